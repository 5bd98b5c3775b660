use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Evento {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_inicio: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub fecha_fin: Option<OffsetDateTime>,
    pub lugar: Option<String>,
    pub max_asistentes: Option<i32>,
    pub activo: bool,
}

const EVENT_COLUMNS: &str =
    "id, nombre, descripcion, fecha_inicio, fecha_fin, lugar, max_asistentes, activo";

pub struct EventoInput<'a> {
    pub nombre: &'a str,
    pub descripcion: Option<&'a str>,
    pub fecha_inicio: OffsetDateTime,
    pub fecha_fin: Option<OffsetDateTime>,
    pub lugar: Option<&'a str>,
    pub max_asistentes: Option<i32>,
}

/// Active events only, soonest first. Residents never see inactive events.
pub async fn list_active(db: &MySqlPool) -> anyhow::Result<Vec<Evento>> {
    let rows = sqlx::query_as::<_, Evento>(&format!(
        "SELECT {EVENT_COLUMNS} FROM eventos WHERE activo = TRUE ORDER BY fecha_inicio ASC"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_active(db: &MySqlPool, id: i64) -> anyhow::Result<Option<Evento>> {
    let row = sqlx::query_as::<_, Evento>(&format!(
        "SELECT {EVENT_COLUMNS} FROM eventos WHERE id = ? AND activo = TRUE"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn create(db: &MySqlPool, input: EventoInput<'_>) -> anyhow::Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO eventos (nombre, descripcion, fecha_inicio, fecha_fin, lugar, max_asistentes)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.nombre)
    .bind(input.descripcion)
    .bind(input.fecha_inicio)
    .bind(input.fecha_fin)
    .bind(input.lugar)
    .bind(input.max_asistentes)
    .execute(db)
    .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn update(db: &MySqlPool, id: i64, input: EventoInput<'_>) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE eventos
        SET nombre = ?, descripcion = ?, fecha_inicio = ?, fecha_fin = ?, lugar = ?, max_asistentes = ?
        WHERE id = ?
        "#,
    )
    .bind(input.nombre)
    .bind(input.descripcion)
    .bind(input.fecha_inicio)
    .bind(input.fecha_fin)
    .bind(input.lugar)
    .bind(input.max_asistentes)
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Soft delete: events stay around for attendance history.
pub async fn deactivate(db: &MySqlPool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("UPDATE eventos SET activo = FALSE WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
