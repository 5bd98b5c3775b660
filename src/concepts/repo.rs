use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};
use time::OffsetDateTime;

/// How a concept is paid: all at once or in monthly installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ConceptoTipo {
    Unico,
    Parcial,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Concepto {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub tipo: ConceptoTipo,
    pub total: Decimal,
    pub mensualidades: i32,
    pub activo: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub fecha_limite: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const CONCEPT_COLUMNS: &str =
    "id, nombre, descripcion, tipo, total, mensualidades, activo, fecha_limite, created_at";

pub async fn list(db: &MySqlPool) -> anyhow::Result<Vec<Concepto>> {
    let rows = sqlx::query_as::<_, Concepto>(&format!(
        "SELECT {CONCEPT_COLUMNS} FROM conceptos_pago ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_active(db: &MySqlPool) -> anyhow::Result<Vec<Concepto>> {
    let rows = sqlx::query_as::<_, Concepto>(&format!(
        "SELECT {CONCEPT_COLUMNS} FROM conceptos_pago WHERE activo = TRUE ORDER BY nombre"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn create(
    db: &MySqlPool,
    nombre: &str,
    descripcion: Option<&str>,
    tipo: ConceptoTipo,
    total: Decimal,
    mensualidades: i32,
) -> anyhow::Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO conceptos_pago (nombre, descripcion, tipo, total, mensualidades, activo)
        VALUES (?, ?, ?, ?, ?, TRUE)
        "#,
    )
    .bind(nombre)
    .bind(descripcion)
    .bind(tipo)
    .bind(total)
    .bind(mensualidades)
    .execute(db)
    .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn update(
    db: &MySqlPool,
    id: i64,
    nombre: &str,
    tipo: ConceptoTipo,
    total: Decimal,
    mensualidades: i32,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE conceptos_pago
        SET nombre = ?, tipo = ?, total = ?, mensualidades = ?
        WHERE id = ?
        "#,
    )
    .bind(nombre)
    .bind(tipo)
    .bind(total)
    .bind(mensualidades)
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn toggle_active(db: &MySqlPool, id: i64) -> anyhow::Result<Option<bool>> {
    let current: Option<(bool,)> =
        sqlx::query_as("SELECT activo FROM conceptos_pago WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
    let Some((activo,)) = current else {
        return Ok(None);
    };
    let nuevo = !activo;
    sqlx::query("UPDATE conceptos_pago SET activo = ? WHERE id = ?")
        .bind(nuevo)
        .bind(id)
        .execute(db)
        .await?;
    Ok(Some(nuevo))
}
