use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asistencia {
    pub id: i64,
    pub usuario_id: i64,
    pub evento_id: i64,
    pub presente: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_asistencia: OffsetDateTime,
}

/// Attendance row joined with the resident it belongs to.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AsistenciaConUsuario {
    pub id: i64,
    pub usuario_id: i64,
    pub evento_id: i64,
    pub presente: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_asistencia: OffsetDateTime,
    pub nombre: String,
    pub apellidos: Option<String>,
    pub numero_vecino: Option<i32>,
}

pub async fn find(
    db: &MySqlPool,
    usuario_id: i64,
    evento_id: i64,
) -> anyhow::Result<Option<Asistencia>> {
    let row = sqlx::query_as::<_, Asistencia>(
        r#"
        SELECT id, usuario_id, evento_id, presente, fecha_asistencia
        FROM asistencias
        WHERE usuario_id = ? AND evento_id = ?
        "#,
    )
    .bind(usuario_id)
    .bind(evento_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Marks the pair present. The unique key on (usuario_id, evento_id)
/// guarantees at most one row per pair.
pub async fn upsert_present(
    db: &MySqlPool,
    usuario_id: i64,
    evento_id: i64,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO asistencias (usuario_id, evento_id, presente, fecha_asistencia)
        VALUES (?, ?, TRUE, NOW())
        ON DUPLICATE KEY UPDATE presente = TRUE, fecha_asistencia = NOW()
        "#,
    )
    .bind(usuario_id)
    .bind(evento_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn list_for_event(
    db: &MySqlPool,
    evento_id: i64,
) -> anyhow::Result<Vec<AsistenciaConUsuario>> {
    let rows = sqlx::query_as::<_, AsistenciaConUsuario>(
        r#"
        SELECT a.id, a.usuario_id, a.evento_id, a.presente, a.fecha_asistencia,
               u.nombre, u.apellidos, u.numero_vecino
        FROM asistencias a
        JOIN usuarios u ON a.usuario_id = u.id
        WHERE a.evento_id = ?
        ORDER BY a.fecha_asistencia DESC
        "#,
    )
    .bind(evento_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
