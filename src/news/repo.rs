use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Noticia {
    pub id: i64,
    pub titulo: String,
    pub contenido: String,
    pub destacada: bool,
    pub usuario_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_publicacion: OffsetDateTime,
}

pub async fn list(db: &MySqlPool) -> anyhow::Result<Vec<Noticia>> {
    let rows = sqlx::query_as::<_, Noticia>(
        r#"
        SELECT id, titulo, contenido, destacada, usuario_id, fecha_publicacion
        FROM noticias
        ORDER BY fecha_publicacion DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn create(
    db: &MySqlPool,
    titulo: &str,
    contenido: &str,
    destacada: bool,
    usuario_id: i64,
) -> anyhow::Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO noticias (titulo, contenido, destacada, usuario_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(titulo)
    .bind(contenido)
    .bind(destacada)
    .bind(usuario_id)
    .execute(db)
    .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn update(
    db: &MySqlPool,
    id: i64,
    titulo: &str,
    contenido: &str,
    destacada: bool,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE noticias
        SET titulo = ?, contenido = ?, destacada = ?
        WHERE id = ?
        "#,
    )
    .bind(titulo)
    .bind(contenido)
    .bind(destacada)
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(db: &MySqlPool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM noticias WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
