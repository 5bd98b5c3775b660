use sqlx::{FromRow, MySqlPool};
use time::OffsetDateTime;

/// Single active code per user; regeneration overwrites it.
#[derive(Debug, Clone, FromRow)]
pub struct OtpRow {
    pub usuario_id: i64,
    pub otp: String,
    pub expires_at: OffsetDateTime,
}

pub async fn upsert(
    db: &MySqlPool,
    usuario_id: i64,
    otp: &str,
    expires_at: OffsetDateTime,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO otps (usuario_id, otp, expires_at)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE otp = VALUES(otp), expires_at = VALUES(expires_at)
        "#,
    )
    .bind(usuario_id)
    .bind(otp)
    .bind(expires_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find(
    db: &MySqlPool,
    usuario_id: i64,
    otp: &str,
) -> anyhow::Result<Option<OtpRow>> {
    let row = sqlx::query_as::<_, OtpRow>(
        "SELECT usuario_id, otp, expires_at FROM otps WHERE usuario_id = ? AND otp = ?",
    )
    .bind(usuario_id)
    .bind(otp)
    .fetch_optional(db)
    .await?;
    Ok(row)
}
