use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};
use time::OffsetDateTime;

/// Business classification of an account. Fixed at creation, not a
/// capability hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Vecino,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub nombre: String,
    pub apellidos: Option<String>,
    pub correo: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub numero_vecino: Option<i32>,
    pub rol: Role,
    pub activo: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, nombre, apellidos, correo, password, direccion, telefono, \
                            numero_vecino, rol, activo, created_at";

pub struct NewUser<'a> {
    pub nombre: &'a str,
    pub apellidos: Option<&'a str>,
    pub correo: &'a str,
    pub password_hash: Option<&'a str>,
    pub direccion: Option<&'a str>,
    pub telefono: Option<&'a str>,
    pub numero_vecino: Option<i32>,
    pub rol: Role,
    pub activo: bool,
}

pub struct UserUpdate<'a> {
    pub nombre: &'a str,
    pub apellidos: Option<&'a str>,
    pub correo: &'a str,
    pub password_hash: Option<&'a str>,
    pub direccion: Option<&'a str>,
    pub telefono: Option<&'a str>,
    pub numero_vecino: Option<i32>,
    pub rol: Role,
    pub activo: bool,
}

pub async fn find_by_email(db: &MySqlPool, correo: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM usuarios WHERE correo = ?"
    ))
    .bind(correo)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_id(db: &MySqlPool, id: i64) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM usuarios WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn list(db: &MySqlPool) -> anyhow::Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM usuarios ORDER BY nombre ASC"
    ))
    .fetch_all(db)
    .await?;
    Ok(users)
}

pub async fn create(db: &MySqlPool, new: NewUser<'_>) -> anyhow::Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO usuarios
            (nombre, apellidos, correo, password, direccion, telefono, numero_vecino, rol, activo)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.nombre)
    .bind(new.apellidos)
    .bind(new.correo)
    .bind(new.password_hash)
    .bind(new.direccion)
    .bind(new.telefono)
    .bind(new.numero_vecino)
    .bind(new.rol)
    .bind(new.activo)
    .execute(db)
    .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn update(db: &MySqlPool, id: i64, upd: UserUpdate<'_>) -> anyhow::Result<bool> {
    // The password column is only rewritten when a new hash was provided.
    let result = match upd.password_hash {
        Some(hash) => {
            sqlx::query(
                r#"
                UPDATE usuarios
                SET nombre = ?, apellidos = ?, correo = ?, direccion = ?, telefono = ?,
                    numero_vecino = ?, rol = ?, activo = ?, password = ?
                WHERE id = ?
                "#,
            )
            .bind(upd.nombre)
            .bind(upd.apellidos)
            .bind(upd.correo)
            .bind(upd.direccion)
            .bind(upd.telefono)
            .bind(upd.numero_vecino)
            .bind(upd.rol)
            .bind(upd.activo)
            .bind(hash)
            .bind(id)
            .execute(db)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                UPDATE usuarios
                SET nombre = ?, apellidos = ?, correo = ?, direccion = ?, telefono = ?,
                    numero_vecino = ?, rol = ?, activo = ?
                WHERE id = ?
                "#,
            )
            .bind(upd.nombre)
            .bind(upd.apellidos)
            .bind(upd.correo)
            .bind(upd.direccion)
            .bind(upd.telefono)
            .bind(upd.numero_vecino)
            .bind(upd.rol)
            .bind(upd.activo)
            .bind(id)
            .execute(db)
            .await?
        }
    };
    Ok(result.rows_affected() > 0)
}

/// Flips `activo` and returns the new value, or None when the user is missing.
pub async fn toggle_active(db: &MySqlPool, id: i64) -> anyhow::Result<Option<bool>> {
    let current: Option<(bool,)> =
        sqlx::query_as("SELECT activo FROM usuarios WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
    let Some((activo,)) = current else {
        return Ok(None);
    };
    let nuevo = !activo;
    sqlx::query("UPDATE usuarios SET activo = ? WHERE id = ?")
        .bind(nuevo)
        .bind(id)
        .execute(db)
        .await?;
    Ok(Some(nuevo))
}

pub async fn delete(db: &MySqlPool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM usuarios WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
