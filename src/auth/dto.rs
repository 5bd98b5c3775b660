use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::repo::{Role, User};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub direccion: String,
}

/// Returned after login or registration.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// User as exposed to clients: everything except the password hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub nombre: String,
    pub apellidos: Option<String>,
    pub email: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub numero_vecino: Option<i32>,
    pub rol: Role,
    pub activo: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            nombre: u.nombre,
            apellidos: u.apellidos,
            email: u.correo,
            direccion: u.direccion,
            telefono: u.telefono,
            numero_vecino: u.numero_vecino,
            rol: u.rol,
            activo: u.activo,
            created_at: u.created_at,
        }
    }
}
