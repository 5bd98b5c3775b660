use serde::Deserialize;

use crate::users::repo::Role;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub nombre: String,
    pub apellidos: Option<String>,
    pub correo: String,
    pub telefono: Option<String>,
    pub numero_vecino: Option<i32>,
    pub rol: Option<Role>,
    pub activo: Option<bool>,
    pub password: Option<String>,
    pub direccion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub nombre: String,
    pub apellidos: Option<String>,
    pub correo: String,
    pub telefono: Option<String>,
    pub numero_vecino: Option<i32>,
    pub rol: Role,
    pub activo: bool,
    /// Only rewrites the stored hash when non-empty.
    pub password: Option<String>,
    pub direccion: Option<String>,
}
