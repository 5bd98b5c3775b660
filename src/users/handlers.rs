use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::{jwt::AdminUser, password::hash_password},
    error::ApiError,
    state::AppState,
    users::{
        dto::{CreateUserRequest, UpdateUserRequest},
        repo::{self, NewUser, Role, User, UserUpdate},
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/usuarios", get(list_users))
        .route("/usuarios", post(create_user))
        .route("/usuarios/:id", get(get_user))
        .route("/usuarios/:id", put(update_user))
        .route("/usuarios/:id/estado", patch(toggle_user))
        .route("/usuarios/:id", delete(delete_user))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = repo::list(&state.db).await?;
    Ok(Json(users))
}

#[instrument(skip(state, _admin))]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Usuario no encontrado".into()))?;
    Ok(Json(user))
}

#[instrument(skip(state, _admin, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.nombre.trim().is_empty() || payload.correo.trim().is_empty() {
        return Err(ApiError::Validation("Datos incompletos".into()));
    }
    if repo::find_by_email(&state.db, payload.correo.trim())
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("El usuario ya existe".into()));
    }

    let hash = match payload.password.as_deref() {
        Some(p) if !p.trim().is_empty() => Some(hash_password(p)?),
        _ => None,
    };

    let id = repo::create(
        &state.db,
        NewUser {
            nombre: payload.nombre.trim(),
            apellidos: payload.apellidos.as_deref(),
            correo: payload.correo.trim(),
            password_hash: hash.as_deref(),
            direccion: payload.direccion.as_deref(),
            telefono: payload.telefono.as_deref(),
            numero_vecino: payload.numero_vecino,
            rol: payload.rol.unwrap_or(Role::Vecino),
            activo: payload.activo.unwrap_or(true),
        },
    )
    .await?;

    info!(user_id = %id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Usuario creado", "id": id })),
    ))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    let hash = match payload.password.as_deref() {
        Some(p) if !p.trim().is_empty() => Some(hash_password(p)?),
        _ => None,
    };

    let updated = repo::update(
        &state.db,
        id,
        UserUpdate {
            nombre: payload.nombre.trim(),
            apellidos: payload.apellidos.as_deref(),
            correo: payload.correo.trim(),
            password_hash: hash.as_deref(),
            direccion: payload.direccion.as_deref(),
            telefono: payload.telefono.as_deref(),
            numero_vecino: payload.numero_vecino,
            rol: payload.rol,
            activo: payload.activo,
        },
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound("Usuario no encontrado".into()));
    }
    info!(user_id = %id, "user updated");
    Ok(Json(json!({ "message": "Usuario actualizado" })))
}

#[instrument(skip(state, _admin))]
pub async fn toggle_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let activo = repo::toggle_active(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Usuario no encontrado".into()))?;
    info!(user_id = %id, activo, "user active flag toggled");
    Ok(Json(json!({ "message": "Estado actualizado", "activo": activo })))
}

#[instrument(skip(state, _admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Usuario no encontrado".into()));
    }
    info!(user_id = %id, "user deleted");
    Ok(Json(json!({ "message": "Usuario eliminado" })))
}
