use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::{CurrentUser, JwtKeys},
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    users::repo::{self as users_repo, NewUser, Role},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Email y contraseña son requeridos".into(),
        ));
    }

    // Unknown email and bad password answer identically so accounts cannot
    // be enumerated.
    let user = match users_repo::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Auth("Credenciales incorrectas".into()));
        }
    };

    let ok = match user.password.as_deref() {
        Some(hash) => verify_password(&payload.password, hash)?,
        None => false,
    };
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Auth("Credenciales incorrectas".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        user: PublicUser::from(user),
        token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.nombre.trim().is_empty()
        || payload.email.is_empty()
        || payload.password.is_empty()
        || payload.direccion.trim().is_empty()
    {
        return Err(ApiError::Validation(
            "Todos los campos son requeridos".into(),
        ));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Email inválido".into()));
    }

    if users_repo::find_by_email(&state.db, &payload.email)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Validation("El usuario ya existe".into()));
    }

    let hash = hash_password(&payload.password)?;
    let id = users_repo::create(
        &state.db,
        NewUser {
            nombre: payload.nombre.trim(),
            apellidos: None,
            correo: &payload.email,
            password_hash: Some(&hash),
            direccion: Some(payload.direccion.trim()),
            telefono: None,
            numero_vecino: None,
            rol: Role::Vecino,
            activo: true,
        },
    )
    .await?;

    let user = users_repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user missing after insert")))?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;

    info!(user_id = %user.id, email = %user.correo, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: PublicUser::from(user),
            token,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = users_repo::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("Usuario no encontrado".into()))?;
    Ok(Json(PublicUser::from(user)))
}

/// The token lives client-side only; this endpoint just acknowledges.
#[instrument(skip_all)]
pub async fn logout(CurrentUser(claims): CurrentUser) -> Json<Value> {
    info!(user_id = %claims.sub, "user logged out");
    Json(json!({ "message": "Sesión cerrada exitosamente" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("vecino@colonia.mx"));
        assert!(is_valid_email("a.b+c@d.co"));
        assert!(!is_valid_email("sin-arroba"));
        assert!(!is_valid_email("dos@@signos.mx"));
        assert!(!is_valid_email("espacio @dominio.mx"));
    }
}
