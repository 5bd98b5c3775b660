use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    attendance::{
        repo::{self, Asistencia, AsistenciaConUsuario},
        services::{check_window, decode_qr_user_id},
    },
    auth::jwt::CurrentUser,
    error::ApiError,
    events::repo as events_repo,
    state::AppState,
    users::repo as users_repo,
};

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub qr: String,
    pub evento_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub success: bool,
    pub message: String,
    pub usuario: String,
    pub evento: String,
    pub ya_registrado: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub registrada: bool,
    pub asistencia: Option<Asistencia>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/asistencias/scan", post(scan))
        .route("/asistencias/evento/:evento_id", get(list_for_event))
        .route(
            "/asistencias/verificar/:usuario_id/:evento_id",
            get(verify),
        )
}

#[instrument(skip(state, _scanner, payload))]
pub async fn scan(
    State(state): State<AppState>,
    _scanner: CurrentUser,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    if payload.qr.trim().is_empty() {
        return Err(ApiError::Validation("Datos incompletos".into()));
    }
    let usuario_id = decode_qr_user_id(payload.qr.trim())?;

    let evento = events_repo::find_active(&state.db, payload.evento_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Evento no válido".into()))?;

    check_window(OffsetDateTime::now_utc(), evento.fecha_inicio, evento.fecha_fin)?;

    let usuario = users_repo::find_by_id(&state.db, usuario_id)
        .await?
        .filter(|u| u.activo)
        .ok_or_else(|| ApiError::NotFound("Usuario no válido o inactivo".into()))?;

    // Idempotent: a second scan reports the existing record and leaves its
    // timestamp untouched.
    let existing = repo::find(&state.db, usuario_id, payload.evento_id).await?;
    let ya_registrado = existing.as_ref().map(|a| a.presente).unwrap_or(false);

    let message = if ya_registrado {
        format!("{} ya tiene registrada esta asistencia", usuario.nombre)
    } else {
        repo::upsert_present(&state.db, usuario_id, payload.evento_id).await?;
        info!(usuario_id, evento_id = payload.evento_id, "attendance registered");
        format!("Asistencia registrada: {}", usuario.nombre)
    };

    Ok(Json(ScanResponse {
        success: true,
        message,
        usuario: usuario.nombre,
        evento: evento.nombre,
        ya_registrado,
        fecha: OffsetDateTime::now_utc(),
    }))
}

#[instrument(skip(state, _user))]
pub async fn list_for_event(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(evento_id): Path<i64>,
) -> Result<Json<Vec<AsistenciaConUsuario>>, ApiError> {
    let rows = repo::list_for_event(&state.db, evento_id).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, _user))]
pub async fn verify(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((usuario_id, evento_id)): Path<(i64, i64)>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let asistencia = repo::find(&state.db, usuario_id, evento_id).await?;
    let registrada = asistencia.as_ref().map(|a| a.presente).unwrap_or(false);
    Ok(Json(VerifyResponse {
        registrada,
        asistencia,
    }))
}
