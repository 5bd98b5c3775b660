use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument};

use crate::{
    error::ApiError,
    otp::{
        repo,
        services::{generate_code, is_expired, OTP_TTL_SECONDS},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub otp: String,
    #[serde(rename = "expiresAt", with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub otp: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub message: String,
}

// No auth on these routes: the kiosk flow calls them before a session exists.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/otp/generar", post(generar))
        .route("/otp/validar", post(validar))
}

#[instrument(skip(state))]
pub async fn generar(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let otp = generate_code(&mut rand::thread_rng());
    let expires_at = OffsetDateTime::now_utc() + Duration::seconds(OTP_TTL_SECONDS);

    repo::upsert(&state.db, payload.user_id, &otp, expires_at).await?;

    info!(usuario_id = %payload.user_id, "otp generated");
    Ok(Json(GenerateResponse { otp, expires_at }))
}

#[instrument(skip(state, payload))]
pub async fn validar(
    State(state): State<AppState>,
    Json(payload): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    if payload.otp.trim().is_empty() {
        return Err(ApiError::Validation("Faltan parámetros".into()));
    }

    let row = repo::find(&state.db, payload.user_id, payload.otp.trim())
        .await?
        .ok_or_else(|| ApiError::Validation("OTP incorrecto".into()))?;

    if is_expired(row.expires_at, OffsetDateTime::now_utc()) {
        return Err(ApiError::Validation("OTP expirado".into()));
    }

    // The code is not consumed here; it stays valid until expiry.
    Ok(Json(ValidateResponse {
        valid: true,
        message: "OTP válido".into(),
    }))
}
