use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::jwt::{AdminUser, CurrentUser},
    error::ApiError,
    events::repo::{self, Evento, EventoInput},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct EventoBody {
    pub nombre: String,
    pub descripcion: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_inicio: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub fecha_fin: Option<OffsetDateTime>,
    pub lugar: Option<String>,
    pub max_asistentes: Option<i32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/eventos", get(list_events))
        .route("/eventos", post(create_event))
        .route("/eventos/:id", put(update_event))
        .route("/eventos/:id", delete(delete_event))
}

#[instrument(skip(state, _user))]
pub async fn list_events(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Evento>>, ApiError> {
    let rows = repo::list_active(&state.db).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, _admin, payload))]
pub async fn create_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<EventoBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.nombre.trim().is_empty() {
        return Err(ApiError::Validation("Datos incompletos".into()));
    }
    let id = repo::create(
        &state.db,
        EventoInput {
            nombre: payload.nombre.trim(),
            descripcion: payload.descripcion.as_deref(),
            fecha_inicio: payload.fecha_inicio,
            fecha_fin: payload.fecha_fin,
            lugar: payload.lugar.as_deref(),
            max_asistentes: payload.max_asistentes,
        },
    )
    .await?;
    info!(event_id = %id, "event created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Evento creado", "id": id })),
    ))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<EventoBody>,
) -> Result<Json<Value>, ApiError> {
    let updated = repo::update(
        &state.db,
        id,
        EventoInput {
            nombre: payload.nombre.trim(),
            descripcion: payload.descripcion.as_deref(),
            fecha_inicio: payload.fecha_inicio,
            fecha_fin: payload.fecha_fin,
            lugar: payload.lugar.as_deref(),
            max_asistentes: payload.max_asistentes,
        },
    )
    .await?;
    if !updated {
        return Err(ApiError::NotFound("Evento no encontrado".into()));
    }
    info!(event_id = %id, "event updated");
    Ok(Json(json!({ "message": "Evento actualizado" })))
}

#[instrument(skip(state, _admin))]
pub async fn delete_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !repo::deactivate(&state.db, id).await? {
        return Err(ApiError::NotFound("Evento no encontrado".into()));
    }
    info!(event_id = %id, "event deactivated");
    Ok(Json(json!({ "message": "Evento eliminado" })))
}
