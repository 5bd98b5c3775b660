use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::jwt::{AdminUser, CurrentUser},
    error::ApiError,
    news::repo::{self, Noticia},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct NoticiaBody {
    pub titulo: String,
    pub contenido: String,
    #[serde(default)]
    pub destacada: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/noticias", get(list_news))
        .route("/noticias", post(create_news))
        .route("/noticias/:id", put(update_news))
        .route("/noticias/:id", delete(delete_news))
}

#[instrument(skip(state, _user))]
pub async fn list_news(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Noticia>>, ApiError> {
    let rows = repo::list(&state.db).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_news(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<NoticiaBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.titulo.trim().is_empty() || payload.contenido.trim().is_empty() {
        return Err(ApiError::Validation("Datos incompletos".into()));
    }
    let id = repo::create(
        &state.db,
        payload.titulo.trim(),
        &payload.contenido,
        payload.destacada,
        admin.sub,
    )
    .await?;
    info!(news_id = %id, author = %admin.sub, "news created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Noticia creada", "id": id })),
    ))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_news(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<NoticiaBody>,
) -> Result<Json<Value>, ApiError> {
    if payload.titulo.trim().is_empty() || payload.contenido.trim().is_empty() {
        return Err(ApiError::Validation("Datos incompletos".into()));
    }
    let updated = repo::update(
        &state.db,
        id,
        payload.titulo.trim(),
        &payload.contenido,
        payload.destacada,
    )
    .await?;
    if !updated {
        return Err(ApiError::NotFound("Noticia no encontrada".into()));
    }
    info!(news_id = %id, "news updated");
    Ok(Json(json!({ "message": "Noticia actualizada" })))
}

#[instrument(skip(state, _admin))]
pub async fn delete_news(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Noticia no encontrada".into()));
    }
    info!(news_id = %id, "news deleted");
    Ok(Json(json!({ "message": "Noticia eliminada" })))
}
