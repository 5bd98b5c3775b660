use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AdminUser,
    concepts::repo::{self, Concepto, ConceptoTipo},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ConceptoBody {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub tipo: ConceptoTipo,
    pub total: Decimal,
    pub mensualidades: Option<i32>,
}

/// A single-payment concept always has exactly one "installment".
fn normalize_mensualidades(tipo: ConceptoTipo, mensualidades: Option<i32>) -> i32 {
    match tipo {
        ConceptoTipo::Unico => 1,
        ConceptoTipo::Parcial => mensualidades.unwrap_or(1).max(1),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/conceptos", get(list_concepts))
        .route("/conceptos", post(create_concept))
        .route("/conceptos/:id", put(update_concept))
        .route("/conceptos/:id/estado", patch(toggle_concept))
}

#[instrument(skip(state, _admin))]
pub async fn list_concepts(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Concepto>>, ApiError> {
    let rows = repo::list(&state.db).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, _admin, payload))]
pub async fn create_concept(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<ConceptoBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.nombre.trim().is_empty() || payload.total <= Decimal::ZERO {
        return Err(ApiError::Validation("Datos incompletos".into()));
    }
    let mensualidades = normalize_mensualidades(payload.tipo, payload.mensualidades);
    let id = repo::create(
        &state.db,
        payload.nombre.trim(),
        payload.descripcion.as_deref(),
        payload.tipo,
        payload.total,
        mensualidades,
    )
    .await?;
    info!(concept_id = %id, tipo = ?payload.tipo, "concept created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Concepto creado", "id": id })),
    ))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_concept(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<ConceptoBody>,
) -> Result<Json<Value>, ApiError> {
    if payload.nombre.trim().is_empty() || payload.total <= Decimal::ZERO {
        return Err(ApiError::Validation("Datos incompletos".into()));
    }
    let mensualidades = normalize_mensualidades(payload.tipo, payload.mensualidades);
    let updated = repo::update(
        &state.db,
        id,
        payload.nombre.trim(),
        payload.tipo,
        payload.total,
        mensualidades,
    )
    .await?;
    if !updated {
        return Err(ApiError::NotFound("Concepto no encontrado".into()));
    }
    info!(concept_id = %id, "concept updated");
    Ok(Json(json!({ "message": "Concepto actualizado" })))
}

#[instrument(skip(state, _admin))]
pub async fn toggle_concept(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let activo = repo::toggle_active(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Concepto no encontrado".into()))?;
    info!(concept_id = %id, activo, "concept active flag toggled");
    Ok(Json(json!({ "message": "Estado actualizado", "activo": activo })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unico_always_one_installment() {
        assert_eq!(normalize_mensualidades(ConceptoTipo::Unico, Some(12)), 1);
        assert_eq!(normalize_mensualidades(ConceptoTipo::Unico, None), 1);
    }

    #[test]
    fn parcial_defaults_and_clamps() {
        assert_eq!(normalize_mensualidades(ConceptoTipo::Parcial, Some(6)), 6);
        assert_eq!(normalize_mensualidades(ConceptoTipo::Parcial, None), 1);
        assert_eq!(normalize_mensualidades(ConceptoTipo::Parcial, Some(0)), 1);
    }
}
