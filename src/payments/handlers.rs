use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AdminUser,
    error::ApiError,
    payments::{
        repo::{self, ConceptoConPagos, EstadoPago, MetodoPago, UsuarioNombre},
        services::{register_payment, RegisterPagoInput},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegistrarPagoRequest {
    pub usuario_id: i64,
    pub concepto_id: i64,
    pub monto: Decimal,
    pub metodo_pago: Option<MetodoPago>,
    pub referencia: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActualizarPagoRequest {
    pub monto: Decimal,
    pub metodo_pago: MetodoPago,
    pub referencia: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EstadoRequest {
    pub estado: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pagos/usuarios", get(list_user_names))
        .route("/pagos/usuario/:usuario_id", get(user_ledger))
        .route("/pagos/registrar", post(registrar))
        .route("/pagos/:id", put(update_payment))
        .route("/pagos/:id/estado", patch(set_status))
        .route("/pagos/:id", delete(delete_payment))
}

#[instrument(skip(state, _admin))]
pub async fn list_user_names(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UsuarioNombre>>, ApiError> {
    let rows = repo::user_names(&state.db).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, _admin))]
pub async fn user_ledger(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(usuario_id): Path<i64>,
) -> Result<Json<Vec<ConceptoConPagos>>, ApiError> {
    let ledger = repo::ledger_for_user(&state.db, usuario_id).await?;
    Ok(Json(ledger))
}

#[instrument(skip(state, _admin, payload))]
pub async fn registrar(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<RegistrarPagoRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let registrado = register_payment(
        &state.db,
        RegisterPagoInput {
            usuario_id: payload.usuario_id,
            concepto_id: payload.concepto_id,
            monto: payload.monto,
            metodo_pago: payload.metodo_pago.unwrap_or(MetodoPago::Efectivo),
            referencia: payload.referencia,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Pago registrado",
            "id": registrado.id,
            "parcialidad": registrado.parcialidad,
            "estado": registrado.estado,
        })),
    ))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_payment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<ActualizarPagoRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.monto <= Decimal::ZERO {
        return Err(ApiError::Validation("El monto debe ser mayor a cero".into()));
    }
    let updated = repo::update_payment(
        &state.db,
        id,
        payload.monto,
        payload.metodo_pago,
        payload.referencia.as_deref(),
    )
    .await?;
    if !updated {
        return Err(ApiError::NotFound("Pago no encontrado".into()));
    }
    info!(pago_id = %id, "payment updated");
    Ok(Json(json!({ "message": "Pago actualizado" })))
}

#[instrument(skip(state, _admin, payload))]
pub async fn set_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<EstadoRequest>,
) -> Result<Json<Value>, ApiError> {
    let estado = EstadoPago::parse(&payload.estado)
        .ok_or_else(|| ApiError::Validation("Estado inválido".into()))?;
    if !repo::set_status(&state.db, id, estado).await? {
        return Err(ApiError::NotFound("Pago no encontrado".into()));
    }
    info!(pago_id = %id, estado = ?estado, "payment status changed");
    Ok(Json(json!({ "message": "Estado actualizado", "estado": estado })))
}

#[instrument(skip(state, _admin))]
pub async fn delete_payment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Pago no encontrado".into()));
    }
    info!(pago_id = %id, "payment deleted");
    Ok(Json(json!({ "message": "Pago eliminado" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estado_parses_known_values_only() {
        assert_eq!(EstadoPago::parse("pendiente"), Some(EstadoPago::Pendiente));
        assert_eq!(EstadoPago::parse("pagado"), Some(EstadoPago::Pagado));
        assert_eq!(EstadoPago::parse("cancelado"), Some(EstadoPago::Cancelado));
        assert_eq!(EstadoPago::parse("PAGADO"), None);
        assert_eq!(EstadoPago::parse("otro"), None);
    }
}
