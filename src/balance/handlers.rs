use axum::{extract::State, routing::get, Json, Router};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::jwt::CurrentUser,
    balance::repo::{self, EstadoCuentaRow, HistorialRow},
    concepts::repo::{self as concepts_repo, Concepto},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub detalle: Vec<EstadoCuentaRow>,
    pub resumen: BalanceResumen,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResumen {
    pub total_pagado: Decimal,
    pub total_pendiente: Decimal,
    pub total_conceptos: Decimal,
    pub conceptos_activos: usize,
}

pub(crate) fn summarize(detalle: &[EstadoCuentaRow]) -> BalanceResumen {
    BalanceResumen {
        total_pagado: detalle.iter().map(|r| r.total_pagado).sum(),
        total_pendiente: detalle.iter().map(|r| r.saldo_pendiente).sum(),
        total_conceptos: detalle.iter().map(|r| r.total_concepto).sum(),
        conceptos_activos: detalle.len(),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/balance", get(get_balance))
        .route("/balance/historial", get(get_history))
        .route("/balance/conceptos", get(get_concepts))
}

/// A resident only ever sees their own ledger; the user id comes from the
/// token, never from the request.
#[instrument(skip(state))]
pub async fn get_balance(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let detalle = repo::estado_cuenta(&state.db, claims.sub).await?;
    let resumen = summarize(&detalle);
    Ok(Json(BalanceResponse { detalle, resumen }))
}

#[instrument(skip(state))]
pub async fn get_history(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<Vec<HistorialRow>>, ApiError> {
    let rows = repo::historial(&state.db, claims.sub).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, _user))]
pub async fn get_concepts(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Concepto>>, ApiError> {
    let rows = concepts_repo::list_active(&state.db).await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::repo::ConceptoTipo;

    fn row(total: i64, pagado: i64) -> EstadoCuentaRow {
        EstadoCuentaRow {
            usuario_id: 1,
            concepto_id: 1,
            concepto: "Cuota".into(),
            tipo: ConceptoTipo::Parcial,
            total_concepto: Decimal::from(total),
            mensualidades: 3,
            total_pagado: Decimal::from(pagado),
            saldo_pendiente: Decimal::from(total - pagado),
        }
    }

    #[test]
    fn summary_adds_across_concepts() {
        let detalle = vec![row(900, 300), row(500, 500)];
        let resumen = summarize(&detalle);
        assert_eq!(resumen.total_pagado, Decimal::from(800));
        assert_eq!(resumen.total_pendiente, Decimal::from(600));
        assert_eq!(resumen.total_conceptos, Decimal::from(1400));
        assert_eq!(resumen.conceptos_activos, 2);
    }

    #[test]
    fn summary_of_empty_ledger_is_zero() {
        let resumen = summarize(&[]);
        assert_eq!(resumen.total_pagado, Decimal::ZERO);
        assert_eq!(resumen.total_pendiente, Decimal::ZERO);
        assert_eq!(resumen.conceptos_activos, 0);
    }
}
