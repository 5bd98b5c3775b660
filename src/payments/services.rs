use rust_decimal::Decimal;
use sqlx::MySqlPool;
use tracing::info;

use crate::{
    concepts::repo::ConceptoTipo,
    error::ApiError,
    payments::repo::{EstadoPago, MetodoPago},
};

pub struct RegisterPagoInput {
    pub usuario_id: i64,
    pub concepto_id: i64,
    pub monto: Decimal,
    pub metodo_pago: MetodoPago,
    pub referencia: Option<String>,
}

pub struct PagoRegistrado {
    pub id: i64,
    pub parcialidad: i32,
    pub estado: EstadoPago,
}

/// What the ledger currently holds for one (user, concept) pair.
/// Cancelled payments are excluded from both count and sum.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlanSnapshot {
    pub tipo: ConceptoTipo,
    pub total: Decimal,
    pub mensualidades: i32,
    pub pagos_previos: i64,
    pub pagado: Decimal,
}

/// Decides the installment number and resulting status for a new payment,
/// enforcing the ledger invariants:
/// - a unique concept accepts exactly one payment, for the exact total;
/// - an installment concept accepts payments while fewer than
///   `mensualidades` exist, numbered contiguously from 1;
/// - the final installment must settle the remaining balance exactly,
///   earlier ones must not exceed it.
pub(crate) fn plan_next_installment(
    plan: &PlanSnapshot,
    monto: Decimal,
) -> Result<(i32, EstadoPago), ApiError> {
    if monto <= Decimal::ZERO {
        return Err(ApiError::Validation("El monto debe ser mayor a cero".into()));
    }
    let restante = plan.total - plan.pagado;

    match plan.tipo {
        ConceptoTipo::Unico => {
            if plan.pagos_previos > 0 {
                return Err(ApiError::BusinessRule("El concepto ya fue pagado".into()));
            }
            if monto != plan.total {
                return Err(ApiError::BusinessRule(
                    "El monto debe ser igual al total del concepto".into(),
                ));
            }
            Ok((1, EstadoPago::Pagado))
        }
        ConceptoTipo::Parcial => {
            if plan.pagos_previos >= plan.mensualidades as i64 {
                return Err(ApiError::BusinessRule(
                    "Todas las mensualidades ya fueron registradas".into(),
                ));
            }
            let parcialidad = (plan.pagos_previos + 1) as i32;
            if parcialidad == plan.mensualidades {
                if monto != restante {
                    return Err(ApiError::BusinessRule(
                        "El monto de la última mensualidad debe cubrir exactamente el saldo restante"
                            .into(),
                    ));
                }
            } else if monto > restante {
                return Err(ApiError::BusinessRule(
                    "El monto excede el saldo pendiente".into(),
                ));
            }
            let estado = if parcialidad < plan.mensualidades {
                EstadoPago::Pendiente
            } else {
                EstadoPago::Pagado
            };
            Ok((parcialidad, estado))
        }
    }
}

/// Registers a payment inside one transaction. The user row, the concept
/// row and the existing payments for the pair are locked `FOR UPDATE` so
/// concurrent registrations for the same (user, concept) serialize and the
/// overpayment invariant holds. Any validation failure rolls back.
pub async fn register_payment(
    db: &MySqlPool,
    input: RegisterPagoInput,
) -> Result<PagoRegistrado, ApiError> {
    let mut tx = db.begin().await?;

    let usuario: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM usuarios WHERE id = ? AND activo = TRUE FOR UPDATE")
            .bind(input.usuario_id)
            .fetch_optional(&mut *tx)
            .await?;
    if usuario.is_none() {
        return Err(ApiError::NotFound("Usuario no encontrado".into()));
    }

    let concepto: Option<(ConceptoTipo, Decimal, i32)> = sqlx::query_as(
        "SELECT tipo, total, mensualidades FROM conceptos_pago WHERE id = ? FOR UPDATE",
    )
    .bind(input.concepto_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some((tipo, total, mensualidades)) = concepto else {
        return Err(ApiError::NotFound("Concepto no encontrado".into()));
    };

    let (pagos_previos, pagado): (i64, Decimal) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(monto), 0)
        FROM pagos
        WHERE usuario_id = ? AND concepto_id = ? AND estado <> 'cancelado'
        FOR UPDATE
        "#,
    )
    .bind(input.usuario_id)
    .bind(input.concepto_id)
    .fetch_one(&mut *tx)
    .await?;

    let plan = PlanSnapshot {
        tipo,
        total,
        mensualidades,
        pagos_previos,
        pagado,
    };
    let (parcialidad, estado) = plan_next_installment(&plan, input.monto)?;

    let result = sqlx::query(
        r#"
        INSERT INTO pagos (usuario_id, concepto_id, monto, parcialidad, estado, metodo_pago, referencia)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.usuario_id)
    .bind(input.concepto_id)
    .bind(input.monto)
    .bind(parcialidad)
    .bind(estado)
    .bind(input.metodo_pago)
    .bind(input.referencia.as_deref())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let id = result.last_insert_id() as i64;
    info!(
        pago_id = %id,
        usuario_id = %input.usuario_id,
        concepto_id = %input.concepto_id,
        parcialidad,
        estado = ?estado,
        "payment registered"
    );
    Ok(PagoRegistrado {
        id,
        parcialidad,
        estado,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcial(total: i64, mensualidades: i32, pagos_previos: i64, pagado: i64) -> PlanSnapshot {
        PlanSnapshot {
            tipo: ConceptoTipo::Parcial,
            total: Decimal::from(total),
            mensualidades,
            pagos_previos,
            pagado: Decimal::from(pagado),
        }
    }

    fn unico(total: i64, pagos_previos: i64, pagado: i64) -> PlanSnapshot {
        PlanSnapshot {
            tipo: ConceptoTipo::Unico,
            total: Decimal::from(total),
            mensualidades: 1,
            pagos_previos,
            pagado: Decimal::from(pagado),
        }
    }

    #[test]
    fn three_equal_installments_number_contiguously() {
        let m300 = Decimal::from(300);

        let (n1, e1) = plan_next_installment(&parcial(900, 3, 0, 0), m300).unwrap();
        assert_eq!((n1, e1), (1, EstadoPago::Pendiente));

        let (n2, e2) = plan_next_installment(&parcial(900, 3, 1, 300), m300).unwrap();
        assert_eq!((n2, e2), (2, EstadoPago::Pendiente));

        let (n3, e3) = plan_next_installment(&parcial(900, 3, 2, 600), m300).unwrap();
        assert_eq!((n3, e3), (3, EstadoPago::Pagado));
    }

    #[test]
    fn fourth_installment_is_rejected() {
        let err = plan_next_installment(&parcial(900, 3, 3, 900), Decimal::from(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Todas las mensualidades ya fueron registradas"
        );
    }

    #[test]
    fn early_installment_cannot_exceed_remaining_balance() {
        let err = plan_next_installment(&parcial(900, 3, 1, 300), Decimal::from(700)).unwrap_err();
        assert_eq!(err.to_string(), "El monto excede el saldo pendiente");
    }

    #[test]
    fn early_installment_may_settle_balance_exactly() {
        // Paying everything on installment 2 of 3 is allowed; the pair then
        // rejects any further amount, so the sum never exceeds the total.
        let (n, _) = plan_next_installment(&parcial(900, 3, 1, 300), Decimal::from(600)).unwrap();
        assert_eq!(n, 2);
        let err = plan_next_installment(&parcial(900, 3, 2, 900), Decimal::from(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "El monto de la última mensualidad debe cubrir exactamente el saldo restante"
        );
    }

    #[test]
    fn final_installment_must_match_remainder() {
        let err = plan_next_installment(&parcial(900, 3, 2, 600), Decimal::from(200)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "El monto de la última mensualidad debe cubrir exactamente el saldo restante"
        );
        let ok = plan_next_installment(&parcial(900, 3, 2, 600), Decimal::from(300));
        assert!(ok.is_ok());
    }

    #[test]
    fn unico_requires_exact_total_once() {
        let err = plan_next_installment(&unico(500, 0, 0), Decimal::from(400)).unwrap_err();
        assert_eq!(err.to_string(), "El monto debe ser igual al total del concepto");

        let (n, e) = plan_next_installment(&unico(500, 0, 0), Decimal::from(500)).unwrap();
        assert_eq!((n, e), (1, EstadoPago::Pagado));

        let err = plan_next_installment(&unico(500, 1, 500), Decimal::from(500)).unwrap_err();
        assert_eq!(err.to_string(), "El concepto ya fue pagado");
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let err = plan_next_installment(&parcial(900, 3, 0, 0), Decimal::ZERO).unwrap_err();
        assert_eq!(err.to_string(), "El monto debe ser mayor a cero");
        assert!(plan_next_installment(&unico(500, 0, 0), Decimal::from(-10)).is_err());
    }

    #[test]
    fn paid_sum_never_exceeds_total() {
        // Walk a plan with uneven amounts and assert the invariant at each step.
        let total = 900i64;
        let mut pagado = Decimal::ZERO;
        let mut previos = 0i64;
        for monto in [Decimal::from(500), Decimal::from(150), Decimal::from(250)] {
            let plan = PlanSnapshot {
                tipo: ConceptoTipo::Parcial,
                total: Decimal::from(total),
                mensualidades: 3,
                pagos_previos: previos,
                pagado,
            };
            plan_next_installment(&plan, monto).unwrap();
            pagado += monto;
            previos += 1;
            assert!(pagado <= Decimal::from(total));
        }
        assert_eq!(pagado, Decimal::from(total));
    }
}
