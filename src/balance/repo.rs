use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};
use time::OffsetDateTime;

use crate::concepts::repo::ConceptoTipo;
use crate::payments::repo::{EstadoPago, MetodoPago};

/// One row of the `vista_estado_cuenta` view: a user's standing against one
/// active concept.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EstadoCuentaRow {
    pub usuario_id: i64,
    pub concepto_id: i64,
    pub concepto: String,
    pub tipo: ConceptoTipo,
    pub total_concepto: Decimal,
    pub mensualidades: i32,
    pub total_pagado: Decimal,
    pub saldo_pendiente: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HistorialRow {
    pub id: i64,
    pub monto: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_pago: OffsetDateTime,
    pub parcialidad: i32,
    pub estado: EstadoPago,
    pub metodo_pago: MetodoPago,
    pub referencia: Option<String>,
    pub concepto: String,
    pub tipo_concepto: ConceptoTipo,
}

pub async fn estado_cuenta(
    db: &MySqlPool,
    usuario_id: i64,
) -> anyhow::Result<Vec<EstadoCuentaRow>> {
    let rows = sqlx::query_as::<_, EstadoCuentaRow>(
        r#"
        SELECT usuario_id, concepto_id, concepto, tipo, total_concepto,
               mensualidades, total_pagado, saldo_pendiente
        FROM vista_estado_cuenta
        WHERE usuario_id = ?
        "#,
    )
    .bind(usuario_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn historial(db: &MySqlPool, usuario_id: i64) -> anyhow::Result<Vec<HistorialRow>> {
    let rows = sqlx::query_as::<_, HistorialRow>(
        r#"
        SELECT p.id, p.monto, p.fecha_pago, p.parcialidad, p.estado, p.metodo_pago,
               p.referencia, cp.nombre AS concepto, cp.tipo AS tipo_concepto
        FROM pagos p
        JOIN conceptos_pago cp ON p.concepto_id = cp.id
        WHERE p.usuario_id = ?
        ORDER BY p.fecha_pago DESC
        "#,
    )
    .bind(usuario_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
