use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};
use time::OffsetDateTime;

use crate::concepts::repo::ConceptoTipo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EstadoPago {
    Pendiente,
    Pagado,
    Cancelado,
}

impl EstadoPago {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pendiente" => Some(Self::Pendiente),
            "pagado" => Some(Self::Pagado),
            "cancelado" => Some(Self::Cancelado),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MetodoPago {
    Efectivo,
    Transferencia,
    Tarjeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pago {
    pub id: i64,
    pub usuario_id: i64,
    pub concepto_id: i64,
    pub monto: Decimal,
    pub parcialidad: i32,
    pub estado: EstadoPago,
    pub metodo_pago: MetodoPago,
    pub referencia: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_pago: OffsetDateTime,
}

/// Picker entry for the admin payment form.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UsuarioNombre {
    pub id: i64,
    pub nombre: String,
    pub apellidos: Option<String>,
}

/// One installment as shown in the per-user ledger.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Parcialidad {
    pub id: i64,
    pub concepto_id: i64,
    pub numero: i32,
    pub monto: Decimal,
    pub estado: EstadoPago,
    pub metodo_pago: MetodoPago,
    pub referencia: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_pago: OffsetDateTime,
}

/// Per-concept aggregate for one user. Cancelled payments do not count
/// toward the paid total.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConceptoResumen {
    pub id: i64,
    pub nombre: String,
    pub tipo: ConceptoTipo,
    pub total: Decimal,
    pub mensualidades: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub fecha_limite: Option<OffsetDateTime>,
    pub pagado: Decimal,
    pub pendiente: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ConceptoConPagos {
    #[serde(flatten)]
    pub resumen: ConceptoResumen,
    pub parcialidades: Vec<Parcialidad>,
}

pub async fn user_names(db: &MySqlPool) -> anyhow::Result<Vec<UsuarioNombre>> {
    let rows = sqlx::query_as::<_, UsuarioNombre>(
        "SELECT id, nombre, apellidos FROM usuarios ORDER BY nombre ASC",
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Full ledger of one user: every active concept with its aggregates and
/// the ordered list of registered installments.
pub async fn ledger_for_user(
    db: &MySqlPool,
    usuario_id: i64,
) -> anyhow::Result<Vec<ConceptoConPagos>> {
    let resumen = sqlx::query_as::<_, ConceptoResumen>(
        r#"
        SELECT
            c.id,
            c.nombre,
            c.tipo,
            c.total,
            c.mensualidades,
            c.fecha_limite,
            COALESCE(SUM(CASE WHEN p.estado <> 'cancelado' THEN p.monto END), 0) AS pagado,
            c.total - COALESCE(SUM(CASE WHEN p.estado <> 'cancelado' THEN p.monto END), 0) AS pendiente
        FROM conceptos_pago c
        LEFT JOIN pagos p ON c.id = p.concepto_id AND p.usuario_id = ?
        WHERE c.activo = TRUE
        GROUP BY c.id, c.nombre, c.tipo, c.total, c.mensualidades, c.fecha_limite
        ORDER BY c.nombre ASC
        "#,
    )
    .bind(usuario_id)
    .fetch_all(db)
    .await?;

    let parcialidades = sqlx::query_as::<_, Parcialidad>(
        r#"
        SELECT id, concepto_id, parcialidad AS numero, monto, estado, metodo_pago,
               referencia, fecha_pago
        FROM pagos
        WHERE usuario_id = ?
        ORDER BY concepto_id, parcialidad ASC
        "#,
    )
    .bind(usuario_id)
    .fetch_all(db)
    .await?;

    let ledger = resumen
        .into_iter()
        .map(|r| {
            let propias = parcialidades
                .iter()
                .filter(|p| p.concepto_id == r.id)
                .cloned()
                .collect();
            ConceptoConPagos {
                resumen: r,
                parcialidades: propias,
            }
        })
        .collect();
    Ok(ledger)
}

pub async fn update_payment(
    db: &MySqlPool,
    id: i64,
    monto: Decimal,
    metodo_pago: MetodoPago,
    referencia: Option<&str>,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE pagos SET monto = ?, metodo_pago = ?, referencia = ? WHERE id = ?",
    )
    .bind(monto)
    .bind(metodo_pago)
    .bind(referencia)
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_status(db: &MySqlPool, id: i64, estado: EstadoPago) -> anyhow::Result<bool> {
    let result = sqlx::query("UPDATE pagos SET estado = ? WHERE id = ?")
        .bind(estado)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(db: &MySqlPool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM pagos WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
