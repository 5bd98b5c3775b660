use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use time::{macros::time, OffsetDateTime};

use crate::error::ApiError;

/// Decodes a scanned QR payload into the user id it carries.
///
/// The payload is base64 of `<label>-<userId>`. The label is not verified
/// against anything; the user id is re-validated against the database by the
/// caller.
pub(crate) fn decode_qr_user_id(qr: &str) -> Result<i64, ApiError> {
    let bytes = BASE64
        .decode(qr)
        .map_err(|_| ApiError::Validation("QR inválido (error de codificación)".into()))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| ApiError::Validation("QR inválido (error de codificación)".into()))?;

    let partes: Vec<&str> = text.split('-').collect();
    if partes.len() != 2 {
        return Err(ApiError::Validation("Formato de QR inválido".into()));
    }
    partes[1]
        .parse::<i64>()
        .map_err(|_| ApiError::Validation("ID de usuario inválido en QR".into()))
}

/// Check-in window of an event. A missing end time means the event runs
/// until 23:59:59 of its start date.
pub(crate) fn event_window(
    fecha_inicio: OffsetDateTime,
    fecha_fin: Option<OffsetDateTime>,
) -> (OffsetDateTime, OffsetDateTime) {
    let end = fecha_fin.unwrap_or_else(|| fecha_inicio.replace_time(time!(23:59:59)));
    (fecha_inicio, end)
}

pub(crate) fn check_window(
    now: OffsetDateTime,
    fecha_inicio: OffsetDateTime,
    fecha_fin: Option<OffsetDateTime>,
) -> Result<(), ApiError> {
    let (start, end) = event_window(fecha_inicio, fecha_fin);
    if now > end {
        return Err(ApiError::Validation("El evento ya ha finalizado".into()));
    }
    if now < start {
        return Err(ApiError::Validation("El evento aún no ha comenzado".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn encode(plain: &str) -> String {
        BASE64.encode(plain.as_bytes())
    }

    #[test]
    fn decodes_valid_payload() {
        let qr = encode("vecino-42");
        assert_eq!(decode_qr_user_id(&qr).unwrap(), 42);
    }

    #[test]
    fn rejects_bad_base64() {
        let err = decode_qr_user_id("%%%not-base64%%%").unwrap_err();
        assert_eq!(err.to_string(), "QR inválido (error de codificación)");
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!(decode_qr_user_id(&encode("solo_un_segmento")).is_err());
        assert!(decode_qr_user_id(&encode("a-b-c")).is_err());
    }

    #[test]
    fn rejects_non_numeric_user_id() {
        let err = decode_qr_user_id(&encode("vecino-abc")).unwrap_err();
        assert_eq!(err.to_string(), "ID de usuario inválido en QR");
    }

    #[test]
    fn window_defaults_to_end_of_start_day() {
        let start = datetime!(2026-03-10 18:00 UTC);
        let (_, end) = event_window(start, None);
        assert_eq!(end, datetime!(2026-03-10 23:59:59 UTC));
    }

    #[test]
    fn window_uses_explicit_end_when_present() {
        let start = datetime!(2026-03-10 18:00 UTC);
        let end = datetime!(2026-03-11 02:00 UTC);
        assert_eq!(event_window(start, Some(end)).1, end);
    }

    #[test]
    fn check_window_rejects_before_and_after() {
        let start = datetime!(2026-03-10 18:00 UTC);
        let end = Some(datetime!(2026-03-10 20:00 UTC));

        let early = check_window(datetime!(2026-03-10 17:59 UTC), start, end).unwrap_err();
        assert_eq!(early.to_string(), "El evento aún no ha comenzado");

        let late = check_window(datetime!(2026-03-10 20:01 UTC), start, end).unwrap_err();
        assert_eq!(late.to_string(), "El evento ya ha finalizado");

        assert!(check_window(datetime!(2026-03-10 19:00 UTC), start, end).is_ok());
    }
}
