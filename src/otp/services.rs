use rand::Rng;
use time::OffsetDateTime;

/// Validity window of a generated code.
pub(crate) const OTP_TTL_SECONDS: i64 = 60;

/// Uniform random 6-digit code.
pub(crate) fn generate_code<R: Rng>(rng: &mut R) -> String {
    rng.gen_range(100_000..1_000_000).to_string()
}

pub(crate) fn is_expired(expires_at: OffsetDateTime, now: OffsetDateTime) -> bool {
    now > expires_at
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use time::Duration;

    #[test]
    fn code_is_always_six_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let code = generate_code(&mut rng);
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().unwrap();
            assert!((100_000..1_000_000).contains(&n));
        }
    }

    #[test]
    fn code_is_deterministic_for_a_fixed_rng() {
        let mut a = StepRng::new(7, 0);
        let mut b = StepRng::new(7, 0);
        assert_eq!(generate_code(&mut a), generate_code(&mut b));
    }

    #[test]
    fn expiry_is_strict() {
        let now = OffsetDateTime::now_utc();
        assert!(!is_expired(now + Duration::seconds(1), now));
        assert!(!is_expired(now, now));
        assert!(is_expired(now - Duration::seconds(1), now));
    }
}
