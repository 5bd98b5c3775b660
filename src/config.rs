use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Allowed CORS origins. Empty means permissive (development).
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            // Fall back to the discrete DB_* variables the deployment uses
            Err(_) => format!(
                "mysql://{}:{}@{}:{}/{}",
                std::env::var("DB_USER").unwrap_or_else(|_| "root".into()),
                std::env::var("DB_PASSWORD").unwrap_or_default(),
                std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into()),
                std::env::var("DB_PORT").unwrap_or_else(|_| "3306".into()),
                std::env::var("DB_NAME").unwrap_or_else(|_| "colonia_app".into()),
            ),
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();
        Ok(Self {
            database_url,
            jwt,
            cors_origins,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_splits_and_trims() {
        let origins = parse_origins("http://localhost:5173, https://colonia.example ,,");
        assert_eq!(
            origins,
            vec![
                "http://localhost:5173".to_string(),
                "https://colonia.example".to_string()
            ]
        );
    }

    #[test]
    fn parse_origins_empty_means_none() {
        assert!(parse_origins("").is_empty());
        assert!(parse_origins("  ,  ").is_empty());
    }
}
