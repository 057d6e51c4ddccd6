use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub uploads: UploadConfig,
    pub security: SecurityConfig,
    pub geocoder: GeocoderConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base used to build password reset links handed to the mailer.
    pub public_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_upload: usize,
    pub upload_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_days: i64,
    pub cookie_expiry_days: i64,
    pub secure_cookies: bool,
    /// Empty means permissive CORS.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.database.url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        config.security.jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if config.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }

        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }
        if let Ok(v) = env::var("RESET_URL_BASE") {
            self.server.public_url = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // Query overrides
        if let Ok(v) = env::var("QUERY_DEFAULT_LIMIT") {
            self.query.default_limit = parse_var("QUERY_DEFAULT_LIMIT", &v)?;
        }
        if let Ok(v) = env::var("QUERY_MAX_LIMIT") {
            self.query.max_limit = parse_var("QUERY_MAX_LIMIT", &v)?;
        }

        // Upload overrides
        if let Ok(v) = env::var("MAX_FILE_UPLOAD") {
            self.uploads.max_file_upload = parse_var("MAX_FILE_UPLOAD", &v)?;
        }
        if let Ok(v) = env::var("FILE_UPLOAD_PATH") {
            self.uploads.upload_path = PathBuf::from(v);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_EXPIRE_DAYS") {
            self.security.jwt_expiry_days = parse_var("JWT_EXPIRE_DAYS", &v)?;
        }
        if let Ok(v) = env::var("JWT_COOKIE_EXPIRE_DAYS") {
            self.security.cookie_expiry_days = parse_var("JWT_COOKIE_EXPIRE_DAYS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Geocoder overrides
        if let Ok(v) = env::var("GEOCODER_BASE_URL") {
            self.geocoder.base_url = v;
        }
        if let Ok(v) = env::var("GEOCODER_API_KEY") {
            self.geocoder.api_key = v;
        }

        if self.query.default_limit == 0 || self.query.max_limit < self.query.default_limit {
            return Err(ConfigError::Invalid {
                name: "QUERY_DEFAULT_LIMIT",
                value: self.query.default_limit.to_string(),
            });
        }

        Ok(self)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                public_url: "http://localhost:5000".to_string(),
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
            },
            query: QueryConfig {
                default_limit: 25,
                max_limit: 100,
            },
            uploads: UploadConfig {
                max_file_upload: 1_000_000,
                upload_path: PathBuf::from("./public/uploads"),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_days: 30,
                cookie_expiry_days: 30,
                secure_cookies: false,
                cors_origins: vec![],
            },
            geocoder: GeocoderConfig {
                base_url: "https://www.mapquestapi.com/geocoding/v1/address".to_string(),
                api_key: String::new(),
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.secure_cookies = true;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.secure_cookies = true;
        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.query.default_limit, 25);
        assert_eq!(config.uploads.max_file_upload, 1_000_000);
        assert!(!config.security.secure_cookies);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.is_production());
        assert!(config.security.secure_cookies);
        assert_eq!(config.query.default_limit, 25);
    }

    #[test]
    fn parse_var_reports_name_on_failure() {
        let err = parse_var::<u16>("PORT", "not-a-port").unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert_eq!(parse_var::<u16>("PORT", " 8080 ").unwrap(), 8080);
    }
}
