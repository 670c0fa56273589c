use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_rate_limit: u64,
    pub max_request_body_size: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub api_base_url: String,
    pub timeout_seconds: u64,
}

// Keep the credential out of logs
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Hosted Gemini embedding model
    Gemini,
    /// Offline trigram hashing
    Local,
}

impl FromStr for EmbeddingProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(EmbeddingProvider::Gemini),
            "local" => Ok(EmbeddingProvider::Local),
            other => Err(Error::Config(format!(
                "Invalid EMBEDDING_PROVIDER value: {other} (expected 'gemini' or 'local')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimensions: usize,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "GEMINI_API_KEY not found. Please set it in your environment or .env file."
                        .to_string(),
                )
            })?;

        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = var("DATABASE_URL", "sqlite:./recipe_db/recipes.db");

        let host = var("HOST", "0.0.0.0");
        let port = parse_var(&lookup, "PORT", "8000")?;
        let api_rate_limit = parse_var(&lookup, "API_RATE_LIMIT", "10")?;
        let max_request_body_size = parse_var(&lookup, "MAX_REQUEST_BODY_SIZE", "65536")?;

        let max_connections = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", "10")?;
        let min_connections = parse_var(&lookup, "DATABASE_MIN_CONNECTIONS", "1")?;
        let connection_timeout_seconds = parse_var(&lookup, "DATABASE_CONNECTION_TIMEOUT", "30")?;
        let idle_timeout_seconds = parse_var(&lookup, "DATABASE_IDLE_TIMEOUT", "600")?;

        let model = var("GEMINI_MODEL", DEFAULT_GEMINI_MODEL);
        let api_base_url = var("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE)
            .trim_end_matches('/')
            .to_string();
        let timeout_seconds = parse_var(&lookup, "GEMINI_TIMEOUT_SECONDS", "60")?;

        let provider: EmbeddingProvider = var("EMBEDDING_PROVIDER", "gemini").parse()?;
        let embedding_model = var("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL);
        let dimensions = parse_var(&lookup, "EMBEDDING_DIMENSIONS", "384")?;

        Ok(Settings {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                min_connections,
                connection_timeout_seconds,
                idle_timeout_seconds,
            },
            server: ServerConfig {
                host,
                port,
                api_rate_limit,
                max_request_body_size,
            },
            gemini: GeminiConfig {
                api_key,
                model,
                api_base_url,
                timeout_seconds,
            },
            embedding: EmbeddingConfig {
                provider,
                model: embedding_model,
                dimensions,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.server.api_rate_limit == 0 {
            return Err(Error::Config("API rate limit must be non-zero".to_string()));
        }

        if self.embedding.dimensions == 0 {
            return Err(Error::Config(
                "Embedding dimensions must be non-zero".to_string(),
            ));
        }

        if self.gemini.model.trim().is_empty() {
            return Err(Error::Config("GEMINI_MODEL must not be empty".to_string()));
        }

        let base = url::Url::parse(&self.gemini.api_base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "GEMINI_API_BASE must use http or https: {}",
                self.gemini.api_base_url
            )));
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {key} value")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_fails() {
        let err = Settings::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY not found"));

        let err = Settings::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k")])).unwrap();

        assert_eq!(settings.gemini.model, "gemini-1.5-flash");
        assert_eq!(settings.gemini.api_base_url, DEFAULT_GEMINI_API_BASE);
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::Gemini);
        assert_eq!(settings.embedding.model, "text-embedding-004");
        assert_eq!(settings.database.url, "sqlite:./recipe_db/recipes.db");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("PORT", "9000"),
            ("EMBEDDING_PROVIDER", "Local"),
            ("GEMINI_API_BASE", "http://localhost:1234/"),
        ]))
        .unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::Local);
        assert_eq!(settings.gemini.api_base_url, "http://localhost:1234");

        let err = Settings::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k"), ("PORT", "abc")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Invalid PORT value");

        let err = Settings::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("EMBEDDING_PROVIDER", "openai"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_settings_validation() {
        let mut settings =
            Settings::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert!(settings.validate().is_ok());

        settings.server.port = 0;
        assert!(settings.validate().is_err());

        settings.server.port = 8000;
        settings.gemini.api_base_url = "ftp://example.com".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings =
            Settings::from_lookup(lookup_from(&[("GEMINI_API_KEY", "super-secret")])).unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
