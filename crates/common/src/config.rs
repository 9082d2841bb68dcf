use crate::error::FolioError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Folio application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database base path
    pub db_base_path: PathBuf,

    /// Record store file path
    pub records_path: PathBuf,

    /// Gemini API key
    #[serde(skip_serializing)]
    pub gemini_api_key: String,

    /// Gemini API base URL
    pub gemini_base_url: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Expected embedding dimension
    pub embedding_dim: usize,

    /// Records per refresh batch
    pub embed_batch_size: usize,

    /// Delay between refresh batches (milliseconds)
    pub embed_batch_delay_ms: u64,

    /// Maximum number of body words fed to the embedding model
    pub body_word_limit: usize,

    /// HTTP client timeout for embedding calls (seconds)
    pub http_timeout_secs: u64,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_base_path: PathBuf::from("./db"),
            records_path: PathBuf::from("./db/records.json"),
            gemini_api_key: String::new(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            embedding_dim: 768,
            embed_batch_size: 5,
            embed_batch_delay_ms: 1000,
            body_word_limit: 500,
            http_timeout_secs: 30,
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            log_dir: PathBuf::from("./db/log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, FolioError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let config = Self::from_source(|key| std::env::var(key).ok());

        // Ensure required directories exist
        config.ensure_directories()?;

        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_source<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_base_path = lookup("DB_BASE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_base_path);
        let records_path = lookup("RECORDS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| db_base_path.join("records.json"));
        let log_dir = lookup("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| db_base_path.join("log"));

        Self {
            records_path,
            log_dir,
            gemini_api_key: lookup("GEMINI_API_KEY").unwrap_or_default(),
            gemini_base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            embedding_model: lookup("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_dim: parse_var(&lookup, "EMBEDDING_DIM").unwrap_or(defaults.embedding_dim),
            embed_batch_size: parse_var(&lookup, "EMBED_BATCH_SIZE")
                .unwrap_or(defaults.embed_batch_size),
            embed_batch_delay_ms: parse_var(&lookup, "EMBED_BATCH_DELAY_MS")
                .unwrap_or(defaults.embed_batch_delay_ms),
            body_word_limit: parse_var(&lookup, "BODY_WORD_LIMIT")
                .unwrap_or(defaults.body_word_limit),
            http_timeout_secs: parse_var(&lookup, "HTTP_TIMEOUT_SECS")
                .unwrap_or(defaults.http_timeout_secs),
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            db_base_path,
        }
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), FolioError> {
        let mut dirs = vec![self.db_base_path.as_path(), self.log_dir.as_path()];
        if let Some(parent) = self.records_path.parent() {
            dirs.push(parent);
        }

        for dir in dirs {
            if dir.as_os_str().is_empty() || dir.exists() {
                continue;
            }
            std::fs::create_dir_all(dir).map_err(|e| {
                FolioError::config(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }

    /// Delay between refresh batches
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.embed_batch_delay_ms)
    }

    /// Embedding HTTP client timeout
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), FolioError> {
        if !self.gemini_base_url.starts_with("http://")
            && !self.gemini_base_url.starts_with("https://")
        {
            return Err(FolioError::config(
                "Gemini base URL must start with http:// or https://",
            ));
        }

        if self.embedding_model.trim().is_empty() {
            return Err(FolioError::config("Embedding model name cannot be empty"));
        }

        if self.embedding_dim == 0 {
            return Err(FolioError::config("Embedding dimension cannot be 0"));
        }

        if self.embed_batch_size == 0 {
            return Err(FolioError::config("Embedding batch size cannot be 0"));
        }

        if self.server_port == 0 {
            return Err(FolioError::config("Server port cannot be 0"));
        }

        Ok(())
    }
}

/// Parse a variable, ignoring values that don't parse
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.embedding_dim, 768);
        assert_eq!(config.embed_batch_size, 5);
    }

    #[test]
    fn test_server_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.server_bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_from_source_overrides() {
        let config = AppConfig::from_source(source(&[
            ("DB_BASE_PATH", "/tmp/folio"),
            ("EMBEDDING_DIM", "256"),
            ("EMBED_BATCH_SIZE", "10"),
            ("EMBED_BATCH_DELAY_MS", "250"),
            ("SERVER_PORT", "not-a-port"),
        ]));

        assert_eq!(config.embedding_dim, 256);
        assert_eq!(config.embed_batch_size, 10);
        assert_eq!(config.batch_delay(), Duration::from_millis(250));
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.records_path, PathBuf::from("/tmp/folio/records.json"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/folio/log"));
    }

    #[test]
    fn test_from_source_parses_each_numeric_type() {
        let config = AppConfig::from_source(source(&[
            ("EMBEDDING_DIM", " 512 "),
            ("BODY_WORD_LIMIT", "200"),
            ("EMBED_BATCH_DELAY_MS", "0"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("SERVER_PORT", "9090"),
        ]));

        assert_eq!(config.embedding_dim, 512);
        assert_eq!(config.body_word_limit, 200);
        assert_eq!(config.batch_delay(), Duration::ZERO);
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
        assert_eq!(config.server_port, 9090);
    }

    #[test]
    fn test_ensure_directories_creates_records_parent() {
        let root = std::env::temp_dir().join(format!("folio-config-{}", std::process::id()));
        let config = AppConfig::from_source(source(&[
            ("DB_BASE_PATH", root.to_str().unwrap()),
            ("RECORDS_PATH", root.join("data/records.json").to_str().unwrap()),
        ]));

        config.ensure_directories().unwrap();
        assert!(root.join("data").is_dir());
        assert!(root.join("log").is_dir());

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.embed_batch_size = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_url = AppConfig::default();
        invalid_url.gemini_base_url = "generativelanguage.googleapis.com".to_string();
        assert!(invalid_url.validate().is_err());
    }
}
