use std::{env, path::PathBuf};

use dotenvy::dotenv;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Cannot resolve upload directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Validate)]
pub struct Config {
    pub database_url: String,
    /// Absolute root of the upload tree; duplicates live in its `Duplicates` child.
    pub upload_dir: PathBuf,
    #[validate(range(min = 1, max = 104857600))] // Max 100MB
    pub max_file_size: u64,
    #[validate(range(min = 1, max = 1073741824))]
    pub max_request_size: usize,
    /// Lower-cased extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
    pub cors_origin: String,
    #[validate(range(min = 1))]
    pub server_port: u16,
    #[validate(range(min = 1, max = 100))]
    pub db_max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load environment variables from `.env` file (if it exists)
        dotenv().ok();

        let upload_dir = match env::var("UPLOAD_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => PathBuf::from("Files"),
        };
        let upload_dir = if upload_dir.is_absolute() {
            upload_dir
        } else {
            env::current_dir()?.join(upload_dir)
        };

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());
        if axum::http::HeaderValue::from_str(&cors_origin).is_err() {
            return Err(ConfigError::Invalid("CORS_ORIGIN", cors_origin));
        }

        let config = Config {
            database_url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            upload_dir,
            max_file_size: parse_or("MAX_FILE_SIZE", 10_485_760)?,
            max_request_size: parse_or("MAX_REQUEST_SIZE", 52_428_800)?,
            allowed_extensions: parse_extensions(
                &env::var("ALLOWED_EXTENSIONS").unwrap_or_else(|_| "txt".to_string()),
            ),
            cors_origin,
            server_port: parse_or("SERVER_PORT", 3000)?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
        };

        // Validate configuration values (e.g. file size range)
        config.validate()?;
        Ok(config)
    }

    pub fn duplicates_dir(&self) -> PathBuf {
        self.upload_dir.join("Duplicates")
    }

    /// Whether `extension` (with or without its leading dot) may be uploaded.
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.').to_lowercase();
        self.allowed_extensions.contains(&extension)
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(_) => Err(ConfigError::Invalid(key, raw)),
        },
        Err(_) => Ok(default),
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config(upload_dir: &std::path::Path) -> Config {
    Config {
        database_url: "postgres://localhost/fileflow_test".to_string(),
        upload_dir: upload_dir.to_path_buf(),
        max_file_size: 1024,
        max_request_size: 1024 * 1024,
        allowed_extensions: vec!["txt".to_string()],
        cors_origin: "http://localhost:5173".to_string(),
        server_port: 3000,
        db_max_connections: 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_normalised() {
        assert_eq!(parse_extensions("TXT, .md,,csv "), vec!["txt", "md", "csv"]);
    }

    #[test]
    fn extension_check_ignores_dot_and_case() {
        let config = test_config(std::path::Path::new("/srv/Files"));

        assert!(config.is_extension_allowed(".txt"));
        assert!(config.is_extension_allowed("TXT"));
        assert!(!config.is_extension_allowed(".pdf"));
        assert!(!config.is_extension_allowed(""));
    }

    #[test]
    fn duplicates_live_under_the_upload_dir() {
        let config = test_config(std::path::Path::new("/srv/Files"));

        assert_eq!(config.duplicates_dir(), PathBuf::from("/srv/Files/Duplicates"));
    }

    #[test]
    fn validation_rejects_out_of_range_sizes() {
        let mut config = test_config(std::path::Path::new("/srv/Files"));
        assert!(config.validate().is_ok());

        config.max_file_size = 0;
        assert!(config.validate().is_err());

        config.max_file_size = 200 * 1024 * 1024;
        assert!(config.validate().is_err());
    }
}
