use std::env;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use reqwest::Url;

type UrlParseError = <Url as FromStr>::Err;

pub const BASE_URL_VAR: &str = "BOOKS_API_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const LOG_FILE_VAR: &str = "BOOKS_LOG_FILE";
pub const DEFAULT_LOG_FILE: &str = "rust_bookstore_client.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    /// The terminal UI owns stdout, so logs are written here instead
    pub log_file: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBaseUrl { value: String, source: UrlParseError },
    CannotBeABase(String),
    EnvFile(dotenvy::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBaseUrl { value, source } => {
                write!(f, "{BASE_URL_VAR} is not a valid URL ({value}): {source}")
            }
            ConfigError::CannotBeABase(value) => {
                write!(f, "{BASE_URL_VAR} cannot be used as a base URL: {value}")
            }
            ConfigError::EnvFile(e) => write!(f, "problem reading the .env file: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::InvalidBaseUrl { source, .. } => Some(source),
            ConfigError::CannotBeABase(_) => None,
            ConfigError::EnvFile(e) => Some(e),
        }
    }
}

impl ClientConfig {
    /// Read the configuration from the process environment, after loading `.env` if present
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::EnvFile(e)),
        }

        let mut config = match env::var(BASE_URL_VAR) {
            Ok(value) => Self::with_base_url(&value)?,
            Err(_) => Self::with_base_url(DEFAULT_BASE_URL)?,
        };
        if let Ok(log_file) = env::var(LOG_FILE_VAR) {
            config.log_file = PathBuf::from(log_file);
        }

        Ok(config)
    }

    pub fn with_base_url(value: &str) -> Result<Self, ConfigError> {
        let mut base_url =
            Url::parse(value.trim()).map_err(|source| ConfigError::InvalidBaseUrl {
                value: value.to_string(),
                source,
            })?;

        if base_url.cannot_be_a_base() {
            return Err(ConfigError::CannotBeABase(value.to_string()));
        }

        // `Url::join` replaces the last path segment unless the path ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(ClientConfig {
            base_url,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_trailing_slash_to_base_path() {
        let config = ClientConfig::with_base_url("http://example.com/api").unwrap();
        assert_eq!("http://example.com/api/", config.base_url.as_str());
        assert_eq!(
            "http://example.com/api/books",
            config.base_url.join("books").unwrap().as_str()
        );
    }

    #[test]
    fn keeps_host_only_url() {
        let config = ClientConfig::with_base_url(" http://localhost:3000 ").unwrap();
        assert_eq!("http://localhost:3000/", config.base_url.as_str());
    }

    #[test]
    fn rejects_garbage() {
        let err = ClientConfig::with_base_url("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn rejects_urls_that_cannot_be_a_base() {
        let err = ClientConfig::with_base_url("mailto:books@example.com").unwrap_err();
        assert!(matches!(err, ConfigError::CannotBeABase(_)));
    }
}
