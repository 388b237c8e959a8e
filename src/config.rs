use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

pub const REMOTE_URL_VAR: &str = "EXPENSES_REMOTE_URL";
pub const REMOTE_KEY_VAR: &str = "EXPENSES_REMOTE_KEY";
pub const REMOTE_TIMEOUT_VAR: &str = "EXPENSES_REMOTE_TIMEOUT_SECS";
pub const DATA_DIR_VAR: &str = "EXPENSES_DATA_DIR";

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("EXPENSES_REMOTE_URL '{value}' is not a usable URL: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("EXPENSES_REMOTE_TIMEOUT_SECS '{0}' is not a positive number of seconds")]
    InvalidTimeout(String),
    #[error("could not determine a data directory; set EXPENSES_DATA_DIR")]
    NoDataDir,
}

/// Connection settings for the hosted database.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project base URL, always ending in `/`.
    pub url: Url,
    pub anon_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Present only when both URL and key are configured.
    pub remote: Option<RemoteConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = match get(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let remote = match (get(REMOTE_URL_VAR), get(REMOTE_KEY_VAR)) {
            (Some(url), Some(anon_key)) => {
                let timeout = match get(REMOTE_TIMEOUT_VAR) {
                    Some(raw) => parse_timeout(&raw)?,
                    None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                };
                Some(RemoteConfig {
                    url: parse_base_url(&url)?,
                    anon_key: anon_key.trim().to_string(),
                    timeout,
                })
            }
            (None, None) => {
                tracing::debug!("remote storage not configured; using local storage only");
                None
            }
            _ => {
                tracing::warn!(
                    "remote storage needs both {REMOTE_URL_VAR} and {REMOTE_KEY_VAR}; using local storage only"
                );
                None
            }
        };

        Ok(Self { data_dir, remote })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("expensetui.db")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("expensetui.log")
    }
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let proj_dirs = directories::ProjectDirs::from("com", "expensetui", "ExpenseTUI")
        .ok_or(ConfigError::NoDataDir)?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        value: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
