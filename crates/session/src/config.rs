use std::path::PathBuf;
use std::time::Duration;

/// Default backend origin for local development.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Upload requests include server-side pose estimation, so the default
/// timeout is generous.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must start with http:// or https://, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{0} environment variable is required")]
    Missing(&'static str),
}

/// Session configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend origin without a trailing slash.
    pub backend_url: String,
    pub request_timeout: Duration,
    /// Clip imported into the first slot.
    pub video_1: Option<PathBuf>,
    /// Clip imported into the second slot.
    pub video_2: Option<PathBuf>,
    /// Where to write the JSON report, if anywhere.
    pub report_path: Option<PathBuf>,
}

impl SessionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `SWAY_BACKEND_URL`          | `http://localhost:8000` |
    /// | `SWAY_REQUEST_TIMEOUT_SECS` | `300`                   |
    /// | `SWAY_VIDEO_1`              | --                      |
    /// | `SWAY_VIDEO_2`              | --                      |
    /// | `SWAY_REPORT_PATH`          | --                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend_url = var("SWAY_BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.into());
        if !(backend_url.starts_with("http://") || backend_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl {
                var: "SWAY_BACKEND_URL",
                value: backend_url,
            });
        }
        let backend_url = backend_url.trim_end_matches('/').to_string();

        let request_timeout_secs = match var("SWAY_REQUEST_TIMEOUT_SECS") {
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "SWAY_REQUEST_TIMEOUT_SECS",
                        value,
                    })
                }
            },
        };

        Ok(Self {
            backend_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            video_1: var("SWAY_VIDEO_1").map(PathBuf::from),
            video_2: var("SWAY_VIDEO_2").map(PathBuf::from),
            report_path: var("SWAY_REPORT_PATH").map(PathBuf::from),
        })
    }

    /// Both clip paths, or the first missing variable.
    pub fn video_paths(&self) -> Result<(PathBuf, PathBuf), ConfigError> {
        let first = self
            .video_1
            .clone()
            .ok_or(ConfigError::Missing("SWAY_VIDEO_1"))?;
        let second = self
            .video_2
            .clone()
            .ok_or(ConfigError::Missing("SWAY_VIDEO_2"))?;
        Ok((first, second))
    }
}
