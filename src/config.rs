use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// Defaults
// =============================================================================

/// Default base URL of the GitHub REST API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Timeout for API requests in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Default git executable
pub const DEFAULT_GIT_BINARY: &str = "git";

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProvenanceConfig {
    pub git: GitConfig,
    pub api: ApiConfig,
    pub log: LogConfig,
}

impl ProvenanceConfig {
    /// Load configuration from a JSON file; missing fields use defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Local git transport configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitConfig {
    /// git executable name or path
    pub binary: String,
    /// Directory whose HEAD is compared with releases
    pub working_dir: PathBuf,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_GIT_BINARY.to_string(),
            working_dir: PathBuf::from("."),
        }
    }
}

/// Hosting API configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    pub github_base_url: String,
    /// Bearer token for the GitHub API
    pub github_token: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            github_base_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_token: None,
            timeout_ms: FETCH_TIMEOUT_MS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Write JSON logs to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Returns the path to the data directory for readme-provenance.
/// Uses $XDG_DATA_HOME/readme-provenance if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/readme-provenance,
/// or ./readme-provenance if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default path of the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("readme-provenance.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("readme-provenance")
}
