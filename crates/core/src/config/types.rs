use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub import: Option<ImportConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Keys accepted by the `api_key` method, each bound to a collection owner.
    #[serde(default)]
    pub api_keys: Vec<ApiKeyEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// A single API key and the user whose collection it unlocks.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiKeyEntry {
    pub key: String,
    pub user: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("binder.db")
}

/// Statistics endpoint tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    /// How many sets the most/least complete rankings hold.
    #[serde(default = "default_top_sets_limit")]
    pub top_sets_limit: usize,
    /// Only rank sets that have at least one owned card.
    #[serde(default)]
    pub started_sets_only: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            top_sets_limit: default_top_sets_limit(),
            started_sets_only: false,
        }
    }
}

fn default_top_sets_limit() -> usize {
    5
}

/// Catalog import configuration (pokemon-tcg-data directory layout).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Directory holding `sets/<lang>.json` and `cards/<lang>/<set>.json`.
    pub data_dir: PathBuf,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Import once when the server starts.
    #[serde(default)]
    pub run_on_startup: bool,
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub stats: StatsConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    /// Users that have a key configured; the keys themselves are never exposed.
    pub users: Vec<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                users: config
                    .auth
                    .api_keys
                    .iter()
                    .map(|entry| entry.user.clone())
                    .collect(),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            stats: config.stats.clone(),
            import: config.import.clone(),
        }
    }
}
