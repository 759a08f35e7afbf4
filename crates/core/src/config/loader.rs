use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "BINDER_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Config file location: `$BINDER_CONFIG`, else `config.toml` in the
/// working directory.
pub fn config_path() -> PathBuf {
    config_path_from(std::env::var_os(CONFIG_PATH_ENV))
}

fn config_path_from(value: Option<OsString>) -> PathBuf {
    value
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from file with environment variable overrides.
///
/// Nested keys use a double underscore, e.g. `BINDER_STATS__TOP_SETS_LIMIT=10`.
/// Relative database and import paths are taken relative to the config
/// file's directory, so the server finds its data whatever directory it is
/// started from.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let mut config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("BINDER_").split("__").ignore(&["config"]))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    if let Some(base) = path.parent() {
        anchor_paths(&mut config, base);
    }
    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn anchor_paths(config: &mut Config, base: &Path) {
    let anchor = |path: &mut PathBuf| {
        if path.is_relative() {
            *path = base.join(&*path);
        }
    };
    anchor(&mut config.database.path);
    if let Some(import) = config.import.as_mut() {
        anchor(&mut import.data_dir);
    }
}
