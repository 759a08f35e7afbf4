use std::collections::HashSet;

use super::{types::Config, AuthMethod, ConfigError};

const MAX_TOP_SETS_LIMIT: usize = 100;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - `api_key` auth has at least one non-empty, unique key
/// - Stats ranking size is within 1..=100
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey {
        if config.auth.api_keys.is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.api_keys must contain at least one key when method = \"api_key\""
                    .to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &config.auth.api_keys {
            if entry.key.is_empty() || entry.user.is_empty() {
                return Err(ConfigError::ValidationError(
                    "auth.api_keys entries need a non-empty key and user".to_string(),
                ));
            }
            if !seen.insert(entry.key.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate API key configured for user {}",
                    entry.user
                )));
            }
        }
    }

    if config.stats.top_sets_limit == 0 || config.stats.top_sets_limit > MAX_TOP_SETS_LIMIT {
        return Err(ConfigError::ValidationError(format!(
            "stats.top_sets_limit must be between 1 and {}",
            MAX_TOP_SETS_LIMIT
        )));
    }

    Ok(())
}
