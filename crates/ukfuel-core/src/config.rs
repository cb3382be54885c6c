use crate::app_config::{AppConfig, MalformedRowPolicy, DEFAULT_SOURCE_URL};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`
/// lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let source_url = or_default("UKFUEL_SOURCE_URL", DEFAULT_SOURCE_URL);
    if !(source_url.starts_with("http://") || source_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "UKFUEL_SOURCE_URL".to_string(),
            reason: format!("'{source_url}' is not an http(s) URL"),
        });
    }

    let table_path = lookup("UKFUEL_TABLE_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty());

    let location_column = match or_default("UKFUEL_LOCATION_COLUMN", "false")
        .trim()
        .to_ascii_lowercase()
        .as_str()
    {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" | "" => false,
        other => {
            return Err(ConfigError::InvalidEnvVar {
                var: "UKFUEL_LOCATION_COLUMN".to_string(),
                reason: format!("'{other}' is not a boolean"),
            })
        }
    };

    let tracking_path = PathBuf::from(or_default(
        "UKFUEL_TRACKING_PATH",
        "./config/tracking.yaml",
    ));
    let log_level = or_default("UKFUEL_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("UKFUEL_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "UKFUEL_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least 1 second".to_string(),
        });
    }
    let user_agent = or_default("UKFUEL_USER_AGENT", "ukfuel/0.1 (price-tracking)");
    let max_retries = parse_u32("UKFUEL_MAX_RETRIES", "0")?;
    let retry_backoff_base_secs = parse_u64("UKFUEL_RETRY_BACKOFF_BASE_SECS", "5")?;

    let malformed_row_policy = or_default("UKFUEL_MALFORMED_ROW_POLICY", "skip")
        .parse::<MalformedRowPolicy>()
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "UKFUEL_MALFORMED_ROW_POLICY".to_string(),
            reason,
        })?;

    Ok(AppConfig {
        source_url,
        table_path,
        location_column,
        tracking_path,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        malformed_row_policy,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
