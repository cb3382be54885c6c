use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_when_env_is_empty() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.source_url, DEFAULT_SOURCE_URL);
    assert!(cfg.table_path.is_none());
    assert!(!cfg.location_column);
    assert_eq!(
        cfg.tracking_path,
        std::path::PathBuf::from("./config/tracking.yaml")
    );
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "ukfuel/0.1 (price-tracking)");
    assert_eq!(cfg.max_retries, 0);
    assert_eq!(cfg.retry_backoff_base_secs, 5);
    assert_eq!(cfg.malformed_row_policy, MalformedRowPolicy::SkipRow);
}

#[test]
fn build_app_config_honours_overrides() {
    let mut map = HashMap::new();
    map.insert("UKFUEL_SOURCE_URL", "http://127.0.0.1:8080/prices");
    map.insert("UKFUEL_TRACKING_PATH", "/etc/ukfuel/tracking.yaml");
    map.insert("UKFUEL_TABLE_PATH", "/html/body/table");
    map.insert("UKFUEL_LOCATION_COLUMN", "yes");
    map.insert("UKFUEL_REQUEST_TIMEOUT_SECS", "5");
    map.insert("UKFUEL_MAX_RETRIES", "2");
    map.insert("UKFUEL_MALFORMED_ROW_POLICY", "abort");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.source_url, "http://127.0.0.1:8080/prices");
    assert_eq!(
        cfg.tracking_path,
        std::path::PathBuf::from("/etc/ukfuel/tracking.yaml")
    );
    assert_eq!(cfg.table_path.as_deref(), Some("/html/body/table"));
    assert!(cfg.location_column);
    assert_eq!(cfg.request_timeout_secs, 5);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.malformed_row_policy, MalformedRowPolicy::AbortSnapshot);
}

#[test]
fn build_app_config_rejects_non_http_source_url() {
    let mut map = HashMap::new();
    map.insert("UKFUEL_SOURCE_URL", "ftp://example.com/prices");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "UKFUEL_SOURCE_URL"),
        "expected InvalidEnvVar(UKFUEL_SOURCE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = HashMap::new();
    map.insert("UKFUEL_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "UKFUEL_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(UKFUEL_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_timeout() {
    let mut map = HashMap::new();
    map.insert("UKFUEL_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn build_app_config_rejects_invalid_max_retries() {
    let mut map = HashMap::new();
    map.insert("UKFUEL_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "UKFUEL_MAX_RETRIES"),
        "expected InvalidEnvVar(UKFUEL_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_boolean_location_column() {
    let mut map = HashMap::new();
    map.insert("UKFUEL_LOCATION_COLUMN", "sometimes");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "UKFUEL_LOCATION_COLUMN"),
        "expected InvalidEnvVar(UKFUEL_LOCATION_COLUMN), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_unknown_row_policy() {
    let mut map = HashMap::new();
    map.insert("UKFUEL_MALFORMED_ROW_POLICY", "guess");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "UKFUEL_MALFORMED_ROW_POLICY"),
        "expected InvalidEnvVar(UKFUEL_MALFORMED_ROW_POLICY), got: {result:?}"
    );
}

#[test]
fn malformed_row_policy_round_trips_through_display() {
    for policy in [MalformedRowPolicy::SkipRow, MalformedRowPolicy::AbortSnapshot] {
        assert_eq!(policy.to_string().parse::<MalformedRowPolicy>(), Ok(policy));
    }
}
