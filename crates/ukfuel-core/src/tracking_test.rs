use std::path::Path;

use super::*;

#[test]
fn parse_tracking_applies_default_update_frequency() {
    let tracking = parse_tracking("retailers: [Tesco]\nfuel_type: diesel\n").unwrap();
    assert_eq!(tracking.update_frequency, 24);
    assert_eq!(
        tracking.update_interval(),
        std::time::Duration::from_secs(24 * 3600)
    );
}

#[test]
fn tracked_pairs_crosses_retailers_with_fuel_type() {
    let tracking = parse_tracking(
        r"
update_frequency: 6
retailers:
  - Tesco
  - ' Asda '
fuel_type: Diesel
",
    )
    .unwrap();
    assert_eq!(
        tracking.tracked_pairs(),
        vec![
            TrackedPair {
                retailer: "Tesco".to_string(),
                fuel_type: "Diesel".to_string(),
            },
            TrackedPair {
                retailer: "Asda".to_string(),
                fuel_type: "Diesel".to_string(),
            },
        ]
    );
}

#[test]
fn tracked_pairs_appends_explicit_pairs_and_deduplicates() {
    let tracking = parse_tracking(
        r"
retailers: [Tesco]
fuel_type: diesel
pairs:
  - retailer: TESCO
    fuel_type: Diesel (B7)
  - retailer: Shell
    fuel_type: unleaded
",
    )
    .unwrap();
    let pairs = tracking.tracked_pairs();
    assert_eq!(pairs.len(), 2, "TESCO/Diesel (B7) duplicates tesco/diesel");
    assert_eq!(pairs[1].retailer, "Shell");
}

#[test]
fn pairs_only_configuration_is_valid() {
    let tracking = parse_tracking(
        r"
pairs:
  - retailer: Esso
    fuel_type: super unleaded
",
    )
    .unwrap();
    assert_eq!(tracking.tracked_pairs().len(), 1);
}

#[test]
fn rejects_missing_fuel_type_with_retailers() {
    let result = parse_tracking("retailers: [Tesco]\n");
    assert!(
        matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("fuel_type")),
        "expected Validation error, got: {result:?}"
    );
}

#[test]
fn rejects_blank_fuel_type() {
    let result = parse_tracking("retailers: [Tesco]\nfuel_type: '  '\n");
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn rejects_blank_pair_fuel_type() {
    let result = parse_tracking("pairs:\n  - retailer: Shell\n    fuel_type: ''\n");
    assert!(
        matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("Shell")),
        "expected Validation error naming the retailer, got: {result:?}"
    );
}

#[test]
fn rejects_separator_only_fuel_types() {
    let result = parse_tracking("retailers: [Tesco]\nfuel_type: '-'\n");
    assert!(matches!(result, Err(ConfigError::Validation(_))), "got: {result:?}");

    let result = parse_tracking("pairs:\n  - retailer: Shell\n    fuel_type: '()'\n");
    assert!(
        matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("Shell")),
        "got: {result:?}"
    );
}

#[test]
fn rejects_blank_retailer() {
    let result = parse_tracking("retailers: ['']\nfuel_type: diesel\n");
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn rejects_zero_update_frequency() {
    let result = parse_tracking("update_frequency: 0\nretailers: [Tesco]\nfuel_type: diesel\n");
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn rejects_empty_configuration() {
    let result = parse_tracking("update_frequency: 12\n");
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn rejects_malformed_yaml() {
    let result = parse_tracking("retailers: [Tesco\n");
    assert!(matches!(result, Err(ConfigError::TrackingFileParse(_))));
}

#[test]
fn load_tracking_reports_missing_file() {
    let result = load_tracking(Path::new("/nonexistent/ukfuel/tracking.yaml"));
    assert!(
        matches!(result, Err(ConfigError::TrackingFileIo { ref path, .. }) if path.contains("tracking.yaml")),
        "expected TrackingFileIo, got: {result:?}"
    );
}

#[test]
fn load_tracking_reads_repo_example() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/tracking.yaml");
    let tracking = load_tracking(&path).unwrap();
    assert!(!tracking.tracked_pairs().is_empty());
}
