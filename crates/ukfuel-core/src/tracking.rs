use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fuel::canonical_fuel_type;
use crate::keys::normalize_key;
use crate::ConfigError;

const DEFAULT_UPDATE_FREQUENCY_HOURS: u32 = 24;

fn default_update_frequency() -> u32 {
    DEFAULT_UPDATE_FREQUENCY_HOURS
}

/// An explicit `(retailer, fuel_type)` entry under `pairs:`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedPairConfig {
    pub retailer: String,
    pub fuel_type: String,
}

/// Contents of the tracking YAML file.
///
/// `retailers` is crossed with `fuel_type`; `pairs` adds individual entries
/// on top of that.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingFile {
    #[serde(default = "default_update_frequency")]
    pub update_frequency: u32,
    #[serde(default)]
    pub retailers: Vec<String>,
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub pairs: Vec<TrackedPairConfig>,
}

/// A validated pair as written in the configuration.
///
/// The display strings are kept as configured; normalization happens when the
/// tracked entity is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPair {
    pub retailer: String,
    pub fuel_type: String,
}

impl TrackingFile {
    /// Poll interval as a [`std::time::Duration`].
    #[must_use]
    pub fn update_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.update_frequency) * 3600)
    }

    /// Expands `retailers × fuel_type` plus `pairs` into a deduplicated list,
    /// preserving first-seen order.
    #[must_use]
    pub fn tracked_pairs(&self) -> Vec<TrackedPair> {
        let crossed = self.fuel_type.iter().flat_map(|fuel_type| {
            self.retailers.iter().map(move |retailer| TrackedPair {
                retailer: retailer.trim().to_owned(),
                fuel_type: fuel_type.trim().to_owned(),
            })
        });
        let explicit = self.pairs.iter().map(|p| TrackedPair {
            retailer: p.retailer.trim().to_owned(),
            fuel_type: p.fuel_type.trim().to_owned(),
        });

        let mut seen = HashSet::new();
        crossed
            .chain(explicit)
            .filter(|pair| {
                seen.insert((
                    normalize_key(&pair.retailer),
                    canonical_fuel_type(&pair.fuel_type),
                ))
            })
            .collect()
    }
}

/// Load and validate the tracking configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_tracking(path: &Path) -> Result<TrackingFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TrackingFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_tracking(&content)
}

/// Parse and validate tracking configuration from a YAML string.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_tracking(content: &str) -> Result<TrackingFile, ConfigError> {
    let tracking: TrackingFile = serde_yaml::from_str(content)?;
    validate_tracking(&tracking)?;
    Ok(tracking)
}

fn validate_tracking(tracking: &TrackingFile) -> Result<(), ConfigError> {
    if tracking.update_frequency == 0 {
        return Err(ConfigError::Validation(
            "update_frequency must be at least 1 hour".to_string(),
        ));
    }

    if !tracking.retailers.is_empty() {
        match tracking.fuel_type.as_deref() {
            None => {
                return Err(ConfigError::Validation(
                    "fuel_type is required when retailers are listed".to_string(),
                ))
            }
            Some(f) if canonical_fuel_type(f).is_empty() => {
                return Err(ConfigError::Validation(
                    "fuel_type must name a fuel".to_string(),
                ))
            }
            Some(_) => {}
        }
    }

    for retailer in &tracking.retailers {
        if retailer.trim().is_empty() {
            return Err(ConfigError::Validation(
                "retailer names must be non-empty".to_string(),
            ));
        }
    }

    for pair in &tracking.pairs {
        if pair.retailer.trim().is_empty() {
            return Err(ConfigError::Validation(
                "retailer names must be non-empty".to_string(),
            ));
        }
        if canonical_fuel_type(&pair.fuel_type).is_empty() {
            return Err(ConfigError::Validation(format!(
                "fuel_type for retailer '{}' must name a fuel",
                pair.retailer
            )));
        }
    }

    if tracking.retailers.is_empty() && tracking.pairs.is_empty() {
        return Err(ConfigError::Validation(
            "at least one retailer or pair must be tracked".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "tracking_test.rs"]
mod tests;
