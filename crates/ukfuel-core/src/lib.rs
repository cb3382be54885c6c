pub mod app_config;
pub mod config;
pub mod fuel;
pub mod geo;
pub mod keys;
pub mod tracking;

pub use app_config::{AppConfig, MalformedRowPolicy, DEFAULT_SOURCE_URL};
pub use config::{load_app_config, load_app_config_from_env};
pub use fuel::{canonical_fuel_type, fuel_type_info, FuelTypeInfo, KNOWN_FUEL_TYPES};
pub use geo::Coordinates;
pub use keys::normalize_key;
pub use tracking::{load_tracking, parse_tracking, TrackedPair, TrackedPairConfig, TrackingFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read tracking file {path}: {source}")]
    TrackingFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tracking file: {0}")]
    TrackingFileParse(#[from] serde_yaml::Error),

    #[error("invalid tracking configuration: {0}")]
    Validation(String),
}
