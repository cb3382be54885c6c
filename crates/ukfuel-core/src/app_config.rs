use std::path::PathBuf;

/// Published page that carries the retailer price table.
pub const DEFAULT_SOURCE_URL: &str = "https://www.gov.uk/guidance/access-fuel-price-data";

/// What the parser does when a single cell in a data row cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedRowPolicy {
    /// Drop the offending row and keep parsing the rest of the table.
    #[default]
    SkipRow,
    /// Fail the whole snapshot.
    AbortSnapshot,
}

impl std::fmt::Display for MalformedRowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedRowPolicy::SkipRow => write!(f, "skip"),
            MalformedRowPolicy::AbortSnapshot => write!(f, "abort"),
        }
    }
}

impl std::str::FromStr for MalformedRowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" | "skip_row" => Ok(MalformedRowPolicy::SkipRow),
            "abort" | "abort_snapshot" => Ok(MalformedRowPolicy::AbortSnapshot),
            other => Err(format!("unknown policy '{other}'; expected 'skip' or 'abort'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source_url: String,
    /// Positional path override for the price table, e.g. `/html/body/div[3]/table`.
    pub table_path: Option<String>,
    /// The table carries a trailing `"<lat>, <lon>"` column.
    pub location_column: bool,
    pub tracking_path: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub malformed_row_policy: MalformedRowPolicy,
}
