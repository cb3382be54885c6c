use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid source URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// `true` when the request gave up because the client timeout elapsed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport(e) if e.is_timeout())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("page structure does not match layout {layout}: {reason}")]
    StructureMismatch { layout: String, reason: String },

    #[error("malformed {column} cell in row {row} ({retailer}): {text:?}")]
    MalformedCell {
        row: usize,
        retailer: String,
        column: String,
        text: String,
    },

    #[error("table matched layout {layout} but no usable rows remained")]
    EmptyTable { layout: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("invalid table path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },
}

/// Failure of one fetch-and-parse pass.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
}
