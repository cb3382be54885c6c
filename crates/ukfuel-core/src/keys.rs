//! Join-key normalization shared by the table parser and tracked entities.

/// Normalizes a free-text identifier into a join key.
///
/// Trims, collapses every run of whitespace (including non-breaking spaces)
/// into a single ASCII space, and lowercases. The function is idempotent, so
/// a key that has already been normalized passes through unchanged.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
