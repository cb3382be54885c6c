//! Cell-text to price conversion.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::types::PriceCell;

/// Cell texts (normalized, lowercase) that mean "not offered".
const NOT_AVAILABLE_MARKERS: &[&str] = &[
    "-",
    "–",
    "—",
    "n/a",
    "na",
    "n.a.",
    "not available",
    "unavailable",
    "not offered",
    "not reported",
    "none",
];

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("valid price regex"));

/// Parses one price cell.
///
/// A leading `£` or `GBP` marks pounds, which are converted to pence; a bare
/// number or a `p`/`ppl` suffix is read as pence. Empty cells, the markers in
/// [`NOT_AVAILABLE_MARKERS`] and a zero price all yield
/// [`PriceCell::NotOffered`].
///
/// Returns the offending text as the error when it is neither a marker nor a
/// non-negative number.
pub(crate) fn parse_price_cell(text: &str) -> Result<PriceCell, String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let lower = collapsed.to_lowercase();

    if lower.is_empty() || NOT_AVAILABLE_MARKERS.contains(&lower.as_str()) {
        return Ok(PriceCell::NotOffered);
    }

    let (in_pounds, rest) = if let Some(rest) = lower.strip_prefix('£') {
        (true, rest)
    } else if let Some(rest) = lower.strip_prefix("gbp") {
        (true, rest)
    } else {
        (false, lower.as_str())
    };

    let rest = rest.trim();
    let number = if in_pounds {
        rest
    } else {
        rest.strip_suffix("ppl")
            .or_else(|| rest.strip_suffix('p'))
            .unwrap_or(rest)
            .trim_end()
    };

    if !NUMBER.is_match(number) {
        return Err(collapsed);
    }
    let value = Decimal::from_str(number).map_err(|_| collapsed.clone())?;
    let pence = if in_pounds {
        value
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| collapsed.clone())?
    } else {
        value
    };

    if pence.is_zero() {
        return Ok(PriceCell::NotOffered);
    }
    Ok(PriceCell::Price(pence.normalize()))
}
