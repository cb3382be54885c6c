//! Fuel-type catalogue and canonicalization.
//!
//! Table headers and configured fuel types go through the same
//! [`canonical_fuel_type`] call, so a lookup at refresh time is a plain
//! string comparison.

use crate::keys::normalize_key;

/// A fuel type known to the catalogue, with the header spellings that map to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuelTypeInfo {
    /// Canonical identifier used as the price map key.
    pub id: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Alias spellings, already in [`fuel_key`] form.
    pub aliases: &'static [&'static str],
}

pub const KNOWN_FUEL_TYPES: &[FuelTypeInfo] = &[
    FuelTypeInfo {
        id: "unleaded",
        label: "Unleaded (E10)",
        aliases: &["unleaded", "e10", "unleaded e10", "e10 unleaded", "petrol"],
    },
    FuelTypeInfo {
        id: "super_unleaded",
        label: "Super unleaded (E5)",
        aliases: &[
            "super unleaded",
            "e5",
            "super unleaded e5",
            "e5 super unleaded",
            "premium unleaded",
        ],
    },
    FuelTypeInfo {
        id: "diesel",
        label: "Diesel (B7)",
        aliases: &["diesel", "b7", "diesel b7", "b7 diesel"],
    },
    FuelTypeInfo {
        id: "super_diesel",
        label: "Super diesel (SDV)",
        aliases: &[
            "super diesel",
            "sdv",
            "super diesel sdv",
            "premium diesel",
        ],
    },
];

/// Reduces a label to its comparison form: normalized key with `_`, `-`, `(`
/// and `)` treated as separators.
fn fuel_key(raw: &str) -> String {
    let separated: String = normalize_key(raw)
        .chars()
        .map(|c| match c {
            '_' | '-' | '(' | ')' => ' ',
            other => other,
        })
        .collect();
    normalize_key(&separated)
}

/// Maps a header label or configured fuel type to its canonical identifier.
///
/// Known spellings ("Diesel (B7)", "b7", "DIESEL") resolve to the catalogue
/// id. Unknown labels fall back to their comparison form with spaces replaced
/// by `_`, which keeps the function idempotent.
#[must_use]
pub fn canonical_fuel_type(raw: &str) -> String {
    let key = fuel_key(raw);
    KNOWN_FUEL_TYPES
        .iter()
        .find(|info| info.aliases.contains(&key.as_str()))
        .map_or_else(|| key.replace(' ', "_"), |info| info.id.to_owned())
}

/// Looks up catalogue metadata for a canonical fuel-type id.
#[must_use]
pub fn fuel_type_info(id: &str) -> Option<&'static FuelTypeInfo> {
    KNOWN_FUEL_TYPES.iter().find(|info| info.id == id)
}
