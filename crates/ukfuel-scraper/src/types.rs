//! Normalized snapshot types produced by [`crate::PriceTableParser`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use ukfuel_core::Coordinates;

/// A single price cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceCell {
    /// Price in pence per litre.
    Price(Decimal),
    /// The retailer does not offer or does not report this fuel type.
    NotOffered,
}

impl PriceCell {
    #[must_use]
    pub fn pence(&self) -> Option<Decimal> {
        match self {
            PriceCell::Price(p) => Some(*p),
            PriceCell::NotOffered => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetailerRow {
    /// Join key: see [`ukfuel_core::normalize_key`].
    pub retailer_name: String,
    /// Name as published, whitespace collapsed.
    pub display_name: String,
    pub location: Option<Coordinates>,
    /// Keyed by canonical fuel-type id.
    pub prices: BTreeMap<String, PriceCell>,
}

impl RetailerRow {
    /// Looks up a canonical fuel-type id. `None` means the column is absent,
    /// which is distinct from [`PriceCell::NotOffered`].
    #[must_use]
    pub fn price(&self, fuel_type: &str) -> Option<&PriceCell> {
        self.prices.get(fuel_type)
    }
}

/// A data row the parser dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    /// 1-based position among the table's data rows.
    pub row: usize,
    pub retailer: String,
    pub reason: String,
}

/// One successful parse of the price table. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub retrieved_at: DateTime<Utc>,
    pub layout_version: String,
    pub rows: Vec<RetailerRow>,
    pub skipped_rows: Vec<RowRejection>,
}

impl PriceSnapshot {
    /// Finds the row for an already-normalized retailer key.
    #[must_use]
    pub fn retailer(&self, retailer_name: &str) -> Option<&RetailerRow> {
        self.rows.iter().find(|row| row.retailer_name == retailer_name)
    }
}
