//! A tracked (retailer, fuel type) price entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use ukfuel_core::{canonical_fuel_type, normalize_key, Coordinates, TrackedPair};
use ukfuel_scraper::PriceCell;

use crate::error::TrackerError;
use crate::feed::{FeedCycle, SnapshotSource};

pub const DOMAIN: &str = "uk_fuel_prices";
pub const NAME_PREFIX: &str = "UK Fuel Price";
pub const ICON: &str = "mdi:gas-station";
pub const UNIT_OF_MEASUREMENT: &str = "p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Available,
    Unavailable,
}

/// Why a valid snapshot yielded no price for this entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    RetailerAbsent,
    FuelTypeAbsent,
    NotOffered,
}

/// What a single refresh did to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated(Decimal),
    Missed(MissReason),
    CycleFailed,
}

/// Observable state. `price` and `location` are only meaningful while
/// `available` is true.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityState {
    pub price: Option<Decimal>,
    pub available: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub location: Option<Coordinates>,
}

impl EntityState {
    fn unavailable(at: DateTime<Utc>) -> Self {
        Self {
            price: None,
            available: false,
            last_update: Some(at),
            location: None,
        }
    }
}

/// Everything a consumer displays for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub unique_id: String,
    pub name: String,
    pub icon: &'static str,
    pub unit_of_measurement: &'static str,
    pub retailer: String,
    pub fuel_type: String,
    pub status: EntityStatus,
    pub price: Option<Decimal>,
    pub last_update: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct TrackedPriceEntity {
    retailer_name: String,
    fuel_type: String,
    name: String,
    unique_id: String,
    state: EntityState,
}

impl TrackedPriceEntity {
    /// Creates an entity in its initial state: unavailable, never updated.
    ///
    /// The display name keeps the configured spelling; the lookup keys are
    /// normalized.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if the retailer is blank or the fuel type has
    /// nothing left once separators are stripped.
    pub fn new(retailer: &str, fuel_type: &str) -> Result<Self, TrackerError> {
        let retailer = retailer.trim();
        let fuel = fuel_type.trim();
        if retailer.is_empty() {
            return Err(TrackerError::EmptyRetailer);
        }

        let fuel_type = canonical_fuel_type(fuel);
        if fuel_type.is_empty() {
            return Err(TrackerError::EmptyFuelType {
                retailer: retailer.to_string(),
            });
        }

        let retailer_name = normalize_key(retailer);
        Ok(Self {
            name: format!("{NAME_PREFIX} {retailer} {fuel}"),
            unique_id: format!("{DOMAIN}-{retailer_name}-{fuel_type}"),
            retailer_name,
            fuel_type,
            state: EntityState::default(),
        })
    }

    /// # Errors
    ///
    /// See [`TrackedPriceEntity::new`].
    pub fn from_pair(pair: &TrackedPair) -> Result<Self, TrackerError> {
        Self::new(&pair.retailer, &pair.fuel_type)
    }

    #[must_use]
    pub fn retailer_name(&self) -> &str {
        &self.retailer_name
    }

    #[must_use]
    pub fn fuel_type(&self) -> &str {
        &self.fuel_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    #[must_use]
    pub fn icon(&self) -> &'static str {
        ICON
    }

    #[must_use]
    pub fn unit_of_measurement(&self) -> &'static str {
        UNIT_OF_MEASUREMENT
    }

    #[must_use]
    pub fn state(&self) -> &EntityState {
        &self.state
    }

    #[must_use]
    pub fn status(&self) -> EntityStatus {
        if self.state.available {
            EntityStatus::Available
        } else {
            EntityStatus::Unavailable
        }
    }

    #[must_use]
    pub fn view(&self) -> EntityView {
        EntityView {
            unique_id: self.unique_id.clone(),
            name: self.name.clone(),
            icon: ICON,
            unit_of_measurement: UNIT_OF_MEASUREMENT,
            retailer: self.retailer_name.clone(),
            fuel_type: self.fuel_type.clone(),
            status: self.status(),
            price: self.state.price,
            last_update: self.state.last_update,
            latitude: self.state.location.map(|c| c.latitude),
            longitude: self.state.location.map(|c| c.longitude),
        }
    }

    /// Replaces the whole state from one cycle. Applying the same cycle
    /// twice yields the same state.
    pub fn apply(&mut self, cycle: &FeedCycle) -> RefreshOutcome {
        let attempted_at = cycle.attempted_at;
        let Some(snapshot) = cycle.snapshot() else {
            self.state = EntityState::unavailable(attempted_at);
            return RefreshOutcome::CycleFailed;
        };

        let Some(row) = snapshot.retailer(&self.retailer_name) else {
            self.state = EntityState::unavailable(attempted_at);
            return RefreshOutcome::Missed(MissReason::RetailerAbsent);
        };

        match row.price(&self.fuel_type) {
            Some(PriceCell::Price(pence)) => {
                self.state = EntityState {
                    price: Some(*pence),
                    available: true,
                    last_update: Some(attempted_at),
                    location: row.location,
                };
                RefreshOutcome::Updated(*pence)
            }
            Some(PriceCell::NotOffered) => {
                self.state = EntityState::unavailable(attempted_at);
                RefreshOutcome::Missed(MissReason::NotOffered)
            }
            None => {
                self.state = EntityState::unavailable(attempted_at);
                RefreshOutcome::Missed(MissReason::FuelTypeAbsent)
            }
        }
    }

    /// Awaits a cycle from `source`, then applies it. State is untouched if
    /// the returned future is dropped before completion.
    pub async fn refresh<S: SnapshotSource>(&mut self, source: &S) -> RefreshOutcome {
        let cycle = source.current_cycle().await;
        self.apply(&cycle)
    }
}

#[cfg(test)]
#[path = "entity_test.rs"]
mod tests;
