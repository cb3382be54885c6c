use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("retailer name must be non-empty")]
    EmptyRetailer,

    #[error("fuel type for retailer '{retailer}' must name a fuel")]
    EmptyFuelType { retailer: String },
}
