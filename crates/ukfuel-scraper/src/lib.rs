pub mod error;
pub mod fetch;
pub mod layout;
pub mod parse;
mod price;
pub mod types;

pub use error::{FetchError, LayoutError, ParseError, SnapshotError};
pub use fetch::PriceTableFetcher;
pub use layout::{Column, PathStep, TableLayout, TablePath};
pub use parse::PriceTableParser;
pub use types::{PriceCell, PriceSnapshot, RetailerRow, RowRejection};
