pub mod fetch;
pub mod links;

pub use fetch::{FetchError, HttpSpreadsheetFetcher, SpreadsheetSource};
