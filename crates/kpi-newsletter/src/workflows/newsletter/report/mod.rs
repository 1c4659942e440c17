mod deriver;
mod format;
mod narrative;
pub mod views;

pub use deriver::{derive, top_mover, ReportDeriver, MAX_KPIS};
pub use format::NumberLocale;
pub use views::DerivationResult;
