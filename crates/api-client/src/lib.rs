// In crates/api-client/src/lib.rs

pub mod commentary;
pub mod error;
pub mod forecast;
pub mod market;

// Re-export public types
pub use commentary::CommentaryClient;
pub use error::{Error, Result};
pub use forecast::{clamp_window, DegradedReason, ForecastClient, ForecastOutcome};
pub use market::{MarketDataClient, SeriesRange};
