// In crates/engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The series source could not produce a usable payload.
    #[error("data service request failed: {0}")]
    Upstream(#[from] api_client::Error),
    /// The series came back well-formed but empty.
    #[error("no data")]
    NoData,
    /// The scan itself rejected its input.
    #[error(transparent)]
    Backtest(#[from] backtester::Error),
    /// The query path was asked about a symbol no run has touched.
    #[error("no signals for symbol {0}")]
    SymbolNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
