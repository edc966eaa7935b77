// In crates/web-server/src/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] engine::Error),
    #[error("Failed to bind the server listener: {0}")]
    ServerBindError(std::io::Error),
    #[error("Server terminated unexpectedly: {0}")]
    ServerError(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Maps operation failures to the wire contract: every error body carries
/// `ok: false` plus a human-readable `error` string.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::Engine(engine::Error::Upstream(e)) => (
                StatusCode::BAD_GATEWAY,
                json!({ "ok": false, "error": format!("data_service: {e}") }),
            ),
            Error::Engine(engine::Error::NoData) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "error": "no data" }),
            ),
            Error::Engine(engine::Error::Backtest(e)) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "error": e.to_string() }),
            ),
            Error::Engine(engine::Error::SymbolNotFound(symbol)) => (
                StatusCode::NOT_FOUND,
                json!({ "ok": false, "error": "no signals for symbol", "symbol": symbol }),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": other.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
