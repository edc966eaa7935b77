use std::time::Duration;

use core_types::ForecastSummary;
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Bounds of the lookback window the predictor accepts.
const MIN_WINDOW: i64 = 16;
const MAX_WINDOW: i64 = 256;

/// Pulls a requested lookback window into the range the predictor accepts.
/// Out-of-range values (negative ones included) are clamped to the nearest
/// bound, never rejected.
pub fn clamp_window(window: i64) -> u32 {
    window.clamp(MIN_WINDOW, MAX_WINDOW) as u32
}

/// Why a predictor call produced no usable prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradedReason {
    /// The predictor answered with a non-success status.
    Status(u16),
    /// The call never completed (connect error, timeout) or the body was not
    /// JSON.
    Transport(String),
}

/// The soft outcome of a predictor call.
///
/// A failed call is a value here, not an error: the surrounding operation
/// keeps its own success status and only reflects the degradation in its
/// response fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    Ok { summary: ForecastSummary, raw: Value },
    Degraded(DegradedReason),
}

impl ForecastOutcome {
    /// Whether the predictor was reached and answered with a decodable body.
    pub fn tf_ok(&self) -> bool {
        matches!(self, ForecastOutcome::Ok { .. })
    }

    /// The normalized summary, when there is one.
    pub fn summary(&self) -> Option<&ForecastSummary> {
        match self {
            ForecastOutcome::Ok { summary, .. } => Some(summary),
            ForecastOutcome::Degraded(_) => None,
        }
    }

    /// The raw predictor body, or the error envelope a degraded call leaves
    /// behind in its place.
    pub fn raw_envelope(&self) -> Value {
        match self {
            ForecastOutcome::Ok { raw, .. } => raw.clone(),
            ForecastOutcome::Degraded(DegradedReason::Status(status)) => {
                json!({ "ok": false, "status": status })
            }
            ForecastOutcome::Degraded(DegradedReason::Transport(error)) => {
                json!({ "ok": false, "error": error })
            }
        }
    }
}

/// Client for the sequence-model predictor.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Sends the close series to the predictor and normalizes the answer.
    ///
    /// This corresponds to the `POST /predict` endpoint. `window`, when
    /// given, is clamped into `[16, 256]` before it goes on the wire. The
    /// call never returns a hard error: every failure mode degrades to
    /// [`ForecastOutcome::Degraded`] and the caller decides how visible to
    /// make that.
    pub async fn predict(&self, closes: &[f64], window: Option<i64>) -> ForecastOutcome {
        let url = format!("{}/predict", self.base_url);

        let mut body = json!({ "series": closes });
        if let Some(window) = window {
            body["window"] = json!(clamp_window(window));
        }

        let response = match self.http_client.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "Predictor call failed in transit.");
                return ForecastOutcome::Degraded(DegradedReason::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Predictor answered with an error status.");
            return ForecastOutcome::Degraded(DegradedReason::Status(status.as_u16()));
        }

        match response.json::<Value>().await {
            Ok(raw) => {
                let summary = ForecastSummary::from_raw(&raw);
                ForecastOutcome::Ok { summary, raw }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Predictor body was not valid JSON.");
                ForecastOutcome::Degraded(DegradedReason::Transport(e.to_string()))
            }
        }
    }
}
