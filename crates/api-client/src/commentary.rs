use std::time::Duration;

use core_types::ForecastSummary;
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Client for the text-generation service that writes run commentary.
#[derive(Debug, Clone)]
pub struct CommentaryClient {
    http_client: reqwest::Client,
    base_url: String,
    default_model: String,
}

impl CommentaryClient {
    pub fn new(base_url: &str, default_model: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            default_model: default_model.to_owned(),
        })
    }

    /// Asks the generator for a short comment.
    ///
    /// This corresponds to the `POST /api/generate` endpoint. Commentary is
    /// decorative, so every failure mode (transport, timeout, error status,
    /// missing or empty text) yields `None` and the caller simply moves on
    /// without it.
    pub async fn generate(&self, prompt: &str, model: Option<&str>) -> Option<String> {
        let url = format!("{}/api/generate", self.base_url);
        let model = model.unwrap_or(&self.default_model);
        let body = json!({ "model": model, "prompt": prompt, "stream": false });

        let response = match self.http_client.post(&url).json(&body).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(
                    status = response.status().as_u16(),
                    "Commentary call rejected."
                );
                return None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "Commentary call failed.");
                return None;
            }
        };

        let body: Value = response.json().await.ok()?;
        let text = body
            .get("response")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .or_else(|| body.get("content").and_then(Value::as_str))?;

        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_owned())
        }
    }
}

/// Builds the compact prompt sent after a backtest run.
///
/// Deterministic: the same inputs always produce the same prompt, and raw
/// series data never enters it, only already-computed fields.
pub fn backtest_prompt(
    symbol: &str,
    trades: u32,
    equity: f64,
    tf_ok: bool,
    forecast: Option<&ForecastSummary>,
) -> String {
    let regime = regime_text(forecast);
    let confidence = confidence_text(forecast);
    let horizon = horizon_text(forecast);
    format!(
        "You are a concise trading assistant. Symbol {symbol}. \
         MA-crossover trades: {trades}. Equity multiple: {equity:.3}. \
         Transformer ok: {tf_ok}. Regime(last): {regime}, confidence: {confidence}. \
         Horizon pred: {horizon}. In one short paragraph, provide a neutral \
         risk-aware summary (no advice)."
    )
}

/// Builds the compact prompt sent after a forecast-only run.
pub fn forecast_prompt(
    symbol: &str,
    window: u32,
    tf_ok: bool,
    forecast: Option<&ForecastSummary>,
) -> String {
    let regime = regime_text(forecast);
    let confidence = confidence_text(forecast);
    let horizon = horizon_text(forecast);
    format!(
        "You are a concise trading assistant. Symbol {symbol}. \
         Recent window: {window}. Transformer ok: {tf_ok}. \
         Regime(last): {regime}, confidence: {confidence}. \
         Horizon pred: {horizon}. Provide a brief risk-aware summary in 2-3 \
         sentences (no advice)."
    )
}

fn regime_text(forecast: Option<&ForecastSummary>) -> String {
    forecast
        .and_then(|f| f.regime_last.as_ref())
        .filter(|value| !value.is_null())
        .map(value_text)
        .unwrap_or_else(|| "none".to_owned())
}

fn confidence_text(forecast: Option<&ForecastSummary>) -> String {
    forecast
        .and_then(|f| f.confidence)
        .map(|confidence| confidence.to_string())
        .unwrap_or_else(|| "none".to_owned())
}

fn horizon_text(forecast: Option<&ForecastSummary>) -> String {
    forecast
        .and_then(|f| f.horizon_pred.as_ref())
        .filter(|value| !value.is_null())
        .map(value_text)
        .unwrap_or_else(|| "none".to_owned())
}

/// Plain text for a loose JSON value: strings lose their quotes, everything
/// else keeps its JSON rendering.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
