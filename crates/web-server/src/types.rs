// In crates/web-server/src/types.rs

use engine::{BacktestRequest, ForecastRequest, SeriesRange};
use serde::{Deserialize, Deserializer};

/// Query parameters for `GET /backtest` (e.g. ?symbol=GC=F&period=2y).
#[derive(Debug, Deserialize)]
pub struct BacktestParams {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_backtest_period")]
    pub period: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    pub with_llm: bool,
}

impl BacktestParams {
    pub fn into_request(self) -> BacktestRequest {
        BacktestRequest {
            symbol: self.symbol,
            range: range_from(self.period, self.start, self.end),
            provider: non_empty(self.provider),
            with_llm: self.with_llm,
        }
    }
}

/// Query parameters for `GET /forecast`.
#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_forecast_period")]
    pub period: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_i64")]
    pub window: Option<i64>,
    #[serde(default, deserialize_with = "de_flag")]
    pub with_llm: bool,
}

impl ForecastParams {
    pub fn into_request(self) -> ForecastRequest {
        ForecastRequest {
            symbol: self.symbol,
            range: range_from(self.period, self.start, self.end),
            provider: non_empty(self.provider),
            window: self.window.unwrap_or(DEFAULT_WINDOW),
            with_llm: self.with_llm,
        }
    }
}

/// Query parameters for `GET /signals`.
#[derive(Debug, Deserialize)]
pub struct SignalsParams {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_i64")]
    pub limit: Option<i64>,
}

const DEFAULT_WINDOW: i64 = 64;

fn default_symbol() -> String {
    "GC=F".to_owned()
}

fn default_backtest_period() -> String {
    "2y".to_owned()
}

fn default_forecast_period() -> String {
    "6mo".to_owned()
}

/// An explicit date bound wins over the relative period; empty strings count
/// as absent.
fn range_from(period: String, start: Option<String>, end: Option<String>) -> SeriesRange {
    let start = non_empty(start);
    let end = non_empty(end);
    if start.is_some() || end.is_some() {
        SeriesRange::Dates { start, end }
    } else {
        SeriesRange::Period(period)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Truthy-flag rule: `1`, `true` and `yes` in any case enable, everything
/// else disables.
fn truthy(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn de_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(truthy(&raw))
}

/// Lenient numeric parsing: a value that does not parse falls back to the
/// field's default instead of rejecting the whole request.
fn de_lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().parse::<i64>().ok())
}
