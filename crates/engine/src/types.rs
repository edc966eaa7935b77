// In crates/engine/src/types.rs

use std::collections::{BTreeMap, HashMap};

use api_client::SeriesRange;
use core_types::{ForecastSummary, SignalEvent, StoredSummary};
use serde::Serialize;
use serde_json::Value;
use signal_cache::CacheEntry;

/// Parameters of one backtest run, already parsed by the entry layer.
#[derive(Debug, Clone)]
pub struct BacktestRequest {
    pub symbol: String,
    pub range: SeriesRange,
    pub provider: Option<String>,
    pub with_llm: bool,
}

/// Parameters of one forecast-only run. `window` is raw caller input; the
/// predictor adapter clamps it before anything reaches the wire.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub symbol: String,
    pub range: SeriesRange,
    pub provider: Option<String>,
    pub window: i64,
    pub with_llm: bool,
}

/// The query path's answer: one symbol's condensed view, or the whole map.
/// Serializes untagged, so the wire shape is the view itself.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SignalsView {
    Symbol(SymbolView),
    All(BTreeMap<String, TrimmedEntry>),
}

impl SignalsView {
    pub fn single(symbol: &str, entry: &CacheEntry, limit: usize) -> Self {
        SignalsView::Symbol(SymbolView::from_entry(symbol, entry, limit))
    }

    /// The whole cache, each signal list trimmed to `limit`, keyed by symbol
    /// in stable order.
    pub fn all(entries: HashMap<String, CacheEntry>, limit: usize) -> Self {
        let map = entries
            .into_iter()
            .map(|(symbol, entry)| {
                let trimmed = TrimmedEntry {
                    signals: entry.tail(limit).to_vec(),
                    summary: entry.summary,
                };
                (symbol, trimmed)
            })
            .collect();
        SignalsView::All(map)
    }
}

/// A cache entry with its signal list trimmed for presentation. The summary
/// rides along untouched.
#[derive(Debug, Clone, Serialize)]
pub struct TrimmedEntry {
    pub signals: Vec<SignalEvent>,
    pub summary: StoredSummary,
}

/// Condensed single-symbol view of the latest cached run.
///
/// Unlike the stored summaries, this view always emits its full shape;
/// fields a forecast-only run cannot fill are `null` rather than absent.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolView {
    pub ok: bool,
    pub symbol: String,
    pub signals_tail: Vec<SignalEvent>,
    pub trades: Option<u32>,
    pub equity: Option<f64>,
    pub last_date: Option<String>,
    pub n: usize,
    pub transformer: ForecastGlance,
}

impl SymbolView {
    pub fn from_entry(symbol: &str, entry: &CacheEntry, limit: usize) -> Self {
        let summary = &entry.summary;
        Self {
            ok: true,
            symbol: symbol.to_owned(),
            signals_tail: entry.tail(limit).to_vec(),
            trades: summary.trades(),
            equity: summary.equity(),
            last_date: summary.last_date().map(str::to_owned),
            n: summary.n(),
            transformer: ForecastGlance::from_summary(summary.transformer()),
        }
    }
}

/// The abbreviated transformer block the query view carries: enough to see
/// the model's state at a glance, without the tail arrays.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ForecastGlance {
    pub ok: bool,
    pub shape: Option<Value>,
    pub horizon_pred: Option<Value>,
    pub device: Option<String>,
    pub window_used: Option<u64>,
    pub regime_last: Option<Value>,
    pub confidence: Option<f64>,
}

impl ForecastGlance {
    pub fn from_summary(summary: Option<&ForecastSummary>) -> Self {
        let Some(summary) = summary else {
            return Self::default();
        };
        Self {
            ok: summary.ok,
            shape: summary.shape.clone(),
            horizon_pred: summary.horizon_pred.clone(),
            device: summary.device.clone(),
            window_used: summary.window_used,
            regime_last: summary.regime_last.clone(),
            confidence: summary.confidence,
        }
    }
}
