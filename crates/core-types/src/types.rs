// In crates/core-types/src/types.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single daily observation from the market data service.
///
/// Rows arrive as `{date, close}` objects. Both fields are defaulted so a
/// sparse row never aborts deserialization of the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub close: f64,
}

/// The direction of an emitted crossover signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
}

/// One crossover event: the bar it fired on and the close it fired at.
///
/// Events are emitted on direction changes only, never on every bar, so two
/// consecutive events always carry opposite actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub date: String,
    pub action: SignalAction,
    pub price: f64,
}

/// Compact, normalized view of a raw predictor response.
///
/// Every field is individually tolerant: a missing or oddly-typed field in
/// the raw body leaves the corresponding field at its default instead of
/// failing the whole normalization. Loosely-shaped fields stay as raw JSON
/// values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_used: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_pred: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub y_tail: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regime_states_tail: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regime_last: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ForecastSummary {
    /// Normalizes a raw predictor body into the compact summary.
    ///
    /// `y_tail` keeps at most the last three numeric entries; non-numeric
    /// entries are dropped.
    pub fn from_raw(raw: &Value) -> Self {
        let y_tail: Vec<f64> = raw
            .get("y_tail")
            .and_then(Value::as_array)
            .map(|values| {
                let skip = values.len().saturating_sub(3);
                values.iter().skip(skip).filter_map(Value::as_f64).collect()
            })
            .unwrap_or_default();

        Self {
            ok: raw.get("ok").and_then(Value::as_bool).unwrap_or(false),
            shape: raw.get("shape").cloned(),
            window_used: raw.get("window").and_then(Value::as_u64),
            horizon_pred: raw.get("horizon_pred").cloned(),
            device: raw.get("device").and_then(Value::as_str).map(str::to_owned),
            y_tail,
            regime_states_tail: raw
                .get("regime_states_tail")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            regime_last: raw.get("regime_last").cloned(),
            confidence: raw.get("confidence").and_then(Value::as_f64),
        }
    }
}

/// The result envelope of one crossover backtest run.
///
/// Immutable once produced. A later run for the same symbol replaces the
/// previous summary wholesale, never patches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub ok: bool,
    pub symbol: String,
    pub trades: u32,
    pub equity: f64,
    pub tf_ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer: Option<ForecastSummary>,
    pub n: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_date: Option<String>,
    pub signals_tail: Vec<SignalEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_comment: Option<String>,
}

/// The result envelope of one forecast-only run.
///
/// `ok` reflects the predictor's own verdict, while `tf_ok` reflects whether
/// the predictor was reachable at all. `transformer_raw` preserves the raw
/// predictor body (or the error envelope a degraded call left behind) for
/// clients that want more than the normalized summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEnvelope {
    pub ok: bool,
    pub symbol: String,
    pub n: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_date: Option<String>,
    pub window: u32,
    pub tf_ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer: Option<ForecastSummary>,
    #[serde(default)]
    pub transformer_raw: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_comment: Option<String>,
}

/// What a cache slot's summary can be: the outcome of the latest backtest
/// run, or of the latest forecast-only run, whichever happened last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredSummary {
    Backtest(BacktestSummary),
    Forecast(ForecastEnvelope),
}

impl StoredSummary {
    pub fn symbol(&self) -> &str {
        match self {
            StoredSummary::Backtest(summary) => &summary.symbol,
            StoredSummary::Forecast(envelope) => &envelope.symbol,
        }
    }

    /// Trade count, present only for backtest outcomes.
    pub fn trades(&self) -> Option<u32> {
        match self {
            StoredSummary::Backtest(summary) => Some(summary.trades),
            StoredSummary::Forecast(_) => None,
        }
    }

    /// Final equity multiple, present only for backtest outcomes.
    pub fn equity(&self) -> Option<f64> {
        match self {
            StoredSummary::Backtest(summary) => Some(summary.equity),
            StoredSummary::Forecast(_) => None,
        }
    }

    /// Number of bars the run was computed over.
    pub fn n(&self) -> usize {
        match self {
            StoredSummary::Backtest(summary) => summary.n,
            StoredSummary::Forecast(envelope) => envelope.n,
        }
    }

    pub fn last_date(&self) -> Option<&str> {
        match self {
            StoredSummary::Backtest(summary) => summary.last_date.as_deref(),
            StoredSummary::Forecast(envelope) => envelope.last_date.as_deref(),
        }
    }

    pub fn transformer(&self) -> Option<&ForecastSummary> {
        match self {
            StoredSummary::Backtest(summary) => summary.transformer.as_ref(),
            StoredSummary::Forecast(envelope) => envelope.transformer.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signal_action_uses_uppercase_wire_names() {
        let buy = serde_json::to_string(&SignalAction::Buy).unwrap();
        let sell = serde_json::to_string(&SignalAction::Sell).unwrap();
        assert_eq!(buy, "\"BUY\"");
        assert_eq!(sell, "\"SELL\"");
    }

    #[test]
    fn price_point_tolerates_sparse_rows() {
        let row: PricePoint = serde_json::from_value(json!({ "close": 5.0 })).unwrap();
        assert_eq!(row.date, "");
        assert_eq!(row.close, 5.0);

        let row: PricePoint = serde_json::from_value(json!({ "date": "2024-01-02" })).unwrap();
        assert_eq!(row.close, 0.0);
    }

    #[test]
    fn from_raw_extracts_well_formed_fields() {
        let raw = json!({
            "ok": true,
            "shape": [1, 64, 1],
            "window": 64,
            "horizon_pred": 0.37,
            "device": "cpu",
            "y_tail": [1.0, 2.0, 3.0, 4.0, 5.0],
            "regime_states_tail": [0, 1, 1],
            "regime_last": 1,
            "confidence": 0.82
        });
        let summary = ForecastSummary::from_raw(&raw);

        assert!(summary.ok);
        assert_eq!(summary.shape, Some(json!([1, 64, 1])));
        assert_eq!(summary.window_used, Some(64));
        assert_eq!(summary.device.as_deref(), Some("cpu"));
        assert_eq!(summary.y_tail, vec![3.0, 4.0, 5.0]);
        assert_eq!(summary.regime_states_tail.len(), 3);
        assert_eq!(summary.regime_last, Some(json!(1)));
        assert_eq!(summary.confidence, Some(0.82));
    }

    #[test]
    fn from_raw_defaults_every_missing_field() {
        let summary = ForecastSummary::from_raw(&json!({}));
        assert_eq!(summary, ForecastSummary::default());
        assert!(!summary.ok);
        assert!(summary.y_tail.is_empty());
    }

    #[test]
    fn from_raw_shrugs_off_mistyped_fields() {
        let raw = json!({
            "ok": "yes",
            "window": "sixty-four",
            "device": 3,
            "y_tail": "not a list",
            "confidence": "high"
        });
        let summary = ForecastSummary::from_raw(&raw);

        assert!(!summary.ok);
        assert_eq!(summary.window_used, None);
        assert_eq!(summary.device, None);
        assert!(summary.y_tail.is_empty());
        assert_eq!(summary.confidence, None);
    }

    #[test]
    fn from_raw_keeps_only_the_numeric_tail() {
        let raw = json!({ "y_tail": [1.0, "x", 2.5, 3.5] });
        let summary = ForecastSummary::from_raw(&raw);
        // Last three entries, minus the non-numeric one.
        assert_eq!(summary.y_tail, vec![2.5, 3.5]);
    }

    #[test]
    fn stored_summary_round_trips_untagged() {
        let backtest = StoredSummary::Backtest(BacktestSummary {
            ok: true,
            symbol: "GC=F".into(),
            trades: 3,
            equity: 1.21,
            tf_ok: false,
            transformer: None,
            n: 120,
            last_date: Some("2024-06-28".into()),
            signals_tail: vec![SignalEvent {
                date: "2024-06-01".into(),
                action: SignalAction::Buy,
                price: 2300.0,
            }],
            llm_comment: None,
        });
        let value = serde_json::to_value(&backtest).unwrap();
        // Untagged: the envelope serializes flat, without a variant wrapper.
        assert_eq!(value["trades"], json!(3));
        let back: StoredSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back, backtest);

        let forecast = StoredSummary::Forecast(ForecastEnvelope {
            ok: false,
            symbol: "SI=F".into(),
            n: 60,
            last_date: None,
            window: 16,
            tf_ok: false,
            transformer: None,
            transformer_raw: json!({ "ok": false, "status": 503 }),
            llm_comment: None,
        });
        let value = serde_json::to_value(&forecast).unwrap();
        assert_eq!(value["window"], json!(16));
        let back: StoredSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back, forecast);
    }

    #[test]
    fn stored_summary_accessors_split_by_kind() {
        let summary = StoredSummary::Forecast(ForecastEnvelope {
            ok: true,
            symbol: "GC=F".into(),
            n: 40,
            last_date: Some("2024-03-01".into()),
            window: 64,
            tf_ok: true,
            transformer: Some(ForecastSummary::default()),
            transformer_raw: json!({ "ok": true }),
            llm_comment: None,
        });

        assert_eq!(summary.symbol(), "GC=F");
        assert_eq!(summary.trades(), None);
        assert_eq!(summary.equity(), None);
        assert_eq!(summary.n(), 40);
        assert_eq!(summary.last_date(), Some("2024-03-01"));
        assert!(summary.transformer().is_some());
    }
}
