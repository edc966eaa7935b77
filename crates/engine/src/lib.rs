// In crates/engine/src/lib.rs

pub mod error;
pub mod types;

use api_client::{commentary, CommentaryClient, ForecastClient, MarketDataClient};
use backtester::{Backtester, CrossoverSettings};
use core_types::{BacktestSummary, ForecastEnvelope, PricePoint, StoredSummary};
use signal_cache::SignalCache;

pub use api_client::SeriesRange;
pub use error::{Error, Result};
pub use types::{BacktestRequest, ForecastGlance, ForecastRequest, SignalsView, SymbolView};

/// How many trailing signals a backtest summary carries.
const SIGNALS_TAIL_LEN: usize = 5;
/// Bounds and default for the query path's tail length.
const MIN_LIMIT: i64 = 1;
const MAX_LIMIT: i64 = 1000;
const DEFAULT_LIMIT: i64 = 10;

/// The orchestrator for the three analytic operations.
///
/// Owns one client per upstream plus the shared signal cache, and wires them
/// together: fetch, compute, decorate, cache, answer. Cheap to share behind
/// an `Arc` since every method takes `&self`.
pub struct Engine {
    market: MarketDataClient,
    forecast: ForecastClient,
    commentary: CommentaryClient,
    cache: SignalCache,
    backtester: Backtester,
}

impl Engine {
    pub fn new(
        market: MarketDataClient,
        forecast: ForecastClient,
        commentary: CommentaryClient,
        cache: SignalCache,
    ) -> Self {
        Self {
            market,
            forecast,
            commentary,
            cache,
            backtester: Backtester::new(CrossoverSettings::default()),
        }
    }

    /// Runs a full crossover backtest for one symbol.
    ///
    /// The data fetch and the scan itself are hard requirements; the
    /// predictor and the commentary are soft additions that can degrade
    /// without failing the run. The cache is written exactly once, after
    /// every field of the summary (commentary included) is in place.
    pub async fn run_backtest(&self, request: BacktestRequest) -> Result<BacktestSummary> {
        let rows = self
            .fetch_rows(&request.symbol, &request.range, request.provider.as_deref())
            .await?;

        let closes: Vec<f64> = rows.iter().map(|row| row.close).collect();
        let dates: Vec<String> = rows.iter().map(|row| row.date.clone()).collect();
        let report = self.backtester.run(&closes, &dates)?;

        tracing::info!(
            symbol = %request.symbol,
            n = rows.len(),
            trades = report.trades,
            "Backtest computed."
        );

        let outcome = self.forecast.predict(&closes, None).await;
        let tf_ok = outcome.tf_ok();

        let tail_start = report.signals.len().saturating_sub(SIGNALS_TAIL_LEN);
        let mut summary = BacktestSummary {
            ok: true,
            symbol: request.symbol.clone(),
            trades: report.trades,
            equity: report.equity,
            tf_ok,
            transformer: outcome.summary().cloned(),
            n: rows.len(),
            last_date: rows.last().map(|row| row.date.clone()),
            signals_tail: report.signals[tail_start..].to_vec(),
            llm_comment: None,
        };

        if request.with_llm {
            let prompt = commentary::backtest_prompt(
                &request.symbol,
                report.trades,
                report.equity,
                tf_ok,
                summary.transformer.as_ref(),
            );
            summary.llm_comment = self.commentary.generate(&prompt, None).await;
        }

        self.cache.put(
            &request.symbol,
            report.signals,
            StoredSummary::Backtest(summary.clone()),
        );

        Ok(summary)
    }

    /// Runs a forecast-only call for one symbol.
    ///
    /// `ok` on the envelope is the predictor's own verdict; a degraded call
    /// still answers 200 with `tf_ok: false` and the error envelope kept in
    /// `transformer_raw`. The cached entry holds no signals, so it shadows
    /// any earlier backtest signals for the symbol.
    pub async fn run_forecast(&self, request: ForecastRequest) -> Result<ForecastEnvelope> {
        let window = api_client::clamp_window(request.window);
        let rows = self
            .fetch_rows(&request.symbol, &request.range, request.provider.as_deref())
            .await?;
        let closes: Vec<f64> = rows.iter().map(|row| row.close).collect();

        let outcome = self.forecast.predict(&closes, Some(request.window)).await;
        let tf_ok = outcome.tf_ok();
        let transformer = outcome.summary().cloned();
        let ok = transformer.as_ref().is_some_and(|summary| summary.ok);

        tracing::info!(symbol = %request.symbol, window, tf_ok, "Forecast computed.");

        let mut envelope = ForecastEnvelope {
            ok,
            symbol: request.symbol.clone(),
            n: rows.len(),
            last_date: rows.last().map(|row| row.date.clone()),
            window,
            tf_ok,
            transformer,
            transformer_raw: outcome.raw_envelope(),
            llm_comment: None,
        };

        if request.with_llm {
            let prompt = commentary::forecast_prompt(
                &request.symbol,
                window,
                tf_ok,
                envelope.transformer.as_ref(),
            );
            envelope.llm_comment = self.commentary.generate(&prompt, None).await;
        }

        self.cache.put(
            &request.symbol,
            Vec::new(),
            StoredSummary::Forecast(envelope.clone()),
        );

        Ok(envelope)
    }

    /// Answers from the cache only; never touches an upstream.
    ///
    /// With a symbol, the condensed view of its latest run (or
    /// [`Error::SymbolNotFound`]). Without one, the whole map with each
    /// signal list trimmed to `limit`. `limit` is clamped into `[1, 1000]`
    /// and defaults to 10.
    pub fn query_signals(&self, symbol: Option<&str>, limit: Option<i64>) -> Result<SignalsView> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(MIN_LIMIT, MAX_LIMIT) as usize;

        match symbol {
            Some(symbol) => {
                let entry = self
                    .cache
                    .get(symbol)
                    .ok_or_else(|| Error::SymbolNotFound(symbol.to_owned()))?;
                Ok(SignalsView::single(symbol, &entry, limit))
            }
            None => Ok(SignalsView::all(self.cache.get_all(), limit)),
        }
    }

    async fn fetch_rows(
        &self,
        symbol: &str,
        range: &SeriesRange,
        provider: Option<&str>,
    ) -> Result<Vec<PricePoint>> {
        let rows = self.market.daily(symbol, range, provider).await?;
        if rows.is_empty() {
            return Err(Error::NoData);
        }
        Ok(rows)
    }
}
