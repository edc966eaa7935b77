pub mod error;

use core_types::{SignalAction, SignalEvent};
use tracing::debug;

pub use error::{Error, Result};

/// Moving-average window lengths for the crossover scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverSettings {
    pub fast_window: usize,
    pub slow_window: usize,
}

impl Default for CrossoverSettings {
    fn default() -> Self {
        Self {
            fast_window: 10,
            slow_window: 20,
        }
    }
}

/// The outcome of one crossover scan over a close series.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverReport {
    /// Number of emitted signals. Always equals `signals.len()`.
    pub trades: u32,
    /// Final mark-to-market equity multiple, starting from 1.0.
    pub equity: f64,
    /// Every emitted signal, in chronological order. Callers trim the tail
    /// they need for presentation.
    pub signals: Vec<SignalEvent>,
}

/// Simple moving average over `values`, computed as a running sum.
///
/// `out[i]` is `Some` iff `i >= window - 1`; earlier positions are the
/// warm-up and stay `None`. `window` must be at least 1.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        out.push(if i + 1 >= window {
            Some(sum / window as f64)
        } else {
            None
        });
    }
    out
}

/// The engine for running moving-average crossover backtests.
///
/// Pure computation: no I/O and no shared state, so one instance can be
/// reused across calls and callers.
#[derive(Debug, Clone, Default)]
pub struct Backtester {
    settings: CrossoverSettings,
}

impl Backtester {
    pub fn new(settings: CrossoverSettings) -> Self {
        Self { settings }
    }

    /// Scans the close series chronologically and reports the crossover
    /// trades, the final equity multiple and every emitted signal.
    ///
    /// A position opens long when the fast average crosses above the slow
    /// one and flips short on the opposite cross; the very first defined
    /// comparison may open a position directly from flat. Equity marks to
    /// market on every bar, warm-up included, using the position already
    /// updated by that bar's signal.
    pub fn run(&self, closes: &[f64], dates: &[String]) -> Result<CrossoverReport> {
        if closes.is_empty() {
            return Err(Error::InvalidInput("close series is empty".to_owned()));
        }
        if closes.len() != dates.len() {
            return Err(Error::InvalidInput(format!(
                "series length mismatch: {} closes vs {} dates",
                closes.len(),
                dates.len()
            )));
        }
        if self.settings.fast_window == 0 || self.settings.slow_window == 0 {
            return Err(Error::InvalidInput(
                "moving-average windows must be at least 1".to_owned(),
            ));
        }

        let fast = sma(closes, self.settings.fast_window);
        let slow = sma(closes, self.settings.slow_window);

        let mut position: i8 = 0;
        let mut equity = 1.0_f64;
        let mut trades = 0_u32;
        let mut last_price = closes[0];
        let mut signals = Vec::new();

        for i in 0..closes.len() {
            let price = closes[i];

            // --- 1. Crossover check (only once both averages exist) ---
            if let (Some(fast_ma), Some(slow_ma)) = (fast[i], slow[i]) {
                if position <= 0 && fast_ma > slow_ma {
                    position = 1;
                    trades += 1;
                    signals.push(SignalEvent {
                        date: dates[i].clone(),
                        action: SignalAction::Buy,
                        price,
                    });
                } else if position >= 0 && fast_ma < slow_ma {
                    position = -1;
                    trades += 1;
                    signals.push(SignalEvent {
                        date: dates[i].clone(),
                        action: SignalAction::Sell,
                        price,
                    });
                }
            }

            // --- 2. Mark to market with the position held into this bar ---
            let bar_return = if last_price != 0.0 {
                (price - last_price) / last_price
            } else {
                0.0
            };
            equity *= 1.0 + f64::from(position) * bar_return;
            last_price = price;
        }

        debug!(trades, equity, "Crossover scan complete.");

        Ok(CrossoverReport {
            trades,
            equity,
            signals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("d{i}")).collect()
    }

    fn run(closes: &[f64], fast: usize, slow: usize) -> CrossoverReport {
        Backtester::new(CrossoverSettings {
            fast_window: fast,
            slow_window: slow,
        })
        .run(closes, &dates(closes.len()))
        .unwrap()
    }

    #[test]
    fn sma_is_defined_exactly_from_the_window_boundary() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn sma_with_window_one_is_the_series_itself() {
        let out = sma(&[2.0, 4.0, 8.0], 1);
        assert_eq!(out, vec![Some(2.0), Some(4.0), Some(8.0)]);
    }

    #[test]
    fn empty_series_is_rejected() {
        let err = Backtester::default().run(&[], &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = Backtester::default()
            .run(&[1.0, 2.0], &dates(3))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn zero_window_is_rejected() {
        let backtester = Backtester::new(CrossoverSettings {
            fast_window: 0,
            slow_window: 20,
        });
        let err = backtester.run(&[1.0, 2.0], &dates(2)).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rising_series_fires_a_single_buy() {
        let closes: Vec<f64> = (1..=10).map(f64::from).collect();
        let report = run(&closes, 2, 3);

        assert_eq!(report.trades, 1);
        assert_eq!(report.signals.len(), 1);
        assert_eq!(report.signals[0].action, SignalAction::Buy);
        assert_eq!(report.signals[0].date, "d2");
        assert_eq!(report.signals[0].price, 3.0);
        assert!(report.equity > 1.0);
    }

    #[test]
    fn falling_series_fires_a_single_sell() {
        let closes: Vec<f64> = (1..=10).rev().map(f64::from).collect();
        let report = run(&closes, 2, 3);

        assert_eq!(report.trades, 1);
        assert_eq!(report.signals[0].action, SignalAction::Sell);
        // Short position in a falling market compounds upward.
        assert!(report.equity > 1.0);
    }

    #[test]
    fn flat_series_stays_out_of_the_market() {
        let closes = vec![5.0; 30];
        let report = run(&closes, 2, 3);

        assert_eq!(report.trades, 0);
        assert!(report.signals.is_empty());
        assert_eq!(report.equity, 1.0);
    }

    #[test]
    fn signals_alternate_through_a_zigzag() {
        let closes = vec![
            1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 5.0,
        ];
        let report = run(&closes, 2, 3);

        let actions: Vec<_> = report.signals.iter().map(|s| s.action).collect();
        assert_eq!(
            actions,
            vec![SignalAction::Buy, SignalAction::Sell, SignalAction::Buy]
        );
        assert_eq!(report.trades, 3);
        let dates: Vec<_> = report.signals.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["d2", "d6", "d10"]);
    }

    #[test]
    fn equity_marks_every_bar_including_warm_up() {
        // The jump from 1.0 to 4.0 happens inside the warm-up, so only the
        // single-bar move 4.0 -> 2.0 counts once the first signal fires.
        let closes = vec![1.0, 4.0, 2.0];
        let report = run(&closes, 2, 3);

        assert_eq!(report.trades, 1);
        assert_eq!(report.signals[0].action, SignalAction::Buy);
        assert!((report.equity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_price_contributes_no_return() {
        let closes = vec![0.0, 0.0, 0.0, 1.0, 2.0];
        let report = run(&closes, 2, 3);

        // The buy at d3 lands on a bar whose previous close is zero, so that
        // bar is skipped; only the 1.0 -> 2.0 move compounds.
        assert_eq!(report.trades, 1);
        assert_eq!(report.signals[0].date, "d3");
        assert_eq!(report.equity, 2.0);
        assert!(report.equity.is_finite());
    }
}
