use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use core_types::{SignalEvent, StoredSummary};
use serde::{Deserialize, Serialize};

/// One cache slot: the full signal list of the latest run for a symbol plus
/// the summary that run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub signals: Vec<SignalEvent>,
    pub summary: StoredSummary,
}

impl CacheEntry {
    /// The most recent `limit` signals, oldest first.
    pub fn tail(&self, limit: usize) -> &[SignalEvent] {
        let start = self.signals.len().saturating_sub(limit);
        &self.signals[start..]
    }
}

/// Process-wide symbol -> latest-result map.
///
/// Clones are cheap and all share the same map, so one handle per component
/// is the intended usage. Every write replaces the whole entry for a symbol;
/// entries are never evicted, so the map grows with the number of distinct
/// symbols seen over the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct SignalCache {
    inner: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl SignalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entry for `symbol` with the given signals and summary as
    /// one unit. Readers see either the previous entry or the new one, never
    /// a mix.
    pub fn put(&self, symbol: &str, signals: Vec<SignalEvent>, summary: StoredSummary) {
        let entry = CacheEntry { signals, summary };
        self.inner.lock().unwrap().insert(symbol.to_owned(), entry);
    }

    /// The latest entry for `symbol`, if any run has completed for it.
    pub fn get(&self, symbol: &str) -> Option<CacheEntry> {
        self.inner.lock().unwrap().get(symbol).cloned()
    }

    /// A point-in-time snapshot of every entry.
    pub fn get_all(&self) -> HashMap<String, CacheEntry> {
        self.inner.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{BacktestSummary, SignalAction};

    fn event(date: &str, action: SignalAction) -> SignalEvent {
        SignalEvent {
            date: date.to_owned(),
            action,
            price: 100.0,
        }
    }

    fn summary(symbol: &str, trades: u32) -> StoredSummary {
        StoredSummary::Backtest(BacktestSummary {
            ok: true,
            symbol: symbol.to_owned(),
            trades,
            equity: 1.0,
            tf_ok: false,
            transformer: None,
            n: 10,
            last_date: Some("2024-01-10".to_owned()),
            signals_tail: Vec::new(),
            llm_comment: None,
        })
    }

    #[test]
    fn get_returns_what_put_stored() {
        let cache = SignalCache::new();
        assert!(cache.get("GC=F").is_none());

        let signals = vec![event("2024-01-03", SignalAction::Buy)];
        cache.put("GC=F", signals.clone(), summary("GC=F", 1));

        let entry = cache.get("GC=F").unwrap();
        assert_eq!(entry.signals, signals);
        assert_eq!(entry.summary.trades(), Some(1));
    }

    #[test]
    fn put_replaces_the_entry_wholesale() {
        let cache = SignalCache::new();
        cache.put(
            "GC=F",
            vec![
                event("2024-01-03", SignalAction::Buy),
                event("2024-01-09", SignalAction::Sell),
            ],
            summary("GC=F", 2),
        );
        cache.put("GC=F", vec![event("2024-02-01", SignalAction::Buy)], summary("GC=F", 1));

        let entry = cache.get("GC=F").unwrap();
        assert_eq!(entry.signals.len(), 1);
        assert_eq!(entry.signals[0].date, "2024-02-01");
        assert_eq!(entry.summary.trades(), Some(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clones_share_the_same_map() {
        let cache = SignalCache::new();
        let other = cache.clone();
        other.put("SI=F", Vec::new(), summary("SI=F", 0));

        assert!(cache.get("SI=F").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn get_all_snapshots_every_symbol() {
        let cache = SignalCache::new();
        cache.put("GC=F", Vec::new(), summary("GC=F", 0));
        cache.put("SI=F", Vec::new(), summary("SI=F", 0));

        let all = cache.get_all();
        assert_eq!(all.len(), 2);
        assert!(all.contains_key("GC=F"));
        assert!(all.contains_key("SI=F"));
    }

    #[test]
    fn tail_keeps_the_most_recent_signals_in_order() {
        let entry = CacheEntry {
            signals: vec![
                event("d1", SignalAction::Buy),
                event("d2", SignalAction::Sell),
                event("d3", SignalAction::Buy),
                event("d4", SignalAction::Sell),
                event("d5", SignalAction::Buy),
            ],
            summary: summary("GC=F", 5),
        };

        let tail = entry.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].date, "d4");
        assert_eq!(tail[1].date, "d5");

        // A limit beyond the list length returns everything.
        assert_eq!(entry.tail(50).len(), 5);
        assert!(entry.tail(0).is_empty());
    }
}
