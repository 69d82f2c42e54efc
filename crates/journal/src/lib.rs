pub mod store;

pub use store::{HistoryStore, JsonFileStore, MemoryStore};

use common::{Result, TradeRecord, TradeResult};

/// Closed-trade history: the in-memory list plus its backing store.
///
/// Records arrive here already resolved and are never mutated again. The
/// file is rewritten after every append so a restart picks up where the
/// process left off.
pub struct TradeJournal {
    store: Box<dyn HistoryStore>,
    closed: Vec<TradeRecord>,
}

/// Aggregate figures for the periodic report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JournalStats {
    pub closed: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_staked: f64,
    pub total_profit: f64,
}

impl TradeJournal {
    /// Load the persisted history through `store`.
    pub async fn load(store: Box<dyn HistoryStore>) -> Result<Self> {
        let closed = store.load().await?;
        Ok(Self { store, closed })
    }

    pub fn closed(&self) -> &[TradeRecord] {
        &self.closed
    }

    /// Append a resolved record and rewrite the backing file.
    pub async fn append(&mut self, record: TradeRecord) -> Result<()> {
        self.closed.push(record);
        self.store.save(&self.closed).await
    }

    /// Fraction of winning trades for one symbol over its resolved
    /// history. `None` until at least `min_samples` trades resolved —
    /// too little data to trust.
    pub fn win_rate(&self, symbol: &str, min_samples: usize) -> Option<f64> {
        let resolved: Vec<&TradeRecord> = self
            .closed
            .iter()
            .filter(|t| t.symbol == symbol && t.result != TradeResult::Pending)
            .collect();
        if resolved.is_empty() || resolved.len() < min_samples {
            return None;
        }
        let wins = resolved.iter().filter(|t| t.result == TradeResult::Win).count();
        Some(wins as f64 / resolved.len() as f64)
    }

    pub fn stats(&self) -> JournalStats {
        JournalStats {
            closed: self.closed.len(),
            wins: self.closed.iter().filter(|t| t.result == TradeResult::Win).count(),
            losses: self.closed.iter().filter(|t| t.result == TradeResult::Loss).count(),
            total_staked: self.closed.iter().map(|t| t.notional).sum(),
            total_profit: self.closed.iter().map(|t| t.profit).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::OrderSide;

    fn record(symbol: &str, result: TradeResult, profit: f64) -> TradeRecord {
        TradeRecord {
            symbol: symbol.into(),
            side: OrderSide::Buy,
            notional: 50.0,
            entry_price: 100.0,
            opened_at: Utc::now(),
            result,
            profit,
        }
    }

    async fn journal_with(records: Vec<TradeRecord>) -> TradeJournal {
        let store = MemoryStore::default();
        store.save(&records).await.unwrap();
        TradeJournal::load(Box::new(store)).await.unwrap()
    }

    #[tokio::test]
    async fn win_rate_is_unknown_below_the_sample_floor() {
        let records = (0..4).map(|_| record("BTCUSDT", TradeResult::Win, 1.0)).collect();
        let journal = journal_with(records).await;
        assert_eq!(journal.win_rate("BTCUSDT", 5), None);
    }

    #[tokio::test]
    async fn win_rate_counts_only_the_requested_symbol() {
        let mut records: Vec<TradeRecord> =
            (0..4).map(|_| record("BTCUSDT", TradeResult::Win, 1.0)).collect();
        records.push(record("BTCUSDT", TradeResult::Loss, -1.0));
        records.extend((0..5).map(|_| record("ETHUSDT", TradeResult::Loss, -1.0)));

        let journal = journal_with(records).await;
        let rate = journal.win_rate("BTCUSDT", 5).unwrap();
        assert!((rate - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn append_persists_through_the_store() {
        let mut journal = journal_with(Vec::new()).await;
        journal.append(record("SOLUSDT", TradeResult::Loss, -0.5)).await.unwrap();
        journal.append(record("SOLUSDT", TradeResult::Win, 2.0)).await.unwrap();

        assert_eq!(journal.closed().len(), 2);
        let stats = journal.stats();
        assert_eq!((stats.closed, stats.wins, stats.losses), (2, 1, 1));
        assert!((stats.total_profit - 1.5).abs() < 1e-9);
        assert!((stats.total_staked - 100.0).abs() < 1e-9);
    }
}
