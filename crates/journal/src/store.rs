use std::path::PathBuf;

use async_trait::async_trait;

use common::{Result, TradeRecord};

/// Persistence boundary for the closed-trade history.
///
/// Loaded wholesale at startup, rewritten wholesale after every
/// resolution. Append/replace, not transactional.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self) -> Result<Vec<TradeRecord>>;
    async fn save(&self, records: &[TradeRecord]) -> Result<()>;
}

/// History store backed by a single JSON file. Timestamps serialize as
/// timezone-aware RFC 3339. A missing file reads as an empty history.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl HistoryStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<TradeRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, records: &[TradeRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

/// Volatile store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    records: std::sync::Mutex<Vec<TradeRecord>>,
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn load(&self) -> Result<Vec<TradeRecord>> {
        Ok(self.records.lock().expect("store lock poisoned").clone())
    }

    async fn save(&self, records: &[TradeRecord]) -> Result<()> {
        *self.records.lock().expect("store lock poisoned") = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{OrderSide, TradeResult};

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("history-{}.json", uuid::Uuid::new_v4()))
    }

    fn sample_record() -> TradeRecord {
        TradeRecord {
            symbol: "BTCUSDT".into(),
            side: OrderSide::Buy,
            notional: 50.0,
            entry_price: 30_000.0,
            opened_at: Utc::now(),
            result: TradeResult::Win,
            profit: 0.75,
        }
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_history() {
        let store = JsonFileStore::new(temp_path());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let path = temp_path();
        let store = JsonFileStore::new(path.clone());
        let records = vec![sample_record(), sample_record()];

        store.save(&records).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, records);

        let _ = tokio::fs::remove_file(path).await;
    }

    #[tokio::test]
    async fn save_rewrites_the_file_wholesale() {
        let path = temp_path();
        let store = JsonFileStore::new(path.clone());

        store.save(&[sample_record(), sample_record()]).await.unwrap();
        store.save(&[sample_record()]).await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 1);

        let _ = tokio::fs::remove_file(path).await;
    }
}
