//! InMemoryStore - プロセス内のストア
//!
//! HashMap を RwLock で保護します。複数のジョブから同時に使えます。
//! ロックは各操作の中で完結し、await を跨ぎません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::StoreError;
use crate::ports::{Clock, Record, Store, StoredRecord, SystemClock};

pub struct InMemoryStore<C = SystemClock> {
    records: RwLock<HashMap<String, StoredRecord>>,
    clock: C,
}

impl InMemoryStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> InMemoryStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C: Clock> Store for InMemoryStore<C> {
    async fn create(&self, record: &dyn Record) -> Result<(), StoreError> {
        let stored = StoredRecord::capture(record, self.clock.now());
        self.records.write().await.insert(stored.id.clone(), stored);
        Ok(())
    }

    async fn update(&self, id: &str, record: &dyn Record) -> Result<(), StoreError> {
        let stored = StoredRecord::capture(record, self.clock.now());
        let mut records = self.records.write().await;
        match records.get_mut(id) {
            Some(slot) => {
                *slot = stored;
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn get(&self, id: &str) -> Result<StoredRecord, StoreError> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn get_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let mut all: Vec<StoredRecord> = self.records.read().await.values().cloned().collect();
        // ULID ベースの id なので作成順になる
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}
