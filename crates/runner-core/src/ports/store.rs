//! Store port - ジョブ状態の永続化サービス
//!
//! Job は生成時に `create`、実行後に `update` を 1 回ずつ呼びます。
//! `delete` / `get` / `get_all` は Job からは呼ばれませんが、
//! 他の利用者のために契約に含めています。
//!
//! 複数のジョブから共有される場合、実装側が自身の排他制御を持つこと。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::StoreError;

/// Something a store can keep track of.
pub trait Record: Send + Sync {
    fn id(&self) -> String;

    fn success(&self) -> bool;
}

/// Snapshot of a record as kept by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub success: bool,
    pub stored_at: DateTime<Utc>,
}

impl StoredRecord {
    pub fn capture(record: &dyn Record, stored_at: DateTime<Utc>) -> Self {
        Self {
            id: record.id(),
            success: record.success(),
            stored_at,
        }
    }
}

impl Record for StoredRecord {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn success(&self) -> bool {
        self.success
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Register a new record.
    async fn create(&self, record: &dyn Record) -> Result<(), StoreError>;

    /// Replace the record stored under `id`. `NotFound` if unknown.
    async fn update(&self, id: &str, record: &dyn Record) -> Result<(), StoreError>;

    /// `NotFound` if unknown.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn get(&self, id: &str) -> Result<StoredRecord, StoreError>;

    async fn get_all(&self) -> Result<Vec<StoredRecord>, StoreError>;
}
