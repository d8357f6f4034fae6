//! TracedStore - 操作ごとに構造化ログを出すデコレータ
//!
//! 任意の `Store` を包み、create / update / delete / get / get_all の
//! それぞれについて service, operation, id, success, error, duration を
//! 1 レコードずつ tracing に出力します。

use std::time::Instant;

use async_trait::async_trait;

use crate::domain::StoreError;
use crate::ports::{Record, Store, StoredRecord};

pub struct TracedStore<S> {
    inner: S,
    service: &'static str,
}

impl<S: Store> TracedStore<S> {
    /// `service` names the wrapped backend in every log record.
    pub fn new(service: &'static str, inner: S) -> Self {
        Self { inner, service }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn log<T>(
        &self,
        operation: &'static str,
        id: Option<&str>,
        success: Option<bool>,
        started: Instant,
        result: &Result<T, StoreError>,
    ) {
        let duration = started.elapsed();
        match result {
            Ok(_) => tracing::debug!(
                service = self.service,
                operation,
                id,
                success,
                ?duration,
                "store operation"
            ),
            Err(error) => tracing::warn!(
                service = self.service,
                operation,
                id,
                success,
                %error,
                ?duration,
                "store operation failed"
            ),
        }
    }
}

#[async_trait]
impl<S: Store> Store for TracedStore<S> {
    async fn create(&self, record: &dyn Record) -> Result<(), StoreError> {
        let started = Instant::now();
        let result = self.inner.create(record).await;
        let id = record.id();
        self.log("create", Some(&id), None, started, &result);
        result
    }

    async fn update(&self, id: &str, record: &dyn Record) -> Result<(), StoreError> {
        let started = Instant::now();
        let result = self.inner.update(id, record).await;
        self.log("update", Some(id), Some(record.success()), started, &result);
        result
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let started = Instant::now();
        let result = self.inner.delete(id).await;
        self.log("delete", Some(id), None, started, &result);
        result
    }

    async fn get(&self, id: &str) -> Result<StoredRecord, StoreError> {
        let started = Instant::now();
        let result = self.inner.get(id).await;
        self.log("get", Some(id), None, started, &result);
        result
    }

    async fn get_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let started = Instant::now();
        let result = self.inner.get_all().await;
        self.log("get-all", None, None, started, &result);
        result
    }
}
