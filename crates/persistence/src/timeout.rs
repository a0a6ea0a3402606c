//! Bounded store calls
//!
//! Wraps any `TableStore` so that no call can hang: each one is raced against
//! a deadline and surfaces `PersistenceError::Timeout` when it loses.

use crate::error::{PersistenceError, PersistenceResult};
use crate::table::{CellValue, Row, RowAddress, StoredRow, TableStore};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: TableStore> TimeoutStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: String,
        call: impl Future<Output = PersistenceResult<T>>,
    ) -> PersistenceResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let after_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(%operation, timeout_ms = after_ms, "store call timed out");
                Err(PersistenceError::Timeout { operation, after_ms })
            }
        }
    }
}

#[async_trait]
impl<S: TableStore> TableStore for TimeoutStore<S> {
    async fn append_row(&self, sheet: &str, row: Row) -> PersistenceResult<RowAddress> {
        self.bounded(format!("append {}", sheet), self.inner.append_row(sheet, row))
            .await
    }

    async fn scan(&self, sheet: &str) -> PersistenceResult<Vec<StoredRow>> {
        self.bounded(format!("scan {}", sheet), self.inner.scan(sheet))
            .await
    }

    async fn update_cell(
        &self,
        sheet: &str,
        address: RowAddress,
        column: &str,
        value: CellValue,
    ) -> PersistenceResult<()> {
        self.bounded(
            format!("update {}.{} row {}", sheet, column, address),
            self.inner.update_cell(sheet, address, column, value),
        )
        .await
    }
}
