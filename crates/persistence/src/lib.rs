//! # Fitledger Persistence
//!
//! Tabular storage for the ledger: a narrow `TableStore` trait (append, scan,
//! update one cell), SQLite and in-memory backends, a timeout wrapper, and
//! typed repositories over the three sheets.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fitledger_persistence::{Database, MemberRepo};
//!
//! let db = Database::open("sqlite:data/fitledger.db", Duration::from_secs(5)).await?;
//! let members = MemberRepo::get_all(db.store().as_ref()).await?;
//! ```

pub mod error;
pub mod memory;
pub mod repos;
pub mod rows;
pub mod sheets;
pub mod sqlite;
pub mod table;
pub mod timeout;

pub use error::{PersistenceError, PersistenceResult};
pub use memory::MemoryTableStore;
pub use repos::{CloseoutRepo, MemberRepo, StoredMember, VerificationRepo};
pub use sqlite::{create_pool, SqliteTableStore};
pub use table::{CellValue, Row, RowAddress, SheetSchema, StoredRow, TableStore};
pub use timeout::TimeoutStore;

use std::sync::Arc;
use std::time::Duration;

/// Database facade - the store every service shares
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn TableStore>,
}

impl Database {
    /// Open (or create) a SQLite ledger, every call bounded by `timeout`
    ///
    /// # Arguments
    /// * `db_url` - SQLite database URL (e.g., "sqlite:data/fitledger.db")
    /// * `timeout` - Limit for each store call and for acquiring a connection
    pub async fn open(db_url: &str, timeout: Duration) -> PersistenceResult<Self> {
        let sqlite = SqliteTableStore::open(db_url, timeout).await?;
        tracing::info!(url = db_url, "ledger database opened");
        Ok(Self::from_store(TimeoutStore::new(sqlite, timeout)))
    }

    /// Volatile ledger for tests and dry runs
    pub fn in_memory() -> Self {
        Self::from_store(MemoryTableStore::new())
    }

    pub fn from_store(store: impl TableStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> Arc<dyn TableStore> {
        Arc::clone(&self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitledger_core::{Member, MemberId};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_file_database() {
        let dir = tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("fitledger.db").display());

        let db = Database::open(&url, Duration::from_secs(5)).await.unwrap();
        let store = db.store();
        let joined = chrono::NaiveDate::from_ymd_opt(2026, 1, 25).unwrap();
        MemberRepo::insert(store.as_ref(), &Member::new(MemberId::from("1001"), "Alice", joined))
            .await
            .unwrap();

        let members = MemberRepo::get_all(store.as_ref()).await.unwrap();
        assert_eq!(members.len(), 1);
        assert!(dir.path().join("fitledger.db").exists());
    }

    #[tokio::test]
    async fn test_in_memory_database_is_empty() {
        let db = Database::in_memory();
        assert!(MemberRepo::get_all(db.store().as_ref()).await.unwrap().is_empty());
    }
}
