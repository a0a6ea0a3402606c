//! SQLite-backed tabular store
//!
//! One SQL table per sheet. Every table gets an autoincrement `row_id`
//! which doubles as the row address; the sheet's own columns carry no
//! constraints so that upstream duplicates survive a round trip, exactly as
//! they would in a spreadsheet.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sheets::{find_sheet, ALL_SHEETS};
use crate::table::{CellValue, ColumnKind, Row, RowAddress, SheetSchema, StoredRow, TableStore};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row as _, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

/// Open a connection pool, creating the database file if needed
pub async fn create_pool(database_url: &str, acquire_timeout: Duration) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    // Single logical writer: one connection keeps `sqlite::memory:` databases
    // shared and avoids SQLITE_BUSY between our own statements.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub struct SqliteTableStore {
    pool: SqlitePool,
    sheets: Vec<SheetSchema>,
}

impl SqliteTableStore {
    /// Store over an existing pool with every ledger sheet
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_sheets(pool, ALL_SHEETS)
    }

    pub fn with_sheets(pool: SqlitePool, sheets: &[SheetSchema]) -> Self {
        Self {
            pool,
            sheets: sheets.to_vec(),
        }
    }

    /// Connect and create missing tables
    pub async fn open(database_url: &str, acquire_timeout: Duration) -> PersistenceResult<Self> {
        let pool = create_pool(database_url, acquire_timeout).await?;
        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Create a table for each sheet if it does not exist yet
    pub async fn init(&self) -> PersistenceResult<()> {
        for sheet in &self.sheets {
            let columns = sheet
                .columns
                .iter()
                .map(|c| {
                    let sql_type = match c.kind {
                        ColumnKind::Text => "TEXT",
                        ColumnKind::Integer => "INTEGER",
                    };
                    format!("\"{}\" {}", c.name, sql_type)
                })
                .collect::<Vec<_>>()
                .join(", ");

            let sql = format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (row_id INTEGER PRIMARY KEY AUTOINCREMENT, {})",
                sheet.name, columns
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }

        tracing::debug!(sheets = self.sheets.len(), "sqlite sheets ready");
        Ok(())
    }

    /// Number of rows in a sheet
    pub async fn count(&self, sheet: &str) -> PersistenceResult<i64> {
        let schema = self.schema(sheet)?;
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", schema.name);
        let row: (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(row.0)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn schema(&self, sheet: &str) -> PersistenceResult<&SheetSchema> {
        find_sheet(&self.sheets, sheet)
            .ok_or_else(|| PersistenceError::UnknownSheet(sheet.to_string()))
    }

    fn decode_row(schema: &SheetSchema, row: &SqliteRow) -> PersistenceResult<StoredRow> {
        let row_id: i64 = row.try_get("row_id")?;
        let mut cells = Row::new();

        for column in schema.columns {
            let value = match column.kind {
                // SQLite keeps whatever type was written; fall back to text
                // for integer columns that hold non-numeric cells.
                ColumnKind::Integer => match row.try_get::<Option<i64>, _>(column.name) {
                    Ok(v) => v.map(CellValue::Integer),
                    Err(_) => row
                        .try_get::<Option<String>, _>(column.name)?
                        .map(CellValue::Text),
                },
                ColumnKind::Text => row
                    .try_get::<Option<String>, _>(column.name)?
                    .map(CellValue::Text),
            };
            if let Some(value) = value {
                cells.set(column.name, value);
            }
        }

        Ok(StoredRow {
            address: RowAddress(row_id as u64),
            cells,
        })
    }
}

#[async_trait]
impl TableStore for SqliteTableStore {
    async fn append_row(&self, sheet: &str, row: Row) -> PersistenceResult<RowAddress> {
        let schema = self.schema(sheet)?;
        schema.check_row(&row)?;

        let names = schema
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; schema.columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            schema.name, names, placeholders
        );

        let mut query = sqlx::query(&sql);
        for column in schema.columns {
            query = match row.get(column.name) {
                Some(CellValue::Integer(i)) => query.bind(*i),
                Some(CellValue::Text(s)) => query.bind(s.clone()),
                None => query.bind(Option::<String>::None),
            };
        }

        let result = query.execute(&self.pool).await?;
        Ok(RowAddress(result.last_insert_rowid() as u64))
    }

    async fn scan(&self, sheet: &str) -> PersistenceResult<Vec<StoredRow>> {
        let schema = self.schema(sheet)?;
        let sql = format!("SELECT * FROM \"{}\" ORDER BY row_id", schema.name);

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        tracing::debug!(sheet = schema.name, rows = rows.len(), "scanned sheet");

        rows.iter().map(|row| Self::decode_row(schema, row)).collect()
    }

    async fn update_cell(
        &self,
        sheet: &str,
        address: RowAddress,
        column: &str,
        value: CellValue,
    ) -> PersistenceResult<()> {
        let schema = self.schema(sheet)?;
        let column = schema.check_column(column)?;
        let sql = format!(
            "UPDATE \"{}\" SET \"{}\" = ? WHERE row_id = ?",
            schema.name, column.name
        );

        let query = sqlx::query(&sql);
        let query = match value {
            CellValue::Integer(i) => query.bind(i),
            CellValue::Text(s) => query.bind(s),
        };
        let result = query.bind(address.0 as i64).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::RowNotFound {
                sheet: sheet.to_string(),
                address: address.0,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::{closeouts, members, verifications};
    use tempfile::tempdir;

    async fn memory_store() -> SqliteTableStore {
        SqliteTableStore::open("sqlite::memory:", Duration::from_secs(5))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_append_and_scan_in_order() {
        let store = memory_store().await;

        for id in ["1001", "1002", "1001"] {
            store
                .append_row(
                    members::SHEET,
                    Row::new()
                        .with(members::MEMBER_ID, id)
                        .with(members::ACCRUED_PENALTY, 0_i64),
                )
                .await
                .unwrap();
        }

        let rows = store.scan(members::SHEET).await.unwrap();
        let ids: Vec<_> = rows
            .iter()
            .map(|r| r.cells.text(members::MEMBER_ID).unwrap())
            .collect();
        assert_eq!(ids, vec!["1001", "1002", "1001"]);
        assert!(rows[0].address < rows[1].address);
        assert_eq!(rows[0].cells.get(members::DISPLAY_NAME), None);
        assert_eq!(store.count(members::SHEET).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_cell() {
        let store = memory_store().await;
        let address = store
            .append_row(
                members::SHEET,
                Row::new()
                    .with(members::MEMBER_ID, "1001")
                    .with(members::ACCRUED_PENALTY, 0_i64),
            )
            .await
            .unwrap();

        store
            .update_cell(members::SHEET, address, members::ACCRUED_PENALTY, 10000_i64.into())
            .await
            .unwrap();

        let rows = store.scan(members::SHEET).await.unwrap();
        assert_eq!(
            rows[0].cells.get(members::ACCRUED_PENALTY),
            Some(&CellValue::Integer(10000))
        );

        let err = store
            .update_cell(members::SHEET, RowAddress(999), members::ACCRUED_PENALTY, 1_i64.into())
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::RowNotFound { .. }));
    }

    #[tokio::test]
    async fn test_integer_column_keeps_text_cells() {
        let store = memory_store().await;
        store
            .append_row(
                verifications::SHEET,
                Row::new().with(verifications::SESSION_INDEX, "two"),
            )
            .await
            .unwrap();

        let rows = store.scan(verifications::SHEET).await.unwrap();
        assert_eq!(
            rows[0].cells.get(verifications::SESSION_INDEX),
            Some(&CellValue::Text("two".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unknown_sheet_and_column() {
        let store = memory_store().await;
        assert!(matches!(
            store.scan("payments").await.unwrap_err(),
            PersistenceError::UnknownSheet(_)
        ));
        assert!(matches!(
            store
                .update_cell(closeouts::SHEET, RowAddress(1), "row_id", 1_i64.into())
                .await
                .unwrap_err(),
            PersistenceError::UnknownColumn { .. }
        ));
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("ledger.db").display());

        {
            let store = SqliteTableStore::open(&url, Duration::from_secs(5)).await.unwrap();
            store
                .append_row(closeouts::SHEET, Row::new().with(closeouts::WEEK_ID, "2026-W03"))
                .await
                .unwrap();
            store.close().await;
        }

        let store = SqliteTableStore::open(&url, Duration::from_secs(5)).await.unwrap();
        let rows = store.scan(closeouts::SHEET).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells.text(closeouts::WEEK_ID).as_deref(), Some("2026-W03"));
    }
}
