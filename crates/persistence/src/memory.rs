//! In-memory tabular store
//!
//! Same contract as the SQLite store, without durability.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sheets::{find_sheet, ALL_SHEETS};
use crate::table::{CellValue, Row, RowAddress, SheetSchema, StoredRow, TableStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub struct MemoryTableStore {
    sheets: Vec<SheetSchema>,
    rows: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryTableStore {
    /// Store with every ledger sheet
    pub fn new() -> Self {
        Self::with_sheets(ALL_SHEETS)
    }

    pub fn with_sheets(sheets: &[SheetSchema]) -> Self {
        Self {
            sheets: sheets.to_vec(),
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn schema(&self, sheet: &str) -> PersistenceResult<&SheetSchema> {
        find_sheet(&self.sheets, sheet)
            .ok_or_else(|| PersistenceError::UnknownSheet(sheet.to_string()))
    }
}

impl Default for MemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn append_row(&self, sheet: &str, row: Row) -> PersistenceResult<RowAddress> {
        self.schema(sheet)?.check_row(&row)?;

        let mut guard = self.rows.write().await;
        let rows = guard.entry(sheet.to_string()).or_default();
        rows.push(row);
        Ok(RowAddress(rows.len() as u64 - 1))
    }

    async fn scan(&self, sheet: &str) -> PersistenceResult<Vec<StoredRow>> {
        self.schema(sheet)?;

        let guard = self.rows.read().await;
        let rows = guard
            .get(sheet)
            .map(|rows| {
                rows.iter()
                    .enumerate()
                    .map(|(i, cells)| StoredRow {
                        address: RowAddress(i as u64),
                        cells: cells.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn update_cell(
        &self,
        sheet: &str,
        address: RowAddress,
        column: &str,
        value: CellValue,
    ) -> PersistenceResult<()> {
        self.schema(sheet)?.check_column(column)?;

        let mut guard = self.rows.write().await;
        let row = guard
            .get_mut(sheet)
            .and_then(|rows| rows.get_mut(address.0 as usize))
            .ok_or_else(|| PersistenceError::RowNotFound {
                sheet: sheet.to_string(),
                address: address.0,
            })?;
        row.set(column, value);
        Ok(())
    }
}
