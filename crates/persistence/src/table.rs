//! Tabular store contract
//!
//! The ledger only needs three things from durable storage: append a row,
//! scan every row of a sheet, and overwrite a single cell. Anything that can
//! do that (a spreadsheet, SQLite, memory) can back the ledger.

use crate::error::{PersistenceError, PersistenceResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single cell.
///
/// Spreadsheets hand back numbers for cells that look numeric, so readers use
/// `as_text`/`as_integer` instead of matching on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Text(String),
}

impl CellValue {
    /// Cell rendered as text; integers become their decimal form
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Integer(i) => i.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Cell as an integer, parsing numeric text
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<u32> for CellValue {
    fn from(i: u32) -> Self {
        CellValue::Integer(i64::from(i))
    }
}

impl From<u64> for CellValue {
    fn from(i: u64) -> Self {
        CellValue::Integer(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

/// Column name -> value. Absent keys are empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<CellValue>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    pub fn set(&mut self, column: &str, value: impl Into<CellValue>) {
        self.0.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }

    /// Text of a cell; empty text counts as absent
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column)
            .map(CellValue::as_text)
            .filter(|s| !s.is_empty())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Opaque address of a stored row, stable for the life of the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowAddress(pub u64);

impl fmt::Display for RowAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row together with its address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub address: RowAddress,
    pub cells: Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Integer,
        }
    }
}

/// Header of a named sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl SheetSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Reject rows that carry columns this sheet does not have
    pub fn check_row(&self, row: &Row) -> PersistenceResult<()> {
        for column in row.columns() {
            if self.column(column).is_none() {
                return Err(PersistenceError::unknown_column(self.name, column));
            }
        }
        Ok(())
    }

    pub fn check_column(&self, column: &str) -> PersistenceResult<&Column> {
        self.column(column)
            .ok_or_else(|| PersistenceError::unknown_column(self.name, column))
    }
}

/// Durable tabular store.
///
/// Implementations must keep rows in insertion order and never reorder or
/// rewrite a row except through `update_cell`.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Append one row to `sheet`
    async fn append_row(&self, sheet: &str, row: Row) -> PersistenceResult<RowAddress>;

    /// All rows of `sheet`, oldest first
    async fn scan(&self, sheet: &str) -> PersistenceResult<Vec<StoredRow>>;

    /// Overwrite a single cell
    async fn update_cell(
        &self,
        sheet: &str,
        address: RowAddress,
        column: &str,
        value: CellValue,
    ) -> PersistenceResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coercion() {
        assert_eq!(CellValue::Integer(1001).as_text(), "1001");
        assert_eq!(CellValue::from(" 42 ").as_integer(), Some(42));
        assert_eq!(CellValue::from("abc").as_integer(), None);
        assert_eq!(CellValue::from(u64::MAX), CellValue::Integer(i64::MAX));
    }

    #[test]
    fn test_row_accessors() {
        let row = Row::new()
            .with("member_id", 1001_i64)
            .with("note", "");

        assert_eq!(row.text("member_id").as_deref(), Some("1001"));
        assert_eq!(row.text("note"), None);
        assert_eq!(row.text("missing"), None);
    }

    #[test]
    fn test_schema_checks() {
        const SHEET: SheetSchema = SheetSchema {
            name: "things",
            columns: &[Column::text("name"), Column::integer("count")],
        };

        assert!(SHEET.check_row(&Row::new().with("name", "a")).is_ok());
        let err = SHEET.check_row(&Row::new().with("colour", "red")).unwrap_err();
        assert_eq!(err.to_string(), "Unknown column: things.colour");
        assert_eq!(SHEET.check_column("count").unwrap().kind, ColumnKind::Integer);
    }
}
