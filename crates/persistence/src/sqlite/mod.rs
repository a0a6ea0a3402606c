//! SQLite persistence module
//!
//! `TableStore` implementation over a sqlx SQLite pool.

pub mod store;

pub use store::{create_pool, SqliteTableStore};
