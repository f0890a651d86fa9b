// Dashstore - record tables for an admin dashboard, persisted through a key-value store

pub mod cli;
pub mod config;
pub mod export;
pub mod filter;
pub mod kv;
pub mod models;
pub mod overview;
pub mod query;
pub mod record;
pub mod selection;
pub mod store;
pub mod table;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use export::{CsvRow, ExportFormat};
pub use filter::{Filter, FilterValue};
pub use kv::{FileKv, KeyValueStore, MemoryKv, SqliteKv};
pub use query::{PageView, Query, Sort, SortDirection};
pub use record::{FieldValue, Record};
pub use selection::Selection;
pub use store::Store;
pub use table::{Confirm, EditSession, FormOutcome, Table};
