//! Persistence is a table contract plus the pieces it is made of
//! - ColumnType (closed set of column kinds, each with one transfer class)
//! - Key (ordered typed tuple addressing a row)
//! - Cursor (one row at a time, for reading and for staged writes)
//! - Filter and ChangeLog (per-table bookkeeping)
//! - Table (the contract, with generic append on top of it)
//! - MemoryTable (an in-memory backend)
//!

//  All modules of this lib
mod append;
mod change_log;
mod column_type;
mod cursor;
mod error;
mod filter;
mod index;
mod key;
mod memory;
mod row;
mod schema;
mod table;

//  External API
pub use append::{
    AppendOptions, AppendSummary, DEFAULT_BATCH_SIZE, UnsupportedValuePolicy, append_table,
};
pub use column_type::{ALL_COLUMN_TYPES, ColumnType, TransferClass, is_numeric};
pub use cursor::Cursor;
pub use error::{TableError, TableResult};
pub use filter::Filter;
pub use key::{Key, KeyValue};
pub use change_log::{ChangeKind, ChangeLog, LogRecord, SharedLog};
pub use memory::{MemoryTable, TransactionStats};
pub use row::{Row, Value};
pub use schema::{ColumnInformation, Schema};
pub use table::{CursorRef, Table, TableState};
