//! An in-memory [`Table`] backend.
//!
//! Rows live in a vector in insertion order, next to an [`Index`] from key to
//! row position. The table has exactly one sheet.
//!
//! # Transactions
//! While a transaction is open every mutation pushes an [`Undo`] entry, so a
//! transaction costs as much as the rows it touches. `rollback` replays the
//! entries backwards and `commit` drops them. Change-log records made inside a
//! transaction are held back and only reach the shared log on `commit`.

use std::fmt::Display;

use chrono::DateTime;
use log::debug;

use super::column_type::{ColumnType, TransferClass};
use super::cursor::Cursor;
use super::error::{TableError, TableResult};
use super::index::Index;
use super::key::Key;
use super::change_log::{ChangeKind, LogRecord};
use super::row::{Row, Value};
use super::schema::{ColumnInformation, Schema};
use super::table::{CursorRef, Table, TableState};

#[derive(Clone, Debug)]
struct StoredRow {
    key: Key,
    values: Vec<Option<Value>>,
}

/// How to take back one mutation.
enum Undo {
    Inserted { position: usize },
    Changed { position: usize, values: Vec<Option<Value>> },
    Removed { position: usize, row: StoredRow },
    Cleared { rows: Vec<StoredRow> },
}

#[derive(Default)]
struct Transaction {
    undo: Vec<Undo>,
    pending: Vec<LogRecord>,
}

/// How often each transaction boundary of a [`MemoryTable`] was called.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransactionStats {
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
}

pub struct MemoryTable {
    state: TableState,
    schema: Schema,
    rows: Vec<StoredRow>,
    index: Index,
    transaction: Option<Transaction>,
    stats: TransactionStats,
}

impl Default for MemoryTable {
    fn default() -> Self {
        MemoryTable::new()
    }
}

impl MemoryTable {
    pub fn new() -> MemoryTable {
        //! A table with no columns and no key type. Rows are added with
        //! [`Table::insert_unkeyed`] unless a key type is set later.

        MemoryTable::from_state(TableState::new())
    }

    pub fn with_key_type(key_type: Vec<ColumnType>) -> MemoryTable {
        MemoryTable::from_state(TableState::with_key_type(key_type))
    }

    fn from_state(state: TableState) -> MemoryTable {
        MemoryTable {
            state,
            schema: Schema::default(),
            rows: vec![],
            index: Index::new(),
            transaction: None,
            stats: TransactionStats::default(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn transaction_stats(&self) -> TransactionStats {
        self.stats
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    pub fn scan(&self) -> Vec<Row> {
        //! A copy of every visible row.

        self.visible_positions(0)
            .into_iter()
            .map(|position| Row(self.rows[position].values.clone()))
            .collect()
    }

    fn check_sheet(&self, sheet: usize) -> TableResult<()> {
        if sheet != 0 {
            return Err(TableError::SheetOutOfRange { sheet, len: 1 });
        }
        Ok(())
    }

    fn is_visible(&self, row: &StoredRow) -> bool {
        self.filter()
            .iter()
            .all(|(&column, keys)| match row.values.get(column) {
                Some(Some(value)) => keys.contains(&Key::from(value.to_key_value())),
                _ => false,
            })
    }

    fn visible_positions(&self, from: usize) -> Vec<usize> {
        (from..self.rows.len())
            .filter(|&position| self.is_visible(&self.rows[position]))
            .collect()
    }

    fn record(&mut self, kind: ChangeKind, key: Key) {
        if let Some(transaction) = self.transaction.as_mut() {
            transaction.pending.push(LogRecord::new(kind, key));
            return;
        }
        self.log().write().record(kind, key);
    }

    fn journal(&mut self, entry: Undo) {
        if let Some(transaction) = self.transaction.as_mut() {
            transaction.undo.push(entry);
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, row) in self.rows.iter().enumerate() {
            if !row.key.is_empty() {
                self.index.insert(row.key.clone(), position);
            }
        }
    }

    fn check_key(&self, key: &Key) -> TableResult<()> {
        if !key.conforms_to(self.key_type()) {
            return Err(TableError::KeyMismatch {
                key: key.clone(),
                expected: self.key_type().to_vec(),
            });
        }
        Ok(())
    }

    fn check_nulls(&self, values: &[Option<Value>]) -> TableResult<()> {
        for (column, value) in self.schema.iter().zip(values) {
            if value.is_none() && !column.nullable {
                return Err(TableError::NullViolation(column.name.clone()));
            }
        }
        Ok(())
    }

    fn write_cursor(
        &mut self,
        mode: WriteMode,
        columns: Vec<usize>,
    ) -> TableResult<CursorRef<'_>> {
        if let Some(&index) = columns.iter().find(|&&index| index >= self.schema.len()) {
            return Err(TableError::ColumnOutOfRange {
                index,
                len: self.schema.len(),
            });
        }
        Ok(Box::new(MemoryWriteCursor {
            table: self,
            mode,
            columns,
            staged: vec![],
        }))
    }

    fn apply_insert(&mut self, key: Key, values: Vec<Option<Value>>) -> TableResult<()> {
        self.check_nulls(&values)?;
        if !key.is_empty() {
            if self.index.contains(&key) {
                return Err(TableError::DuplicateKey(key));
            }
            self.index.insert(key.clone(), self.rows.len());
        }
        self.rows.push(StoredRow {
            key: key.clone(),
            values,
        });
        self.journal(Undo::Inserted {
            position: self.rows.len() - 1,
        });
        self.record(ChangeKind::Insert, key);
        Ok(())
    }

    fn apply_increment(&mut self, key: Key, values: Vec<Option<Value>>) -> TableResult<()> {
        let Some(position) = self.index.get(&key) else {
            debug!("increment on missing key '{}' inserts a new row", key);
            return self.apply_insert(key, values);
        };

        let mut updated = self.rows[position].values.clone();
        for (column, delta) in values.into_iter().enumerate() {
            let Some(delta) = delta else {
                continue;
            };
            let Some(info) = self.schema.get(column) else {
                continue;
            };
            let current = updated[column].as_ref();
            let value = match info.column_type.transfer_class() {
                TransferClass::Integral => current
                    .map_or(0, Value::as_integer)
                    .checked_add(delta.as_integer())
                    .map(Value::Integer)
                    .ok_or_else(|| TableError::Overflow {
                        column: info.name.clone(),
                    })?,
                TransferClass::Floating => {
                    Value::Double(current.map_or(0.0, Value::as_double) + delta.as_double())
                }
                _ => delta,
            };
            updated[column] = Some(value);
        }

        let values = std::mem::replace(&mut self.rows[position].values, updated);
        self.journal(Undo::Changed { position, values });
        self.record(ChangeKind::Increment, key);
        Ok(())
    }

    fn apply_assign(&mut self, columns: &[usize], staged: &[Option<Value>]) -> TableResult<()> {
        for (&column, value) in columns.iter().zip(staged) {
            if value.is_none() && !self.schema.get(column).is_some_and(|info| info.nullable) {
                let name = self
                    .schema
                    .get(column)
                    .map(|info| info.name.clone())
                    .unwrap_or_default();
                return Err(TableError::NullViolation(name));
            }
        }

        let positions = self.visible_positions(0);
        for position in positions.iter().copied() {
            if self.transaction.is_some() {
                let values = self.rows[position].values.clone();
                self.journal(Undo::Changed { position, values });
            }
            for (&column, value) in columns.iter().zip(staged) {
                self.rows[position].values[column] = value.clone();
            }
            let key = self.rows[position].key.clone();
            self.record(ChangeKind::Update, key);
        }
        debug!("assigned {} columns on {} rows", staged.len(), positions.len());
        Ok(())
    }

    fn column_info(&self, column_index: usize) -> Option<&ColumnInformation> {
        self.schema.get(column_index)
    }
}

impl Table for MemoryTable {
    fn state(&self) -> &TableState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut TableState {
        &mut self.state
    }

    fn seek_begin(&self, sheet: usize) -> TableResult<Option<CursorRef<'_>>> {
        self.check_sheet(sheet)?;
        Ok(MemoryReadCursor::open(self, self.visible_positions(0)))
    }

    fn seek(&self, key: &Key) -> TableResult<Option<CursorRef<'_>>> {
        let positions = self
            .index
            .get(key)
            .filter(|&position| self.is_visible(&self.rows[position]))
            .into_iter()
            .collect();
        Ok(MemoryReadCursor::open(self, positions))
    }

    fn seek_row(&self, row: usize, sheet: usize) -> TableResult<Option<CursorRef<'_>>> {
        //! A cursor starting at raw row position `row`, continuing through the
        //! visible rows after it. `None` when that row is filtered out.

        self.check_sheet(sheet)?;
        match self.rows.get(row) {
            Some(stored) if self.is_visible(stored) => {
                Ok(MemoryReadCursor::open(self, self.visible_positions(row)))
            }
            _ => Ok(None),
        }
    }

    fn insert(&mut self, key: &Key) -> TableResult<CursorRef<'_>> {
        //! Unkeyed tables also accept an empty key here.

        self.check_key(key)?;
        if !key.is_empty() && self.index.contains(key) {
            return Err(TableError::DuplicateKey(key.clone()));
        }
        let columns = (0..self.schema.len()).collect();
        self.write_cursor(WriteMode::Insert(key.clone()), columns)
    }

    fn insert_unkeyed(&mut self, sheet: usize) -> TableResult<CursorRef<'_>> {
        self.check_sheet(sheet)?;
        if !self.key_type().is_empty() {
            return Err(TableError::KeyRequired);
        }
        let columns = (0..self.schema.len()).collect();
        self.write_cursor(WriteMode::Insert(Key::empty()), columns)
    }

    fn increment(&mut self, key: &Key) -> TableResult<CursorRef<'_>> {
        //! Bound values are added to integral and floating fields and replace
        //! any other field. Null binds leave a field as it is. A key with no
        //! row yet inserts the bound values as a new row.
        //!
        //! Unkeyed rows cannot be addressed, so tables without a key type
        //! refuse with [`TableError::KeyRequired`]. An integral sum past
        //! `i64` fails with [`TableError::Overflow`] and changes nothing.

        if self.key_type().is_empty() {
            return Err(TableError::KeyRequired);
        }
        self.check_key(key)?;
        let columns = (0..self.schema.len()).collect();
        self.write_cursor(WriteMode::Increment(key.clone()), columns)
    }

    fn assign(&mut self, columns: Vec<usize>) -> TableResult<CursorRef<'_>> {
        //! Executing the cursor writes the bound values into `columns` of every
        //! row the current filter lets through.

        self.write_cursor(WriteMode::Assign, columns)
    }

    fn remove(&mut self, key: &Key) -> TableResult<()> {
        if let Some(position) = self.index.remove(key) {
            let row = self.rows.remove(position);
            self.index.shift_index_back(position);
            self.journal(Undo::Removed { position, row });
            self.record(ChangeKind::Remove, key.clone());
        }
        Ok(())
    }

    fn copy(&self) -> Box<dyn Table> {
        //! The copy owns its rows and schema but shares the change log.

        Box::new(MemoryTable {
            state: self.state.clone(),
            schema: self.schema.clone(),
            rows: self.rows.clone(),
            index: self.index.clone(),
            transaction: None,
            stats: TransactionStats::default(),
        })
    }

    fn add_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        nullable: bool,
        unique: bool,
        decimals: Option<u32>,
    ) {
        self.schema.push(ColumnInformation::new(
            name,
            column_type,
            nullable,
            unique,
            decimals,
        ));
        for row in self.rows.iter_mut() {
            row.values.push(None);
        }
    }

    fn clear(&mut self) {
        //! Drops every row. The schema stays.

        let rows = std::mem::take(&mut self.rows);
        self.index.clear();
        self.journal(Undo::Cleared { rows });
        self.record(ChangeKind::Clear, Key::empty());
    }

    fn num_fields(&self, sheet: usize) -> usize {
        if sheet == 0 { self.schema.len() } else { 0 }
    }

    fn column_type(&self, column_index: usize, _sheet: usize) -> ColumnType {
        self.column_info(column_index)
            .map_or(ColumnType::Any, |info| info.column_type)
    }

    fn is_column_nullable(&self, column_index: usize, _sheet: usize) -> bool {
        self.column_info(column_index).is_some_and(|info| info.nullable)
    }

    fn is_column_unique(&self, column_index: usize, _sheet: usize) -> bool {
        self.column_info(column_index).is_some_and(|info| info.unique)
    }

    fn column_name(&self, column_index: usize, _sheet: usize) -> &str {
        self.column_info(column_index).map_or("", |info| info.name.as_str())
    }

    fn column_decimals(&self, column_index: usize) -> i32 {
        self.column_info(column_index)
            .map_or(-1, ColumnInformation::decimals_or_default)
    }

    fn begin(&mut self) -> TableResult<()> {
        if self.transaction.is_some() {
            return Err(TableError::TransactionActive);
        }
        self.transaction = Some(Transaction::default());
        self.stats.begins += 1;
        Ok(())
    }

    fn commit(&mut self) -> TableResult<()> {
        let transaction = self.transaction.take().ok_or(TableError::NoTransaction)?;
        self.log().write().extend(transaction.pending);
        self.stats.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> TableResult<()> {
        let transaction = self.transaction.take().ok_or(TableError::NoTransaction)?;
        for entry in transaction.undo.into_iter().rev() {
            match entry {
                Undo::Inserted { position } => {
                    self.rows.truncate(position);
                }
                Undo::Changed { position, values } => {
                    if let Some(row) = self.rows.get_mut(position) {
                        row.values = values;
                    }
                }
                Undo::Removed { position, row } => {
                    let position = position.min(self.rows.len());
                    self.rows.insert(position, row);
                }
                Undo::Cleared { rows } => {
                    self.rows = rows;
                }
            }
        }
        self.reindex();
        // columns added during the transaction stay
        let width = self.schema.len();
        for row in self.rows.iter_mut() {
            row.values.resize(width, None);
        }
        self.stats.rollbacks += 1;
        debug!("rolled back {} change records", transaction.pending.len());
        Ok(())
    }
}

impl Display for MemoryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| format!("{} | {}", row.key, Row(row.values.clone())))
            .collect();

        writeln!(f, "{}\n{}", self.schema, rows.join("\n"))
    }
}

fn coerce(value: Value, column_type: ColumnType) -> Value {
    //! Store values in the representation their column's transfer class reads.

    match column_type.transfer_class() {
        TransferClass::Integral => Value::Integer(value.as_integer()),
        TransferClass::Floating => Value::Double(value.as_double()),
        TransferClass::Textual => match value {
            Value::Text(text) => Value::Text(text),
            Value::Blob(bytes) if column_type == ColumnType::BinaryKey => Value::Blob(bytes),
            other => Value::Text(other.to_string()),
        },
        TransferClass::Unsupported => value,
    }
}

fn render(value: &Value, column: &ColumnInformation) -> String {
    match (column.column_type, value) {
        (ColumnType::Bool, value) => (value.as_integer() != 0).to_string(),
        (ColumnType::Date, Value::Integer(days)) => days
            .checked_mul(86_400)
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
            .map_or_else(
                || days.to_string(),
                |date| date.date_naive().format("%Y-%m-%d").to_string(),
            ),
        (ColumnType::DateTime, Value::Integer(seconds)) => DateTime::from_timestamp(*seconds, 0)
            .map_or_else(|| seconds.to_string(), |datetime| datetime.to_rfc3339()),
        // hex, the way binary key positions display
        (ColumnType::BinaryKey, Value::Blob(_)) => value.to_key_value().to_string(),
        (ColumnType::Double, Value::Double(number)) => match column.decimals {
            Some(decimals) => format!("{:.*}", decimals as usize, number),
            None => number.to_string(),
        },
        (_, value) => value.to_string(),
    }
}

/// Walks a fixed list of row positions.
struct MemoryReadCursor<'a> {
    table: &'a MemoryTable,
    positions: Vec<usize>,
    at: usize,
}

impl<'a> MemoryReadCursor<'a> {
    fn open(table: &'a MemoryTable, positions: Vec<usize>) -> Option<CursorRef<'a>> {
        if positions.is_empty() {
            return None;
        }
        Some(Box::new(MemoryReadCursor {
            table,
            positions,
            at: 0,
        }))
    }

    fn current(&self) -> &StoredRow {
        &self.table.rows[self.positions[self.at]]
    }

    fn value(&self, column_index: usize) -> Option<&Value> {
        self.current().values.get(column_index)?.as_ref()
    }
}

impl Cursor for MemoryReadCursor<'_> {
    fn next(&mut self) -> bool {
        if self.at + 1 < self.positions.len() {
            self.at += 1;
            true
        } else {
            false
        }
    }

    fn row_key(&self) -> Key {
        self.current().key.clone()
    }

    fn num_fields(&self) -> usize {
        self.table.schema.len()
    }

    fn column_type(&self, column_index: usize) -> ColumnType {
        self.table.column_type(column_index, 0)
    }

    fn column_name(&self, column_index: usize) -> &str {
        self.table.column_name(column_index, 0)
    }

    fn is_null(&self, column_index: usize) -> bool {
        self.value(column_index).is_none()
    }

    fn get_integer(&self, column_index: usize) -> i64 {
        self.value(column_index).map_or(0, Value::as_integer)
    }

    fn get_double(&self, column_index: usize) -> f64 {
        self.value(column_index).map_or(0.0, Value::as_double)
    }

    fn get_text(&self, column_index: usize) -> String {
        match (self.value(column_index), self.table.column_info(column_index)) {
            (Some(value), Some(column)) => render(value, column),
            _ => String::new(),
        }
    }

    fn bind(&mut self, _value: Value, _is_present: bool) -> TableResult<()> {
        Err(TableError::ReadOnlyCursor)
    }

    fn execute(&mut self) -> TableResult<()> {
        Err(TableError::ReadOnlyCursor)
    }
}

enum WriteMode {
    Insert(Key),
    Increment(Key),
    Assign,
}

/// Stages one row's values. Values are bound in the order of `columns`;
/// columns left unbound at `execute` are null (insert) or untouched
/// (increment, assign).
struct MemoryWriteCursor<'a> {
    table: &'a mut MemoryTable,
    mode: WriteMode,
    columns: Vec<usize>,
    staged: Vec<Option<Value>>,
}

impl MemoryWriteCursor<'_> {
    fn staged_value(&self, index: usize) -> Option<&Value> {
        self.staged.get(index)?.as_ref()
    }

    fn full_row(&mut self) -> Vec<Option<Value>> {
        let mut values = vec![None; self.table.schema.len()];
        for (&column, value) in self.columns.iter().zip(self.staged.drain(..)) {
            values[column] = value;
        }
        values
    }
}

impl Cursor for MemoryWriteCursor<'_> {
    fn next(&mut self) -> bool {
        false
    }

    fn row_key(&self) -> Key {
        match &self.mode {
            WriteMode::Insert(key) | WriteMode::Increment(key) => key.clone(),
            WriteMode::Assign => Key::empty(),
        }
    }

    fn num_fields(&self) -> usize {
        self.columns.len()
    }

    fn column_type(&self, column_index: usize) -> ColumnType {
        self.columns
            .get(column_index)
            .map_or(ColumnType::Any, |&column| self.table.column_type(column, 0))
    }

    fn column_name(&self, column_index: usize) -> &str {
        self.columns
            .get(column_index)
            .map_or("", |&column| self.table.column_name(column, 0))
    }

    fn is_null(&self, column_index: usize) -> bool {
        self.staged_value(column_index).is_none()
    }

    fn get_integer(&self, column_index: usize) -> i64 {
        self.staged_value(column_index).map_or(0, Value::as_integer)
    }

    fn get_double(&self, column_index: usize) -> f64 {
        self.staged_value(column_index).map_or(0.0, Value::as_double)
    }

    fn get_text(&self, column_index: usize) -> String {
        let column = self
            .columns
            .get(column_index)
            .and_then(|&column| self.table.column_info(column));
        match (self.staged_value(column_index), column) {
            (Some(value), Some(column)) => render(value, column),
            _ => String::new(),
        }
    }

    fn bind(&mut self, value: Value, is_present: bool) -> TableResult<()> {
        let Some(&column) = self.columns.get(self.staged.len()) else {
            return Err(TableError::TooManyValues {
                bound: self.staged.len() + 1,
                len: self.columns.len(),
            });
        };
        let column_type = self.table.column_type(column, 0);
        self.staged
            .push(is_present.then(|| coerce(value, column_type)));
        Ok(())
    }

    fn execute(&mut self) -> TableResult<()> {
        //! Applies the staged values and empties the staging area.

        if matches!(self.mode, WriteMode::Assign) {
            let staged: Vec<Option<Value>> = self.staged.drain(..).collect();
            return self.table.apply_assign(&self.columns, &staged);
        }

        let key = self.row_key();
        let values = self.full_row();
        if matches!(self.mode, WriteMode::Increment(_)) {
            self.table.apply_increment(key, values)
        } else {
            self.table.apply_insert(key, values)
        }
    }
}
