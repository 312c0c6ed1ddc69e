use std::collections::HashSet;

use super::append::{self, AppendOptions, AppendSummary};
use super::change_log::SharedLog;
use super::column_type::{ColumnType, is_numeric};
use super::cursor::Cursor;
use super::error::TableResult;
use super::filter::Filter;
use super::key::Key;

/// A cursor borrowed from the table that produced it.
pub type CursorRef<'a> = Box<dyn Cursor + 'a>;

/// The part of a table every backend carries the same way.
///
/// Backends own one of these and hand it out through [`Table::state`] and
/// [`Table::state_mut`]; the trait's provided methods do the rest. A clone
/// shares the change log with the original.
#[derive(Clone, Debug, Default)]
pub struct TableState {
    key_type: Vec<ColumnType>,
    has_human_readable_key: bool,
    filter: Filter,
    log: SharedLog,
}

impl TableState {
    pub fn new() -> TableState {
        TableState::default()
    }

    pub fn with_key_type(key_type: Vec<ColumnType>) -> TableState {
        TableState {
            key_type,
            ..TableState::default()
        }
    }
}

/// The storage-agnostic table contract.
///
/// A backend implements the required methods (cursor factories, mutations,
/// schema accessors) and gets key-type bookkeeping, column lookups, filters,
/// the change log and [`Table::append`] for free.
///
/// Lookups that find nothing return `Ok(None)`. `Err` is reserved for failures
/// of the backend itself.
pub trait Table {
    fn state(&self) -> &TableState;

    fn state_mut(&mut self) -> &mut TableState;

    /// A cursor on the first visible row of `sheet`, or `None` when the sheet
    /// has no visible rows.
    fn seek_begin(&self, sheet: usize) -> TableResult<Option<CursorRef<'_>>>;

    fn seek(&self, key: &Key) -> TableResult<Option<CursorRef<'_>>>;

    /// A cursor on the `row`-th row of `sheet`. Backends without positional
    /// access keep this default and report `None`.
    fn seek_row(&self, _row: usize, _sheet: usize) -> TableResult<Option<CursorRef<'_>>> {
        Ok(None)
    }

    fn insert(&mut self, key: &Key) -> TableResult<CursorRef<'_>>;

    /// Insert into a table that has no key type.
    fn insert_unkeyed(&mut self, sheet: usize) -> TableResult<CursorRef<'_>>;

    fn increment(&mut self, key: &Key) -> TableResult<CursorRef<'_>>;

    /// A write cursor whose bound values go, in order, to `columns`.
    fn assign(&mut self, columns: Vec<usize>) -> TableResult<CursorRef<'_>>;

    fn remove(&mut self, key: &Key) -> TableResult<()>;

    fn assign_all(&mut self) -> TableResult<CursorRef<'_>> {
        let columns = (0..self.num_fields(0)).collect();
        self.assign(columns)
    }

    fn copy(&self) -> Box<dyn Table>;

    fn add_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        nullable: bool,
        unique: bool,
        decimals: Option<u32>,
    );

    fn clear(&mut self);

    fn num_sheets(&self) -> usize {
        1
    }

    fn num_fields(&self, sheet: usize) -> usize;

    fn column_type(&self, column_index: usize, sheet: usize) -> ColumnType;

    fn is_column_nullable(&self, column_index: usize, sheet: usize) -> bool;

    fn is_column_unique(&self, column_index: usize, sheet: usize) -> bool;

    fn column_name(&self, column_index: usize, sheet: usize) -> &str;

    /// Display precision of a column, `-1` when unspecified.
    fn column_decimals(&self, _column_index: usize) -> i32 {
        -1
    }

    fn begin(&mut self) -> TableResult<()> {
        Ok(())
    }

    fn commit(&mut self) -> TableResult<()> {
        Ok(())
    }

    fn rollback(&mut self) -> TableResult<()> {
        Ok(())
    }

    fn append(&mut self, other: &dyn Table) -> TableResult<AppendSummary> {
        //! Copy every row of `other`'s first sheet into this table, with the
        //! default [`AppendOptions`]. See [`append::append_table`].

        append::append_table(self, other, &AppendOptions::default())
    }

    fn append_with(
        &mut self,
        other: &dyn Table,
        options: &AppendOptions,
    ) -> TableResult<AppendSummary> {
        append::append_table(self, other, options)
    }

    fn column_by_name(&self, name: &str, sheet: usize) -> Option<usize> {
        //! The last declared column called `name`.

        (0..self.num_fields(sheet))
            .rev()
            .find(|&index| self.column_name(index, sheet) == name)
    }

    fn column_by_names(&self, names: &HashSet<String>, sheet: usize) -> Option<usize> {
        //! The last declared column whose name is in `names`.

        (0..self.num_fields(sheet))
            .rev()
            .find(|&index| names.contains(self.column_name(index, sheet)))
    }

    fn columns_by_names(&self, names: &HashSet<String>, sheet: usize) -> Vec<usize> {
        //! Every column whose name is in `names`, highest index first.

        (0..self.num_fields(sheet))
            .rev()
            .filter(|&index| names.contains(self.column_name(index, sheet)))
            .collect()
    }

    fn column_by_type(&self, column_type: ColumnType, sheet: usize) -> Option<usize> {
        //! The first declared column of `column_type`.

        (0..self.num_fields(sheet)).find(|&index| self.column_type(index, sheet) == column_type)
    }

    fn add_integer_column(&mut self, name: &str, nullable: bool, unique: bool) {
        self.add_column(name, ColumnType::Integer, nullable, unique, None);
    }

    fn add_char_column(&mut self, name: &str) {
        self.add_column(name, ColumnType::Char, true, false, None);
    }

    fn add_date_time_column(&mut self, name: &str) {
        self.add_column(name, ColumnType::DateTime, true, false, None);
    }

    fn add_date_column(&mut self, name: &str) {
        self.add_column(name, ColumnType::Date, true, false, None);
    }

    fn add_var_char_column(&mut self, name: &str, nullable: bool, unique: bool) {
        self.add_column(name, ColumnType::VarChar, nullable, unique, None);
    }

    fn add_text_column(&mut self, name: &str) {
        self.add_column(name, ColumnType::Text, true, false, None);
    }

    fn add_double_column(
        &mut self,
        name: &str,
        nullable: bool,
        unique: bool,
        decimals: Option<u32>,
    ) {
        self.add_column(name, ColumnType::Double, nullable, unique, decimals);
    }

    fn add_url_column(&mut self, name: &str) {
        self.add_column(name, ColumnType::Url, true, false, None);
    }

    fn add_text_key_column(&mut self, name: &str) {
        self.add_column(name, ColumnType::TextKey, true, false, None);
    }

    fn add_binary_key_column(&mut self, name: &str) {
        self.add_column(name, ColumnType::BinaryKey, true, false, None);
    }

    fn add_enum_column(&mut self, name: &str) {
        self.add_column(name, ColumnType::Enum, true, false, None);
    }

    fn add_bool_column(&mut self, name: &str, nullable: bool, unique: bool) {
        self.add_column(name, ColumnType::Bool, nullable, unique, None);
    }

    fn add_blob_column(&mut self, name: &str) {
        self.add_column(name, ColumnType::Blob, true, false, None);
    }

    fn add_vector_column(&mut self, name: &str) {
        self.add_column(name, ColumnType::Vector, true, false, None);
    }

    fn dump_row(&self, key: &Key) -> TableResult<String> {
        //! The text of every field of the row at `key`, joined with `;`.
        //!
        //! Returns `"not found"` when no such row is visible.

        let dump = match self.seek(key)? {
            Some(cursor) => (0..cursor.num_fields())
                .map(|index| cursor.get_text(index))
                .collect::<Vec<String>>()
                .join(";"),
            None => "not found".to_string(),
        };
        Ok(dump)
    }

    fn key_type(&self) -> &[ColumnType] {
        &self.state().key_type
    }

    fn set_key_type(&mut self, key_type: Vec<ColumnType>) {
        self.state_mut().key_type = key_type;
    }

    fn key_size(&self) -> usize {
        self.state().key_type.len()
    }

    fn has_numeric_key(&self) -> bool {
        match self.key_type() {
            [single] => is_numeric(*single),
            _ => false,
        }
    }

    fn set_has_human_readable_key(&mut self, human_readable: bool) {
        self.state_mut().has_human_readable_key = human_readable;
    }

    fn has_human_readable_key(&self) -> bool {
        self.state().has_human_readable_key
    }

    fn has_filter(&self, column: usize) -> bool {
        self.state().filter.contains(column)
    }

    fn set_filter(&mut self, column: usize, keys: HashSet<Key>) {
        self.state_mut().filter.set(column, keys);
    }

    fn clear_filter(&mut self, column: usize) {
        self.state_mut().filter.clear(column);
    }

    fn filter(&self) -> &Filter {
        &self.state().filter
    }

    fn log(&self) -> &SharedLog {
        &self.state().log
    }
}
