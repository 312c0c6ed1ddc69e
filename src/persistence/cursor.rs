use super::column_type::ColumnType;
use super::error::TableResult;
use super::key::Key;
use super::row::Value;

/// A transient handle over one row of one sheet.
///
/// Read cursors come out of [`super::Table::seek_begin`], [`super::Table::seek`]
/// and [`super::Table::seek_row`] and walk the table with [`Cursor::next`].
/// Write cursors come out of the mutation methods (`insert`, `increment`,
/// `assign`): values are staged field by field with [`Cursor::bind`] and
/// applied by [`Cursor::execute`]. One write cursor stages one row.
///
/// Cursors borrow the table that produced them, so they can never outlive it
/// and no other mutation can start while a write cursor is alive.
pub trait Cursor {
    /// Advance to the next row. Returns `false` once the traversal is exhausted.
    fn next(&mut self) -> bool;

    fn row_key(&self) -> Key;

    fn num_fields(&self) -> usize;

    fn column_type(&self, column_index: usize) -> ColumnType;

    fn column_name(&self, column_index: usize) -> &str;

    fn is_null(&self, column_index: usize) -> bool;

    /// Read the field as an integer. Call this for integral-like columns; what
    /// other columns return is up to the backend.
    fn get_integer(&self, column_index: usize) -> i64;

    fn get_double(&self, column_index: usize) -> f64;

    fn get_text(&self, column_index: usize) -> String;

    /// Stage the next field of a pending row. `is_present == false` stages a
    /// null regardless of `value`.
    fn bind(&mut self, value: Value, is_present: bool) -> TableResult<()>;

    fn bind_null(&mut self) -> TableResult<()> {
        self.bind(Value::Text(String::new()), false)
    }

    /// Apply the staged row to the table.
    fn execute(&mut self) -> TableResult<()>;
}
