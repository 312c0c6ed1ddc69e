//! Bulk copy of one table into another.
//!
//! [`append_table`] drives a full scan of the source and one `insert` cursor
//! per row on the target. Values move according to the column's
//! [`TransferClass`]; the target's transaction boundaries are opened and
//! closed once per batch of rows, never once per row.

use log::{debug, info, warn};

use super::column_type::TransferClass;
use super::cursor::Cursor;
use super::error::{TableError, TableResult};
use super::row::Value;
use super::table::Table;

pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// What to do with a column whose values have no generic accessor
/// (BLOB, VECTOR).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnsupportedValuePolicy {
    /// Bind an empty null in its place and carry on.
    #[default]
    BindNull,
    /// Fail the append before anything is written.
    Reject,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppendOptions {
    /// Rows per `begin`/`commit` pair.
    pub batch_size: usize,
    pub unsupported: UnsupportedValuePolicy,
}

impl Default for AppendOptions {
    fn default() -> Self {
        AppendOptions {
            batch_size: DEFAULT_BATCH_SIZE,
            unsupported: UnsupportedValuePolicy::default(),
        }
    }
}

impl AppendOptions {
    pub fn validate(&self) -> TableResult<()> {
        if self.batch_size == 0 {
            return Err(TableError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppendSummary {
    pub rows: usize,
    /// Number of committed batches.
    pub batches: usize,
    /// Source columns whose values were replaced by nulls.
    pub nulled_columns: Vec<String>,
}

pub fn append_table<T>(
    target: &mut T,
    source: &dyn Table,
    options: &AppendOptions,
) -> TableResult<AppendSummary>
where
    T: Table + ?Sized,
{
    //! Copy every row of `source`'s first sheet into `target`.
    //!
    //! - A target without columns first adopts the source's key type and
    //! columns, in order.
    //! - Only sheet 0 is copied.
    //! - Existing target columns are not checked against the source.
    //! - On a failure, a failed `commit` included, the open batch is rolled
    //! back and the error returned; batches committed before it stay.
    //! - The source's change log is merged into the target's once every row
    //! is in.

    options.validate()?;

    if options.unsupported == UnsupportedValuePolicy::Reject {
        for index in 0..source.num_fields(0) {
            let column_type = source.column_type(index, 0);
            if column_type.transfer_class() == TransferClass::Unsupported {
                return Err(TableError::UnsupportedTransfer {
                    column: source.column_name(index, 0).to_string(),
                    column_type,
                });
            }
        }
    }

    if target.num_fields(0) == 0 {
        target.set_key_type(source.key_type().to_vec());
        for index in 0..source.num_fields(0) {
            let decimals = u32::try_from(source.column_decimals(index)).ok();
            target.add_column(
                source.column_name(index, 0),
                source.column_type(index, 0),
                source.is_column_nullable(index, 0),
                source.is_column_unique(index, 0),
                decimals,
            );
        }
        debug!("adopted {} columns from the source table", source.num_fields(0));
    }

    let mut summary = AppendSummary::default();

    let Some(mut cursor) = source.seek_begin(0)? else {
        debug!("source table is empty; nothing to append");
        return Ok(summary);
    };

    let mut pending = 0;
    loop {
        if pending == 0 {
            target.begin()?;
        }

        if let Err(error) = copy_row(target, cursor.as_ref(), options, &mut summary) {
            abandon(target);
            return Err(error);
        }

        summary.rows += 1;
        pending += 1;
        if pending == options.batch_size {
            if let Err(error) = target.commit() {
                abandon(target);
                return Err(error);
            }
            summary.batches += 1;
            debug!("committed batch {} ({} rows so far)", summary.batches, summary.rows);
            pending = 0;
        }

        if !cursor.next() {
            break;
        }
    }

    if pending > 0 {
        if let Err(error) = target.commit() {
            abandon(target);
            return Err(error);
        }
        summary.batches += 1;
    }

    target.log().append_from(source.log());

    info!(
        "appended {} rows in {} batches",
        summary.rows, summary.batches
    );
    Ok(summary)
}

fn abandon<T>(target: &mut T)
where
    T: Table + ?Sized,
{
    if let Err(error) = target.rollback() {
        warn!("rollback after failed append also failed: {}", error);
    }
}

fn copy_row<T>(
    target: &mut T,
    source: &dyn Cursor,
    options: &AppendOptions,
    summary: &mut AppendSummary,
) -> TableResult<()>
where
    T: Table + ?Sized,
{
    let mut row = target.insert(&source.row_key())?;

    for index in 0..source.num_fields() {
        let is_present = !source.is_null(index);
        let column_type = source.column_type(index);

        match column_type.transfer_class() {
            TransferClass::Integral => {
                row.bind(Value::Integer(source.get_integer(index)), is_present)?
            }
            TransferClass::Floating => {
                row.bind(Value::Double(source.get_double(index)), is_present)?
            }
            TransferClass::Textual => row.bind(Value::Text(source.get_text(index)), is_present)?,
            TransferClass::Unsupported => match options.unsupported {
                UnsupportedValuePolicy::BindNull => {
                    let name = source.column_name(index);
                    if !summary.nulled_columns.iter().any(|nulled| nulled == name) {
                        warn!(
                            "column '{}' of type {} cannot be copied; binding nulls",
                            name, column_type
                        );
                        summary.nulled_columns.push(name.to_string());
                    }
                    row.bind_null()?
                }
                UnsupportedValuePolicy::Reject => {
                    return Err(TableError::UnsupportedTransfer {
                        column: source.column_name(index).to_string(),
                        column_type,
                    });
                }
            },
        }
    }

    row.execute()
}
