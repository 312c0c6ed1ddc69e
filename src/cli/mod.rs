use colored::Colorize;

use crate::{
    cli::{
        colors::SQLDB_TEAL,
        messages::{highlight_argument, system_message},
        parsers::CliCommand,
    },
    config,
    persistence::{
        ALL_COLUMN_TYPES, AppendOptions, ColumnType, Key, MemoryTable, Table, TableResult,
        UnsupportedValuePolicy, Value, is_numeric,
    },
};

mod colors;
mod messages;
pub mod parsers;

const SAMPLE_NAMES: [&str; 9] = [
    "Jansen",
    "Bonega",
    "Maharashtra",
    "Lorem",
    "Malaika",
    "Jimmy",
    "Jeffrey",
    "Rango",
    "Danish",
];

pub fn run(command: CliCommand) -> Result<(), String> {
    let result = match command {
        CliCommand::Demo {
            rows,
            batch_size,
            reject_unsupported,
        } => run_demo(rows, batch_size, reject_unsupported),
        CliCommand::Log { rows } => run_log(rows),
        CliCommand::Types => {
            show_types();
            Ok(())
        }
    };

    result.map_err(|error| system_message("error", error))
}

pub fn sample_table(rows: usize) -> TableResult<MemoryTable> {
    //! A table keyed by INTEGER with one column of most transfer classes,
    //! including a BLOB column that append cannot carry over.
    //!
    //! Every fourth row has a null name.

    let mut table = MemoryTable::with_key_type(vec![ColumnType::Integer]);
    table.set_has_human_readable_key(true);
    table.add_integer_column("n", false, false);
    table.add_double_column("ratio", true, false, Some(2));
    table.add_var_char_column("name", true, false);
    table.add_date_column("born");
    table.add_blob_column("payload");

    for id in 1..=rows as i64 {
        let mut cursor = table.insert(&Key::from(id))?;
        cursor.bind(Value::Integer(id * 10), true)?;
        cursor.bind(Value::Double(id as f64 / 3.0), true)?;
        let name = SAMPLE_NAMES[(id as usize - 1) % SAMPLE_NAMES.len()];
        cursor.bind(Value::from(name), id % 4 != 0)?;
        cursor.bind(Value::Integer(id * 1000), true)?;
        cursor.bind(Value::Blob(id.to_le_bytes().to_vec()), true)?;
        cursor.execute()?;
    }

    Ok(table)
}

fn run_demo(
    rows: usize,
    batch_size: Option<usize>,
    reject_unsupported: bool,
) -> Result<(), String> {
    let mut options: AppendOptions =
        config::append_options_from_env().map_err(|error| error.to_string())?;
    if let Some(batch_size) = batch_size {
        options.batch_size = batch_size;
    }
    if reject_unsupported {
        options.unsupported = UnsupportedValuePolicy::Reject;
    }

    let source = sample_table(rows).map_err(|error| error.to_string())?;
    let mut target = MemoryTable::new();

    println!(
        "{}",
        system_message(
            "append",
            format!(
                "Copying {} rows with batches of {}.",
                highlight_argument(&source.rows().to_string()),
                highlight_argument(&options.batch_size.to_string())
            )
        )
    );

    let summary = target
        .append_with(&source, &options)
        .map_err(|error| error.to_string())?;

    for column in summary.nulled_columns.iter() {
        println!(
            "{}",
            system_message(
                "append",
                format!("Column {} was copied as nulls.", highlight_argument(column))
            )
        );
    }

    let stats = target.transaction_stats();
    println!(
        "{}",
        system_message(
            "append",
            format!(
                "{} row(s) in {} batch(es); {} begin / {} commit.",
                summary.rows, summary.batches, stats.begins, stats.commits
            )
        )
    );

    println!();
    print!("{}", target);
    Ok(())
}

fn run_log(rows: usize) -> Result<(), String> {
    let source = sample_table(rows).map_err(|error| error.to_string())?;
    let mut target = MemoryTable::new();
    target.append(&source).map_err(|error| error.to_string())?;

    let json = target
        .log()
        .read()
        .to_json()
        .map_err(|error| error.to_string())?;
    println!("{}", json);
    Ok(())
}

fn show_types() {
    println!(
        "{:12} {:12} {}",
        "TYPE".color(SQLDB_TEAL),
        "TRANSFER".color(SQLDB_TEAL),
        "NUMERIC".color(SQLDB_TEAL)
    );
    for column_type in ALL_COLUMN_TYPES {
        println!(
            "{:12} {:12} {}",
            column_type.to_string(),
            format!("{:?}", column_type.transfer_class()),
            is_numeric(column_type)
        );
    }
}
