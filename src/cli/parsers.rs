//! The place where the command line parser is defined.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sqldb")]
#[command(about = "Copy rows between tables through a storage-agnostic table contract", long_about = None)]
pub struct CliParser {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Clone, Subcommand)]
pub enum CliCommand {
    /// Build a sample table, append it into an empty one and print the result.
    Demo {
        /// Number of rows in the sample table.
        #[arg(long, default_value_t = 10)]
        rows: usize,

        /// Rows per transaction batch (overrides SQLDB_APPEND_BATCH_SIZE).
        #[arg(long)]
        batch_size: Option<usize>,

        /// Fail on BLOB and VECTOR columns instead of copying nulls.
        #[arg(long)]
        reject_unsupported: bool,
    },

    /// Print the change log of the appended sample table as JSON.
    Log {
        #[arg(long, default_value_t = 3)]
        rows: usize,
    },

    /// List every column type with its transfer class.
    Types,
}
