//! Settings read from the environment (or a `.env` file next to the binary).
//!
//! - `SQLDB_APPEND_BATCH_SIZE`: rows per transaction batch during append.
//! - `SQLDB_APPEND_UNSUPPORTED`: `null` or `reject`, what append does with
//! BLOB and VECTOR columns.

use std::env;

use crate::persistence::{AppendOptions, TableError, TableResult, UnsupportedValuePolicy};

pub const BATCH_SIZE_VAR: &str = "SQLDB_APPEND_BATCH_SIZE";
pub const UNSUPPORTED_VAR: &str = "SQLDB_APPEND_UNSUPPORTED";

pub fn append_options_from_env() -> TableResult<AppendOptions> {
    if let Err(error) = dotenvy::dotenv() {
        log::debug!("no .env loaded: {}", error);
    }
    append_options_from_lookup(|name| env::var(name).ok())
}

pub fn append_options_from_lookup<F>(lookup: F) -> TableResult<AppendOptions>
where
    F: Fn(&str) -> Option<String>,
{
    //! Build [`AppendOptions`] from whatever `lookup` returns for each
    //! variable, falling back to the defaults for missing ones.

    let mut options = AppendOptions::default();

    if let Some(raw) = lookup(BATCH_SIZE_VAR) {
        options.batch_size = raw.trim().parse().map_err(|_| {
            TableError::InvalidConfig(format!(
                "{} must be a positive integer, got '{}'",
                BATCH_SIZE_VAR, raw
            ))
        })?;
    }

    if let Some(raw) = lookup(UNSUPPORTED_VAR) {
        options.unsupported = parse_policy(&raw)?;
    }

    options.validate()?;
    Ok(options)
}

fn parse_policy(raw: &str) -> TableResult<UnsupportedValuePolicy> {
    match raw.trim().to_lowercase().as_str() {
        "null" => Ok(UnsupportedValuePolicy::BindNull),
        "reject" => Ok(UnsupportedValuePolicy::Reject),
        other => Err(TableError::InvalidConfig(format!(
            "{} must be 'null' or 'reject', got '{}'",
            UNSUPPORTED_VAR, other
        ))),
    }
}
