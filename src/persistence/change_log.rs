//! The change log every table carries.
//!
//! A [`ChangeLog`] is an append-only list of [`LogRecord`]s describing the
//! mutations made to a table. Tables hold it through a [`SharedLog`], so a
//! copy of a table can keep writing into the same log as its origin.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::key::Key;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Increment,
    Remove,
    Clear,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogRecord {
    pub kind: ChangeKind,
    pub key: Key,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(kind: ChangeKind, key: Key) -> LogRecord {
        LogRecord {
            kind,
            key,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChangeLog {
    records: Vec<LogRecord>,
}

impl ChangeLog {
    pub fn new() -> ChangeLog {
        ChangeLog { records: vec![] }
    }

    pub fn record(&mut self, kind: ChangeKind, key: Key) {
        self.records.push(LogRecord::new(kind, key));
    }

    pub fn extend(&mut self, records: Vec<LogRecord>) {
        self.records.extend(records);
    }

    pub fn append(&mut self, other: &ChangeLog) {
        //! Add all of `other`'s records after this log's own, in order.

        self.records.extend(other.records.iter().cloned());
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}

/// A reference-counted handle to a [`ChangeLog`].
///
/// Cloning the handle shares the log. Use [`SharedLog::detached`] for a log of
/// one's own.
#[derive(Clone, Debug, Default)]
pub struct SharedLog(Arc<RwLock<ChangeLog>>);

impl SharedLog {
    pub fn new() -> SharedLog {
        SharedLog(Arc::new(RwLock::new(ChangeLog::new())))
    }

    pub fn detached(&self) -> SharedLog {
        //! A new handle holding a copy of the current records.

        SharedLog(Arc::new(RwLock::new(self.read().clone())))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ChangeLog> {
        self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ChangeLog> {
        self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ptr_eq(&self, other: &SharedLog) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn append_from(&self, other: &SharedLog) {
        //! Merge `other` into this log. Merging a log into itself changes nothing.

        if self.ptr_eq(other) {
            return;
        }
        let source = other.read().clone();
        self.write().append(&source);
    }
}
