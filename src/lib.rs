//! A storage-agnostic table contract.
//!
//! [`persistence::Table`] is the interface every backend implements;
//! [`persistence::MemoryTable`] is the in-memory one shipped here.

pub mod cli;
pub mod config;
pub mod persistence;
