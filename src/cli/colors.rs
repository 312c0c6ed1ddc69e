//! Theme colors of the CLI, kept here so output stays consistent.
//!
//! - SQLDB_TEAL: Main Color

use colored::Color;

pub(crate) const SQLDB_TEAL: Color = Color::TrueColor {
    r: 38,
    g: 166,
    b: 154,
};
