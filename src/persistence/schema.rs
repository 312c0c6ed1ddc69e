use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::column_type::ColumnType;

/// Everything a table knows about one of its columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnInformation {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    /// Display precision, only meaningful for [`ColumnType::Double`].
    /// `None` leaves the choice to the backend.
    pub decimals: Option<u32>,
}

impl ColumnInformation {
    pub fn new(
        name: &str,
        column_type: ColumnType,
        nullable: bool,
        unique: bool,
        decimals: Option<u32>,
    ) -> ColumnInformation {
        ColumnInformation {
            name: name.to_string(),
            column_type,
            nullable,
            unique,
            decimals,
        }
    }

    pub fn decimals_or_default(&self) -> i32 {
        //! The precision in the `-1 == unspecified` convention.

        self.decimals.map_or(-1, |decimals| decimals as i32)
    }
}

/// The ordered column list of one sheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema(Vec<ColumnInformation>);

impl Schema {
    pub fn push(&mut self, column: ColumnInformation) {
        self.0.push(column);
    }

    pub fn get(&self, index: usize) -> Option<&ColumnInformation> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnInformation> {
        self.0.iter()
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schema: Vec<String> = self
            .0
            .iter()
            .map(|info| format!("{} ({})", info.name, info.column_type))
            .collect();
        write!(f, "{}", schema.join(" | "))
    }
}
