use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The semantic kinds a column can hold.
///
/// This is a closed set. Every generic algorithm that moves values between
/// cursors matches on it exhaustively (through [`ColumnType::transfer_class`]),
/// so adding a variant forces a decision everywhere values are copied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Bool,
    Enum,
    Integer,
    DateTime,
    Date,
    Double,
    Any,
    Text,
    Url,
    TextKey,
    BinaryKey,
    Char,
    VarChar,
    Blob,
    Vector,
}

/// How a value of a given [`ColumnType`] travels from one cursor to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferClass {
    /// Read with `get_integer`, bound as [`super::Value::Integer`].
    Integral,
    /// Read with `get_double`, bound as [`super::Value::Double`].
    Floating,
    /// Read with `get_text`, bound as [`super::Value::Text`].
    Textual,
    /// No generic accessor exists for the value.
    Unsupported,
}

pub const ALL_COLUMN_TYPES: [ColumnType; 15] = [
    ColumnType::Bool,
    ColumnType::Enum,
    ColumnType::Integer,
    ColumnType::DateTime,
    ColumnType::Date,
    ColumnType::Double,
    ColumnType::Any,
    ColumnType::Text,
    ColumnType::Url,
    ColumnType::TextKey,
    ColumnType::BinaryKey,
    ColumnType::Char,
    ColumnType::VarChar,
    ColumnType::Blob,
    ColumnType::Vector,
];

impl ColumnType {
    pub fn transfer_class(self) -> TransferClass {
        match self {
            ColumnType::Bool
            | ColumnType::Enum
            | ColumnType::Integer
            | ColumnType::DateTime
            | ColumnType::Date => TransferClass::Integral,
            ColumnType::Double => TransferClass::Floating,
            ColumnType::Any
            | ColumnType::Text
            | ColumnType::Url
            | ColumnType::TextKey
            | ColumnType::BinaryKey
            | ColumnType::Char
            | ColumnType::VarChar => TransferClass::Textual,
            ColumnType::Blob | ColumnType::Vector => TransferClass::Unsupported,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Bool => "BOOL",
            ColumnType::Enum => "ENUM",
            ColumnType::Integer => "INTEGER",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Date => "DATE",
            ColumnType::Double => "DOUBLE",
            ColumnType::Any => "ANY",
            ColumnType::Text => "TEXT",
            ColumnType::Url => "URL",
            ColumnType::TextKey => "TEXT_KEY",
            ColumnType::BinaryKey => "BINARY_KEY",
            ColumnType::Char => "CHAR",
            ColumnType::VarChar => "VARCHAR",
            ColumnType::Blob => "BLOB",
            ColumnType::Vector => "VECTOR",
        }
    }
}

/// Whether values of `column_type` are numbers (integral-like or floating).
pub fn is_numeric(column_type: ColumnType) -> bool {
    matches!(
        column_type.transfer_class(),
        TransferClass::Integral | TransferClass::Floating
    )
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        ALL_COLUMN_TYPES
            .iter()
            .copied()
            .find(|column_type| column_type.name() == wanted)
            .ok_or_else(|| format!("invalid datatype {}: not supported", s))
    }
}
