use std::fmt::Display;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::column_type::{ColumnType, TransferClass};

/// A single position of a [`Key`].
///
/// `Double` compares and hashes by its bit pattern, so `NaN` keys are equal to
/// themselves and `0.0` differs from `-0.0`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum KeyValue {
    Integer(i64),
    Double(f64),
    Text(String),
    Binary(Vec<u8>),
}

impl KeyValue {
    pub fn admits(&self, column_type: ColumnType) -> bool {
        //! Whether this value may sit at a key position declared as `column_type`.

        match (column_type.transfer_class(), self) {
            (TransferClass::Integral, KeyValue::Integer(_)) => true,
            (TransferClass::Floating, KeyValue::Double(_)) => true,
            (TransferClass::Textual, KeyValue::Text(_)) => true,
            (TransferClass::Textual, KeyValue::Binary(_)) => column_type == ColumnType::BinaryKey,
            (TransferClass::Unsupported, KeyValue::Binary(_)) => true,
            _ => false,
        }
    }
}

impl PartialEq for KeyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KeyValue::Integer(a), KeyValue::Integer(b)) => a == b,
            (KeyValue::Double(a), KeyValue::Double(b)) => a.to_bits() == b.to_bits(),
            (KeyValue::Text(a), KeyValue::Text(b)) => a == b,
            (KeyValue::Binary(a), KeyValue::Binary(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for KeyValue {}

impl Hash for KeyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            KeyValue::Integer(value) => value.hash(state),
            KeyValue::Double(value) => value.to_bits().hash(state),
            KeyValue::Text(value) => value.hash(state),
            KeyValue::Binary(value) => value.hash(state),
        }
    }
}

impl Display for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyValue::Integer(value) => write!(f, "{}", value),
            KeyValue::Double(value) => write!(f, "{}", value),
            KeyValue::Text(value) => write!(f, "{}", value),
            KeyValue::Binary(bytes) => {
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

/// The ordered, typed tuple that identifies a row.
///
/// A key carries no schema of its own. Arity and per-position types are the
/// owning table's business, checked with [`Key::conforms_to`] when a key is
/// handed to a table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key(Vec<KeyValue>);

impl Key {
    pub fn new(values: Vec<KeyValue>) -> Key {
        Key(values)
    }

    pub fn empty() -> Key {
        Key(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn conforms_to(&self, key_type: &[ColumnType]) -> bool {
        //! Check the arity and the per-position types against a table's declared
        //! key type.

        self.len() == key_type.len()
            && self
                .0
                .iter()
                .zip(key_type)
                .all(|(value, column_type)| value.admits(*column_type))
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key(vec![KeyValue::Integer(value)])
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key(vec![KeyValue::Text(value.to_string())])
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key(vec![KeyValue::Text(value)])
    }
}

impl From<Vec<KeyValue>> for Key {
    fn from(values: Vec<KeyValue>) -> Self {
        Key(values)
    }
}

impl From<KeyValue> for Key {
    fn from(value: KeyValue) -> Self {
        Key(vec![value])
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|value| value.to_string()).collect();
        write!(f, "{}", parts.join(";"))
    }
}
