use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::key::KeyValue;

/// A typed field value, as staged on a write cursor or held by a backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Integer(i64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn as_integer(&self) -> i64 {
        //! Lossy integer view. Text that does not parse reads as 0.

        match self {
            Value::Integer(value) => *value,
            Value::Double(value) => *value as i64,
            Value::Text(text) => text.trim().parse().unwrap_or(0),
            Value::Blob(_) => 0,
        }
    }

    pub fn as_double(&self) -> f64 {
        match self {
            Value::Integer(value) => *value as f64,
            Value::Double(value) => *value,
            Value::Text(text) => text.trim().parse().unwrap_or(0.0),
            Value::Blob(_) => 0.0,
        }
    }

    pub fn to_key_value(&self) -> KeyValue {
        match self {
            Value::Integer(value) => KeyValue::Integer(*value),
            Value::Double(value) => KeyValue::Double(*value),
            Value::Text(text) => KeyValue::Text(text.clone()),
            Value::Blob(bytes) => KeyValue::Binary(bytes.clone()),
        }
    }
}

impl From<KeyValue> for Value {
    fn from(value: KeyValue) -> Self {
        match value {
            KeyValue::Integer(value) => Value::Integer(value),
            KeyValue::Double(value) => Value::Double(value),
            KeyValue::Text(text) => Value::Text(text),
            KeyValue::Binary(bytes) => Value::Blob(bytes),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            Value::Double(value) => write!(f, "{}", value),
            Value::Text(text) => write!(f, "{}", text),
            Value::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row(pub Vec<Option<Value>>);

impl Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let row: Vec<String> = self
            .0
            .iter()
            .map(|value| match value {
                Some(value) => value.to_string(),
                None => "NIL".to_string(),
            })
            .collect();
        write!(f, "{}", row.join(" | "))
    }
}
