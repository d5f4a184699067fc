//! # Document Store
//!
//! Holds the ordered key/value mapping loaded from a parameter file and writes it
//! back after every edit. The mapping is a `serde_json::Map` built with the
//! `preserve_order` feature, so keys come back out in the order they were read.
//!
//! Only top-level booleans and numbers are ever mutated. Strings, nulls, arrays
//! and nested objects are kept exactly as loaded and written back untouched.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::config::SAVE_INDENT;
use crate::error::DocumentError;

/// The kind of an editable field. Decides which control renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Boolean,
    Integer,
    Float,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
        }
    }

    /// Integers and floats may replace each other; booleans only replace booleans.
    fn accepts(self, incoming: FieldKind) -> bool {
        match self {
            FieldKind::Boolean => incoming == FieldKind::Boolean,
            FieldKind::Integer | FieldKind::Float => incoming != FieldKind::Boolean,
        }
    }
}

/// A scalar value that can be written into an eligible field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Boolean(_) => FieldKind::Boolean,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Float(_) => FieldKind::Float,
        }
    }

    /// Classifies a JSON value. Returns `None` for anything that is not
    /// eligible for editing (strings, null, arrays, objects).
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(FieldValue::Boolean(*b)),
            Value::Number(n) if n.is_f64() => n.as_f64().map(FieldValue::Float),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Integer)
                .or_else(|| n.as_f64().map(FieldValue::Float)),
            _ => None,
        }
    }

    fn to_json(self) -> Option<Value> {
        match self {
            FieldValue::Boolean(b) => Some(Value::Bool(b)),
            FieldValue::Integer(i) => Some(Value::Number(i.into())),
            FieldValue::Float(f) => Number::from_f64(f).map(Value::Number),
        }
    }
}

/// Read-only view over one eligible document entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field<'a> {
    pub key: &'a str,
    pub value: FieldValue,
}

impl Field<'_> {
    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }
}

/// The in-memory parameter document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    entries: Map<String, Value>,
}

impl Document {
    /// Reads and parses the JSON object at `path`.
    ///
    /// Fails when the file cannot be read, is not valid JSON, or its top level
    /// is not an object. Nothing is substituted for a missing file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&data).map_err(|source| DocumentError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Object(entries) => {
                debug!(path = %path.display(), keys = entries.len(), "document loaded");
                Ok(Self { entries })
            }
            _ => Err(DocumentError::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Writes the whole document to `path` with 4-space indentation,
    /// replacing whatever was there.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let write_err = |source: std::io::Error| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(SAVE_INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.entries
            .serialize(&mut ser)
            .map_err(|e| write_err(e.into()))?;
        fs::write(path, buf).map_err(write_err)?;
        debug!(path = %path.display(), "document saved");
        Ok(())
    }

    /// Replaces the value stored at an existing key.
    ///
    /// The key set never changes: an unknown key leaves the document as it was
    /// and reports `UnknownField`. A boolean can only replace a boolean and a
    /// number can only replace a number.
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), DocumentError> {
        let slot = self
            .entries
            .get_mut(key)
            .ok_or_else(|| DocumentError::UnknownField(key.to_string()))?;

        let current = FieldValue::from_json(slot).ok_or(DocumentError::KindMismatch {
            key: key.to_string(),
            expected: "non-editable",
            found: value.kind().name(),
        })?;
        if !current.kind().accepts(value.kind()) {
            return Err(DocumentError::KindMismatch {
                key: key.to_string(),
                expected: current.kind().name(),
                found: value.kind().name(),
            });
        }

        let json = value.to_json().ok_or(DocumentError::KindMismatch {
            key: key.to_string(),
            expected: current.kind().name(),
            found: "non-finite number",
        })?;
        *slot = json;
        Ok(())
    }

    /// Eligible fields in document order.
    pub fn fields(&self) -> impl Iterator<Item = Field<'_>> {
        self.entries.iter().filter_map(|(key, value)| {
            FieldValue::from_json(value).map(|value| Field {
                key: key.as_str(),
                value,
            })
        })
    }

    pub fn field(&self, key: &str) -> Option<FieldValue> {
        self.entries.get(key).and_then(FieldValue::from_json)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compact serialization of the whole document, as sent to the peer.
    pub fn to_message(&self) -> String {
        Value::Object(self.entries.clone()).to_string()
    }
}

impl From<Map<String, Value>> for Document {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}
