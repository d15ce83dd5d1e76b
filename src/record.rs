//! Typed access to the handful of fields read from API payloads.
//!
//! Records stay generic [`serde_json::Value`] trees because their schema is
//! controlled by the remote installation. Only `id`, `items.count` and
//! `file_urls` are ever read, and only through the accessors here, which
//! fail loudly when a field is absent or has the wrong type.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Errors raised when a record lacks a field the traversal depends on.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The field is not present.
    #[error("{kind} record is missing `{field}`")]
    MissingField {
        /// Record kind (collection, item, file, or a resource name).
        kind: String,
        /// Dotted field path.
        field: &'static str,
    },

    /// The field is present but has an unusable type or value.
    #[error("{kind} record has an invalid `{field}`: {value}")]
    InvalidField {
        /// Record kind (collection, item, file, or a resource name).
        kind: String,
        /// Dotted field path.
        field: &'static str,
        /// The offending JSON, rendered compactly.
        value: String,
    },
}

impl RecordError {
    fn missing(kind: &str, field: &'static str) -> Self {
        Self::MissingField {
            kind: kind.to_string(),
            field,
        }
    }

    fn invalid(kind: &str, field: &'static str, value: &Value) -> Self {
        Self::InvalidField {
            kind: kind.to_string(),
            field,
            value: value.to_string(),
        }
    }
}

/// Identifier of an API record, rendered as it appears in archive paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    /// The identifier as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named rendition of a file and its URL, if the server supplied one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendition<'a> {
    /// Rendition name, e.g. `original` or `thumbnail`.
    pub name: &'a str,
    /// Download URL; `None` when the server reported `null`.
    pub url: Option<&'a str>,
}

/// Reads the `id` of a record.
///
/// Numeric ids and non-empty string ids are accepted.
///
/// # Errors
///
/// Returns [`RecordError`] if `id` is missing, empty, or not a number/string.
pub fn record_id(record: &Value, kind: &str) -> Result<RecordId, RecordError> {
    match record.get("id") {
        None | Some(Value::Null) => Err(RecordError::missing(kind, "id")),
        Some(Value::Number(n)) => Ok(RecordId(n.to_string())),
        Some(Value::String(s)) if !s.is_empty() => Ok(RecordId(s.clone())),
        Some(other) => Err(RecordError::invalid(kind, "id", other)),
    }
}

/// Reads `items.count` from a collection record.
///
/// # Errors
///
/// Returns [`RecordError`] if the field is missing or not a non-negative integer.
pub fn collection_item_count(collection: &Value) -> Result<u64, RecordError> {
    let count = collection
        .get("items")
        .and_then(|items| items.get("count"))
        .ok_or_else(|| RecordError::missing("collection", "items.count"))?;
    count
        .as_u64()
        .ok_or_else(|| RecordError::invalid("collection", "items.count", count))
}

/// Reads the `file_urls` mapping of a file record, in server order.
///
/// # Errors
///
/// Returns [`RecordError`] if `file_urls` is missing, is not an object, or
/// holds a value that is neither a string nor `null`.
pub fn file_renditions(file: &Value) -> Result<Vec<Rendition<'_>>, RecordError> {
    let urls = file
        .get("file_urls")
        .ok_or_else(|| RecordError::missing("file", "file_urls"))?;
    let map = urls
        .as_object()
        .ok_or_else(|| RecordError::invalid("file", "file_urls", urls))?;

    map.iter()
        .map(|(name, value)| match value {
            Value::Null => Ok(Rendition { name, url: None }),
            Value::String(url) if url.is_empty() => Ok(Rendition { name, url: None }),
            Value::String(url) => Ok(Rendition {
                name,
                url: Some(url),
            }),
            other => Err(RecordError::invalid("file", "file_urls", other)),
        })
        .collect()
}
