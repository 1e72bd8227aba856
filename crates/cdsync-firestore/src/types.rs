//! Firestore REST API types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Firestore document value types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Document fields
    pub fields: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    /// Create a named document with the given fields.
    pub fn named(name: impl Into<String>, fields: HashMap<String, Value>) -> Self {
        Self {
            name: Some(name.into()),
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    /// Look up a field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.as_ref()?.get(name)
    }
}

// ============================================================================
// Field values and write options
// ============================================================================

/// Value passed to a document write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A concrete value stored as-is.
    Value(Value),
    /// Replaced by the server's commit time.
    ServerTimestamp,
}

/// Sentinel that asks Firestore to stamp the field with its own clock.
pub const SERVER_TIMESTAMP: FieldValue = FieldValue::ServerTimestamp;

impl FieldValue {
    pub fn of(value: impl ToFirestoreValue) -> Self {
        FieldValue::Value(value.to_firestore_value())
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::of(value)
    }
}

/// Options for `set_document`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Only touch the fields being written, leaving the rest of the document alone.
    pub merge: bool,
}

impl SetOptions {
    pub fn merge() -> Self {
        Self { merge: true }
    }

    pub fn overwrite() -> Self {
        Self { merge: false }
    }
}

// ============================================================================
// Commit types
// ============================================================================

/// A single write operation in a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Write {
    /// Update or insert a document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<Document>,

    /// Fields to update; absent means replace the whole document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_mask: Option<DocumentMask>,

    /// Server-side transforms applied after the update.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update_transforms: Vec<FieldTransform>,
}

/// Document field mask for partial updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    pub field_paths: Vec<String>,
}

/// Server-side field transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTransform {
    pub field_path: String,
    pub set_to_server_value: ServerValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerValue {
    RequestTime,
}

impl FieldTransform {
    pub fn request_time(field_path: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            set_to_server_value: ServerValue::RequestTime,
        }
    }
}

/// Commit request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub writes: Vec<Write>,
}

/// Result of a single write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    /// Update time of the written document.
    pub update_time: Option<String>,
}

/// Commit response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub write_results: Option<Vec<WriteResult>>,
    pub commit_time: Option<String>,
}

/// Build the commit write for `set_document`.
///
/// Sentinel fields become transforms. With `merge`, the update mask lists
/// exactly the plain fields so nothing else in the document changes.
pub fn build_set_write(
    document_name: impl Into<String>,
    fields: HashMap<String, FieldValue>,
    options: SetOptions,
) -> Write {
    let mut values = HashMap::new();
    let mut transforms = Vec::new();

    for (path, field) in fields {
        match field {
            FieldValue::Value(value) => {
                values.insert(path, value);
            }
            FieldValue::ServerTimestamp => transforms.push(FieldTransform::request_time(quote_field_path(&path))),
        }
    }
    transforms.sort_by(|a, b| a.field_path.cmp(&b.field_path));

    let update_mask = options.merge.then(|| {
        let mut field_paths: Vec<String> = values.keys().map(|k| quote_field_path(k)).collect();
        field_paths.sort();
        DocumentMask { field_paths }
    });

    Write {
        update: Some(Document::named(document_name, values)),
        update_mask,
        update_transforms: transforms,
    }
}

/// Quote a field name for use in a field path.
///
/// Simple names pass through; anything else is wrapped in backticks.
pub fn quote_field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert a Rust value to Firestore Value.
pub trait ToFirestoreValue {
    fn to_firestore_value(&self) -> Value;
}

impl ToFirestoreValue for String {
    fn to_firestore_value(&self) -> Value {
        Value::StringValue(self.clone())
    }
}

impl ToFirestoreValue for &str {
    fn to_firestore_value(&self) -> Value {
        Value::StringValue(self.to_string())
    }
}

impl ToFirestoreValue for i64 {
    fn to_firestore_value(&self) -> Value {
        Value::IntegerValue(self.to_string())
    }
}

impl ToFirestoreValue for u32 {
    fn to_firestore_value(&self) -> Value {
        Value::IntegerValue(self.to_string())
    }
}

impl ToFirestoreValue for f64 {
    fn to_firestore_value(&self) -> Value {
        Value::DoubleValue(*self)
    }
}

impl ToFirestoreValue for bool {
    fn to_firestore_value(&self) -> Value {
        Value::BooleanValue(*self)
    }
}

impl ToFirestoreValue for DateTime<Utc> {
    fn to_firestore_value(&self) -> Value {
        Value::TimestampValue(self.to_rfc3339())
    }
}

impl<T: ToFirestoreValue> ToFirestoreValue for Option<T> {
    fn to_firestore_value(&self) -> Value {
        match self {
            Some(v) => v.to_firestore_value(),
            None => Value::NullValue(()),
        }
    }
}

impl<T: ToFirestoreValue> ToFirestoreValue for Vec<T> {
    fn to_firestore_value(&self) -> Value {
        Value::ArrayValue(ArrayValue {
            values: Some(self.iter().map(|v| v.to_firestore_value()).collect()),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn health_fields() -> HashMap<String, FieldValue> {
        let mut fields = HashMap::new();
        fields.insert("timestamp".to_string(), SERVER_TIMESTAMP);
        fields.insert("status".to_string(), FieldValue::from("connected"));
        fields
    }

    #[test]
    fn test_merge_write_masks_only_plain_fields() {
        let write = build_set_write("projects/p/databases/(default)/documents/h/c", health_fields(), SetOptions::merge());

        assert_eq!(
            write.update_mask,
            Some(DocumentMask {
                field_paths: vec!["status".to_string()]
            })
        );
        assert_eq!(write.update_transforms, vec![FieldTransform::request_time("timestamp")]);

        let doc = write.update.as_ref().unwrap();
        assert_eq!(doc.field("status"), Some(&Value::StringValue("connected".into())));
        assert!(doc.field("timestamp").is_none());
    }

    #[test]
    fn test_overwrite_has_no_mask() {
        let write = build_set_write("doc", health_fields(), SetOptions::overwrite());
        assert!(write.update_mask.is_none());
        assert_eq!(write.update_transforms.len(), 1);
    }

    #[test]
    fn test_write_wire_format() {
        let write = build_set_write("projects/p/databases/(default)/documents/h/c", health_fields(), SetOptions::merge());
        let body = serde_json::to_value(CommitRequest { writes: vec![write] }).unwrap();

        assert_eq!(
            body,
            json!({
                "writes": [{
                    "update": {
                        "name": "projects/p/databases/(default)/documents/h/c",
                        "fields": { "status": { "stringValue": "connected" } }
                    },
                    "updateMask": { "fieldPaths": ["status"] },
                    "updateTransforms": [
                        { "fieldPath": "timestamp", "setToServerValue": "REQUEST_TIME" }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_quote_field_path() {
        assert_eq!(quote_field_path("status"), "status");
        assert_eq!(quote_field_path("_private1"), "_private1");
        assert_eq!(quote_field_path("last-sync"), "`last-sync`");
        assert_eq!(quote_field_path("1st"), "`1st`");
        assert_eq!(quote_field_path("a`b"), "`a\\`b`");
    }

    #[test]
    fn test_to_firestore_value() {
        assert_eq!(42i64.to_firestore_value(), Value::IntegerValue("42".into()));
        assert_eq!(None::<bool>.to_firestore_value(), Value::NullValue(()));
        assert_eq!(
            vec![true].to_firestore_value(),
            Value::ArrayValue(ArrayValue {
                values: Some(vec![Value::BooleanValue(true)])
            })
        );
        assert_eq!(FieldValue::of(7u32), FieldValue::Value(Value::IntegerValue("7".into())));
    }
}
