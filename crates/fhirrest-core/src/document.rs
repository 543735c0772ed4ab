//! Schema-less JSON documents.
//!
//! A [`RecordDocument`] is the local declaration of a FHIR resource: any
//! JSON object carrying a non-empty `resourceType`. Apart from that key the
//! content is opaque and sent to the server as declared.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ReconcileError, Result};

pub const RESOURCE_TYPE: &str = "resourceType";
pub const ID: &str = "id";

/// A JSON object with checked string accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDocument {
    fields: Map<String, Value>,
    /// Bytes the document was parsed from; dropped once a field is set.
    raw: Option<Vec<u8>>,
    origin: String,
}

impl RecordDocument {
    /// Reads and validates the document stored at `path`.
    ///
    /// The file is read fresh on every call.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ReconcileError::File {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = Self::from_slice(bytes, path.display().to_string())?;
        doc.require_resource_type()?;
        Ok(doc)
    }

    /// Parses `bytes` as a JSON object. `origin` names the source in errors.
    pub fn from_slice(bytes: Vec<u8>, origin: impl Into<String>) -> Result<Self> {
        let origin = origin.into();
        let fields = parse_object(&bytes).map_err(|reason| ReconcileError::Parse {
            origin: origin.clone(),
            reason,
        })?;
        Ok(Self {
            fields,
            raw: Some(bytes),
            origin,
        })
    }

    /// Builds a document from an already parsed JSON object.
    pub fn from_map(fields: Map<String, Value>, origin: impl Into<String>) -> Self {
        Self {
            fields,
            raw: None,
            origin: origin.into(),
        }
    }

    /// Returns the string stored under `key`.
    ///
    /// Fails with `MissingField` when the key is absent or not a string.
    pub fn get_string(&self, key: &str) -> Result<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| ReconcileError::missing_field(key))
    }

    /// Sets `key` to a string value, replacing any previous value.
    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.fields
            .insert(key.to_string(), Value::String(value.into()));
        self.raw = None;
    }

    /// The declared resource type.
    pub fn resource_type(&self) -> Result<&str> {
        self.require_resource_type()
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The request body for this document.
    ///
    /// An unmodified document is sent byte-for-byte as it was read; once a
    /// field has been set the object is re-serialized.
    pub fn to_body(&self) -> Result<Vec<u8>> {
        match &self.raw {
            Some(raw) => Ok(raw.clone()),
            None => serde_json::to_vec(&self.fields).map_err(|e| ReconcileError::Parse {
                origin: self.origin.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn require_resource_type(&self) -> Result<&str> {
        self.fields
            .get(RESOURCE_TYPE)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ReconcileError::schema(&self.origin, RESOURCE_TYPE))
    }
}

/// Parses `bytes` as a top-level JSON object.
pub(crate) fn parse_object(bytes: &[u8]) -> std::result::Result<Map<String, Value>, String> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("top-level JSON value is not an object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}
