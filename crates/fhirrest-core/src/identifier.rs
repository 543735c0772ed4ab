//! Composite resource identifiers.
//!
//! A resource stored on the FHIR server is addressed as `{type}/{id}`.
//! The split point is always the leftmost `/`: the type never contains a
//! slash, while the id is kept verbatim and may contain further slashes.
//!
//! ```
//! use fhirrest_core::identifier::RemoteIdentifier;
//!
//! let id: RemoteIdentifier = "Patient/08146022-932a-4001-9fe4-928382855ddf".parse().unwrap();
//! assert_eq!(id.resource_type(), "Patient");
//! assert_eq!(id.id(), "08146022-932a-4001-9fe4-928382855ddf");
//! assert_eq!(id.to_string(), "Patient/08146022-932a-4001-9fe4-928382855ddf");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{ReconcileError, Result};

/// A `{type}/{id}` reference to a record on the remote server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteIdentifier {
    resource_type: String,
    id: String,
}

impl RemoteIdentifier {
    /// Creates a new identifier from its two segments.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Parses a composite identifier, splitting on the first `/`.
    pub fn parse(s: &str) -> Result<Self> {
        let (resource_type, id) = parse(s)?;
        Ok(Self::new(resource_type, id))
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// The bare id segment, without the resource type.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for RemoteIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&build(&self.resource_type, &self.id))
    }
}

impl FromStr for RemoteIdentifier {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Splits `s` into `(type, id)` at the leftmost `/`.
pub fn parse(s: &str) -> Result<(&str, &str)> {
    s.split_once('/').ok_or_else(|| ReconcileError::format(s))
}

/// Joins a type and an id into `{type}/{id}`.
pub fn build(resource_type: &str, id: &str) -> String {
    format!("{resource_type}/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid_identifier() {
        let s = "Patient/08146022-932a-4001-9fe4-928382855ddf";
        let (rt, id) = parse(s).unwrap();
        assert_eq!(rt, "Patient");
        assert_eq!(id, "08146022-932a-4001-9fe4-928382855ddf");
        assert_eq!(build(rt, id), s);
    }

    #[test]
    fn test_parse_keeps_trailing_slashes_in_id() {
        let s = "Patient/123/_history/2";
        let (rt, id) = parse(s).unwrap();
        assert_eq!(rt, "Patient");
        assert_eq!(id, "123/_history/2");
        assert_eq!(build(rt, id), s);
    }

    #[test]
    fn test_parse_without_slash_fails() {
        let err = parse("Patient").unwrap_err();
        assert!(matches!(err, ReconcileError::Format(ref s) if s == "Patient"));
    }

    #[test]
    fn test_parse_empty_id_segment() {
        let (rt, id) = parse("Patient/").unwrap();
        assert_eq!(rt, "Patient");
        assert_eq!(id, "");
    }

    #[test]
    fn test_build_then_parse_round_trip() {
        let cases = [
            ("Patient", "123"),
            ("Observation", "a-b-c"),
            ("Medication", "08146022-932a-4001-9fe4-928382855ddf"),
            ("Binary", "x/y"),
        ];
        for (rt, id) in cases {
            let built = build(rt, id);
            assert_eq!(parse(&built).unwrap(), (rt, id));
        }
    }

    #[test]
    fn test_remote_identifier_from_str_and_display() {
        let id: RemoteIdentifier = "Medication/42".parse().unwrap();
        assert_eq!(id, RemoteIdentifier::new("Medication", "42"));
        assert_eq!(id.to_string(), "Medication/42");
        assert!("Medication".parse::<RemoteIdentifier>().is_err());
    }
}
