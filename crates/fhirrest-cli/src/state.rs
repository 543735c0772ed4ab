use std::path::Path;

use fhirrest_core::ReconcileOutcome;
use serde::Serialize;

/// Declared and computed attributes of a managed resource, as the host
/// would persist them after an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_base_url: Option<String>,
    pub resource_id: String,
    pub response_sha256: Option<String>,
}

impl ResourceState {
    pub fn declared(
        file_path: Option<&Path>,
        file_sha256: Option<&str>,
        fhir_base_url: Option<&str>,
    ) -> Self {
        Self {
            file_path: file_path.map(|p| p.display().to_string()),
            file_sha256: file_sha256.map(str::to_string),
            fhir_base_url: fhir_base_url.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_outcome(mut self, outcome: ReconcileOutcome) -> Self {
        self.resource_id = outcome.identifier.to_string();
        self.response_sha256 = Some(outcome.fingerprint.into_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhirrest_core::{Fingerprint, RemoteIdentifier};

    #[test]
    fn test_state_from_outcome() {
        let outcome = ReconcileOutcome {
            identifier: RemoteIdentifier::new("Patient", "1"),
            fingerprint: Fingerprint::of(b"{}"),
        };
        let state = ResourceState::declared(Some(Path::new("patient.json")), Some("abc"), None)
            .with_outcome(outcome);

        assert_eq!(state.resource_id, "Patient/1");
        assert_eq!(state.file_path.as_deref(), Some("patient.json"));
        assert_eq!(
            state.response_sha256.as_deref(),
            Some(Fingerprint::of(b"{}").as_str())
        );

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["file_sha256"], "abc");
        assert!(json.get("fhir_base_url").is_none());
    }
}
