use std::path::PathBuf;

use thiserror::Error;

/// Error types for reconciliation operations
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to read file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON document {origin}: {reason}")]
    Parse { origin: String, reason: String },

    #[error("property {key} not found in JSON document {origin}")]
    Schema { origin: String, key: String },

    #[error("invalid resource id \"{0}\", expected format: ResourceType/id")]
    Format(String),

    #[error("request to {url} could not be sent: {reason}")]
    Transport { url: String, reason: String },

    #[error("the server returned an invalid status for {method} {url}: {status}")]
    Remote {
        method: String,
        url: String,
        status: String,
        body: String,
    },

    #[error("failed to parse response JSON from {url}: {reason}")]
    ResponseParse { url: String, reason: String },

    #[error("property {0} not found in JSON object")]
    MissingField(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ReconcileError {
    /// Create a new Schema error for a missing document key
    pub fn schema(origin: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Schema {
            origin: origin.into(),
            key: key.into(),
        }
    }

    /// Create a new Format error for a malformed identifier
    pub fn format(identifier: impl Into<String>) -> Self {
        Self::Format(identifier.into())
    }

    /// Create a new MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::File { .. } => ErrorCategory::File,
            Self::Parse { .. } | Self::Schema { .. } | Self::Format(_) => {
                ErrorCategory::Validation
            }
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Remote { .. } => ErrorCategory::Remote,
            Self::ResponseParse { .. } | Self::MissingField(_) => ErrorCategory::Response,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }

    /// Render the error as a host-facing diagnostic.
    ///
    /// The summary is the one-line message; the detail carries the
    /// underlying cause or, for remote failures, the status and the
    /// response body verbatim.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let detail = match self {
            Self::File { source, .. } => source.to_string(),
            Self::Parse { reason, .. }
            | Self::Transport { reason, .. }
            | Self::ResponseParse { reason, .. } => reason.clone(),
            Self::Remote { status, body, .. } => format!("Error code {status}. Response: {body}"),
            Self::Schema { .. }
            | Self::Format(_)
            | Self::MissingField(_)
            | Self::Configuration(_) => String::new(),
        };
        Diagnostic {
            summary: self.to_string(),
            detail,
        }
    }
}

/// Summary plus detail, the shape in which failures are reported to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.summary)
        } else {
            write!(f, "{}\n{}", self.summary, self.detail)
        }
    }
}

/// Error categories for logging and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    File,
    Validation,
    Transport,
    Remote,
    Response,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Validation => write!(f, "validation"),
            Self::Transport => write!(f, "transport"),
            Self::Remote => write!(f, "remote"),
            Self::Response => write!(f, "response"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for reconciliation operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_diagnostic_keeps_body_verbatim() {
        let err = ReconcileError::Remote {
            method: "GET".into(),
            url: "http://localhost/fhir/Patient/1".into(),
            status: "404 Not Found".into(),
            body: r#"{"error":"not found"}"#.into(),
        };
        let diag = err.to_diagnostic();
        assert!(diag.summary.contains("404"));
        assert!(diag.detail.contains("404"));
        assert!(diag.detail.contains(r#"{"error":"not found"}"#));
        assert_eq!(err.category(), ErrorCategory::Remote);
    }

    #[test]
    fn test_file_error_detail_is_io_cause() {
        let err = ReconcileError::File {
            path: PathBuf::from("/missing/patient.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let diag = err.to_diagnostic();
        assert_eq!(
            diag.summary,
            "failed to read file /missing/patient.json: no such file"
        );
        assert_eq!(diag.detail, "no such file");
        assert_eq!(err.category(), ErrorCategory::File);
    }

    #[test]
    fn test_format_error_message() {
        let err = ReconcileError::format("Patient");
        assert_eq!(
            err.to_string(),
            "invalid resource id \"Patient\", expected format: ResourceType/id"
        );
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_diagnostic_display_without_detail() {
        let diag = ReconcileError::missing_field("id").to_diagnostic();
        assert_eq!(diag.to_string(), "property id not found in JSON object");
    }

    #[test]
    fn test_error_categories_display() {
        assert_eq!(ErrorCategory::File.to_string(), "file");
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::Transport.to_string(), "transport");
        assert_eq!(ErrorCategory::Remote.to_string(), "remote");
        assert_eq!(ErrorCategory::Response.to_string(), "response");
        assert_eq!(ErrorCategory::Configuration.to_string(), "configuration");
    }
}
