pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod identifier;
pub mod transport;

pub use config::{ProviderConfig, load_config};
pub use document::RecordDocument;
pub use engine::{FetchedResource, ReconcileOutcome, ReconciliationEngine};
pub use error::{Diagnostic, ErrorCategory, ReconcileError, Result};
pub use fingerprint::Fingerprint;
pub use identifier::RemoteIdentifier;
pub use transport::{RemoteResponse, RemoteTransport, TransportConfig, resolve_base_url};
