//! Create, read, update and delete of FHIR resources declared in local files.
//!
//! Each operation issues exactly one request and returns either its result
//! or the first error encountered. Deciding which operation to run, and
//! persisting what it returns, belongs to the caller.

use std::collections::BTreeMap;
use std::path::Path;

use reqwest::Method;
use tracing::{debug, warn};

use crate::document::{ID, RESOURCE_TYPE, RecordDocument};
use crate::error::{ReconcileError, Result};
use crate::fingerprint::Fingerprint;
use crate::identifier::RemoteIdentifier;
use crate::transport::{
    RemoteResponse, RemoteTransport, TransportConfig, join_url, resolve_base_url,
};

/// What a successful create, read or update hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub identifier: RemoteIdentifier,
    pub fingerprint: Fingerprint,
}

/// A resource fetched without interpreting its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub identifier: RemoteIdentifier,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    transport: RemoteTransport,
}

impl ReconciliationEngine {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            transport: RemoteTransport::new(config),
        }
    }

    pub fn transport(&self) -> &RemoteTransport {
        &self.transport
    }

    /// Loads the document at `path` and POSTs it to `{base}/{resourceType}`.
    pub async fn create(
        &self,
        path: impl AsRef<Path>,
        base_url: Option<&str>,
    ) -> Result<ReconcileOutcome> {
        let doc = RecordDocument::load(path)?;
        self.create_document(&doc, base_url).await
    }

    /// POSTs an already loaded document, sent as declared.
    pub async fn create_document(
        &self,
        doc: &RecordDocument,
        base_url: Option<&str>,
    ) -> Result<ReconcileOutcome> {
        let resource_type = doc.resource_type()?;
        let url = join_url(self.base_url(base_url), resource_type);

        let response = self
            .send(Method::POST, &url, Some(doc.to_body()?))
            .await?;
        let parsed = response.parsed_body(&url)?;
        let id = parsed.get_string(ID)?;
        debug!(resource_type, url = %url, body = %response.body_text(), "persisted resource");

        Ok(ReconcileOutcome {
            identifier: RemoteIdentifier::new(resource_type, id),
            fingerprint: Fingerprint::of(response.body()),
        })
    }

    /// Loads the document at `path` and PUTs it to `{base}/{existing}`.
    pub async fn update(
        &self,
        path: impl AsRef<Path>,
        existing: &str,
        base_url: Option<&str>,
    ) -> Result<ReconcileOutcome> {
        let doc = RecordDocument::load(path)?;
        self.update_document(doc, existing, base_url).await
    }

    /// PUTs `doc` with its `id` set to the bare id of `existing`.
    ///
    /// The returned identifier is rebuilt from the response; when the server
    /// omits `resourceType` the declared type is used.
    pub async fn update_document(
        &self,
        mut doc: RecordDocument,
        existing: &str,
        base_url: Option<&str>,
    ) -> Result<ReconcileOutcome> {
        let declared_type = doc.resource_type()?.to_string();
        let identifier = RemoteIdentifier::parse(existing)?;
        doc.set_string(ID, identifier.id());
        let url = join_url(self.base_url(base_url), existing);

        let response = self.send(Method::PUT, &url, Some(doc.to_body()?)).await?;
        let parsed = response.parsed_body(&url)?;
        let id = parsed.get_string(ID)?;
        let resource_type = match parsed.get_string(RESOURCE_TYPE) {
            Ok(rt) => rt,
            Err(_) => declared_type.as_str(),
        };
        debug!(resource_type, url = %url, body = %response.body_text(), "persisted resource");

        Ok(ReconcileOutcome {
            identifier: RemoteIdentifier::new(resource_type, id),
            fingerprint: Fingerprint::of(response.body()),
        })
    }

    /// GETs `{base}/{identifier}` and re-derives the identifier from the body.
    pub async fn read(&self, identifier: &str, base_url: Option<&str>) -> Result<ReconcileOutcome> {
        RemoteIdentifier::parse(identifier)?;
        let url = join_url(self.base_url(base_url), identifier);

        let response = self.send(Method::GET, &url, None).await?;
        let parsed = response.parsed_body(&url)?;
        let id = parsed.get_string(ID)?;
        let resource_type = parsed.get_string(RESOURCE_TYPE)?;

        Ok(ReconcileOutcome {
            identifier: RemoteIdentifier::new(resource_type, id),
            fingerprint: Fingerprint::of(response.body()),
        })
    }

    /// DELETEs `{base}/{identifier}`. The success body is ignored.
    pub async fn delete(&self, identifier: &str, base_url: Option<&str>) -> Result<()> {
        RemoteIdentifier::parse(identifier)?;
        let url = join_url(self.base_url(base_url), identifier);
        self.send(Method::DELETE, &url, None).await?;
        debug!(url = %url, "deleted resource");
        Ok(())
    }

    /// GETs `{base}/{identifier}` and returns the body text as received.
    pub async fn fetch(&self, identifier: &str, base_url: Option<&str>) -> Result<FetchedResource> {
        let parsed_id = RemoteIdentifier::parse(identifier)?;
        let url = join_url(self.base_url(base_url), identifier);
        let response = self.send(Method::GET, &url, None).await?;
        Ok(FetchedResource {
            identifier: parsed_id,
            body: response.body_text().into_owned(),
        })
    }

    /// Accepts an externally supplied identifier for adoption.
    ///
    /// No request is made; a subsequent [`read`](Self::read) fills in the
    /// fingerprint.
    pub fn import(&self, identifier: &str) -> Result<RemoteIdentifier> {
        RemoteIdentifier::parse(identifier)
    }

    fn base_url<'a>(&'a self, override_url: Option<&'a str>) -> &'a str {
        resolve_base_url(override_url, self.transport.config().base_url())
    }

    async fn send(&self, method: Method, url: &str, body: Option<Vec<u8>>) -> Result<RemoteResponse> {
        let response = self
            .transport
            .execute(method.clone(), url, body, &BTreeMap::new())
            .await?;
        if !response.is_success() {
            let status = response.status_text();
            warn!(%method, url, %status, "server returned a non-success status");
            return Err(ReconcileError::Remote {
                method: method.to_string(),
                url: url.to_string(),
                status,
                body: response.body_text().into_owned(),
            });
        }
        Ok(response)
    }
}
