//! Provider configuration.
//!
//! Settings come from an optional TOML file layered with environment
//! variables, e.g. `FHIRREST__FHIR_BASE_URL=http://localhost:8080/fhir`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "fhirrest.toml";
pub const ENV_PREFIX: &str = "FHIRREST";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the FHIR server
    #[serde(default)]
    pub fhir_base_url: String,
    /// Headers sent with every request
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
}

impl ProviderConfig {
    pub fn new(fhir_base_url: impl Into<String>) -> Self {
        Self {
            fhir_base_url: fhir_base_url.into(),
            default_headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Applies `headers` over the default headers.
    ///
    /// Header names are case-insensitive, so an override replaces a default
    /// whose name differs only in case.
    pub fn merge_headers<'a>(
        &mut self,
        headers: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) {
        for (name, value) in headers {
            self.default_headers
                .retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            self.default_headers
                .insert(name.to_string(), value.to_string());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.fhir_base_url.trim().is_empty() {
            return Err(ReconcileError::configuration("fhir_base_url is required"));
        }
        let parsed = url::Url::parse(&self.fhir_base_url).map_err(|e| {
            ReconcileError::configuration(format!(
                "fhir_base_url {} is not a valid URL: {e}",
                self.fhir_base_url
            ))
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ReconcileError::configuration(format!(
                "fhir_base_url {} cannot be used as a base URL",
                self.fhir_base_url
            )));
        }
        for (name, value) in &self.default_headers {
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                ReconcileError::configuration(format!("invalid header name: {name}"))
            })?;
            HeaderValue::from_str(value).map_err(|_| {
                ReconcileError::configuration(format!("invalid value for header {name}"))
            })?;
        }
        Ok(())
    }
}

/// Loads the provider configuration.
///
/// With `path = None` the default `fhirrest.toml` in the working directory
/// is used when it exists. Environment variables override file values.
pub fn load_config(path: Option<&Path>) -> Result<ProviderConfig> {
    let mut builder = Config::builder();
    match path {
        Some(p) => {
            if !p.exists() {
                return Err(ReconcileError::configuration(format!(
                    "config file {} does not exist",
                    p.display()
                )));
            }
            builder = builder.add_source(File::from(p.to_path_buf()));
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                builder = builder.add_source(File::from(default_path));
            }
        }
    }
    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let merged: ProviderConfig = builder
        .build()
        .and_then(|cfg| cfg.try_deserialize())
        .map_err(|e| ReconcileError::configuration(format!("config load error: {e}")))?;
    merged.validate()?;
    Ok(merged)
}
