mod cli;
mod commands;
mod observability;
mod output;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use fhirrest_core::{
    ProviderConfig, ReconcileError, ReconciliationEngine, TransportConfig, load_config,
};

use cli::{Cli, Commands};
use commands::resource;
use output::{print_diagnostic, print_error};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    if let Err(e) = run(&cli).await {
        match e.downcast_ref::<ReconcileError>() {
            Some(err) => print_diagnostic(&err.to_diagnostic()),
            None => print_error(&format!("{e:#}")),
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let base_url = cli.base_url.as_deref();

    match &cli.command {
        Commands::Create(args) => resource::create(&make_engine(cli)?, args, base_url).await,
        Commands::Read(args) => resource::read(&make_engine(cli)?, args, base_url).await,
        Commands::Update(args) => resource::update(&make_engine(cli)?, args, base_url).await,
        Commands::Delete(args) => resource::delete(&make_engine(cli)?, args, base_url).await,
        Commands::Fetch(args) => resource::fetch(&make_engine(cli)?, args, base_url).await,
        Commands::Import(args) => resource::import(&make_engine(cli)?, args, base_url).await,
        Commands::Hash(args) => resource::hash(args),
    }
}

fn make_engine(cli: &Cli) -> Result<ReconciliationEngine> {
    let provider = load_config(cli.config.as_deref()).context(
        "No usable provider configuration. Set fhir_base_url in fhirrest.toml or FHIRREST__FHIR_BASE_URL",
    )?;
    let provider = with_cli_headers(provider, cli)?;

    tracing::debug!(
        base_url = %provider.fhir_base_url,
        headers = provider.default_headers.len(),
        "provider configured"
    );
    let config = TransportConfig::from_provider(&provider, reqwest::Client::new());
    Ok(ReconciliationEngine::new(config))
}

/// Merges `--header` values over the configured default headers.
fn with_cli_headers(mut provider: ProviderConfig, cli: &Cli) -> Result<ProviderConfig> {
    provider.merge_headers(
        cli.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    );
    provider.validate()?;
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_headers_override_configured_headers() {
        let cli = Cli::try_parse_from([
            "fhirrest",
            "-H",
            "authorization=Bearer cli",
            "-H",
            "Prefer=return=minimal",
            "delete",
            "Patient/1",
        ])
        .unwrap();
        let provider = ProviderConfig::new("http://localhost:8080/fhir")
            .with_header("Authorization", "Bearer config")
            .with_header("X-Tenant", "acme");

        let merged = with_cli_headers(provider, &cli).unwrap();

        assert_eq!(merged.default_headers.len(), 3);
        assert_eq!(
            merged.default_headers.get("authorization").map(String::as_str),
            Some("Bearer cli")
        );
        assert!(!merged.default_headers.contains_key("Authorization"));
        assert_eq!(
            merged.default_headers.get("Prefer").map(String::as_str),
            Some("return=minimal")
        );
        assert_eq!(
            merged.default_headers.get("X-Tenant").map(String::as_str),
            Some("acme")
        );
    }

    #[test]
    fn test_cli_header_with_invalid_value_is_rejected() {
        let cli = Cli::try_parse_from(["fhirrest", "-H", "X-Bad=line\nbreak", "delete", "Patient/1"])
            .unwrap();
        let err = with_cli_headers(ProviderConfig::new("http://localhost"), &cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::Configuration(_))
        ));
    }
}
