use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fhirrest")]
#[command(about = "fhirrest: reconcile FHIR resource files against a FHIR server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Provider config file (defaults to ./fhirrest.toml when present)
    #[arg(short, long, global = true, env = "FHIRREST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL for this resource, overriding the provider's fhir_base_url
    #[arg(short = 'u', long, global = true, env = "FHIRREST_BASE_URL")]
    pub base_url: Option<String>,

    /// Additional request header as NAME=VALUE (repeatable)
    #[arg(short = 'H', long = "header", global = true, value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "FHIRREST_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the resource declared in a file
    Create(CreateArgs),
    /// Read a resource by id (e.g. Patient/123) and print its state
    Read(ReadArgs),
    /// Update a resource from the file it was declared in
    Update(UpdateArgs),
    /// Delete a resource
    Delete(DeleteArgs),
    /// Print a resource exactly as the server returns it
    Fetch(FetchArgs),
    /// Adopt an existing resource and print its state
    Import(ImportArgs),
    /// Print the SHA-256 of a file
    Hash(HashArgs),
}

#[derive(clap::Args)]
pub struct DeclaredFile {
    /// Path of the file containing the FHIR resource
    #[arg(short, long)]
    pub file: PathBuf,
    /// SHA-256 of the file, recorded in the state but never compared
    #[arg(long)]
    pub file_sha256: Option<String>,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub declared: DeclaredFile,
}

#[derive(clap::Args)]
pub struct ReadArgs {
    /// Resource id (e.g. Patient/123)
    pub resource_id: String,
    /// File the resource was declared in, carried into the printed state
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    /// Declared file hash, carried into the printed state
    #[arg(long)]
    pub file_sha256: Option<String>,
}

#[derive(clap::Args)]
pub struct UpdateArgs {
    /// Resource id (e.g. Patient/123)
    pub resource_id: String,
    #[command(flatten)]
    pub declared: DeclaredFile,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    /// Resource id (e.g. Patient/123)
    pub resource_id: String,
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// Resource id (e.g. Medication/08146022-932a-4001-9fe4-928382855ddf)
    pub resource_id: String,
}

#[derive(clap::Args)]
pub struct ImportArgs {
    /// Resource id (e.g. Patient/123)
    pub resource_id: String,
}

#[derive(clap::Args)]
pub struct HashArgs {
    /// File to hash
    pub file: PathBuf,
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid header \"{s}\". Expected format: NAME=VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid header \"{s}\": empty name"));
    }
    Ok((name.to_string(), value.to_string()))
}
