use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use fhirrest_core::{Fingerprint, ReconciliationEngine};

use crate::cli::{CreateArgs, DeleteArgs, FetchArgs, HashArgs, ImportArgs, ReadArgs, UpdateArgs};
use crate::output::{print_json, print_success};
use crate::state::ResourceState;

pub async fn create(
    engine: &ReconciliationEngine,
    args: &CreateArgs,
    base_url: Option<&str>,
) -> Result<()> {
    let declared = &args.declared;
    let outcome = engine.create(&declared.file, base_url).await?;
    print_success(&format!("Created {}", outcome.identifier.to_string().cyan()));
    let state = ResourceState::declared(
        Some(declared.file.as_path()),
        declared.file_sha256.as_deref(),
        base_url,
    )
    .with_outcome(outcome);
    print_json(&state)
}

pub async fn read(
    engine: &ReconciliationEngine,
    args: &ReadArgs,
    base_url: Option<&str>,
) -> Result<()> {
    let outcome = engine.read(&args.resource_id, base_url).await?;
    let state = ResourceState::declared(
        args.file.as_deref(),
        args.file_sha256.as_deref(),
        base_url,
    )
    .with_outcome(outcome);
    print_json(&state)
}

pub async fn update(
    engine: &ReconciliationEngine,
    args: &UpdateArgs,
    base_url: Option<&str>,
) -> Result<()> {
    let declared = &args.declared;
    let outcome = engine
        .update(&declared.file, &args.resource_id, base_url)
        .await?;
    print_success(&format!("Updated {}", outcome.identifier.to_string().cyan()));
    let state = ResourceState::declared(
        Some(declared.file.as_path()),
        declared.file_sha256.as_deref(),
        base_url,
    )
    .with_outcome(outcome);
    print_json(&state)
}

pub async fn delete(
    engine: &ReconciliationEngine,
    args: &DeleteArgs,
    base_url: Option<&str>,
) -> Result<()> {
    engine.delete(&args.resource_id, base_url).await?;
    print_success(&format!("Deleted {}", args.resource_id.cyan()));
    Ok(())
}

pub async fn fetch(
    engine: &ReconciliationEngine,
    args: &FetchArgs,
    base_url: Option<&str>,
) -> Result<()> {
    let fetched = engine.fetch(&args.resource_id, base_url).await?;
    println!("{}", fetched.body);
    Ok(())
}

pub async fn import(
    engine: &ReconciliationEngine,
    args: &ImportArgs,
    base_url: Option<&str>,
) -> Result<()> {
    let identifier = engine.import(&args.resource_id)?;
    let outcome = engine.read(&identifier.to_string(), base_url).await?;
    print_success(&format!("Imported {}", outcome.identifier.to_string().cyan()));
    let state = ResourceState::declared(None, None, base_url).with_outcome(outcome);
    print_json(&state)
}

pub fn hash(args: &HashArgs) -> Result<()> {
    println!("{}", file_sha256(&args.file)?);
    Ok(())
}

fn file_sha256(path: &Path) -> Result<Fingerprint> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(Fingerprint::of(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sha256_matches_content_digest() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("patient.json");
        fs::write(&path, b"abc").expect("write file");

        assert_eq!(
            file_sha256(&path).unwrap().as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_file_sha256_missing_file() {
        let err = file_sha256(Path::new("/nonexistent/fhirrest/patient.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
