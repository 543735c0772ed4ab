use anyhow::Result;
use colored::Colorize;
use fhirrest_core::Diagnostic;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_diagnostic(diag: &Diagnostic) {
    print_error(&diag.summary);
    if !diag.detail.is_empty() {
        eprintln!("  {}", diag.detail.dimmed());
    }
}
