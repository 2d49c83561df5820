use std::fs;

use anyhow::{Context, Result};
use sieve_core::firmware::locate_in_text;

use crate::print_json;

/// Search a captured response body for firmware fields and download URLs.
pub fn locate_command(file: &str, json: bool) -> Result<()> {
    let body = fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?;
    let result = locate_in_text(&body);

    if json {
        return print_json(&result, "locator result");
    }

    if !result.mentions_firmware {
        println!("Body does not mention firmware.");
    }
    println!("Firmware fields ({}):", result.fields.len());
    for field in &result.fields {
        println!("  - {}: {}", field.path, field.value);
    }
    println!("Download URLs ({}):", result.download_urls.len());
    for url in &result.download_urls {
        println!("  - {url}");
    }
    Ok(())
}
