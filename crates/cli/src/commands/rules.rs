use anyhow::{Context, Result};
use sieve_core::patterns::Category;

use crate::{load_scan_config, print_json};

/// Print the effective rule tables, validating that they compile.
pub fn rules_command(config: Option<&str>, json: bool) -> Result<()> {
    let scan_config = load_scan_config(config, None)?;
    let rules = scan_config.compile_rules().context("Failed to compile rules")?;

    if json {
        return print_json(&scan_config.rules, "rules");
    }

    println!("Rules ({}):", rules.len());
    for category in Category::ALL {
        let patterns = scan_config.rules.patterns(category);
        println!("{} ({}):", category.key(), patterns.len());
        for pattern in patterns {
            println!("  - {pattern}");
        }
    }
    Ok(())
}

/// Print the effective configuration.
pub fn show_config_command(config: Option<&str>, json: bool) -> Result<()> {
    let scan_config = load_scan_config(config, None)?;

    if json {
        return print_json(&scan_config, "config");
    }

    let yaml = serde_yaml::to_string(&scan_config).context("Failed to serialize config to YAML")?;
    print!("{yaml}");
    Ok(())
}
