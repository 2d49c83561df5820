use anyhow::Result;
use apk_sieve::{
    batch_command, firmware_command, inspect_image_command, locate_command, logging,
    rules_command, scan_command, show_config_command,
};
use clap::{Parser, Subcommand};
use sieve_core::binary::DEFAULT_MIN_STRING_LEN;

/// Forensic scanner for Android packages and firmware blobs.
///
/// This CLI is a thin wrapper around `sieve-core` (exposed in code as `sieve_core`).
/// All scanning logic lives in the library so it can be tested directly.
#[derive(Parser, Debug)]
#[command(
    name = "apk-sieve",
    version,
    about = "Forensic scanner for APKs and firmware blobs",
    long_about = None
)]
struct Cli {
    /// Debug-level logging on stderr (`RUST_LOG` takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a single APK (or an already unpacked directory).
    ///
    /// The unit is extracted to `<output-dir>/<stem>_extracted` and the report
    /// is written to `<output-dir>/<stem>_report.json`.
    Scan {
        /// Path to the APK.
        apk: String,

        /// Overrides the config's output directory.
        #[arg(long)]
        output_dir: Option<String>,

        /// JSON or YAML scan configuration.
        #[arg(long)]
        config: Option<String>,

        /// Emit the full report as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Scan every APK directly inside a directory.
    Batch {
        /// Directory holding the APKs.
        dir: String,

        /// Where the combined batch document is written.
        #[arg(long, default_value = "batch_report.json")]
        output: String,

        /// Overrides the config's output directory.
        #[arg(long)]
        output_dir: Option<String>,

        /// JSON or YAML scan configuration.
        #[arg(long)]
        config: Option<String>,
    },

    /// Walk the chunks of a PNG (or every PNG in a directory) and report anomalies.
    InspectImage {
        /// PNG file or directory.
        path: String,

        /// JSON or YAML scan configuration (size threshold, markers).
        #[arg(long)]
        config: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Identify, hash and mine strings from a firmware blob.
    Firmware {
        /// Firmware file.
        file: String,

        /// Shortest printable run reported as a string.
        #[arg(long, default_value_t = DEFAULT_MIN_STRING_LEN)]
        min_len: usize,

        /// Unpack archive-type blobs to `<output-dir>/<stem>_zip`.
        #[arg(long, default_value_t = false)]
        extract: bool,

        #[arg(long, default_value = "firmware_analysis")]
        output_dir: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Find firmware fields and download URLs in a captured response body.
    Locate {
        /// File holding the response body (JSON or raw text).
        file: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the effective rule tables.
    Rules {
        #[arg(long)]
        config: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the effective configuration.
    ShowConfig {
        #[arg(long)]
        config: Option<String>,

        /// Emit JSON instead of YAML.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Scan { apk, output_dir, config, json } => {
            scan_command(&apk, output_dir.as_deref(), config.as_deref(), json)?
        }
        Command::Batch { dir, output, output_dir, config } => {
            batch_command(&dir, &output, output_dir.as_deref(), config.as_deref())?
        }
        Command::InspectImage { path, config, json } => {
            inspect_image_command(&path, config.as_deref(), json)?
        }
        Command::Firmware { file, min_len, extract, output_dir, json } => {
            firmware_command(&file, min_len, extract, &output_dir, json)?
        }
        Command::Locate { file, json } => locate_command(&file, json)?,
        Command::Rules { config, json } => rules_command(config.as_deref(), json)?,
        Command::ShowConfig { config, json } => show_config_command(config.as_deref(), json)?,
    }

    Ok(())
}
