//! Tracing setup for the CLI.
//!
//! Log lines go to stderr so that `--json` output on stdout stays clean.
//! `RUST_LOG` wins over `--verbose` when set:
//!
//! ```bash
//! RUST_LOG=sieve_core=debug apk-sieve scan app.apk
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "sieve_core=warn,apk_sieve=warn";
const VERBOSE_FILTER: &str = "sieve_core=debug,apk_sieve=debug";

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    });

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer().with_writer(std::io::stderr).with_target(verbose).compact(),
    );

    let _ = tracing::subscriber::set_global_default(subscriber);
}
