//! Logging setup for the sqlsrc binary
//!
//! Everything goes to stderr so stdout stays clean for command output.
//! `RUST_LOG` takes precedence over the verbosity-derived default filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn,sqlsrc=info";
const VERBOSE_FILTER: &str = "info,sqlsrc=debug,sqlsrc_core=debug,sqlsrc_spark=debug";

/// Install the global subscriber
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let default_filter = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_file(verbose)
                .with_line_number(verbose),
        )
        .try_init()?;

    Ok(())
}
