use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .compact()
        .init();
}

/// Picks the effective default level: `--silent` raises the floor to
/// errors, `--verbose` lowers it to debug, otherwise the `--log-level`
/// flag stands.
pub fn effective_level<'a>(level: &'a str, verbose: bool, silent: bool) -> &'a str {
    if silent {
        "error"
    } else if verbose {
        "debug"
    } else {
        level
    }
}
