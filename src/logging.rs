//! Diagnostic logging for the binary.
//!
//! Library code emits `tracing` events; this installs a stderr subscriber
//! filtered by `QRSTUDIO_LOG` (`EnvFilter` syntax). Without it the level is
//! `warn`, or `debug` with `--verbose`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "QRSTUDIO_LOG";

fn filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "qrstudio=debug" } else { "warn" };
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed; the existing one
/// stays in place.
pub fn init(verbose: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_existing_subscriber() {
        init(false);
        assert!(!init(true));
    }
}
