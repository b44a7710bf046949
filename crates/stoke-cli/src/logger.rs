//! Logging setup on top of `tracing-subscriber`.
//!
//! `--verbose` turns on debug output for the stoke crates, `--quiet` keeps
//! errors only, and otherwise `RUST_LOG` is honored with an info fallback.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "stoke=debug,stoke_core=debug,stoke_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "stoke=info,stoke_core=info,stoke_cli=info";

/// Pick the filter directives for the given flags.
pub fn filter_directives(verbose: bool, quiet: bool) -> Option<&'static str> {
    if verbose {
        Some(VERBOSE_FILTER)
    } else if quiet {
        Some(QUIET_FILTER)
    } else {
        None
    }
}

/// Install the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = match filter_directives(verbose, quiet) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .with_writer(std::io::stderr)
        .compact();

    // A second call (tests, embedding) keeps the first subscriber.
    if let Err(err) = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init() {
        tracing::debug!(error = %err, "logger already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_wins_over_quiet() {
        assert_eq!(filter_directives(true, true), Some(VERBOSE_FILTER));
        assert_eq!(filter_directives(false, true), Some(QUIET_FILTER));
        assert_eq!(filter_directives(false, false), None);
    }

    #[test]
    fn test_directives_parse() {
        for directives in [VERBOSE_FILTER, QUIET_FILTER, DEFAULT_FILTER] {
            assert!(EnvFilter::try_new(directives).is_ok(), "{directives}");
        }
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logger(false, true, true);
        init_logger(true, false, true);
    }
}
