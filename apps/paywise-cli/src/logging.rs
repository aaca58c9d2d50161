use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays clean.
///
/// `RUST_LOG` wins over the configured level; each `-v` raises the level
/// one step past the configured one. A configured directive that is not a
/// bare level (`paywise_auth=debug`) is stepped up from `warn`.
pub fn init(config: &LoggingConfig, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(effective_level(&config.level, verbose)));

    let registry = Registry::default().with(filter);

    match config.format {
        LogFormat::Text => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Json => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

fn effective_level(configured: &str, verbose: u8) -> &str {
    if verbose == 0 {
        return configured;
    }
    let base = LEVELS
        .iter()
        .position(|level| level.eq_ignore_ascii_case(configured.trim()))
        .unwrap_or(2);
    let step = base.saturating_add(usize::from(verbose));
    LEVELS[step.min(LEVELS.len() - 1)]
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn verbosity_steps_up_from_configured_level() {
        assert_eq!(effective_level("warn", 0), "warn");
        assert_eq!(effective_level("paywise_auth=debug", 0), "paywise_auth=debug");
        assert_eq!(effective_level("warn", 1), "info");
        assert_eq!(effective_level("error", 2), "info");
        assert_eq!(effective_level("warn", 7), "trace");
    }

    #[test]
    fn verbosity_never_lowers_a_configured_level() {
        assert_eq!(effective_level("debug", 1), "trace");
        assert_eq!(effective_level("DEBUG", 1), "trace");
        assert_eq!(effective_level("trace", 3), "trace");
    }

    #[test]
    fn directives_step_up_from_warn() {
        assert_eq!(effective_level("paywise_auth=debug", 2), "debug");
    }
}
