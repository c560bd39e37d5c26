//! Logging setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration handed to the subscriber at startup
#[derive(Clone, Debug, Default)]
pub struct LogConfig {
    /// Debug-level output for the registrator crates
    pub verbose: bool,
    /// JSON lines instead of human-readable output
    pub json: bool,
}

impl LogConfig {
    /// Default directives, overridden by `RUST_LOG` when set
    pub fn directives(&self) -> &'static str {
        if self.verbose {
            "registrator_core=debug,registrator_inspect=debug"
        } else {
            "registrator_core=info,registrator_inspect=info"
        }
    }

    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
    }

    /// Install the global subscriber, logging to stderr so stdout stays machine-readable
    pub fn init(&self) {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        if self.json {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}
