//! Command-line configuration

use crate::logging::LogConfig;
use clap::Parser;
use registrator_core::{BuilderConfig, ContainersFilters, RetryPolicy};
use std::path::PathBuf;
use std::time::Duration;

/// Build service registrations from container inspection records
#[derive(Parser, Debug)]
#[command(name = "registrator-inspect", version, about)]
pub struct Cli {
    /// JSON array of container inspection records (defaults to stdin)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// JSON array of runtime events to report signals for
    #[arg(long, value_name = "PATH")]
    pub events: Option<PathBuf>,

    /// Container selector as key=value, repeatable
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Advertise container addresses and exposed ports
    #[arg(long, env = "REGISTRATOR_INTERNAL")]
    pub internal: bool,

    /// Only register containers that set SERVICE_NAME
    #[arg(long, env = "REGISTRATOR_EXPLICIT")]
    pub explicit: bool,

    /// Host name used in service ids
    #[arg(long, env = "REGISTRATOR_HOSTNAME")]
    pub hostname: Option<String>,

    /// Address to advertise instead of the published host IP
    #[arg(long, env = "REGISTRATOR_HOST_IP")]
    pub host_ip: Option<String>,

    /// Comma-separated tags appended to every service
    #[arg(long, env = "REGISTRATOR_TAGS", default_value = "")]
    pub tags: String,

    /// TTL in seconds for registered services, 0 for none
    #[arg(long, env = "REGISTRATOR_TTL", default_value_t = 0)]
    pub ttl: u32,

    /// Retries when reading inputs
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Debug logging
    #[arg(short, long, env = "REGISTRATOR_VERBOSE")]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            verbose: self.verbose,
            json: self.json_logs,
        }
    }

    pub fn builder_config(&self) -> BuilderConfig {
        BuilderConfig {
            hostname: self.hostname.clone(),
            host_ip: self.host_ip.clone(),
            internal: self.internal,
            explicit: self.explicit,
            force_tags: self.tags.clone(),
            refresh_ttl: self.ttl,
        }
    }

    pub fn container_filters(&self) -> ContainersFilters {
        self.filters.iter().collect()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retries,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}
