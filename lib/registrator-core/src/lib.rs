//! Service descriptor construction for container registration
//!
//! This library provides:
//! - Escaped tag list parsing and tag combination
//! - Service metadata resolution from environment and labels
//! - Port and network resolution into service ports
//! - Service building for a discovery backend
//! - Container filter query building
//! - Best-effort template evaluation against container records
//! - Signal extraction from runtime events
//! - Exponential backoff retry for fallible calls

pub mod error;
pub mod filters;
pub mod metadata;
pub mod retry;
pub mod service;
pub mod service_port;
pub mod signal;
pub mod tags;
pub mod template;

pub use error::{CoreError, Result};
pub use filters::ContainersFilters;
pub use metadata::{service_metadata, ServiceMetadata};
pub use retry::{retry, RetryPolicy};
pub use service::{BuilderConfig, Service, ServiceBuilder};
pub use service_port::{service_port, service_ports, ServicePort};
pub use signal::{signal_from_event, INVALID_SIGNAL};
pub use tags::{combine_tags, parse_escaped_list};
pub use template::{evaluate, evaluate_template_tags, Template, TemplateError, TemplateOutcome};
