use anyhow::{Context, Result};
use clap::Parser;
use registrator_api::{Container, Event};
use registrator_core::{retry, signal_from_event, RetryPolicy, ServiceBuilder, INVALID_SIGNAL};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info};

mod cli;
mod logging;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.log_config().init();

    info!("Starting registrator-inspect...");

    let filters = cli.container_filters();
    if !filters.is_empty() {
        info!(query = %filters, "Container filter");
    }

    let policy = cli.retry_policy();
    let containers: Vec<Container> = load_json(cli.input.as_deref(), &policy).await?;
    info!("Loaded {} container records", containers.len());

    let builder = ServiceBuilder::new(cli.builder_config());
    let mut services = Vec::new();
    let mut failed = 0;
    for container in &containers {
        debug!(query = %filters.with_container_id(&container.id), "Resolving container");
        match builder.build_all(container) {
            Ok(built) => {
                debug!("Container {} yields {} services", container.short_id(), built.len());
                services.extend(built);
            }
            Err(e) => {
                failed += 1;
                error!("Error building services for {}: {}", container.short_id(), e);
            }
        }
    }

    if let Some(path) = cli.events.as_deref() {
        let events: Vec<Event> = load_json(Some(path), &policy).await?;
        for event in &events {
            report_signal(event);
        }
    }

    info!("Built {} services ({} containers failed)", services.len(), failed);

    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &services)?;
    println!();

    Ok(())
}

/// Read and parse a JSON document from `path`, or stdin when absent
async fn load_json<T: DeserializeOwned>(path: Option<&Path>, policy: &RetryPolicy) -> Result<T> {
    let raw = match path {
        Some(path) => retry(policy, || tokio::fs::read_to_string(path))
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read stdin")?;
            raw
        }
    };

    serde_json::from_str(&raw).context("Failed to parse JSON input")
}

fn report_signal(event: &Event) {
    let signal = signal_from_event(event);
    if signal == INVALID_SIGNAL {
        debug!(action = %event.action, container = %event.actor.id, "Event carries no signal");
        return;
    }
    info!(
        action = %event.action,
        container = %event.actor.id,
        signal,
        "Container signalled"
    );
}
