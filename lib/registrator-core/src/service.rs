//! Service building from resolved service ports

use crate::metadata::ServiceMetadata;
use crate::service_port::{service_ports, ServicePort};
use crate::tags::combine_tags;
use crate::template::evaluate_template_tags;
use crate::Result;
use registrator_api::Container;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Settings shared by every service built for this host
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Host name used in service ids, defaults to the published host IP
    pub hostname: Option<String>,
    /// Address to advertise instead of the published host IP
    pub host_ip: Option<String>,
    /// Advertise container addresses and exposed ports instead of published ones
    pub internal: bool,
    /// Only register containers that set a service name
    pub explicit: bool,
    /// Tags appended to every service
    pub force_tags: String,
    /// TTL in seconds handed to the backend, 0 for none
    pub refresh_ttl: u32,
}

/// Backend-agnostic registration record for one container port
#[derive(Clone, Debug, Serialize)]
pub struct Service<'a> {
    pub id: String,
    pub name: String,
    pub port: u16,
    pub ip: String,
    pub tags: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub ttl: u32,
    pub origin: ServicePort<'a>,
}

/// Builds services from containers according to a [`BuilderConfig`]
pub struct ServiceBuilder {
    config: BuilderConfig,
}

impl ServiceBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build services for every registrable port of `container`
    pub fn build_all<'a>(&self, container: &'a Container) -> Result<Vec<Service<'a>>> {
        let ports = service_ports(container)?;
        if ports.is_empty() {
            debug!(container = container.short_id(), "ignored: no published ports");
        }

        let is_group = ports.len() > 1;
        let mut services = Vec::with_capacity(ports.len());
        for port in ports {
            if !self.config.internal && port.host_port.is_empty() {
                debug!(
                    container = container.short_id(),
                    port = %port.exposed_port,
                    "ignored: port not published on host"
                );
                continue;
            }
            if let Some(service) = self.build(port, is_group) {
                services.push(service);
            }
        }
        Ok(services)
    }

    /// Build the service for one port, `None` if the container opts out
    pub fn build<'a>(&self, mut port: ServicePort<'a>, is_group: bool) -> Option<Service<'a>> {
        let container = port.container;

        let hostname = self
            .config
            .hostname
            .clone()
            .unwrap_or_else(|| port.host_ip.clone());
        if let Some(host_ip) = &self.config.host_ip {
            port.host_ip = host_ip.clone();
        }

        let mut metadata = ServiceMetadata::resolve(&container.config, &port.exposed_port);
        if !metadata.get_or("ignore", "").is_empty() {
            debug!(container = container.short_id(), "ignored: SERVICE_IGNORE set");
            return None;
        }

        let mut name = metadata.get_or("name", "").to_string();
        if name.is_empty() {
            if self.config.explicit {
                debug!(container = container.short_id(), "ignored: no service name in explicit mode");
                return None;
            }
            name = default_service_name(&container.config.image).to_string();
        }
        if is_group && !metadata.is_from_port("name") {
            name = format!("{}-{}", name, port.exposed_port);
        }

        let mut id = format!(
            "{}:{}:{}",
            hostname,
            container.bare_name(),
            port.exposed_port
        );

        let (ip, service_port) = if self.config.internal {
            (port.exposed_ip.clone(), port.exposed_port.as_str())
        } else {
            (port.host_ip.clone(), port.host_port.as_str())
        };
        let service_port = service_port.parse::<u16>().unwrap_or(0);

        let service_tags = evaluate_template_tags(metadata.get_or("tags", ""), Some(container));
        let force_tags = evaluate_template_tags(&self.config.force_tags, Some(container));
        let mut tags = combine_tags([service_tags.as_str(), force_tags.as_str()]);
        if port.port_type == "udp" {
            tags.push("udp".to_string());
            id.push_str(":udp");
        }

        if let Some(custom_id) = metadata.get("id").filter(|id| !id.is_empty()) {
            id = custom_id.to_string();
        }
        for reserved in ["id", "tags", "name"] {
            metadata.remove(reserved);
        }

        debug!(service = %id, name = %name, "Built service");
        Some(Service {
            id,
            name,
            port: service_port,
            ip,
            tags,
            attrs: metadata.into_values(),
            ttl: self.config.refresh_ttl,
            origin: port,
        })
    }
}

/// Image base name without registry path, tag or digest
fn default_service_name(image: &str) -> &str {
    let base = image
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    base.split([':', '@']).next().unwrap_or_default()
}
