//! Port and network resolution for a container's exposed ports

use crate::{CoreError, Result};
use registrator_api::{Container, Port, PortBinding, BUILTIN_NETWORK_MODES, INGRESS_NETWORK};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Host address used when a port has no explicit host binding
pub const WILDCARD_ADDRESS: &str = "0.0.0.0";

/// Network view of one exposed container port
#[derive(Clone, Debug, Serialize)]
pub struct ServicePort<'a> {
    /// Published host port, empty when unpublished
    pub host_port: String,
    /// Published host address, never empty
    pub host_ip: String,
    pub exposed_port: String,
    /// Container address on its primary or user-defined network
    pub exposed_ip: String,
    /// `tcp` or `udp`
    pub port_type: String,
    pub container_id: String,
    pub container_hostname: String,
    #[serde(skip)]
    pub container: &'a Container,
}

/// Resolve `port` of `container` given the bindings published for it.
///
/// Only the first published binding is used. A network mode naming a network
/// the container is not attached to is an error.
pub fn service_port<'a>(
    container: &'a Container,
    port: &Port,
    published: &[PortBinding],
) -> Result<ServicePort<'a>> {
    debug!(container = container.short_id(), port = %port, "Building service port");

    if port.port().is_empty() {
        return Err(CoreError::InvalidPort(port.to_string()));
    }

    let (host_port, mut host_ip) = match published.first() {
        Some(binding) => {
            debug!(
                "Found published port for {} - \"{}:{}\"",
                container.short_id(),
                binding.host_ip,
                binding.host_port
            );
            (binding.host_port.clone(), binding.host_ip.clone())
        }
        None => (String::new(), String::new()),
    };
    if host_ip.is_empty() {
        host_ip = WILDCARD_ADDRESS.to_string();
    }

    let exposed_ip = exposed_ip(container)?;

    Ok(ServicePort {
        host_port,
        host_ip,
        exposed_port: port.port().to_string(),
        exposed_ip,
        port_type: port.proto().to_string(),
        container_id: container.id.clone(),
        container_hostname: container.config.hostname.clone(),
        container,
    })
}

/// Resolve every exposed and published port of `container`, ordered by port
pub fn service_ports(container: &Container) -> Result<Vec<ServicePort<'_>>> {
    let mut ports: BTreeMap<&str, &[PortBinding]> = BTreeMap::new();
    for port in container.config.exposed_ports.keys() {
        ports.insert(port.as_str(), &[]);
    }
    for (port, published) in &container.network_settings.ports {
        ports.insert(port.as_str(), published.as_deref().unwrap_or_default());
    }

    ports
        .into_iter()
        .map(|(port, published)| service_port(container, &Port::from(port), published))
        .collect()
}

fn exposed_ip(container: &Container) -> Result<String> {
    let network_mode = container.host_config.network_mode.as_str();
    debug!("Network mode for {} is: \"{}\"", container.short_id(), network_mode);

    // User-defined and overlay networks: the primary IP is not meaningful
    if !BUILTIN_NETWORK_MODES.contains(&network_mode) {
        return container
            .network_settings
            .networks
            .get(network_mode)
            .map(|network| network.ip_address.clone())
            .ok_or_else(|| CoreError::NetworkNotFound {
                container: container.id.clone(),
                network: network_mode.to_string(),
            });
    }

    let primary = &container.network_settings.ip_address;
    if !primary.is_empty() {
        return Ok(primary.clone());
    }

    // Networks are name-ordered, so the smallest non-ingress name wins
    let fallback = container
        .network_settings
        .networks
        .iter()
        .find(|(name, _)| name.as_str() != INGRESS_NETWORK)
        .map(|(name, network)| {
            debug!(
                "Container {} exposed IP is: \"{}\" (network {})",
                container.short_id(),
                network.ip_address,
                name
            );
            network.ip_address.clone()
        })
        .unwrap_or_default();

    Ok(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn container(value: serde_json::Value) -> Container {
        serde_json::from_value(value).unwrap()
    }

    fn binding(host_ip: &str, host_port: &str) -> PortBinding {
        PortBinding {
            host_ip: host_ip.to_string(),
            host_port: host_port.to_string(),
        }
    }

    #[test]
    fn test_unpublished_defaults_to_wildcard() {
        let container = container(json!({
            "Id": "0123456789abcdef",
            "Config": { "Hostname": "box-1" },
            "HostConfig": { "NetworkMode": "bridge" },
            "NetworkSettings": { "IPAddress": "172.17.0.5" }
        }));

        let port = service_port(&container, &Port::from("80/tcp"), &[]).unwrap();
        assert_eq!(port.host_ip, WILDCARD_ADDRESS);
        assert_eq!(port.host_port, "");
        assert_eq!(port.exposed_port, "80");
        assert_eq!(port.port_type, "tcp");
        assert_eq!(port.container_id, "0123456789abcdef");
        assert_eq!(port.container_hostname, "box-1");
    }

    #[test]
    fn test_first_published_binding_wins() {
        let container = container(json!({
            "Id": "0123456789abcdef",
            "HostConfig": { "NetworkMode": "default" },
            "NetworkSettings": { "IPAddress": "172.17.0.5" }
        }));

        let published = [binding("10.0.0.1", "8080"), binding("10.0.0.2", "9090")];
        let port = service_port(&container, &Port::from("53/udp"), &published).unwrap();
        assert_eq!(port.host_ip, "10.0.0.1");
        assert_eq!(port.host_port, "8080");
        assert_eq!(port.port_type, "udp");

        let published = [binding("", "8080")];
        let port = service_port(&container, &Port::from("80/tcp"), &published).unwrap();
        assert_eq!(port.host_ip, WILDCARD_ADDRESS);
    }

    #[test]
    fn test_bridge_prefers_primary_ip() {
        let container = container(json!({
            "Id": "0123456789abcdef",
            "HostConfig": { "NetworkMode": "bridge" },
            "NetworkSettings": {
                "IPAddress": "172.17.0.5",
                "Networks": {
                    "backend": { "IPAddress": "10.1.0.5" },
                    "bridge": { "IPAddress": "172.17.0.99" }
                }
            }
        }));

        let port = service_port(&container, &Port::from("80/tcp"), &[]).unwrap();
        assert_eq!(port.exposed_ip, "172.17.0.5");
    }

    #[test]
    fn test_fallback_skips_ingress() {
        let container = container(json!({
            "Id": "0123456789abcdef",
            "HostConfig": { "NetworkMode": "host" },
            "NetworkSettings": {
                "IPAddress": "",
                "Networks": {
                    "ingress": { "IPAddress": "10.255.0.4" },
                    "web": { "IPAddress": "10.0.1.7" },
                    "zeta": { "IPAddress": "10.0.9.9" }
                }
            }
        }));

        let port = service_port(&container, &Port::from("80/tcp"), &[]).unwrap();
        assert_eq!(port.exposed_ip, "10.0.1.7");
    }

    #[test]
    fn test_only_ingress_leaves_exposed_ip_empty() {
        let container = container(json!({
            "Id": "0123456789abcdef",
            "HostConfig": { "NetworkMode": "bridge" },
            "NetworkSettings": {
                "Networks": { "ingress": { "IPAddress": "10.255.0.4" } }
            }
        }));

        let port = service_port(&container, &Port::from("80/tcp"), &[]).unwrap();
        assert_eq!(port.exposed_ip, "");
    }

    #[test]
    fn test_user_defined_network_mode() {
        let container = container(json!({
            "Id": "0123456789abcdef",
            "HostConfig": { "NetworkMode": "overlay-net" },
            "NetworkSettings": {
                "IPAddress": "172.17.0.5",
                "Networks": { "overlay-net": { "IPAddress": "10.0.3.12" } }
            }
        }));

        let port = service_port(&container, &Port::from("80/tcp"), &[]).unwrap();
        assert_eq!(port.exposed_ip, "10.0.3.12");
        assert_eq!(port.host_ip, WILDCARD_ADDRESS);
    }

    #[test]
    fn test_missing_network_is_an_error() {
        let container = container(json!({
            "Id": "0123456789abcdef",
            "HostConfig": { "NetworkMode": "overlay-net" },
            "NetworkSettings": { "Networks": { "bridge": { "IPAddress": "172.17.0.5" } } }
        }));

        let err = service_port(&container, &Port::from("80/tcp"), &[]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NetworkNotFound { ref network, .. } if network == "overlay-net"
        ));
    }

    #[test]
    fn test_service_ports_merges_exposed_and_published() {
        let container = container(json!({
            "Id": "0123456789abcdef",
            "Config": { "ExposedPorts": { "80/tcp": {}, "443/tcp": {}, "53/udp": {} } },
            "HostConfig": { "NetworkMode": "bridge" },
            "NetworkSettings": {
                "IPAddress": "172.17.0.5",
                "Ports": {
                    "80/tcp": [{ "HostIp": "0.0.0.0", "HostPort": "32768" }],
                    "53/udp": null
                }
            }
        }));

        let ports = service_ports(&container).unwrap();
        let summary: Vec<(&str, &str, &str)> = ports
            .iter()
            .map(|p| (p.exposed_port.as_str(), p.port_type.as_str(), p.host_port.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("443", "tcp", ""), ("53", "udp", ""), ("80", "tcp", "32768")]
        );
    }

    #[test]
    fn test_service_ports_fails_as_a_unit() {
        let container = container(json!({
            "Id": "0123456789abcdef",
            "Config": { "ExposedPorts": { "80/tcp": {} } },
            "HostConfig": { "NetworkMode": "missing" }
        }));

        assert!(service_ports(&container).is_err());
    }
}
