//! Container runtime record types consumed by the registrator core
//!
//! This library defines the read-only inspection records the runtime client
//! hands to the descriptor core:
//! - Container: identity, config, host config and network settings
//! - PortBinding / Port: published host bindings per internal port
//! - Event: runtime events with their free-form actor attributes

pub mod container;
pub mod event;

pub use container::{
    Container, ContainerConfig, EndpointSettings, HostConfig, NetworkSettings, Port, PortBinding,
};
pub use event::{Event, EventActor};

/// Overlay network reserved for the routing mesh
pub const INGRESS_NETWORK: &str = "ingress";
/// Network modes whose primary container IP is directly reachable
pub const BUILTIN_NETWORK_MODES: [&str; 3] = ["bridge", "default", "host"];
