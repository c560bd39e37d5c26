use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Container inspection record as returned by the runtime
///
/// Field names follow the runtime's JSON so that records deserialize directly
/// from inspection output and template paths like `.Config.Hostname` resolve
/// against the serialized form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Container {
    /// Full container id
    #[serde(rename(serialize = "ID", deserialize = "Id"), alias = "ID")]
    pub id: String,

    /// Container name, with the leading `/` the runtime reports
    #[serde(default)]
    pub name: String,

    /// Image id the container was created from
    #[serde(default)]
    pub image: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub config: ContainerConfig,

    #[serde(default, deserialize_with = "null_as_default")]
    pub host_config: HostConfig,

    #[serde(default, deserialize_with = "null_as_default")]
    pub network_settings: NetworkSettings,
}

impl Container {
    /// First 12 characters of the id, as shown by runtime tooling
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(12) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    /// Container name without the leading `/`
    pub fn bare_name(&self) -> &str {
        self.name.strip_prefix('/').unwrap_or(&self.name)
    }
}

/// Creation-time configuration of a container
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerConfig {
    #[serde(default)]
    pub hostname: String,

    #[serde(default)]
    pub user: String,

    /// Image reference as requested, e.g. `registry/org/redis:7`
    #[serde(default)]
    pub image: String,

    /// Environment as `KEY=VALUE` strings
    #[serde(default, deserialize_with = "null_as_default")]
    pub env: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,

    /// Ports declared by the image or at creation, keyed by `port/proto`
    #[serde(default, deserialize_with = "null_as_default")]
    pub exposed_ports: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    /// `bridge`, `default`, `host`, or the name of a user-defined network
    #[serde(default)]
    pub network_mode: String,
}

/// Runtime network state of a container
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkSettings {
    /// Primary container IP, empty outside the default bridge
    #[serde(rename = "IPAddress", default)]
    pub ip_address: String,

    /// Published bindings keyed by internal `port/proto`
    #[serde(default, deserialize_with = "null_as_default")]
    pub ports: BTreeMap<String, Option<Vec<PortBinding>>>,

    /// Attached networks keyed by network name
    #[serde(default, deserialize_with = "null_as_default")]
    pub networks: BTreeMap<String, EndpointSettings>,
}

/// A container's attachment to one network
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointSettings {
    #[serde(rename = "IPAddress", default)]
    pub ip_address: String,

    #[serde(rename = "NetworkID", default)]
    pub network_id: String,

    #[serde(default)]
    pub gateway: String,
}

/// Host-side address a container port is published on
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    #[serde(
        rename(serialize = "HostIP", deserialize = "HostIp"),
        alias = "HostIP",
        default
    )]
    pub host_ip: String,

    #[serde(rename = "HostPort", default)]
    pub host_port: String,
}

/// Internal container port in `number/proto` form, e.g. `8080/tcp`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(String);

impl Port {
    pub fn new(port: impl Into<String>) -> Self {
        Self(port.into())
    }

    /// Port number part
    pub fn port(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(port, _)| port)
    }

    /// Protocol part, `tcp` when unspecified
    pub fn proto(&self) -> &str {
        match self.0.split_once('/') {
            Some((_, proto)) if !proto.is_empty() => proto,
            _ => "tcp",
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Port {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Port {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// The runtime reports empty collections as `null`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
