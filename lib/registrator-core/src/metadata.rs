//! Service metadata resolution from container environment and labels

use registrator_api::ContainerConfig;
use std::collections::{BTreeMap, HashSet};

/// Only environment entries and labels starting with this prefix are metadata
pub const SERVICE_PREFIX: &str = "SERVICE_";

/// Metadata resolved for one exposed port of a container
///
/// Keys are lower-cased with the prefix stripped. Keys that were satisfied by
/// a port-scoped entry (`SERVICE_<port>_<key>`) are tracked separately: a
/// generic entry never replaces them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceMetadata {
    values: BTreeMap<String, String>,
    from_port: HashSet<String>,
}

impl ServiceMetadata {
    /// Resolve metadata for `port` from the container's environment, then its labels
    pub fn resolve(config: &ContainerConfig, port: &str) -> Self {
        let labels = config
            .labels
            .iter()
            .map(|(key, value)| format!("{}={}", key, value));

        let mut metadata = Self::default();
        for entry in config.env.iter().cloned().chain(labels) {
            metadata.apply(&entry, port);
        }
        metadata
    }

    fn apply(&mut self, entry: &str, port: &str) {
        let Some((name, value)) = entry.split_once('=') else {
            return;
        };
        let Some(key) = name.strip_prefix(SERVICE_PREFIX) else {
            return;
        };

        let key = key.to_lowercase();
        if self.from_port.contains(&key) {
            return;
        }

        match key.split_once('_') {
            Some((scope, scoped_key)) if scope.parse::<i64>().is_ok() => {
                if scope != port || self.from_port.contains(scoped_key) {
                    return;
                }
                self.values.insert(scoped_key.to_string(), value.to_string());
                self.from_port.insert(scoped_key.to_string());
            }
            _ => {
                self.values.insert(key, value.to_string());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for `key`, or `default` when it is missing or empty
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => default,
        }
    }

    /// Whether `key` was set by an entry scoped to the resolved port
    pub fn is_from_port(&self, key: &str) -> bool {
        self.from_port.contains(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn into_values(self) -> BTreeMap<String, String> {
        self.values
    }
}

/// Resolve the metadata for `port` of a container
pub fn service_metadata(config: &ContainerConfig, port: &str) -> ServiceMetadata {
    ServiceMetadata::resolve(config, port)
}
