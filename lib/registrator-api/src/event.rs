use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Runtime event as emitted on the events stream
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    /// Object type, e.g. `container` or `network`
    #[serde(default)]
    pub r#type: String,

    /// What happened, e.g. `start`, `die`, `kill`
    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub actor: EventActor,
}

/// Object an event refers to
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventActor {
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Free-form attributes (container labels, `signal`, `exitCode`, ...)
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}
