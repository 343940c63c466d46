//! Serializable graph snapshot, the input document of an analysis run
//!
//! Pins are nested under their owning node. Kind names stay as strings here
//! and are classified during ingestion, so unknown editor kinds survive as
//! `Other(..)` instead of failing to parse.

use super::model::PinDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub entry: bool,
    #[serde(default)]
    pub pins: Vec<PinRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinRecord {
    pub id: String,
    /// Optional explicit owner; must match the enclosing node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub direction: PinDirection,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Synthesised as `link-<index>` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub from: String,
    pub to: String,
}

impl GraphSnapshot {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_node(mut self, node: NodeRecord) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a link with a synthesised id
    pub fn with_link(mut self, from: &str, to: &str) -> Self {
        self.links.push(LinkRecord {
            id: None,
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl NodeRecord {
    pub fn new(id: &str, kind: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            title: None,
            properties: BTreeMap::new(),
            entry: false,
            pins: Vec::new(),
        }
    }

    pub fn entry(mut self) -> Self {
        self.entry = true;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_property(mut self, key: &str, value: serde_json::Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    pub fn with_pin(mut self, pin: PinRecord) -> Self {
        self.pins.push(pin);
        self
    }

    /// Add `<id>.exec` (input) and `<id>.then` (output) execution pins
    pub fn with_exec_pins(self) -> Self {
        let input = PinRecord::new(&format!("{}.exec", self.id), PinDirection::Input, "exec");
        let output = PinRecord::new(&format!("{}.then", self.id), PinDirection::Output, "exec");
        self.with_pin(input).with_pin(output)
    }
}

impl PinRecord {
    pub fn new(id: &str, direction: PinDirection, kind: &str) -> Self {
        Self {
            id: id.to_string(),
            owner: None,
            name: None,
            direction,
            kind: kind.to_string(),
            default_value: None,
            optional: false,
        }
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = Some(owner.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_document() {
        let json = r#"{
            "id": "BP_Door",
            "source": "/Game/Blueprints/BP_Door",
            "timestamp": "2025-01-01T00:00:00Z",
            "nodes": [
                {"id": "n1", "kind": "Event", "title": "BeginPlay",
                 "properties": {"function": "ReceiveBeginPlay"},
                 "pins": [{"id": "n1.then", "direction": "output", "kind": "exec"}]},
                {"id": "n2", "kind": "FunctionCall",
                 "pins": [{"id": "n2.exec", "direction": "in", "kind": "exec"}]}
            ],
            "links": [{"from": "n1.then", "to": "n2.exec"}]
        }"#;

        let snapshot = GraphSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.id, "BP_Door");
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[1].pins[0].direction, PinDirection::Input);
        assert!(snapshot.links[0].id.is_none());
        assert_eq!(
            snapshot.timestamp.map(|t| t.to_rfc3339()),
            Some("2025-01-01T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_exec_pin_helper() {
        let node = NodeRecord::new("b", "Branch").with_exec_pins();
        let ids: Vec<&str> = node.pins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b.exec", "b.then"]);
    }
}
