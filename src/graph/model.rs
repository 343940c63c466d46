//! In-memory graph model: nodes, pins, links and the frozen `Graph`
//!
//! Cross-references are ids into graph-owned tables. A pin names its owning
//! node by id, a link names its two pins by id; nothing holds a reference
//! back into the graph, so ownership runs one way only.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Unique node identifier within one graph
    NodeId
);
string_id!(
    /// Unique pin identifier within one graph
    PinId
);
string_id!(
    /// Unique link identifier within one graph
    LinkId
);

/// Node categories of a visual-scripting graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Event,
    FunctionEntry,
    FunctionResult,
    FunctionCall,
    VariableGet,
    VariableSet,
    Branch,
    Loop,
    Sequence,
    Macro,
    Other(String),
}

impl NodeKind {
    /// Parse a kind name in PascalCase, snake_case or kebab-case
    pub fn parse(name: &str) -> Self {
        match crate::models::kebab_case(name).as_str() {
            "event" | "custom-event" => NodeKind::Event,
            "function-entry" | "entry" => NodeKind::FunctionEntry,
            "function-result" | "return" => NodeKind::FunctionResult,
            "function-call" | "call-function" | "call" => NodeKind::FunctionCall,
            "variable-get" | "get" => NodeKind::VariableGet,
            "variable-set" | "set" => NodeKind::VariableSet,
            "branch" | "if-then-else" => NodeKind::Branch,
            "loop" | "for-loop" | "for-each-loop" | "while-loop" => NodeKind::Loop,
            "sequence" | "execution-sequence" => NodeKind::Sequence,
            "macro" | "macro-instance" => NodeKind::Macro,
            _ => NodeKind::Other(name.trim().to_string()),
        }
    }

    /// Kinds that start execution on their own
    pub fn is_entry_kind(&self) -> bool {
        matches!(self, NodeKind::Event | NodeKind::FunctionEntry)
    }

    pub fn name(&self) -> &str {
        match self {
            NodeKind::Event => "Event",
            NodeKind::FunctionEntry => "FunctionEntry",
            NodeKind::FunctionResult => "FunctionResult",
            NodeKind::FunctionCall => "FunctionCall",
            NodeKind::VariableGet => "VariableGet",
            NodeKind::VariableSet => "VariableSet",
            NodeKind::Branch => "Branch",
            NodeKind::Loop => "Loop",
            NodeKind::Sequence => "Sequence",
            NodeKind::Macro => "Macro",
            NodeKind::Other(name) => name,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Data-kind tag of a pin
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PinKind {
    Exec,
    Bool,
    Int,
    Float,
    String,
    Name,
    Text,
    Object,
    Struct,
    Enum,
    Wildcard,
    Other(String),
}

impl PinKind {
    pub fn parse(name: &str) -> Self {
        match crate::models::kebab_case(name).as_str() {
            "exec" | "execution" | "then" => PinKind::Exec,
            "bool" | "boolean" => PinKind::Bool,
            "int" | "integer" | "int64" | "byte" => PinKind::Int,
            "float" | "real" | "double" => PinKind::Float,
            "string" => PinKind::String,
            "name" => PinKind::Name,
            "text" => PinKind::Text,
            "object" | "class" | "soft-object" => PinKind::Object,
            "struct" => PinKind::Struct,
            "enum" => PinKind::Enum,
            "wildcard" | "any" => PinKind::Wildcard,
            _ => PinKind::Other(name.trim().to_string()),
        }
    }

    pub fn is_exec(&self) -> bool {
        matches!(self, PinKind::Exec)
    }
}

impl std::fmt::Display for PinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinKind::Exec => f.write_str("exec"),
            PinKind::Bool => f.write_str("bool"),
            PinKind::Int => f.write_str("int"),
            PinKind::Float => f.write_str("float"),
            PinKind::String => f.write_str("string"),
            PinKind::Name => f.write_str("name"),
            PinKind::Text => f.write_str("text"),
            PinKind::Object => f.write_str("object"),
            PinKind::Struct => f.write_str("struct"),
            PinKind::Enum => f.write_str("enum"),
            PinKind::Wildcard => f.write_str("wildcard"),
            PinKind::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    #[serde(alias = "in")]
    Input,
    #[serde(alias = "out")]
    Output,
}

impl std::fmt::Display for PinDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinDirection::Input => f.write_str("input"),
            PinDirection::Output => f.write_str("output"),
        }
    }
}

/// A node in the graph
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub title: Option<String>,
    pub properties: BTreeMap<String, serde_json::Value>,
    /// Owned pins, in declaration order
    pub pins: Vec<PinId>,
    /// Explicit entry marker from the snapshot
    pub entry: bool,
}

impl Node {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.properties.get(key).and_then(|v| v.as_bool())
    }

    /// Display label: title if present, else the id
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(self.id.as_str())
    }
}

/// A pin owned by a node
#[derive(Debug, Clone)]
pub struct Pin {
    pub id: PinId,
    pub owner: NodeId,
    pub name: Option<String>,
    pub direction: PinDirection,
    pub kind: PinKind,
    pub default_value: Option<String>,
    pub optional: bool,
    /// Connected links
    pub links: BTreeSet<LinkId>,
}

impl Pin {
    pub fn is_exec(&self) -> bool {
        self.kind.is_exec()
    }

    /// A data input without a default that must be fed by a link
    pub fn is_required_input(&self) -> bool {
        self.direction == PinDirection::Input
            && !self.is_exec()
            && self.default_value.is_none()
            && !self.optional
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Whether a link carries control flow or data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkFlow {
    Exec,
    Data,
}

/// A directed link from an output pin to an input pin
#[derive(Debug, Clone)]
pub struct Link {
    pub id: LinkId,
    pub source: PinId,
    pub target: PinId,
}

/// Descriptive metadata of an analysed graph
#[derive(Debug, Clone, Default)]
pub struct GraphMetadata {
    pub name: Option<String>,
    pub source: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Frozen graph with O(1) lookup indices
///
/// Built by [`super::ingest`]; no method mutates it afterwards.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) id: String,
    pub(crate) metadata: GraphMetadata,
    pub(crate) nodes: FxHashMap<NodeId, Node>,
    pub(crate) pins: FxHashMap<PinId, Pin>,
    pub(crate) links: FxHashMap<LinkId, Link>,
    /// Node ids in ascending order
    pub(crate) node_order: Vec<NodeId>,
    /// Link ids in ascending order
    pub(crate) link_order: Vec<LinkId>,
    pub(crate) outgoing: FxHashMap<NodeId, Vec<LinkId>>,
    pub(crate) incoming: FxHashMap<NodeId, Vec<LinkId>>,
    pub(crate) entries: Vec<NodeId>,
}

impl Graph {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn metadata(&self) -> &GraphMetadata {
        &self.metadata
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn pin(&self, id: &PinId) -> Option<&Pin> {
        self.pins.get(id)
    }

    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    /// All nodes in ascending id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_order.iter().filter_map(move |id| self.nodes.get(id))
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    /// All links in ascending id order
    pub fn links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.link_order.iter().filter_map(move |id| self.links.get(id))
    }

    /// Pins owned by a node, in declaration order
    pub fn pins_of<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a Pin> + 'a {
        self.nodes
            .get(node)
            .into_iter()
            .flat_map(|n| n.pins.iter())
            .filter_map(move |p| self.pins.get(p))
    }

    pub fn owner_of(&self, pin: &PinId) -> Option<&NodeId> {
        self.pins.get(pin).map(|p| &p.owner)
    }

    /// Links leaving a node, ascending by link id
    pub fn outgoing(&self, node: &NodeId) -> &[LinkId] {
        self.outgoing.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Links entering a node, ascending by link id
    pub fn incoming(&self, node: &NodeId) -> &[LinkId] {
        self.incoming.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Source and target node of a link
    pub fn endpoints(&self, link: &Link) -> Option<(&NodeId, &NodeId)> {
        Some((self.owner_of(&link.source)?, self.owner_of(&link.target)?))
    }

    pub fn flow(&self, link: &Link) -> LinkFlow {
        match self.pins.get(&link.source) {
            Some(pin) if pin.is_exec() => LinkFlow::Exec,
            _ => LinkFlow::Data,
        }
    }

    /// Entry nodes in ascending id order
    pub fn entry_nodes(&self) -> &[NodeId] {
        &self.entries
    }

    pub fn is_entry(&self, node: &NodeId) -> bool {
        self.entries.binary_search(node).is_ok()
    }

    /// Whether a node owns at least one execution pin
    pub fn has_exec_pins(&self, node: &NodeId) -> bool {
        self.pins_of(node).any(Pin::is_exec)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
