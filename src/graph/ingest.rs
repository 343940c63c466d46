//! Snapshot validation and index construction

use super::model::{Graph, GraphMetadata, Link, LinkId, Node, NodeId, NodeKind, Pin, PinDirection, PinId, PinKind};
use super::snapshot::GraphSnapshot;
use crate::error::MalformedGraph;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// How execution input pins with several incoming links are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanInPolicy {
    /// Accepted silently
    Allow,
    /// Accepted, reported by the `exec-fan-in` rule
    #[default]
    Warn,
    /// Rejected at ingestion
    Reject,
}

impl std::str::FromStr for FanInPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" => Ok(FanInPolicy::Allow),
            "warn" => Ok(FanInPolicy::Warn),
            "reject" => Ok(FanInPolicy::Reject),
            other => Err(format!(
                "Unknown fan-in policy '{}'. Valid policies: allow, warn, reject",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    pub exec_fan_in: FanInPolicy,
}

/// Ingest with default options
pub fn ingest(snapshot: &GraphSnapshot) -> Result<Graph, MalformedGraph> {
    ingest_with(snapshot, IngestOptions::default())
}

/// Validate referential integrity and build the lookup indices
///
/// Checks run in document order, so the first violation in the snapshot is
/// the one reported.
pub fn ingest_with(snapshot: &GraphSnapshot, options: IngestOptions) -> Result<Graph, MalformedGraph> {
    let mut nodes: FxHashMap<NodeId, Node> = FxHashMap::default();
    let mut pins: FxHashMap<PinId, Pin> = FxHashMap::default();
    let mut links: FxHashMap<LinkId, Link> = FxHashMap::default();

    // Pass 1: node ids, so explicit pin owners can be resolved regardless of order
    let mut node_ids: FxHashSet<&str> = FxHashSet::default();
    for record in &snapshot.nodes {
        if !node_ids.insert(record.id.as_str()) {
            return Err(MalformedGraph::DuplicateNode(NodeId::new(record.id.clone())));
        }
    }

    // Pass 2: nodes and their pins
    for record in &snapshot.nodes {
        let node_id = NodeId::new(record.id.clone());
        let mut owned = Vec::with_capacity(record.pins.len());

        for pin in &record.pins {
            let pin_id = PinId::new(pin.id.clone());
            if pins.contains_key(&pin_id) {
                return Err(MalformedGraph::DuplicatePin(pin_id));
            }
            if let Some(owner) = &pin.owner {
                if !node_ids.contains(owner.as_str()) {
                    return Err(MalformedGraph::UnknownOwner {
                        pin: pin_id,
                        owner: NodeId::new(owner.clone()),
                    });
                }
                if owner != &record.id {
                    return Err(MalformedGraph::OwnerMismatch {
                        pin: pin_id,
                        declared: NodeId::new(owner.clone()),
                        nested: node_id,
                    });
                }
            }

            owned.push(pin_id.clone());
            pins.insert(
                pin_id.clone(),
                Pin {
                    id: pin_id,
                    owner: node_id.clone(),
                    name: pin.name.clone(),
                    direction: pin.direction,
                    kind: PinKind::parse(&pin.kind),
                    default_value: pin.default_value.clone(),
                    optional: pin.optional,
                    links: BTreeSet::new(),
                },
            );
        }

        nodes.insert(
            node_id.clone(),
            Node {
                id: node_id,
                kind: NodeKind::parse(&record.kind),
                title: record.title.clone(),
                properties: record.properties.clone(),
                pins: owned,
                entry: record.entry,
            },
        );
    }

    // Pass 3: links
    let mut outgoing: FxHashMap<NodeId, Vec<LinkId>> = FxHashMap::default();
    let mut incoming: FxHashMap<NodeId, Vec<LinkId>> = FxHashMap::default();

    for (index, record) in snapshot.links.iter().enumerate() {
        let link_id = match &record.id {
            Some(id) => LinkId::new(id.clone()),
            None => LinkId::new(format!("link-{}", index)),
        };
        if links.contains_key(&link_id) {
            return Err(MalformedGraph::DuplicateLink(link_id));
        }

        let source_id = PinId::new(record.from.clone());
        let target_id = PinId::new(record.to.clone());
        let source = pins.get(&source_id).ok_or_else(|| MalformedGraph::UnknownPin {
            link: link_id.clone(),
            pin: source_id.clone(),
        })?;
        let target = pins.get(&target_id).ok_or_else(|| MalformedGraph::UnknownPin {
            link: link_id.clone(),
            pin: target_id.clone(),
        })?;

        if source.direction != PinDirection::Output || target.direction != PinDirection::Input {
            return Err(MalformedGraph::DirectionMismatch {
                link: link_id,
                from_dir: source.direction,
                to_dir: target.direction,
            });
        }
        if source.is_exec() != target.is_exec() {
            return Err(MalformedGraph::KindMismatch {
                link: link_id,
                from: source_id,
                to: target_id,
            });
        }

        let source_owner = source.owner.clone();
        let target_owner = target.owner.clone();

        if let Some(pin) = pins.get_mut(&source_id) {
            pin.links.insert(link_id.clone());
        }
        if let Some(pin) = pins.get_mut(&target_id) {
            pin.links.insert(link_id.clone());
        }
        outgoing.entry(source_owner).or_default().push(link_id.clone());
        incoming.entry(target_owner).or_default().push(link_id.clone());

        links.insert(
            link_id.clone(),
            Link {
                id: link_id,
                source: source_id,
                target: target_id,
            },
        );
    }

    if options.exec_fan_in == FanInPolicy::Reject {
        let mut fan_in: Vec<&Pin> = pins
            .values()
            .filter(|p| p.is_exec() && p.direction == PinDirection::Input && p.links.len() > 1)
            .collect();
        fan_in.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(pin) = fan_in.first() {
            return Err(MalformedGraph::ExecFanIn {
                pin: pin.id.clone(),
                count: pin.links.len(),
            });
        }
    }

    for list in outgoing.values_mut().chain(incoming.values_mut()) {
        list.sort();
    }

    let mut node_order: Vec<NodeId> = nodes.keys().cloned().collect();
    node_order.sort();
    let mut link_order: Vec<LinkId> = links.keys().cloned().collect();
    link_order.sort();

    let entries: Vec<NodeId> = node_order
        .iter()
        .filter(|id| {
            nodes
                .get(*id)
                .map(|n| n.entry || n.kind.is_entry_kind())
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    debug!(
        "Ingested graph '{}': {} nodes, {} pins, {} links, {} entries",
        snapshot.id,
        nodes.len(),
        pins.len(),
        links.len(),
        entries.len()
    );

    Ok(Graph {
        id: snapshot.id.clone(),
        metadata: GraphMetadata {
            name: snapshot.name.clone(),
            source: snapshot.source.clone(),
            timestamp: snapshot.timestamp,
        },
        nodes,
        pins,
        links,
        node_order,
        link_order,
        outgoing,
        incoming,
        entries,
    })
}
