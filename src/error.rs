//! Error types for graph ingestion

use crate::graph::{LinkId, NodeId, PinDirection, PinId};
use thiserror::Error;

/// A snapshot that violates referential integrity
///
/// Fatal to the run: returned before any rule is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedGraph {
    #[error("duplicate node id '{0}'")]
    DuplicateNode(NodeId),

    #[error("duplicate pin id '{0}'")]
    DuplicatePin(PinId),

    #[error("duplicate link id '{0}'")]
    DuplicateLink(LinkId),

    #[error("pin '{pin}' names unknown owner node '{owner}'")]
    UnknownOwner { pin: PinId, owner: NodeId },

    #[error("pin '{pin}' declares owner '{declared}' but is nested under node '{nested}'")]
    OwnerMismatch {
        pin: PinId,
        declared: NodeId,
        nested: NodeId,
    },

    #[error("link '{link}' references unknown pin '{pin}'")]
    UnknownPin { link: LinkId, pin: PinId },

    #[error("link '{link}' must run from an output pin to an input pin (got {from_dir} -> {to_dir})")]
    DirectionMismatch {
        link: LinkId,
        from_dir: PinDirection,
        to_dir: PinDirection,
    },

    #[error("link '{link}' connects execution pin to data pin ('{from}' -> '{to}')")]
    KindMismatch { link: LinkId, from: PinId, to: PinId },

    #[error("execution input pin '{pin}' has {count} incoming links")]
    ExecFanIn { pin: PinId, count: usize },
}
