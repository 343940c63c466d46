//! Graph model for visual-scripting programs
//!
//! A snapshot document is validated and indexed by [`ingest`] into an
//! immutable [`Graph`]. Everything downstream reads the graph by reference.

pub mod ingest;
pub mod model;
pub mod snapshot;

pub use ingest::{ingest, ingest_with, FanInPolicy, IngestOptions};
pub use model::{
    Graph, GraphMetadata, Link, LinkFlow, LinkId, Node, NodeId, NodeKind, Pin, PinDirection,
    PinId, PinKind,
};
pub use snapshot::{GraphSnapshot, LinkRecord, NodeRecord, PinRecord};
