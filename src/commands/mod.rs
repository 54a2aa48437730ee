//! Value-stream map commands
//!
//! Commands represent intent to modify a value-stream map. They are executed by the
//! [`VsmWorkspace`](crate::workspace::VsmWorkspace), which applies them to the map, records a
//! history commit point and emits the corresponding events.

use crate::aggregate::{VsmEdge, VsmNode};
use crate::generator::{GraphPayload, ImportMode};
use crate::value_objects::{AttributeBag, EdgeId, FlowKind, NodeId, Position2D, Symbol};
use serde::{Deserialize, Serialize};

/// Commands for value-stream map operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VsmCommand {
    /// Place a symbol from the palette
    PlaceSymbol {
        /// The symbol to place
        symbol: Symbol,
        /// Where to place it
        position: Position2D,
    },

    /// Add a fully formed node
    AddNode {
        /// The node to add
        node: VsmNode,
    },

    /// Connect two nodes using the styling of the given flow kind
    Connect {
        /// Upstream node
        source: NodeId,
        /// Downstream node
        target: NodeId,
        /// Material, information or electronic flow
        flow: FlowKind,
    },

    /// Add a fully formed edge
    AddEdge {
        /// The edge to add
        edge: VsmEdge,
    },

    /// Write one attribute of a node, applying field coupling rules
    UpdateNodeData {
        /// The node to update
        node_id: NodeId,
        /// Attribute key
        field: String,
        /// New value
        value: serde_json::Value,
    },

    /// Overlay several attributes of a node
    PatchNodeData {
        /// The node to update
        node_id: NodeId,
        /// Attributes to overlay
        patch: AttributeBag,
    },

    /// Move a node on the canvas
    MoveNode {
        /// The node to move
        node_id: NodeId,
        /// New position
        position: Position2D,
    },

    /// Remove a node and every edge touching it
    RemoveNode {
        /// The node to remove
        node_id: NodeId,
    },

    /// Remove an edge
    RemoveEdge {
        /// The edge to remove
        edge_id: EdgeId,
    },

    /// Set the takt time by hand
    SetGlobalTakt {
        /// Takt time in seconds
        takt: f64,
    },

    /// Replace or merge a graph payload (template, generator output, generative result)
    ApplyPayload {
        /// The payload to apply
        payload: GraphPayload,
        /// Replace the map or merge beside it
        mode: ImportMode,
        /// Horizontal gap between the current map and merged content
        gap: Option<f64>,
    },
}

/// Result type for value-stream map operations
pub type VsmResult<T> = Result<T, VsmError>;

/// Errors that can occur while working on a value-stream map
#[derive(Debug, thiserror::Error)]
pub enum VsmError {
    /// Malformed input such as an import document without node or edge arrays
    #[error("Validation error: {0}")]
    Validation(String),

    /// A structural invariant of the map would be broken
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Unknown template identifier
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// A collaborator (persistence, project link, generative service) failed
    #[error("External service error: {0}")]
    ExternalService(String),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
