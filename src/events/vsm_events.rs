//! Value-stream map events

use crate::value_objects::{EdgeId, FlowKind, NodeId, NodeKind, Position2D, Symbol};
use serde::{Deserialize, Serialize};

/// Node added event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAdded {
    /// The new node
    pub node_id: NodeId,
    /// Coarse type of the node
    pub kind: NodeKind,
    /// Refined symbol of the node
    pub symbol: Symbol,
}

/// Node data changed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdated {
    /// The changed node
    pub node_id: NodeId,
    /// Keys that were written, including coupled fields
    pub fields: Vec<String>,
}

/// Node moved event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMoved {
    pub node_id: NodeId,
    pub position: Position2D,
}

/// Node removed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRemoved {
    /// The removed node
    pub node_id: NodeId,
    /// Edges removed with it
    pub cascaded_edges: Vec<EdgeId>,
}

/// Edge added event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAdded {
    pub edge_id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub flow: FlowKind,
}

/// Edge removed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRemoved {
    pub edge_id: EdgeId,
}

/// Where a takt value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaktSource {
    /// Entered by the analyst
    Manual,
    /// Derived from customer demand
    Calculated,
    /// Carried by a template, document or generated payload
    Imported,
}

/// Visible takt changed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaktChanged {
    pub previous: f64,
    pub current: f64,
    pub source: TaktSource,
}

/// Whole-map replacement or merge event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLoaded {
    /// Nodes adopted from the payload
    pub nodes: usize,
    /// Edges adopted from the payload
    pub edges: usize,
    /// Payload edges dropped for dangling endpoints or repeated ids
    pub dropped_edges: usize,
    /// Whether the payload was merged rather than replacing the map
    pub merged: bool,
}

/// Enum wrapper for value-stream map events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VsmEvent {
    /// A node was added
    NodeAdded(NodeAdded),
    /// A node's data changed
    NodeUpdated(NodeUpdated),
    /// A node was moved
    NodeMoved(NodeMoved),
    /// A node and its edges were removed
    NodeRemoved(NodeRemoved),
    /// An edge was added
    EdgeAdded(EdgeAdded),
    /// An edge was removed
    EdgeRemoved(EdgeRemoved),
    /// The visible takt changed
    TaktChanged(TaktChanged),
    /// A payload replaced or was merged into the map
    MapLoaded(MapLoaded),
}

impl VsmEvent {
    /// Stable event name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NodeAdded(_) => "NodeAdded",
            Self::NodeUpdated(_) => "NodeUpdated",
            Self::NodeMoved(_) => "NodeMoved",
            Self::NodeRemoved(_) => "NodeRemoved",
            Self::EdgeAdded(_) => "EdgeAdded",
            Self::EdgeRemoved(_) => "EdgeRemoved",
            Self::TaktChanged(_) => "TaktChanged",
            Self::MapLoaded(_) => "MapLoaded",
        }
    }

    /// Node the event is about, if any
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::NodeAdded(e) => Some(&e.node_id),
            Self::NodeUpdated(e) => Some(&e.node_id),
            Self::NodeMoved(e) => Some(&e.node_id),
            Self::NodeRemoved(e) => Some(&e.node_id),
            _ => None,
        }
    }
}
