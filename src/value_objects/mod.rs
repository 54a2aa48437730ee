//! Value-stream map value objects
//!
//! Value objects are immutable types that represent concepts in the value-stream domain.
//! They are compared by value rather than identity and encapsulate domain validation.

mod attributes;
mod symbol;

pub use attributes::AttributeBag;
pub(crate) use attributes::{coerce_number, number_value};
pub use symbol::{Symbol, SymbolRole};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a node, unique within one map
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a fresh node id with the given prefix
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", uuid::Uuid::new_v4()))
    }

    /// Get the string form of the id
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a new id by appending a suffix
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}-{suffix}", self.0))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Stable identifier of an edge, unique within one map
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Create an edge id from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a fresh edge id with the given prefix
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", uuid::Uuid::new_v4()))
    }

    /// Get the string form of the id
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a new id by appending a suffix
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}-{suffix}", self.0))
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EdgeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Represents the position of a node on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

impl Position2D {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Get the distance to another position
    pub fn distance_to(&self, other: &Position2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Shift the position horizontally
    pub fn offset_x(&self, dx: f64) -> Self {
        Self::new(self.x + dx, self.y)
    }
}

impl Default for Position2D {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Coarse node type tag, refined by the `symbolType` carried in the data bag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// A process step box with cycle-time data
    Process,
    /// An inventory triangle
    Inventory,
    /// Any symbol-typed icon (supplier, customer, transport, ...)
    Generic,
    /// The production control box
    ProductionControl,
    /// A free text annotation
    TextNote,
    /// A node type this crate does not know about
    Custom(String),
}

impl NodeKind {
    /// Create a node kind from a string
    pub fn from_str(s: &str) -> Self {
        match s {
            "process" => NodeKind::Process,
            "inventory" => NodeKind::Inventory,
            "generic" => NodeKind::Generic,
            "production_control" | "productionControl" => NodeKind::ProductionControl,
            "text_note" | "textNote" => NodeKind::TextNote,
            _ => NodeKind::Custom(s.to_string()),
        }
    }

    /// Get the string representation of the node kind
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Process => "process",
            NodeKind::Inventory => "inventory",
            NodeKind::Generic => "generic",
            NodeKind::ProductionControl => "production_control",
            NodeKind::TextNote => "text_note",
            NodeKind::Custom(s) => s,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Generic
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        NodeKind::from_str(&s)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

/// What travels along an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Physical parts moving downstream
    Material,
    /// Manual schedules, kanban cards and other signals
    Information,
    /// Information sent electronically (EDI, MRP)
    Electronic,
}

impl FlowKind {
    /// Information and electronic edges both carry signals
    pub fn is_information(&self) -> bool {
        matches!(self, FlowKind::Information | FlowKind::Electronic)
    }

    /// Get the string representation of the flow kind
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::Material => "material",
            FlowKind::Information => "information",
            FlowKind::Electronic => "electronic",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for FlowKind {
    fn default() -> Self {
        FlowKind::Material
    }
}

/// Round to two decimals for display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
