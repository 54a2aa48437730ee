//! Value-stream map nodes

use crate::registry;
use crate::value_objects::{AttributeBag, NodeId, NodeKind, Position2D, Symbol, SymbolRole};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node of a value-stream map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VsmNode {
    /// Unique identifier within the map
    pub id: NodeId,
    /// Coarse type tag
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Canvas position
    #[serde(default)]
    pub position: Position2D,
    /// Open attribute bag, refined by its `symbolType`
    #[serde(default)]
    pub data: AttributeBag,
    /// Presentation keys the domain does not interpret (width, selected, ...)
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl VsmNode {
    /// Create a node with an empty data bag
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, position: Position2D) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data: AttributeBag::new(),
            extra: IndexMap::new(),
        }
    }

    /// Create a node for a palette symbol, seeded with the registry defaults
    pub fn from_symbol(id: impl Into<NodeId>, symbol: &Symbol, position: Position2D) -> Self {
        Self {
            data: registry::default_data(symbol),
            ..Self::new(id, registry::node_kind(symbol), position)
        }
    }

    /// Replace the data bag
    pub fn with_data(mut self, data: AttributeBag) -> Self {
        self.data = data;
        self
    }

    /// The refined symbol: `symbolType` when present, otherwise derived from the kind
    pub fn symbol(&self) -> Symbol {
        match self.data.text("symbolType") {
            Some(s) if !s.is_empty() => Symbol::from_str(s),
            _ => match &self.kind {
                NodeKind::Process => Symbol::Process,
                NodeKind::Inventory => Symbol::Inventory,
                NodeKind::ProductionControl => Symbol::ProductionControl,
                NodeKind::TextNote => Symbol::TextNote,
                NodeKind::Generic => Symbol::CustomItem,
                NodeKind::Custom(s) => Symbol::Custom(s.clone()),
            },
        }
    }

    /// Process boxes and project-linked steps carry cycle time
    pub fn is_processing(&self) -> bool {
        self.kind == NodeKind::Process || self.symbol() == Symbol::Project
    }

    /// Stock whose quantity converts to lead time through Little's Law
    pub fn holds_lead_time_stock(&self) -> bool {
        self.kind == NodeKind::Inventory || self.symbol() == Symbol::FinishedGoods
    }

    /// Customer nodes set demand and the plant calendar
    pub fn is_customer(&self) -> bool {
        self.symbol().role() == SymbolRole::Customer
    }

    /// Display name, falling back to the label and then the id
    pub fn display_name(&self) -> &str {
        self.data
            .text("name")
            .filter(|name| !name.is_empty())
            .or_else(|| self.data.text("label"))
            .unwrap_or_else(|| self.id.as_str())
    }

    /// Cycle time in seconds
    pub fn cycle_time(&self) -> f64 {
        self.data.number("ct")
    }

    /// Value-added time in seconds, defaulting to the cycle time
    pub fn value_added_time(&self) -> f64 {
        self.data.number_or("va", self.cycle_time())
    }
}
