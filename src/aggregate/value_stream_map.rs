//! Value-stream map aggregate
//!
//! Owns the node and edge collections and enforces the structural invariants: node ids are
//! unique, edge ids are unique, and every edge references nodes of the same map.
//! Edits addressed to unknown ids are no-ops.

use super::coupling::{self, DurationLookup};
use super::{VsmEdge, VsmNode};
use crate::commands::{VsmError, VsmResult};
use crate::value_objects::{AttributeBag, EdgeId, NodeId, Position2D};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Wire form of a map: `{ nodes: [...], edges: [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MapRepr {
    #[serde(default)]
    nodes: Vec<VsmNode>,
    #[serde(default)]
    edges: Vec<VsmEdge>,
}

/// A value-stream map: nodes and the flows between them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "MapRepr", into = "MapRepr")]
pub struct ValueStreamMap {
    nodes: IndexMap<NodeId, VsmNode>,
    edges: IndexMap<EdgeId, VsmEdge>,
}

impl ValueStreamMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from collections, dropping edges that would dangle
    pub fn from_parts(nodes: Vec<VsmNode>, edges: Vec<VsmEdge>) -> Self {
        let mut map = Self::new();
        map.replace_all(nodes, edges);
        map
    }

    /// Iterate nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &VsmNode> {
        self.nodes.values()
    }

    /// Iterate edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &VsmEdge> {
        self.edges.values()
    }

    /// Look up a node
    pub fn node(&self, id: &NodeId) -> Option<&VsmNode> {
        self.nodes.get(id)
    }

    /// Look up a node for in-place mutation of its data bag or position
    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut VsmNode> {
        self.nodes.get_mut(id)
    }

    /// Mutable iteration for passes that rewrite data bags
    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut VsmNode> {
        self.nodes.values_mut()
    }

    /// Mutable iteration for passes that rewrite edge data bags
    pub(crate) fn edges_mut(&mut self) -> impl Iterator<Item = &mut VsmEdge> {
        self.edges.values_mut()
    }

    /// Look up an edge
    pub fn edge(&self, id: &EdgeId) -> Option<&VsmEdge> {
        self.edges.get(id)
    }

    /// Whether a node with this id exists
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether an edge with this id exists
    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the map has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node; the id must be unused
    pub fn add_node(&mut self, node: VsmNode) -> VsmResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(VsmError::ConstraintViolation(format!(
                "Node {} already exists",
                node.id
            )));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Add an edge; the id must be unused and both endpoints must exist
    pub fn add_edge(&mut self, edge: VsmEdge) -> VsmResult<()> {
        if self.edges.contains_key(&edge.id) {
            return Err(VsmError::ConstraintViolation(format!(
                "Edge {} already exists",
                edge.id
            )));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(VsmError::ConstraintViolation(format!(
                    "Edge {} references missing node {}",
                    edge.id, endpoint
                )));
            }
        }
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    /// Write one data field, applying the coupling rules; returns whether the node exists
    pub fn update_node_data(
        &mut self,
        id: &NodeId,
        field: &str,
        value: Value,
        projects: &dyn DurationLookup,
    ) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                coupling::apply(&mut node.data, field, value, projects);
                true
            }
            None => false,
        }
    }

    /// Overlay a patch onto a node's data without coupling; returns whether the node exists
    pub fn patch_node_data(&mut self, id: &NodeId, patch: &AttributeBag) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.data.merge(patch);
                true
            }
            None => false,
        }
    }

    /// Move a node; returns whether the node exists
    pub fn move_node(&mut self, id: &NodeId, position: Position2D) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, id: &NodeId) -> Option<VsmNode> {
        let node = self.nodes.shift_remove(id)?;
        let before = self.edges.len();
        self.edges.retain(|_, edge| !edge.touches(id));
        debug!(
            node_id = %id,
            cascaded_edges = before - self.edges.len(),
            "Removed node"
        );
        Some(node)
    }

    /// Remove an edge
    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<VsmEdge> {
        self.edges.shift_remove(id)
    }

    /// Replace both collections
    ///
    /// A repeated node id keeps the later node. Edges with a repeated id or an endpoint
    /// missing from `nodes` are dropped; the number of dropped edges is returned.
    pub fn replace_all(&mut self, nodes: Vec<VsmNode>, edges: Vec<VsmEdge>) -> usize {
        self.nodes = nodes.into_iter().map(|node| (node.id.clone(), node)).collect();
        self.edges = IndexMap::with_capacity(edges.len());
        let mut dropped = 0;
        for edge in edges {
            let dangling =
                !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target);
            if dangling || self.edges.contains_key(&edge.id) {
                warn!(
                    edge_id = %edge.id,
                    source = %edge.source,
                    target = %edge.target,
                    "Dropping edge that would break map invariants"
                );
                dropped += 1;
                continue;
            }
            self.edges.insert(edge.id.clone(), edge);
        }
        dropped
    }

    /// Rightmost node x coordinate
    pub fn max_x(&self) -> Option<f64> {
        self.nodes
            .values()
            .map(|node| node.position.x)
            .fold(None, |max, x| Some(max.map_or(x, |m: f64| m.max(x))))
    }

    /// Edges ending at a node
    pub fn incoming<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a VsmEdge> + 'a {
        self.edges.values().filter(move |edge| &edge.target == id)
    }

    /// Edges starting at a node
    pub fn outgoing<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a VsmEdge> + 'a {
        self.edges.values().filter(move |edge| &edge.source == id)
    }

    /// Every node id
    pub fn node_ids(&self) -> HashSet<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    /// Every edge id
    pub fn edge_ids(&self) -> HashSet<EdgeId> {
        self.edges.keys().cloned().collect()
    }

    /// Clone the collections out
    pub fn to_parts(&self) -> (Vec<VsmNode>, Vec<VsmEdge>) {
        (
            self.nodes.values().cloned().collect(),
            self.edges.values().cloned().collect(),
        )
    }
}

impl From<MapRepr> for ValueStreamMap {
    fn from(repr: MapRepr) -> Self {
        Self::from_parts(repr.nodes, repr.edges)
    }
}

impl From<ValueStreamMap> for MapRepr {
    fn from(map: ValueStreamMap) -> Self {
        Self {
            nodes: map.nodes.into_values().collect(),
            edges: map.edges.into_values().collect(),
        }
    }
}
