//! Whole-map payloads and the replace/merge contract
//!
//! Templates, generated maps, generative results and imported documents all arrive as a
//! [`GraphPayload`]. The caller adopts one either by replacing the current map or by
//! merging it to the right of the current map with every id suffixed.

use crate::aggregate::{ValueStreamMap, VsmEdge, VsmNode};
use crate::commands::VsmResult;
use crate::value_objects::{number_value, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Nodes, edges and an optional takt, as produced outside the map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<VsmNode>,
    #[serde(default)]
    pub edges: Vec<VsmEdge>,
    /// Takt the payload was built for, seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_takt: Option<f64>,
}

/// How a payload is adopted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportMode {
    /// Discard the current map and adopt the payload
    #[default]
    Replace,
    /// Offset the payload past the current map and union the collections
    Merge,
}

impl GraphPayload {
    /// Create a payload
    pub fn new(nodes: Vec<VsmNode>, edges: Vec<VsmEdge>, global_takt: Option<f64>) -> Self {
        Self {
            nodes,
            edges,
            global_takt,
        }
    }

    /// Parse a `{nodes, edges, globalTakt}` JSON payload
    pub fn from_json_str(json: &str) -> VsmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write `globalTakt` onto every node
    pub fn stamp_takt(&mut self, takt: f64) {
        for node in &mut self.nodes {
            node.data.set("globalTakt", number_value(takt));
        }
    }

    /// Prepare the payload for merging into `existing`
    ///
    /// Nodes are shifted right by the current map's rightmost x plus `gap`. Every node and edge
    /// id gets `-{suffix}` appended (plus a counter should that still collide), and edge
    /// endpoints are remapped to the new node ids. Endpoints the payload does not define keep
    /// their original id.
    pub fn offset_for_merge(self, existing: &ValueStreamMap, gap: f64, suffix: &str) -> Self {
        let offset = existing.max_x().unwrap_or(0.0) + gap;

        let mut taken_nodes = existing.node_ids();
        let mut node_ids: HashMap<NodeId, NodeId> = HashMap::with_capacity(self.nodes.len());
        let nodes: Vec<VsmNode> = self
            .nodes
            .into_iter()
            .map(|mut node| {
                let fresh = unique(&node.id.with_suffix(suffix), &mut taken_nodes, |id, n| {
                    id.with_suffix(&n.to_string())
                });
                node_ids.insert(node.id.clone(), fresh.clone());
                node.id = fresh;
                node.position = node.position.offset_x(offset);
                node
            })
            .collect();

        let mut taken_edges = existing.edge_ids();
        let edges: Vec<VsmEdge> = self
            .edges
            .into_iter()
            .map(|mut edge| {
                edge.id = unique(&edge.id.with_suffix(suffix), &mut taken_edges, |id, n| {
                    id.with_suffix(&n.to_string())
                });
                if let Some(source) = node_ids.get(&edge.source) {
                    edge.source = source.clone();
                }
                if let Some(target) = node_ids.get(&edge.target) {
                    edge.target = target.clone();
                }
                edge
            })
            .collect();

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            offset_x = offset,
            "Prepared payload for merge"
        );
        Self {
            nodes,
            edges,
            global_takt: self.global_takt,
        }
    }
}

fn unique<T, F>(candidate: &T, taken: &mut HashSet<T>, bump: F) -> T
where
    T: Clone + Eq + std::hash::Hash,
    F: Fn(&T, u32) -> T,
{
    let mut id = candidate.clone();
    let mut n = 1;
    while taken.contains(&id) {
        id = bump(candidate, n);
        n += 1;
    }
    taken.insert(id.clone());
    id
}

/// Timestamp suffix used for merged ids
pub fn merge_suffix() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{NodeKind, Position2D};

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     P[GraphPayload] --> S[stamp_takt]
    ///     P --> M[offset_for_merge]
    ///     M --> O[x offset]
    ///     M --> R[endpoint remap]
    ///     M --> U[id uniqueness]
    /// ```

    fn node(id: &str, x: f64) -> VsmNode {
        VsmNode::new(id, NodeKind::Process, Position2D::new(x, 10.0))
    }

    #[test]
    fn test_merge_offsets_and_remaps() {
        let existing = ValueStreamMap::from_parts(vec![node("a", 100.0), node("b", 700.0)], vec![]);
        let payload = GraphPayload::new(
            vec![node("a", 0.0), node("b", 50.0)],
            vec![VsmEdge::new("ab", "a", "b")],
            None,
        );

        let merged = payload.offset_for_merge(&existing, 300.0, "1700000000000");
        assert_eq!(merged.nodes[0].id.as_str(), "a-1700000000000");
        assert_eq!(merged.nodes[0].position.x, 1000.0);
        assert_eq!(merged.nodes[1].position.x, 1050.0);
        assert_eq!(merged.nodes[1].position.y, 10.0);
        assert_eq!(merged.edges[0].id.as_str(), "ab-1700000000000");
        assert_eq!(merged.edges[0].source.as_str(), "a-1700000000000");
        assert_eq!(merged.edges[0].target.as_str(), "b-1700000000000");
    }

    #[test]
    fn test_merge_twice_with_same_suffix_stays_unique() {
        let payload = GraphPayload::new(vec![node("a", 0.0)], vec![], None);
        let mut map = ValueStreamMap::new();

        for _ in 0..3 {
            let merged = payload.clone().offset_for_merge(&map, 300.0, "42");
            for n in merged.nodes {
                map.add_node(n).unwrap();
            }
        }
        assert_eq!(map.node_count(), 3);
        assert!(map.contains_node(&NodeId::new("a-42-1")));
    }

    #[test]
    fn test_merge_into_empty_map_uses_gap_only() {
        let merged = GraphPayload::new(vec![node("a", 5.0)], vec![], None).offset_for_merge(
            &ValueStreamMap::new(),
            400.0,
            "x",
        );
        assert_eq!(merged.nodes[0].position.x, 405.0);
    }

    #[test]
    fn test_stamp_takt() {
        let mut payload = GraphPayload::new(vec![node("a", 0.0)], vec![], Some(45.0));
        payload.stamp_takt(45.0);
        assert_eq!(payload.nodes[0].data.number("globalTakt"), 45.0);
    }
}
