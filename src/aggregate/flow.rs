//! Material-flow view of a map
//!
//! A petgraph digraph over the material edges only. Used for upstream reachability,
//! cycle detection and picking the path a lead-time ladder walks.

use super::ValueStreamMap;
use crate::value_objects::NodeId;
use petgraph::algo::{all_simple_paths, is_cyclic_directed};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use petgraph::Direction;
use std::collections::HashMap;

/// Directed material-flow graph
pub struct MaterialFlow {
    graph: DiGraph<NodeId, ()>,
    indices: HashMap<NodeId, NodeIndex>,
}

impl MaterialFlow {
    /// Build the material-flow graph of a map
    pub fn build(map: &ValueStreamMap) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        for node in map.nodes() {
            let index = graph.add_node(node.id.clone());
            indices.insert(node.id.clone(), index);
        }
        for edge in map.edges().filter(|edge| !edge.flow().is_information()) {
            if let (Some(&source), Some(&target)) =
                (indices.get(&edge.source), indices.get(&edge.target))
            {
                graph.add_edge(source, target, ());
            }
        }
        Self { graph, indices }
    }

    /// Every node from which material can reach `id`, excluding `id` itself
    pub fn upstream_of(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(&start) = self.indices.get(id) else {
            return Vec::new();
        };
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, start);
        let mut upstream = Vec::new();
        while let Some(index) = bfs.next(reversed) {
            if index != start {
                upstream.push(self.graph[index].clone());
            }
        }
        upstream
    }

    /// Whether material flows in a loop
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Nodes with no incoming material
    pub fn sources(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|&index| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|index| self.graph[index].clone())
            .collect()
    }

    /// The simple path into `target` that visits the most nodes accepted by `weight`
    ///
    /// Paths start at any material source. Ties keep the first path found.
    pub fn heaviest_path_to<F>(&self, target: &NodeId, weight: F) -> Vec<NodeId>
    where
        F: Fn(&NodeId) -> bool,
    {
        let Some(&end) = self.indices.get(target) else {
            return Vec::new();
        };
        let mut best: Vec<NodeId> = Vec::new();
        let mut best_weight = 0usize;
        for source in self.sources() {
            let Some(&start) = self.indices.get(&source) else {
                continue;
            };
            if start == end {
                continue;
            }
            let paths = all_simple_paths::<Vec<NodeIndex>, _>(&self.graph, start, end, 0, None);
            for path in paths {
                let ids: Vec<NodeId> = path.iter().map(|&i| self.graph[i].clone()).collect();
                let path_weight = ids.iter().filter(|id| weight(id)).count();
                if best.is_empty() || path_weight > best_weight {
                    best_weight = path_weight;
                    best = ids;
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{VsmEdge, VsmNode};
    use crate::value_objects::{FlowKind, NodeKind, Position2D};

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     F[MaterialFlow] --> U[upstream_of]
    ///     F --> C[has_cycle]
    ///     F --> P[heaviest_path_to]
    /// ```

    fn map() -> ValueStreamMap {
        let mut map = ValueStreamMap::new();
        for id in ["supp", "p1", "p2", "inv", "cust", "ctrl"] {
            let kind = if id.starts_with('p') { NodeKind::Process } else { NodeKind::Generic };
            map.add_node(VsmNode::new(id, kind, Position2D::default())).unwrap();
        }
        map.add_edge(VsmEdge::new("e1", "supp", "p1")).unwrap();
        map.add_edge(VsmEdge::new("e2", "p1", "p2")).unwrap();
        map.add_edge(VsmEdge::new("e3", "supp", "inv")).unwrap();
        map.add_edge(VsmEdge::new("e4", "p2", "cust")).unwrap();
        map.add_edge(VsmEdge::new("e5", "inv", "cust")).unwrap();
        map.add_edge(VsmEdge::new("i1", "cust", "ctrl").with_flow(FlowKind::Information))
            .unwrap();
        map
    }

    #[test]
    fn test_upstream_ignores_information_flow() {
        let flow = MaterialFlow::build(&map());
        let mut upstream = flow.upstream_of(&NodeId::new("cust"));
        upstream.sort();
        let names: Vec<&str> = upstream.iter().map(NodeId::as_str).collect();
        assert_eq!(names, vec!["inv", "p1", "p2", "supp"]);
        assert!(flow.upstream_of(&NodeId::new("ctrl")).is_empty());
    }

    #[test]
    fn test_cycle_detection() {
        let mut looped = map();
        looped.add_edge(VsmEdge::new("back", "p2", "p1")).unwrap();
        assert!(MaterialFlow::build(&looped).has_cycle());
        assert!(!MaterialFlow::build(&map()).has_cycle());
    }

    #[test]
    fn test_heaviest_path_prefers_process_chain() {
        let map = map();
        let flow = MaterialFlow::build(&map);
        let path = flow.heaviest_path_to(&NodeId::new("cust"), |id| {
            map.node(id).map_or(false, |node| node.is_processing())
        });
        let names: Vec<&str> = path.iter().map(NodeId::as_str).collect();
        assert_eq!(names, vec!["supp", "p1", "p2", "cust"]);
    }
}
