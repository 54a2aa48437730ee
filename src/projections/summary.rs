//! Map summary projection
//!
//! Keeps node and edge counts, the flow mix and the takt history of a workspace.

use crate::events::{
    EdgeAdded, MapLoaded, NodeAdded, NodeRemoved, TaktChanged, TaktSource, VsmEvent,
};
use crate::value_objects::FlowKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary information about a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSummary {
    /// Current number of nodes
    pub node_count: usize,
    /// Current number of edges
    pub edge_count: usize,
    /// Edges added one by one, per flow kind
    pub connected_flows: HashMap<FlowKind, usize>,
    /// Takt after the last takt change, seconds
    pub takt: Option<f64>,
    /// Where the last takt change came from
    pub takt_source: Option<TaktSource>,
    /// Number of payloads adopted
    pub loads: usize,
    /// Number of events handled
    pub events_seen: u64,
    /// When the summary last changed
    pub last_modified: DateTime<Utc>,
}

impl Default for MapSummary {
    fn default() -> Self {
        Self {
            node_count: 0,
            edge_count: 0,
            connected_flows: HashMap::new(),
            takt: None,
            takt_source: None,
            loads: 0,
            events_seen: 0,
            last_modified: Utc::now(),
        }
    }
}

/// Projection that maintains a map summary
#[derive(Debug, Clone, Default)]
pub struct MapSummaryProjection {
    summary: MapSummary,
    checkpoint: Option<u64>,
}

impl MapSummaryProjection {
    /// Create a new summary projection
    pub fn new() -> Self {
        Self::default()
    }

    /// Current summary
    pub fn summary(&self) -> &MapSummary {
        &self.summary
    }

    /// Edges connected with the given flow kind
    pub fn flows_of(&self, flow: FlowKind) -> usize {
        self.summary.connected_flows.get(&flow).copied().unwrap_or(0)
    }
}

#[async_trait]
impl super::VsmProjection for MapSummaryProjection {
    async fn handle_event(&mut self, event: &VsmEvent) -> Result<(), String> {
        let summary = &mut self.summary;
        match event {
            VsmEvent::NodeAdded(NodeAdded { .. }) => {
                summary.node_count += 1;
            }

            VsmEvent::NodeRemoved(NodeRemoved { cascaded_edges, .. }) => {
                summary.node_count = summary.node_count.saturating_sub(1);
                summary.edge_count = summary.edge_count.saturating_sub(cascaded_edges.len());
            }

            VsmEvent::EdgeAdded(EdgeAdded { flow, .. }) => {
                summary.edge_count += 1;
                *summary.connected_flows.entry(*flow).or_insert(0) += 1;
            }

            VsmEvent::EdgeRemoved(_) => {
                summary.edge_count = summary.edge_count.saturating_sub(1);
            }

            VsmEvent::TaktChanged(TaktChanged { current, source, .. }) => {
                summary.takt = Some(*current);
                summary.takt_source = Some(*source);
            }

            VsmEvent::MapLoaded(MapLoaded {
                nodes,
                edges,
                merged,
                ..
            }) => {
                if *merged {
                    summary.node_count += nodes;
                    summary.edge_count += edges;
                } else {
                    summary.node_count = *nodes;
                    summary.edge_count = *edges;
                    summary.connected_flows.clear();
                }
                summary.loads += 1;
            }

            VsmEvent::NodeUpdated(_) | VsmEvent::NodeMoved(_) => {}
        }
        summary.events_seen += 1;
        summary.last_modified = Utc::now();
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), String> {
        self.summary = MapSummary::default();
        self.checkpoint = None;
        Ok(())
    }

    async fn get_checkpoint(&self) -> Option<u64> {
        self.checkpoint
    }

    async fn save_checkpoint(&mut self, sequence: u64) -> Result<(), String> {
        self.checkpoint = Some(sequence);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EdgeRemoved;
    use crate::projections::VsmProjection;
    use crate::value_objects::{EdgeId, NodeId, NodeKind, Symbol};

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     P[MapSummaryProjection] --> N[node events]
    ///     P --> E[edge events and cascade]
    ///     P --> L[replace and merge loads]
    ///     P --> C[checkpoint handling]
    /// ```

    fn node_added(id: &str) -> VsmEvent {
        VsmEvent::NodeAdded(NodeAdded {
            node_id: NodeId::new(id),
            kind: NodeKind::Process,
            symbol: Symbol::Process,
        })
    }

    fn edge_added(id: &str, flow: FlowKind) -> VsmEvent {
        VsmEvent::EdgeAdded(EdgeAdded {
            edge_id: EdgeId::new(id),
            source: NodeId::new("a"),
            target: NodeId::new("b"),
            flow,
        })
    }

    #[tokio::test]
    async fn test_counts_follow_events() {
        let mut projection = MapSummaryProjection::new();
        projection.handle_event(&node_added("a")).await.unwrap();
        projection.handle_event(&node_added("b")).await.unwrap();
        projection
            .handle_event(&edge_added("ab", FlowKind::Material))
            .await
            .unwrap();
        projection
            .handle_event(&edge_added("ba", FlowKind::Electronic))
            .await
            .unwrap();

        assert_eq!(projection.summary().node_count, 2);
        assert_eq!(projection.summary().edge_count, 2);
        assert_eq!(projection.flows_of(FlowKind::Electronic), 1);

        projection
            .handle_event(&VsmEvent::EdgeRemoved(EdgeRemoved {
                edge_id: EdgeId::new("ba"),
            }))
            .await
            .unwrap();
        projection
            .handle_event(&VsmEvent::NodeRemoved(NodeRemoved {
                node_id: NodeId::new("a"),
                cascaded_edges: vec![EdgeId::new("ab")],
            }))
            .await
            .unwrap();

        let summary = projection.summary();
        assert_eq!(summary.node_count, 1);
        assert_eq!(summary.edge_count, 0);
        assert_eq!(summary.events_seen, 6);
    }

    #[tokio::test]
    async fn test_loads_replace_or_accumulate() {
        let mut projection = MapSummaryProjection::new();
        projection.handle_event(&node_added("a")).await.unwrap();

        let load = |nodes, edges, merged| {
            VsmEvent::MapLoaded(MapLoaded {
                nodes,
                edges,
                dropped_edges: 0,
                merged,
            })
        };
        projection.handle_event(&load(7, 6, false)).await.unwrap();
        assert_eq!(projection.summary().node_count, 7);

        projection.handle_event(&load(3, 2, true)).await.unwrap();
        assert_eq!(projection.summary().node_count, 10);
        assert_eq!(projection.summary().edge_count, 8);
        assert_eq!(projection.summary().loads, 2);

        projection
            .handle_event(&VsmEvent::TaktChanged(TaktChanged {
                previous: 60.0,
                current: 57.6,
                source: TaktSource::Calculated,
            }))
            .await
            .unwrap();
        assert_eq!(projection.summary().takt, Some(57.6));
    }

    #[tokio::test]
    async fn test_checkpoint_handling() {
        let mut projection = MapSummaryProjection::new();
        assert!(projection.get_checkpoint().await.is_none());

        projection.save_checkpoint(42).await.unwrap();
        assert_eq!(projection.get_checkpoint().await, Some(42));

        projection.handle_event(&node_added("a")).await.unwrap();
        projection.clear().await.unwrap();
        assert!(projection.get_checkpoint().await.is_none());
        assert_eq!(projection.summary().node_count, 0);
    }
}
