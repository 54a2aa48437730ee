//! Read-only snapshot publishing
//!
//! The workspace publishes an immutable [`VsmSnapshot`] after every committed metrics pass.
//! Readers hold a [`watch::Receiver`] and always see the latest snapshot, or `None` before
//! the first publication and after teardown.

use crate::aggregate::{ValueStreamMap, VsmEdge, VsmNode};
use crate::metrics::{Bottleneck, MetricsRecord, MetricsReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Map and metrics as of one committed metrics pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsmSnapshot {
    pub nodes: Vec<VsmNode>,
    pub edges: Vec<VsmEdge>,
    /// Metrics rounded for display
    pub metrics: MetricsRecord,
    pub bottleneck: Option<Bottleneck>,
    pub published_at: DateTime<Utc>,
}

impl VsmSnapshot {
    /// Capture a map together with its metrics
    pub fn capture(map: &ValueStreamMap, report: &MetricsReport) -> Self {
        let (nodes, edges) = map.to_parts();
        Self {
            nodes,
            edges,
            metrics: report.record.rounded(),
            bottleneck: report.bottleneck.clone(),
            published_at: Utc::now(),
        }
    }
}

/// Latest-value publisher of workspace snapshots
#[derive(Debug)]
pub struct SnapshotPublisher {
    sender: watch::Sender<Option<Arc<VsmSnapshot>>>,
    published: u64,
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPublisher {
    /// Create a publisher with nothing published
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender,
            published: 0,
        }
    }

    /// Publish a snapshot, replacing the previous one
    pub fn publish(&mut self, snapshot: VsmSnapshot) -> Arc<VsmSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.sender.send_replace(Some(Arc::clone(&snapshot)));
        self.published += 1;
        trace!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            published = self.published,
            "Published snapshot"
        );
        snapshot
    }

    /// Subscribe to snapshots
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<VsmSnapshot>>> {
        self.sender.subscribe()
    }

    /// The latest snapshot, if any
    pub fn latest(&self) -> Option<Arc<VsmSnapshot>> {
        self.sender.borrow().clone()
    }

    /// Number of snapshots published so far
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Withdraw the latest snapshot; readers observe `None`
    pub fn teardown(&mut self) {
        if self.sender.borrow().is_some() {
            debug!(published = self.published, "Tearing down snapshot publisher");
        }
        self.sender.send_replace(None);
    }
}
