//! Versioned JSON export document
//!
//! ```json
//! { "version": "1.0", "timestamp": "...", "nodes": [], "edges": [], "globalTakt": 60,
//!   "customLibrary": [], "metadata": { "totalNodes": 0, "totalEdges": 0, "metrics": {} } }
//! ```
//!
//! Import checks that `nodes` and `edges` are arrays before anything else is read.

use crate::aggregate::{ValueStreamMap, VsmEdge, VsmNode};
use crate::commands::{VsmError, VsmResult};
use crate::generator::GraphPayload;
use crate::metrics::MetricsRecord;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Format version written on export
pub const DOCUMENT_VERSION: &str = "1.0";

/// A user-uploaded palette icon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomIcon {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Image data URL
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl CustomIcon {
    /// Create an icon
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            extra: IndexMap::new(),
        }
    }
}

/// Summary written alongside an export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub metrics: MetricsRecord,
}

/// Exported map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsmDocument {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub nodes: Vec<VsmNode>,
    pub edges: Vec<VsmEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_takt: Option<f64>,
    #[serde(default)]
    pub custom_library: Vec<CustomIcon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
}

impl VsmDocument {
    /// Snapshot a map for export
    pub fn export(
        map: &ValueStreamMap,
        global_takt: f64,
        custom_library: &[CustomIcon],
        metrics: MetricsRecord,
    ) -> Self {
        let (nodes, edges) = map.to_parts();
        Self {
            version: DOCUMENT_VERSION.to_string(),
            timestamp: Some(Utc::now()),
            metadata: Some(DocumentMetadata {
                total_nodes: nodes.len(),
                total_edges: edges.len(),
                metrics,
            }),
            nodes,
            edges,
            global_takt: Some(global_takt),
            custom_library: custom_library.to_vec(),
        }
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> VsmResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a document
    pub fn parse(json: &str) -> VsmResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Validate and convert an already parsed document
    pub fn from_value(value: Value) -> VsmResult<Self> {
        for key in ["nodes", "edges"] {
            if !value.get(key).map_or(false, Value::is_array) {
                return Err(VsmError::Validation(format!(
                    "document `{key}` is missing or not an array"
                )));
            }
        }
        let document: Self = serde_json::from_value(value)?;
        debug!(
            version = %document.version,
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            "Parsed value-stream document"
        );
        Ok(document)
    }

    /// Read and validate a document file
    pub fn from_file(path: impl AsRef<Path>) -> VsmResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::parse(&json)
    }

    /// The map part as an importable payload
    pub fn payload(&self) -> GraphPayload {
        GraphPayload::new(self.nodes.clone(), self.edges.clone(), self.global_takt)
    }
}
