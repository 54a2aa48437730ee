//! Built-in template catalog
//!
//! Templates are static `{name, description, globalTakt, nodes, edges}` documents compiled
//! into the crate. They are adopted through the same replace/merge contract as generated maps.

use crate::aggregate::{VsmEdge, VsmNode};
use crate::commands::{VsmError, VsmResult};
use crate::generator::GraphPayload;
use serde::{Deserialize, Serialize};

const CATALOG: &[(&str, &str)] = &[
    ("simple", include_str!("catalog/simple.json")),
    ("intermediate", include_str!("catalog/intermediate.json")),
    ("advanced", include_str!("catalog/advanced.json")),
    ("integratedSupplyChain", include_str!("catalog/integrated_supply_chain.json")),
    ("pullSystem", include_str!("catalog/pull_system.json")),
    ("expert", include_str!("catalog/expert.json")),
];

/// A named starting map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    pub description: String,
    /// Takt the template is drawn for, seconds
    pub global_takt: f64,
    pub nodes: Vec<VsmNode>,
    pub edges: Vec<VsmEdge>,
}

impl Template {
    /// The template as an importable payload
    pub fn payload(&self) -> GraphPayload {
        GraphPayload::new(self.nodes.clone(), self.edges.clone(), Some(self.global_takt))
    }
}

/// Identifiers of the built-in templates, in catalog order
pub fn ids() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(id, _)| *id)
}

/// Load a built-in template
pub fn load(id: &str) -> VsmResult<Template> {
    let (_, json) = CATALOG
        .iter()
        .find(|(key, _)| *key == id)
        .ok_or_else(|| VsmError::TemplateNotFound(id.to_string()))?;
    Ok(serde_json::from_str(json)?)
}
