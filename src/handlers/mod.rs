//! Collaborator seams
//!
//! Persistence, project links and generative map suggestions live outside this crate. Each
//! is an `async_trait` trait; the workspace only ever sees the data contracts below.

use crate::aggregate::DurationLookup;
use crate::commands::{VsmError, VsmResult};
use crate::document::VsmDocument;
use crate::generator::GraphPayload;
use crate::value_objects::coerce_number;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Repository for saved maps
#[async_trait]
pub trait VsmRepository: Send + Sync {
    /// Load a saved map
    async fn load(&self, key: &str) -> VsmResult<Option<VsmDocument>>;

    /// Save a map under a key, replacing what was there
    async fn save(&self, key: &str, document: &VsmDocument) -> VsmResult<()>;

    /// Check if a map is saved under a key
    async fn exists(&self, key: &str) -> VsmResult<bool>;

    /// Remove a saved map; returns whether one existed
    async fn delete(&self, key: &str) -> VsmResult<bool>;

    /// Keys of every saved map
    async fn keys(&self) -> VsmResult<Vec<String>>;
}

/// In-memory implementation of the map repository
#[derive(Debug, Default)]
pub struct InMemoryVsmRepository {
    documents: RwLock<HashMap<String, VsmDocument>>,
}

impl InMemoryVsmRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VsmRepository for InMemoryVsmRepository {
    async fn load(&self, key: &str) -> VsmResult<Option<VsmDocument>> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, document: &VsmDocument) -> VsmResult<()> {
        self.documents
            .write()
            .await
            .insert(key.to_string(), document.clone());
        debug!(key, nodes = document.nodes.len(), "Saved map");
        Ok(())
    }

    async fn exists(&self, key: &str) -> VsmResult<bool> {
        Ok(self.documents.read().await.contains_key(key))
    }

    async fn delete(&self, key: &str) -> VsmResult<bool> {
        Ok(self.documents.write().await.remove(key).is_some())
    }

    async fn keys(&self) -> VsmResult<Vec<String>> {
        let mut keys: Vec<String> = self.documents.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// One timed observation of a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Duration in seconds; strings and other shapes coerce to a number
    #[serde(default)]
    pub duration: Value,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Measurement {
    /// A measurement of `seconds`
    pub fn new(seconds: f64) -> Self {
        Self {
            duration: Value::from(seconds),
            extra: IndexMap::new(),
        }
    }

    /// Duration in seconds, 0 when it is not numeric
    pub fn seconds(&self) -> f64 {
        coerce_number(&self.duration)
    }
}

/// A time-study project a process step can be linked to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedProject {
    pub id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

impl LinkedProject {
    /// Create a project
    pub fn new(
        id: impl Into<String>,
        project_name: impl Into<String>,
        measurements: Vec<Measurement>,
    ) -> Self {
        Self {
            id: id.into(),
            project_name: project_name.into(),
            measurements,
        }
    }

    /// Sum of the measured durations, seconds
    pub fn total_duration(&self) -> f64 {
        self.measurements.iter().map(Measurement::seconds).sum()
    }
}

/// Source of time-study projects
#[async_trait]
pub trait ProjectLinkService: Send + Sync {
    /// Look up one project
    async fn project(&self, id: &str) -> VsmResult<Option<LinkedProject>>;

    /// Every project that can be linked
    async fn projects(&self) -> VsmResult<Vec<LinkedProject>>;
}

/// Projects known to a workspace, keyed by id
#[derive(Debug, Clone, Default)]
pub struct ProjectCatalog {
    projects: IndexMap<String, LinkedProject>,
}

impl ProjectCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every project a service offers
    pub async fn load(service: &dyn ProjectLinkService) -> VsmResult<Self> {
        let mut catalog = Self::new();
        for project in service.projects().await? {
            catalog.insert(project);
        }
        debug!(projects = catalog.len(), "Loaded project catalog");
        Ok(catalog)
    }

    /// Add or replace a project
    pub fn insert(&mut self, project: LinkedProject) {
        self.projects.insert(project.id.clone(), project);
    }

    /// Look up a project
    pub fn get(&self, id: &str) -> Option<&LinkedProject> {
        self.projects.get(id)
    }

    /// Number of projects
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl DurationLookup for ProjectCatalog {
    fn total_duration(&self, project_id: &str) -> Option<f64> {
        self.get(project_id).map(LinkedProject::total_duration)
    }
}

#[async_trait]
impl ProjectLinkService for ProjectCatalog {
    async fn project(&self, id: &str) -> VsmResult<Option<LinkedProject>> {
        Ok(self.get(id).cloned())
    }

    async fn projects(&self) -> VsmResult<Vec<LinkedProject>> {
        Ok(self.projects.values().cloned().collect())
    }
}

/// What the analyst asks a generative service for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum GenerativePrompt {
    /// A free-text description of the value stream
    Text { prompt: String },
    /// A photo or sketch of a drawn map
    Image {
        mime_type: String,
        /// Base64 image data
        data: String,
        #[serde(default)]
        prompt: String,
    },
}

/// Service that turns a prompt into a candidate map
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Produce a `{nodes, edges, globalTakt}` payload
    async fn generate(&self, prompt: &GenerativePrompt) -> VsmResult<GraphPayload>;
}

/// Pull the payload out of a model reply
///
/// Markdown code fences are stripped and the outermost `{...}` is parsed. Anything that is
/// not an object with `nodes` and `edges` arrays is an external service failure.
pub fn extract_payload(reply: &str) -> VsmResult<GraphPayload> {
    let text = reply.replace("```json", "").replace("```", "");
    let body = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            warn!("Generative reply contains no JSON object");
            return Err(VsmError::ExternalService(
                "no JSON object in generative reply".to_string(),
            ));
        }
    };
    let value: Value = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Generative reply is not valid JSON");
        VsmError::ExternalService(format!("invalid JSON in generative reply: {e}"))
    })?;
    for key in ["nodes", "edges"] {
        if !value.get(key).map_or(false, Value::is_array) {
            return Err(VsmError::ExternalService(format!(
                "generative reply has no `{key}` array"
            )));
        }
    }
    serde_json::from_value(value)
        .map_err(|e| VsmError::ExternalService(format!("unusable generative payload: {e}")))
}

/// Generative service that answers every prompt with a fixed reply
#[derive(Debug, Clone)]
pub struct CannedGenerativeService {
    reply: Result<String, String>,
}

impl CannedGenerativeService {
    /// Answer with this model reply text
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
        }
    }

    /// Fail every request with this message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
        }
    }
}

#[async_trait]
impl GenerativeService for CannedGenerativeService {
    async fn generate(&self, _prompt: &GenerativePrompt) -> VsmResult<GraphPayload> {
        match &self.reply {
            Ok(reply) => extract_payload(reply),
            Err(message) => Err(VsmError::ExternalService(message.clone())),
        }
    }
}
