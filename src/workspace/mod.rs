//! Value-stream map workspace
//!
//! [`VsmWorkspace`] is the single owner of a map. It executes [`VsmCommand`]s, records
//! undo snapshots at commit points, recomputes metrics after every edit and publishes a
//! read-only snapshot of the result. The simulation mutates the same map between edits but
//! never touches history or metrics.
//!
//! Drag moves and keystroke edits do not commit; callers invoke [`VsmWorkspace::commit`] on
//! drag-stop or blur. Structural edits and whole-map loads commit on their own.

use crate::aggregate::coupling::pieces_per_hour;
use crate::aggregate::{ValueStreamMap, VsmEdge, VsmNode};
use crate::commands::{VsmCommand, VsmError, VsmResult};
use crate::config::VsmConfig;
use crate::document::{CustomIcon, VsmDocument};
use crate::events::{
    EdgeAdded, EdgeRemoved, MapLoaded, NodeAdded, NodeMoved, NodeRemoved, NodeUpdated,
    TaktChanged, TaktSource, VsmEvent,
};
use crate::generator::{merge_suffix, GraphGenerator, GraphPayload, ImportMode, WizardInput};
use crate::handlers::{
    GenerativePrompt, GenerativeService, ProjectCatalog, ProjectLinkService, VsmRepository,
};
use crate::history::HistoryStore;
use crate::metrics::{MetricsEngine, MetricsRecord, MetricsReport};
use crate::projections::{SnapshotPublisher, VsmSnapshot};
use crate::registry;
use crate::simulation::{Simulation, SimulationState, SimulationTarget, TickSummary};
use crate::templates;
use crate::value_objects::{
    coerce_number, number_value, round2, AttributeBag, EdgeId, FlowKind, NodeId, Position2D,
    Symbol,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Result of an external supply-chain simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Per-node status keyed by node id
    #[serde(default)]
    pub node_status: IndexMap<String, Value>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Owner of one value-stream map and everything derived from it
pub struct VsmWorkspace {
    config: VsmConfig,
    map: ValueStreamMap,
    history: HistoryStore<ValueStreamMap>,
    applying_history: bool,
    global_takt: f64,
    engine: MetricsEngine,
    report: MetricsReport,
    simulation: Simulation,
    custom_library: Vec<CustomIcon>,
    projects: ProjectCatalog,
    publisher: SnapshotPublisher,
}

impl Default for VsmWorkspace {
    fn default() -> Self {
        Self::build(VsmConfig::default())
    }
}

impl VsmWorkspace {
    /// Create an empty workspace from a validated configuration
    pub fn new(config: VsmConfig) -> VsmResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: VsmConfig) -> Self {
        let map = ValueStreamMap::new();
        let mut workspace = Self {
            history: HistoryStore::with_capacity(map.clone(), config.history_capacity),
            applying_history: false,
            global_takt: config.default_takt,
            engine: MetricsEngine::new(config.takt_hysteresis),
            report: MetricsReport::default(),
            simulation: Simulation::from_config(&config),
            custom_library: Vec::new(),
            projects: ProjectCatalog::new(),
            publisher: SnapshotPublisher::new(),
            map,
            config,
        };
        workspace.recompute_metrics();
        workspace
    }

    /// Current map
    pub fn map(&self) -> &ValueStreamMap {
        &self.map
    }

    /// Configuration in effect
    pub fn config(&self) -> &VsmConfig {
        &self.config
    }

    /// Visible takt time, seconds
    pub fn global_takt(&self) -> f64 {
        self.global_takt
    }

    /// Latest metrics record, unrounded
    pub fn metrics(&self) -> MetricsRecord {
        self.report.record
    }

    /// Latest full metrics pass
    pub fn report(&self) -> &MetricsReport {
        &self.report
    }

    /// User-uploaded palette icons
    pub fn custom_library(&self) -> &[CustomIcon] {
        &self.custom_library
    }

    /// Projects nodes can be linked to
    pub fn projects(&self) -> &ProjectCatalog {
        &self.projects
    }

    /// Replace the project catalog used by `outputPcs` coupling and project links
    pub fn set_projects(&mut self, projects: ProjectCatalog) {
        self.projects = projects;
    }

    /// Simulation state
    pub fn simulation_state(&self) -> SimulationState {
        self.simulation.state()
    }

    /// Whether an older snapshot exists
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a newer snapshot exists
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of retained snapshots
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Subscribe to published snapshots
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<VsmSnapshot>>> {
        self.publisher.subscribe()
    }

    /// Latest published snapshot
    pub fn latest_snapshot(&self) -> Option<Arc<VsmSnapshot>> {
        self.publisher.latest()
    }

    /// Execute a command and return the events it produced
    pub fn execute(&mut self, command: VsmCommand) -> VsmResult<Vec<VsmEvent>> {
        let (mut events, commit) = match command {
            VsmCommand::PlaceSymbol { symbol, position } => {
                (vec![self.place_symbol(symbol, position)?], true)
            }
            VsmCommand::AddNode { node } => (vec![self.add_node(node)?], true),
            VsmCommand::Connect {
                source,
                target,
                flow,
            } => (vec![self.connect(source, target, flow)?], true),
            VsmCommand::AddEdge { edge } => (vec![self.add_edge(edge)?], true),
            VsmCommand::UpdateNodeData {
                node_id,
                field,
                value,
            } => (self.update_node_data(&node_id, &field, value), false),
            VsmCommand::PatchNodeData { node_id, patch } => {
                (self.patch_node_data(&node_id, &patch), false)
            }
            VsmCommand::MoveNode { node_id, position } => {
                let moved = self.map.move_node(&node_id, position);
                let events = if moved {
                    vec![VsmEvent::NodeMoved(NodeMoved { node_id, position })]
                } else {
                    Vec::new()
                };
                (events, false)
            }
            VsmCommand::RemoveNode { node_id } => (self.remove_node(&node_id), true),
            VsmCommand::RemoveEdge { edge_id } => {
                let events = match self.map.remove_edge(&edge_id) {
                    Some(_) => vec![VsmEvent::EdgeRemoved(EdgeRemoved { edge_id })],
                    None => Vec::new(),
                };
                (events, true)
            }
            VsmCommand::SetGlobalTakt { takt } => (self.set_global_takt(takt)?, false),
            VsmCommand::ApplyPayload { payload, mode, gap } => {
                (self.apply_payload(payload, mode, gap, true), true)
            }
        };

        if events.is_empty() {
            debug!("Command addressed nothing; map unchanged");
            return Ok(events);
        }
        events.extend(self.settle(commit));
        Ok(events)
    }

    /// Common tail of every map change: recompute metrics, then commit when asked
    fn settle(&mut self, commit: bool) -> Vec<VsmEvent> {
        let events = self.recompute_metrics();
        if commit {
            self.commit();
        }
        events
    }

    fn place_symbol(&mut self, symbol: Symbol, position: Position2D) -> VsmResult<VsmEvent> {
        let kind = registry::node_kind(&symbol);
        let mut node = VsmNode::from_symbol(NodeId::generate(kind.as_str()), &symbol, position);
        node.data.set("globalTakt", number_value(self.global_takt));
        self.add_node(node)
    }

    fn add_node(&mut self, node: VsmNode) -> VsmResult<VsmEvent> {
        let event = NodeAdded {
            node_id: node.id.clone(),
            kind: node.kind.clone(),
            symbol: node.symbol(),
        };
        self.map.add_node(node)?;
        debug!(node_id = %event.node_id, symbol = %event.symbol, "Added node");
        Ok(VsmEvent::NodeAdded(event))
    }

    fn connect(&mut self, source: NodeId, target: NodeId, flow: FlowKind) -> VsmResult<VsmEvent> {
        for endpoint in [&source, &target] {
            if !self.map.contains_node(endpoint) {
                return Err(VsmError::NodeNotFound(endpoint.clone()));
            }
        }
        self.add_edge(VsmEdge::connection(
            EdgeId::generate("edge"),
            source,
            target,
            flow,
        ))
    }

    fn add_edge(&mut self, edge: VsmEdge) -> VsmResult<VsmEvent> {
        let event = EdgeAdded {
            edge_id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            flow: edge.flow(),
        };
        self.map.add_edge(edge)?;
        debug!(edge_id = %event.edge_id, flow = %event.flow, "Added edge");
        Ok(VsmEvent::EdgeAdded(event))
    }

    fn update_node_data(&mut self, node_id: &NodeId, field: &str, value: Value) -> Vec<VsmEvent> {
        let Some(before) = self.map.node(node_id).map(|node| node.data.clone()) else {
            return Vec::new();
        };
        self.map
            .update_node_data(node_id, field, value, &self.projects);
        let mut fields = vec![field.to_string()];
        if let Some(node) = self.map.node(node_id) {
            fields.extend(
                node.data
                    .iter()
                    .filter(|(key, value)| key.as_str() != field && before.get(key) != Some(*value))
                    .map(|(key, _)| key.clone()),
            );
        }
        vec![VsmEvent::NodeUpdated(NodeUpdated {
            node_id: node_id.clone(),
            fields,
        })]
    }

    fn patch_node_data(&mut self, node_id: &NodeId, patch: &AttributeBag) -> Vec<VsmEvent> {
        if !self.map.patch_node_data(node_id, patch) {
            return Vec::new();
        }
        vec![VsmEvent::NodeUpdated(NodeUpdated {
            node_id: node_id.clone(),
            fields: patch.iter().map(|(key, _)| key.clone()).collect(),
        })]
    }

    fn remove_node(&mut self, node_id: &NodeId) -> Vec<VsmEvent> {
        let cascaded_edges: Vec<EdgeId> = self
            .map
            .edges()
            .filter(|edge| edge.touches(node_id))
            .map(|edge| edge.id.clone())
            .collect();
        match self.map.remove_node(node_id) {
            Some(_) => vec![VsmEvent::NodeRemoved(NodeRemoved {
                node_id: node_id.clone(),
                cascaded_edges,
            })],
            None => Vec::new(),
        }
    }

    fn set_global_takt(&mut self, takt: f64) -> VsmResult<Vec<VsmEvent>> {
        if !takt.is_finite() || takt < 0.0 {
            return Err(VsmError::Validation(format!(
                "takt time must be a non-negative number, got {takt}"
            )));
        }
        let previous = self.global_takt;
        self.global_takt = takt;
        Ok(vec![VsmEvent::TaktChanged(TaktChanged {
            previous,
            current: takt,
            source: TaktSource::Manual,
        })])
    }

    /// Adopt a payload by replacing the map or merging beside it
    ///
    /// With `stamp` the payload takt is written onto every incoming node. Saved documents are
    /// adopted without it so their attribute bags come back exactly as exported.
    fn apply_payload(
        &mut self,
        mut payload: GraphPayload,
        mode: ImportMode,
        gap: Option<f64>,
        stamp: bool,
    ) -> Vec<VsmEvent> {
        let mut events = Vec::new();
        let incoming_nodes = payload.nodes.len();
        let incoming_edges = payload.edges.len();

        let dropped_edges = match mode {
            ImportMode::Replace => {
                let takt = payload.global_takt.unwrap_or(self.global_takt);
                if stamp {
                    payload.stamp_takt(takt);
                }
                if takt != self.global_takt {
                    events.push(VsmEvent::TaktChanged(TaktChanged {
                        previous: self.global_takt,
                        current: takt,
                        source: TaktSource::Imported,
                    }));
                    self.global_takt = takt;
                }
                self.map.replace_all(payload.nodes, payload.edges)
            }
            ImportMode::Merge => {
                if let Some(takt) = payload.global_takt.filter(|_| stamp) {
                    payload.stamp_takt(takt);
                }
                let gap = gap.unwrap_or(self.config.merge_gap);
                let payload = payload.offset_for_merge(&self.map, gap, &merge_suffix());
                let (mut nodes, mut edges) = self.map.to_parts();
                nodes.extend(payload.nodes);
                edges.extend(payload.edges);
                self.map.replace_all(nodes, edges)
            }
        };

        info!(
            ?mode,
            nodes = incoming_nodes,
            edges = incoming_edges,
            dropped_edges,
            "Applied map payload"
        );
        events.insert(
            0,
            VsmEvent::MapLoaded(MapLoaded {
                nodes: incoming_nodes,
                edges: incoming_edges.saturating_sub(dropped_edges),
                dropped_edges,
                merged: mode == ImportMode::Merge,
            }),
        );
        events
    }

    /// Record the current map as an undo snapshot
    ///
    /// Ignored while a snapshot is being restored. Returns whether a snapshot was recorded.
    pub fn commit(&mut self) -> bool {
        if self.applying_history {
            debug!("Skipping commit while restoring history");
            return false;
        }
        self.history.push(self.map.clone());
        true
    }

    /// Restore the previous snapshot; returns whether one existed
    pub fn undo(&mut self) -> bool {
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Restore the next snapshot; returns whether one existed
    pub fn redo(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: ValueStreamMap) {
        self.applying_history = true;
        self.map = snapshot;
        self.settle(true);
        self.applying_history = false;
        debug!(cursor = self.history.cursor(), "Restored history snapshot");
    }

    /// Derive metrics, write the cached fields onto the map and publish a snapshot
    ///
    /// Returns a takt event when customer demand moved the visible takt.
    pub fn recompute_metrics(&mut self) -> Vec<VsmEvent> {
        let mut report = self.engine.compute(&self.map, self.global_takt);
        let mut events = Vec::new();
        if let Some(takt) = report.takt_update {
            events.push(VsmEvent::TaktChanged(TaktChanged {
                previous: self.global_takt,
                current: takt,
                source: TaktSource::Calculated,
            }));
            self.global_takt = takt;
        }
        let patched = report.apply_patches(&mut self.map);
        report.patches.clear();
        debug!(patched, "Applied cached metric fields");
        self.publisher
            .publish(VsmSnapshot::capture(&self.map, &report));
        self.report = report;
        events
    }

    /// Link a process step to a time-study project from the catalog
    ///
    /// Sets `projectId` and `projectName` and derives `ct` from the project's total measured
    /// duration divided by the node's `outputPcs` (1 when unset).
    pub fn link_project(&mut self, node_id: &NodeId, project_id: &str) -> VsmResult<Vec<VsmEvent>> {
        let node = self
            .map
            .node(node_id)
            .ok_or_else(|| VsmError::NodeNotFound(node_id.clone()))?;
        let project = self
            .projects
            .get(project_id)
            .ok_or_else(|| VsmError::Validation(format!("unknown project {project_id}")))?;

        let output = match node.data.number("outputPcs") {
            n if n > 0.0 => n,
            _ => 1.0,
        };
        let ct = round2(project.total_duration() / output);
        let patch = AttributeBag::new()
            .with("projectId", project.id.clone())
            .with("projectName", project.project_name.clone())
            .with("ct", number_value(ct))
            .with("pcsPerHour", number_value(pieces_per_hour(ct)));

        info!(node_id = %node_id, project_id, ct, "Linked project");
        let mut events = self.patch_node_data(node_id, &patch);
        events.extend(self.settle(true));
        Ok(events)
    }

    /// Fetch a project from a collaborator, add it to the catalog and link it
    pub async fn link_project_from(
        &mut self,
        service: &dyn ProjectLinkService,
        node_id: &NodeId,
        project_id: &str,
    ) -> VsmResult<Vec<VsmEvent>> {
        let project = service.project(project_id).await?.ok_or_else(|| {
            VsmError::ExternalService(format!("project {project_id} is not available"))
        })?;
        self.projects.insert(project);
        self.link_project(node_id, project_id)
    }

    /// Write an external simulation run's per-node status onto matching nodes
    pub fn apply_simulation_result(&mut self, result: &SimulationResult) -> Vec<VsmEvent> {
        let mut events = Vec::new();
        for (id, status) in &result.node_status {
            let patch = AttributeBag::new().with("simulationResult", status.clone());
            events.extend(self.patch_node_data(&NodeId::new(id.as_str()), &patch));
        }
        let shortages = result
            .node_status
            .values()
            .filter(|status| status.get("shortage").map_or(false, |s| coerce_number(s) > 0.0))
            .count();
        info!(
            updated = events.len(),
            shortages,
            "Applied simulation result"
        );
        events
    }

    /// Add an icon to the custom library
    pub fn add_custom_icon(&mut self, icon: CustomIcon) {
        self.custom_library.push(icon);
    }

    /// Remove an icon from the custom library; returns whether it existed
    pub fn remove_custom_icon(&mut self, id: &str) -> bool {
        let before = self.custom_library.len();
        self.custom_library.retain(|icon| icon.id != id);
        self.custom_library.len() != before
    }

    /// Snapshot the map as a versioned document
    pub fn export_document(&self) -> VsmDocument {
        VsmDocument::export(
            &self.map,
            self.global_takt,
            &self.custom_library,
            self.report.record.rounded(),
        )
    }

    /// Adopt an imported document
    ///
    /// Replace also replaces the custom library; merge appends icons whose id is new. Node
    /// attribute bags are kept as saved, including each node's own `globalTakt`.
    pub fn import_document(
        &mut self,
        document: VsmDocument,
        mode: ImportMode,
    ) -> VsmResult<Vec<VsmEvent>> {
        let payload = document.payload();
        match mode {
            ImportMode::Replace => self.custom_library = document.custom_library,
            ImportMode::Merge => {
                for icon in document.custom_library {
                    if self.custom_library.iter().all(|known| known.id != icon.id) {
                        self.custom_library.push(icon);
                    }
                }
            }
        }
        let mut events = self.apply_payload(payload, mode, None, false);
        events.extend(self.settle(true));
        Ok(events)
    }

    /// Apply a built-in template
    pub fn apply_template(&mut self, id: &str, mode: ImportMode) -> VsmResult<Vec<VsmEvent>> {
        let template = templates::load(id)?;
        info!(template = id, name = %template.name, "Applying template");
        self.execute(VsmCommand::ApplyPayload {
            payload: template.payload(),
            mode,
            gap: None,
        })
    }

    /// Generate a map from a wizard description and apply it
    pub fn apply_wizard(
        &mut self,
        input: &WizardInput,
        mode: ImportMode,
    ) -> VsmResult<Vec<VsmEvent>> {
        let payload = GraphGenerator::new(self.global_takt).generate(input);
        self.execute(VsmCommand::ApplyPayload {
            payload,
            mode,
            gap: None,
        })
    }

    /// Ask a generative collaborator for a map and apply it
    ///
    /// On failure the map is left unchanged.
    pub async fn apply_generative(
        &mut self,
        service: &dyn GenerativeService,
        prompt: &GenerativePrompt,
        mode: ImportMode,
    ) -> VsmResult<Vec<VsmEvent>> {
        let payload = service.generate(prompt).await.map_err(|e| {
            warn!(error = %e, "Generative service failed");
            match e {
                VsmError::ExternalService(_) => e,
                other => VsmError::ExternalService(other.to_string()),
            }
        })?;
        self.execute(VsmCommand::ApplyPayload {
            payload,
            mode,
            gap: Some(self.config.generative_merge_gap),
        })
    }

    /// Save the map through a persistence collaborator
    pub async fn save_to(&self, repository: &dyn VsmRepository, key: &str) -> VsmResult<()> {
        repository.save(key, &self.export_document()).await
    }

    /// Load a saved map through a persistence collaborator
    pub async fn load_from(
        &mut self,
        repository: &dyn VsmRepository,
        key: &str,
        mode: ImportMode,
    ) -> VsmResult<Vec<VsmEvent>> {
        let document = repository
            .load(key)
            .await?
            .ok_or_else(|| VsmError::ExternalService(format!("no saved map named {key}")))?;
        self.import_document(document, mode)
    }

    /// Start the animation; returns false when already running
    pub fn start_simulation(&mut self) -> bool {
        self.simulation.start(&mut self.map)
    }

    /// Stop the animation; idempotent
    pub fn stop_simulation(&mut self) -> bool {
        self.simulation.stop(&mut self.map)
    }

    /// Stop the animation and clear its state from the map
    pub fn reset_simulation(&mut self) {
        self.simulation.reset(&mut self.map);
    }

    /// Apply one simulation tick; `None` while idle
    pub fn tick_simulation(&mut self, now_ms: f64) -> Option<TickSummary> {
        self.simulation.tick(&mut self.map, now_ms)
    }
}

impl SimulationTarget for VsmWorkspace {
    fn begin(&mut self) {
        self.start_simulation();
    }

    fn tick(&mut self, now_ms: f64) -> Option<TickSummary> {
        self.tick_simulation(now_ms)
    }

    fn end(&mut self) {
        self.stop_simulation();
    }
}

impl Drop for VsmWorkspace {
    fn drop(&mut self) {
        self.publisher.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{LinkedProject, Measurement};
    use crate::value_objects::NodeKind;
    use serde_json::json;

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     W[VsmWorkspace] --> C[execute]
    ///     C --> PS[PlaceSymbol]
    ///     C --> CN[Connect]
    ///     C --> RN[RemoveNode cascade]
    ///     W --> H[commit / undo / redo]
    ///     W --> M[metrics and takt]
    ///     W --> P[link_project]
    ///     W --> S[simulation result]
    /// ```

    fn workspace() -> VsmWorkspace {
        VsmWorkspace::new(VsmConfig {
            rng_seed: Some(7),
            ..VsmConfig::default()
        })
        .unwrap()
    }

    fn place(ws: &mut VsmWorkspace, symbol: Symbol, x: f64) -> NodeId {
        let events = ws
            .execute(VsmCommand::PlaceSymbol {
                symbol,
                position: Position2D::new(x, 0.0),
            })
            .unwrap();
        events[0].node_id().unwrap().clone()
    }

    #[test]
    fn test_place_symbol_uses_registry_defaults() {
        let mut ws = workspace();
        let id = place(&mut ws, Symbol::Process, 0.0);

        assert!(id.as_str().starts_with("process-"));
        let node = ws.map().node(&id).unwrap();
        assert_eq!(node.kind, NodeKind::Process);
        assert_eq!(node.data.text("symbolType"), Some("process"));
        assert_eq!(node.data.number("globalTakt"), 60.0);
        assert_eq!(ws.history_len(), 2);
    }

    #[test]
    fn test_connect_requires_existing_nodes() {
        let mut ws = workspace();
        let a = place(&mut ws, Symbol::Process, 0.0);
        let result = ws.execute(VsmCommand::Connect {
            source: a.clone(),
            target: NodeId::new("ghost"),
            flow: FlowKind::Material,
        });
        assert!(matches!(result, Err(VsmError::NodeNotFound(id)) if id.as_str() == "ghost"));

        let b = place(&mut ws, Symbol::Inventory, 450.0);
        let events = ws
            .execute(VsmCommand::Connect {
                source: a,
                target: b,
                flow: FlowKind::Electronic,
            })
            .unwrap();
        assert!(matches!(
            &events[0],
            VsmEvent::EdgeAdded(EdgeAdded { flow: FlowKind::Electronic, .. })
        ));
        assert_eq!(ws.map().edge_count(), 1);
    }

    #[test]
    fn test_remove_node_reports_cascade() {
        let mut ws = workspace();
        let a = place(&mut ws, Symbol::Process, 0.0);
        let b = place(&mut ws, Symbol::Process, 450.0);
        ws.execute(VsmCommand::Connect {
            source: a.clone(),
            target: b,
            flow: FlowKind::Material,
        })
        .unwrap();

        let events = ws.execute(VsmCommand::RemoveNode { node_id: a }).unwrap();
        match &events[0] {
            VsmEvent::NodeRemoved(removed) => assert_eq!(removed.cascaded_edges.len(), 1),
            other => panic!("Expected NodeRemoved, got {other:?}"),
        }
        assert_eq!(ws.map().edge_count(), 0);

        let none = ws
            .execute(VsmCommand::RemoveNode {
                node_id: NodeId::new("missing"),
            })
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_edits_do_not_commit_until_asked() {
        let mut ws = workspace();
        let id = place(&mut ws, Symbol::Process, 0.0);
        let len = ws.history_len();

        let events = ws
            .execute(VsmCommand::UpdateNodeData {
                node_id: id.clone(),
                field: "ct".to_string(),
                value: json!(45),
            })
            .unwrap();
        match &events[0] {
            VsmEvent::NodeUpdated(updated) => {
                assert_eq!(updated.fields[0], "ct");
                assert!(updated.fields.contains(&"pcsPerHour".to_string()));
            }
            other => panic!("Expected NodeUpdated, got {other:?}"),
        }
        assert_eq!(ws.history_len(), len);

        assert!(ws.commit());
        assert_eq!(ws.history_len(), len + 1);
    }

    #[test]
    fn test_undo_redo_do_not_record_history() {
        let mut ws = workspace();
        place(&mut ws, Symbol::Process, 0.0);
        place(&mut ws, Symbol::Process, 450.0);
        let len = ws.history_len();

        assert!(ws.undo());
        assert_eq!(ws.map().node_count(), 1);
        assert_eq!(ws.history_len(), len);

        assert!(ws.redo());
        assert_eq!(ws.map().node_count(), 2);
        assert!(!ws.redo());
        assert_eq!(ws.history_len(), len);
    }

    #[test]
    fn test_customer_demand_drives_takt() {
        let mut ws = workspace();
        let customer = place(&mut ws, Symbol::Customer, 900.0);
        let patch = AttributeBag::new()
            .with("demand", json!(500))
            .with("availableTime", json!(8))
            .with("shifts", json!(2))
            .with("packSize", json!(10));
        let events = ws
            .execute(VsmCommand::PatchNodeData {
                node_id: customer,
                patch,
            })
            .unwrap();

        assert!(events.iter().any(|e| matches!(
            e,
            VsmEvent::TaktChanged(TaktChanged { source: TaktSource::Calculated, .. })
        )));
        assert_eq!(ws.global_takt(), 115.2);
        assert_eq!(ws.metrics().pitch, 1152.0);
        assert_eq!(ws.latest_snapshot().unwrap().metrics.calculated_takt, 115.2);
    }

    #[test]
    fn test_manual_takt_rejects_negative() {
        let mut ws = workspace();
        assert!(matches!(
            ws.execute(VsmCommand::SetGlobalTakt { takt: -1.0 }),
            Err(VsmError::Validation(_))
        ));
        ws.execute(VsmCommand::SetGlobalTakt { takt: 45.0 }).unwrap();
        assert_eq!(ws.global_takt(), 45.0);
    }

    #[test]
    fn test_link_project_derives_cycle_time() {
        let mut ws = workspace();
        let mut catalog = ProjectCatalog::new();
        catalog.insert(LinkedProject::new(
            "12",
            "Assembly study",
            vec![Measurement::new(100.0), Measurement::new(50.0)],
        ));
        ws.set_projects(catalog);

        let id = place(&mut ws, Symbol::Project, 0.0);
        ws.execute(VsmCommand::UpdateNodeData {
            node_id: id.clone(),
            field: "outputPcs".to_string(),
            value: json!(4),
        })
        .unwrap();
        ws.link_project(&id, "12").unwrap();

        let node = ws.map().node(&id).unwrap();
        assert_eq!(node.data.text("projectName"), Some("Assembly study"));
        assert_eq!(node.data.number("ct"), 37.5);
        assert_eq!(node.data.number("pcsPerHour"), 96.0);
        assert_eq!(ws.metrics().total_ct, 37.5);

        assert!(matches!(
            ws.link_project(&id, "99"),
            Err(VsmError::Validation(_))
        ));
    }

    #[test]
    fn test_simulation_result_targets_known_nodes() {
        let mut ws = workspace();
        let id = place(&mut ws, Symbol::Supermarket, 0.0);
        let mut result = SimulationResult::default();
        result
            .node_status
            .insert(id.as_str().to_string(), json!({ "shortage": 40 }));
        result.node_status.insert("ghost".to_string(), json!({}));

        let events = ws.apply_simulation_result(&result);
        assert_eq!(events.len(), 1);
        let node = ws.map().node(&id).unwrap();
        assert_eq!(node.data.get("simulationResult"), Some(&json!({ "shortage": 40 })));
    }

    #[test]
    fn test_custom_library() {
        let mut ws = workspace();
        ws.add_custom_icon(CustomIcon::new("1", "press", "data:,"));
        ws.add_custom_icon(CustomIcon::new("2", "robot", "data:,"));
        assert!(ws.remove_custom_icon("1"));
        assert!(!ws.remove_custom_icon("1"));
        assert_eq!(ws.export_document().custom_library.len(), 1);
    }

    #[test]
    fn test_drop_tears_down_snapshot() {
        let ws = workspace();
        let receiver = ws.subscribe();
        assert!(receiver.borrow().is_some());
        drop(ws);
        assert!(receiver.borrow().is_none());
    }
}
