//! Value-stream map domain for the Composable Information Machine
//!
//! A value-stream map is a directed diagram of process steps, inventories, suppliers,
//! customers, transport links and control signals. This crate owns the map model and the
//! computations over it: lean metrics derived after every edit, a tick-based animation,
//! bounded undo/redo, and a procedural generator that lays out a map from a wizard
//! description. Rendering, dialogs and persistence backends are collaborators outside it.

pub mod aggregate;
pub mod commands;
pub mod config;
pub mod document;
pub mod events;
pub mod generator;
pub mod handlers;
pub mod history;
pub mod metrics;
pub mod projections;
pub mod registry;
pub mod simulation;
pub mod templates;
pub mod value_objects;
pub mod workspace;

// Re-export main types
pub use aggregate::{
    DurationLookup, EdgeMarker, EdgeStyle, MarkerKind, MaterialFlow, ValueStreamMap, VsmEdge,
    VsmNode,
};
pub use events::*;

// Re-export commands and their types
pub use commands::{VsmCommand, VsmError, VsmResult};

pub use config::VsmConfig;
pub use document::{CustomIcon, VsmDocument};
pub use generator::{GraphGenerator, GraphPayload, ImportMode, WizardInput};
pub use history::HistoryStore;
pub use metrics::{MetricsEngine, MetricsRecord, MetricsReport};
pub use simulation::{Simulation, SimulationClock, SimulationState, SimulationTarget, TickSummary};
pub use workspace::{SimulationResult, VsmWorkspace};

// Re-export collaborator seams
pub use handlers::{
    GenerativeService, InMemoryVsmRepository, ProjectCatalog, ProjectLinkService, VsmRepository,
};

// Re-export value objects
pub use value_objects::{AttributeBag, EdgeId, FlowKind, NodeId, NodeKind, Position2D, Symbol};

// Re-export projections
pub use projections::{MapSummaryProjection, SnapshotPublisher, VsmProjection, VsmSnapshot};
