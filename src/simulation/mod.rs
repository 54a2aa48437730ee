//! Tick-based animation of a value-stream map
//!
//! [`Simulation`] is a two-state machine (idle, running). While running, every
//! [`Simulation::tick`] applies one node pass followed by one edge pass to the map as a single
//! unit. The pass is an animation driver, not a queueing model.
//!
//! Node rules:
//! - processing steps advance `progress` by `100 / (ct * 2)` and wrap at 100
//! - inventory `level` drifts with `sin(now / 2000) * 5`, clamped to `[10, 100]`, and raises
//!   `kanbanTriggered` below `minStock`
//! - customers get an `isShortage` signal (see [`ShortagePolicy`])
//! - truck, sea and air freight advance `progress` by `10 / leadTime` and wrap at 100
//!
//! The edge pass sets `kanbanActive` on information edges that end at a triggered inventory.

pub mod clock;

pub use clock::{SimulationClock, SimulationTarget};

use crate::aggregate::{MaterialFlow, ValueStreamMap, VsmNode};
use crate::config::VsmConfig;
use crate::value_objects::{number_value, NodeId, NodeKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Whether the animation is running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SimulationState {
    /// Not animating
    #[default]
    Idle,
    /// Ticks are applied
    Running,
}

/// How a customer's shortage signal is decided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShortagePolicy {
    /// Cosmetic demo signal with a fixed per-tick probability
    #[default]
    Random,
    /// Short when any stock upstream on material edges has a kanban triggered
    Derived,
}

/// Which node state the kanban edge pass reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KanbanPropagation {
    /// State before this tick's node pass; signals arrive one tick late
    #[default]
    Lagged,
    /// State after this tick's node pass
    SameTick,
}

/// Counters describing one applied tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSummary {
    /// Tick number since the last reset, starting at 1
    pub tick: u64,
    /// Inventories with a triggered kanban after the node pass
    pub triggered: usize,
    /// Information edges showing an active kanban
    pub kanban_active: usize,
    /// Customers flagged short
    pub shortages: usize,
}

/// Simulation state machine
#[derive(Debug, Clone)]
pub struct Simulation {
    state: SimulationState,
    ticks: u64,
    shortage_policy: ShortagePolicy,
    shortage_probability: f64,
    propagation: KanbanPropagation,
    rng: StdRng,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(ShortagePolicy::Random, 0.05, KanbanPropagation::Lagged, None)
    }
}

impl Simulation {
    /// Create an idle simulation
    ///
    /// The shortage probability is clamped to `[0, 1]`; NaN or infinite values disable random
    /// shortages.
    pub fn new(
        shortage_policy: ShortagePolicy,
        shortage_probability: f64,
        propagation: KanbanPropagation,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: SimulationState::Idle,
            ticks: 0,
            shortage_policy,
            shortage_probability: if shortage_probability.is_finite() {
                shortage_probability.clamp(0.0, 1.0)
            } else {
                0.0
            },
            propagation,
            rng,
        }
    }

    /// Create an idle simulation from workspace configuration
    pub fn from_config(config: &VsmConfig) -> Self {
        Self::new(
            config.shortage_policy,
            config.shortage_probability,
            config.kanban_propagation,
            config.rng_seed,
        )
    }

    /// Current state
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Whether ticks are applied
    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    /// Ticks applied since the last reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Idle to running: zero progress and shortage flags, mark everything simulating
    ///
    /// Returns false when already running.
    pub fn start(&mut self, map: &mut ValueStreamMap) -> bool {
        if self.is_running() {
            return false;
        }
        for node in map.nodes_mut() {
            node.data.set("simulating", true);
            node.data.set("progress", 0);
            node.data.set("isShortage", false);
        }
        for edge in map.edges_mut() {
            edge.data.set("simulating", true);
            edge.data.set("isShortage", false);
        }
        self.state = SimulationState::Running;
        info!(nodes = map.node_count(), edges = map.edge_count(), "Simulation started");
        true
    }

    /// Running to idle: clear `simulating` flags, keep accumulated progress
    ///
    /// Idempotent; returns whether the simulation was running.
    pub fn stop(&mut self, map: &mut ValueStreamMap) -> bool {
        let was_running = self.is_running();
        for node in map.nodes_mut() {
            node.data.set("simulating", false);
        }
        for edge in map.edges_mut() {
            edge.data.set("simulating", false);
        }
        self.state = SimulationState::Idle;
        if was_running {
            info!(ticks = self.ticks, "Simulation stopped");
        }
        was_running
    }

    /// Stop, then zero progress, refill inventory levels and clear shortages
    pub fn reset(&mut self, map: &mut ValueStreamMap) {
        self.stop(map);
        self.ticks = 0;
        for node in map.nodes_mut() {
            node.data.set("progress", 0);
            node.data.set("level", 100);
            node.data.set("isShortage", false);
        }
        info!("Simulation reset");
    }

    /// Apply one tick at wall-clock time `now_ms`; `None` while idle
    pub fn tick(&mut self, map: &mut ValueStreamMap, now_ms: f64) -> Option<TickSummary> {
        if !self.is_running() {
            return None;
        }
        self.ticks += 1;

        let lagged = match self.propagation {
            KanbanPropagation::Lagged => Some(triggered_inventories(map)),
            KanbanPropagation::SameTick => None,
        };

        let drift = (now_ms / 2000.0).sin() * 5.0;
        let mut customers = Vec::new();
        for node in map.nodes_mut() {
            if node.is_processing() {
                let ct = positive_or(node.data.number("ct"), 10.0);
                advance(node, 100.0 / (ct * 2.0));
            } else if node.kind == NodeKind::Inventory {
                let level = node.data.maybe_number("level").unwrap_or(100.0);
                let level = (level + drift).clamp(10.0, 100.0);
                let min_stock = node.data.number("minStock");
                node.data.set("level", number_value(level));
                node.data.set("kanbanTriggered", min_stock > 0.0 && level < min_stock);
            } else if node.is_customer() {
                customers.push(node.id.clone());
            } else if node.symbol().is_freight() {
                let lead_time = positive_or(node.data.number("leadTime"), 5.0);
                advance(node, 10.0 / lead_time);
                node.data.set("simulating", true);
            }
        }

        let shortages = self.flag_shortages(map, &customers);

        let current = triggered_inventories(map);
        let triggered = lagged.as_ref().unwrap_or(&current);
        let mut kanban_active = 0;
        for edge in map.edges_mut() {
            let active = edge.flow().is_information() && triggered.contains(&edge.target);
            edge.data.set("kanbanActive", active);
            kanban_active += usize::from(active);
        }

        let summary = TickSummary {
            tick: self.ticks,
            triggered: current.len(),
            kanban_active,
            shortages,
        };
        debug!(?summary, "Simulation tick");
        Some(summary)
    }

    fn flag_shortages(&mut self, map: &mut ValueStreamMap, customers: &[NodeId]) -> usize {
        if customers.is_empty() {
            return 0;
        }
        let decisions: Vec<(NodeId, bool)> = match self.shortage_policy {
            ShortagePolicy::Random => customers
                .iter()
                .map(|id| (id.clone(), self.rng.gen_bool(self.shortage_probability)))
                .collect(),
            ShortagePolicy::Derived => {
                let flow = MaterialFlow::build(map);
                customers
                    .iter()
                    .map(|id| {
                        let short = flow.upstream_of(id).iter().any(|up| {
                            map.node(up).map_or(false, |node| node.data.flag("kanbanTriggered"))
                        });
                        (id.clone(), short)
                    })
                    .collect()
            }
        };

        let mut shortages = 0;
        for (id, short) in decisions {
            if let Some(node) = map.node_mut(&id) {
                node.data.set("isShortage", short);
                node.data.set("simulating", true);
                shortages += usize::from(short);
            }
        }
        shortages
    }
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        default
    }
}

fn advance(node: &mut VsmNode, step: f64) {
    let progress = node.data.number("progress") + step;
    let progress = if progress >= 100.0 { 0.0 } else { progress };
    node.data.set("progress", number_value(progress));
}

fn triggered_inventories(map: &ValueStreamMap) -> HashSet<NodeId> {
    map.nodes()
        .filter(|node| node.kind == NodeKind::Inventory && node.data.flag("kanbanTriggered"))
        .map(|node| node.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::VsmEdge;
    use crate::value_objects::{AttributeBag, FlowKind, Position2D, Symbol};
    use serde_json::json;

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     S[Simulation] --> SS[start / stop / reset]
    ///     S --> P[Process progress]
    ///     S --> I[Inventory level + kanban]
    ///     S --> T[Freight progress]
    ///     S --> C[Customer shortage]
    ///     C --> N[non-finite probability]
    ///     S --> E[Kanban edge pass]
    /// ```

    fn process(ct: f64) -> VsmNode {
        VsmNode::new("p", NodeKind::Process, Position2D::default())
            .with_data(AttributeBag::new().with("ct", json!(ct)))
    }

    fn inventory(level: f64, min_stock: f64) -> VsmNode {
        VsmNode::new("inv", NodeKind::Inventory, Position2D::default()).with_data(
            AttributeBag::new()
                .with("level", json!(level))
                .with("minStock", json!(min_stock)),
        )
    }

    fn seeded(policy: ShortagePolicy, propagation: KanbanPropagation) -> Simulation {
        Simulation::new(policy, 0.05, propagation, Some(7))
    }

    #[test]
    fn test_start_stop_reset() {
        let mut map = ValueStreamMap::from_parts(vec![process(10.0)], vec![]);
        let mut sim = Simulation::default();

        assert!(sim.tick(&mut map, 0.0).is_none());
        assert!(sim.start(&mut map));
        assert!(!sim.start(&mut map));
        sim.tick(&mut map, 0.0);

        assert!(sim.stop(&mut map));
        assert!(!sim.stop(&mut map));
        let node = map.node(&NodeId::new("p")).unwrap();
        assert_eq!(node.data.number("progress"), 5.0);
        assert!(!node.data.flag("simulating"));

        sim.reset(&mut map);
        let node = map.node(&NodeId::new("p")).unwrap();
        assert_eq!(node.data.number("progress"), 0.0);
        assert_eq!(node.data.number("level"), 100.0);
        assert_eq!(sim.ticks(), 0);
    }

    #[test]
    fn test_process_progress_wraps() {
        let mut map = ValueStreamMap::from_parts(vec![process(1.0)], vec![]);
        let mut sim = Simulation::default();
        sim.start(&mut map);

        sim.tick(&mut map, 0.0);
        assert_eq!(map.node(&NodeId::new("p")).unwrap().data.number("progress"), 50.0);
        sim.tick(&mut map, 0.0);
        assert_eq!(map.node(&NodeId::new("p")).unwrap().data.number("progress"), 0.0);
    }

    #[test]
    fn test_missing_cycle_time_defaults_to_ten() {
        let mut map = ValueStreamMap::from_parts(vec![process(0.0)], vec![]);
        let mut sim = Simulation::default();
        sim.start(&mut map);
        sim.tick(&mut map, 0.0);
        assert_eq!(map.node(&NodeId::new("p")).unwrap().data.number("progress"), 5.0);
    }

    #[test]
    fn test_inventory_level_is_clamped_and_triggers_kanban() {
        let mut map = ValueStreamMap::from_parts(vec![inventory(12.0, 50.0)], vec![]);
        let mut sim = Simulation::default();
        sim.start(&mut map);

        // sin(-pi/2) = -1
        let now = -std::f64::consts::FRAC_PI_2 * 2000.0;
        sim.tick(&mut map, now);
        let node = map.node(&NodeId::new("inv")).unwrap();
        assert_eq!(node.data.number("level"), 10.0);
        assert!(node.data.flag("kanbanTriggered"));
    }

    #[test]
    fn test_freight_progress() {
        let truck = VsmNode::from_symbol("t", &Symbol::Truck, Position2D::default());
        let mut map = ValueStreamMap::from_parts(vec![truck], vec![]);
        let mut sim = Simulation::default();
        sim.start(&mut map);
        sim.tick(&mut map, 0.0);
        let progress = map.node(&NodeId::new("t")).unwrap().data.number("progress");
        assert!((progress - 10.0 / 30.0).abs() < 1e-12);
    }

    fn kanban_map() -> ValueStreamMap {
        let control = VsmNode::new("ctrl", NodeKind::ProductionControl, Position2D::default());
        let mut map = ValueStreamMap::from_parts(vec![control, inventory(12.0, 50.0)], vec![]);
        map.add_edge(VsmEdge::new("sig", "ctrl", "inv").with_flow(FlowKind::Information))
            .unwrap();
        map.add_edge(VsmEdge::new("mat", "ctrl", "inv")).unwrap();
        map
    }

    #[test]
    fn test_kanban_signal_lags_one_tick() {
        let mut map = kanban_map();
        let mut sim = seeded(ShortagePolicy::Random, KanbanPropagation::Lagged);
        sim.start(&mut map);
        let now = -std::f64::consts::FRAC_PI_2 * 2000.0;

        let first = sim.tick(&mut map, now).unwrap();
        assert_eq!(first.triggered, 1);
        assert_eq!(first.kanban_active, 0);

        let second = sim.tick(&mut map, now).unwrap();
        assert_eq!(second.kanban_active, 1);
        let sig = map.edge(&crate::value_objects::EdgeId::new("sig")).unwrap();
        assert!(sig.data.flag("kanbanActive"));
        let mat = map.edge(&crate::value_objects::EdgeId::new("mat")).unwrap();
        assert!(!mat.data.flag("kanbanActive"));
    }

    #[test]
    fn test_kanban_signal_same_tick() {
        let mut map = kanban_map();
        let mut sim = seeded(ShortagePolicy::Random, KanbanPropagation::SameTick);
        sim.start(&mut map);
        let now = -std::f64::consts::FRAC_PI_2 * 2000.0;
        assert_eq!(sim.tick(&mut map, now).unwrap().kanban_active, 1);
    }

    #[test]
    fn test_derived_shortage_follows_upstream_kanban() {
        let customer = VsmNode::from_symbol("cust", &Symbol::Customer, Position2D::default());
        let mut map = ValueStreamMap::from_parts(vec![inventory(12.0, 50.0), customer], vec![]);
        map.add_edge(VsmEdge::new("ship", "inv", "cust")).unwrap();

        let mut sim = seeded(ShortagePolicy::Derived, KanbanPropagation::Lagged);
        sim.start(&mut map);
        let summary = sim
            .tick(&mut map, -std::f64::consts::FRAC_PI_2 * 2000.0)
            .unwrap();
        assert_eq!(summary.shortages, 1);
        assert!(map.node(&NodeId::new("cust")).unwrap().data.flag("isShortage"));
    }

    #[test]
    fn test_random_shortage_respects_probability() {
        let customer = VsmNode::from_symbol("cust", &Symbol::Customer, Position2D::default());
        let mut map = ValueStreamMap::from_parts(vec![customer], vec![]);

        let mut never = Simulation::new(ShortagePolicy::Random, 0.0, KanbanPropagation::Lagged, Some(1));
        never.start(&mut map);
        for _ in 0..20 {
            assert_eq!(never.tick(&mut map, 0.0).unwrap().shortages, 0);
        }

        let mut always = Simulation::new(ShortagePolicy::Random, 1.0, KanbanPropagation::Lagged, Some(1));
        always.stop(&mut map);
        always.start(&mut map);
        assert_eq!(always.tick(&mut map, 0.0).unwrap().shortages, 1);
    }

    #[test]
    fn test_non_finite_probability_disables_random_shortage() {
        let customer = VsmNode::from_symbol("cust", &Symbol::Customer, Position2D::default());
        let mut map = ValueStreamMap::from_parts(vec![customer], vec![]);

        for probability in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut sim =
                Simulation::new(ShortagePolicy::Random, probability, KanbanPropagation::Lagged, Some(1));
            sim.start(&mut map);
            for _ in 0..10 {
                assert_eq!(sim.tick(&mut map, 0.0).unwrap().shortages, 0);
            }
            sim.stop(&mut map);
        }
    }
}
