//! Lean metrics derivation
//!
//! [`MetricsEngine::compute`] is a pure pass over a map snapshot. It produces a
//! [`MetricsRecord`] together with the cached-field patches (`globalTakt` on processing
//! steps, `calculatedLT` on stock) that renderers read. Applying the patches is a separate
//! step so the caller decides when the map is written.
//!
//! Accumulation is exact; only [`MetricsRecord::rounded`] and the cached `calculatedLT`
//! are rounded to two decimals.

pub mod analysis;

use crate::aggregate::{ValueStreamMap, VsmNode};
use crate::value_objects::{number_value, round2, AttributeBag, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Seconds in one day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Default takt overwrite threshold in seconds
pub const DEFAULT_TAKT_HYSTERESIS: f64 = 0.01;

/// Derived metrics of a map
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    /// Sum of cycle times, seconds
    #[serde(rename = "totalCT")]
    pub total_ct: f64,
    /// Sum of value-added times, seconds
    #[serde(rename = "totalVA")]
    pub total_va: f64,
    /// Inventory time plus processing time, seconds
    #[serde(rename = "totalLT")]
    pub total_lt: f64,
    /// Value-added share of lead time, percent
    pub efficiency: f64,
    /// Takt time in effect after this pass, seconds
    pub takt_time: f64,
    /// Takt time derived from customer demand, 0 without demand
    pub calculated_takt: f64,
    /// Calculated takt times the first customer's pack size
    pub pitch: f64,
}

impl MetricsRecord {
    /// Copy with every value rounded to two decimals for display
    pub fn rounded(&self) -> Self {
        Self {
            total_ct: round2(self.total_ct),
            total_va: round2(self.total_va),
            total_lt: round2(self.total_lt),
            efficiency: round2(self.efficiency),
            takt_time: round2(self.takt_time),
            calculated_takt: round2(self.calculated_takt),
            pitch: round2(self.pitch),
        }
    }
}

/// The slowest processing step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bottleneck {
    /// Node id
    pub node_id: NodeId,
    /// Display name
    pub name: String,
    /// Cycle time, seconds
    pub cycle_time: f64,
}

/// Lead time contributed by one stock node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLeadTime {
    /// Node id
    pub node_id: NodeId,
    /// Days of demand held, when demand is known
    pub days: Option<f64>,
    /// Seconds added to the lead time
    pub seconds: f64,
}

/// Everything one metrics pass produces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsReport {
    /// The derived record
    pub record: MetricsRecord,
    /// Sum of customer demand per day
    pub daily_demand: f64,
    /// New visible takt, when the hysteresis rule says to overwrite
    pub takt_update: Option<f64>,
    /// Takt written onto processing steps: calculated when available, else the current one
    pub effective_takt: f64,
    /// Slowest processing step
    pub bottleneck: Option<Bottleneck>,
    /// Per-stock lead-time contributions
    pub stock: Vec<StockLeadTime>,
    /// Cached-field patches for nodes whose cached values are stale
    pub patches: IndexMap<NodeId, AttributeBag>,
}

impl MetricsReport {
    /// Write the cached-field patches onto the map; returns the number of patched nodes
    pub fn apply_patches(&self, map: &mut ValueStreamMap) -> usize {
        self.patches
            .iter()
            .filter(|(id, patch)| map.patch_node_data(id, patch))
            .count()
    }
}

/// Plant calendar taken from the first customer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calendar {
    /// Available hours per shift
    pub available_hours: f64,
    /// Shifts per day
    pub shifts: f64,
    /// Standard pack size
    pub pack_size: f64,
}

impl Calendar {
    /// Read the calendar of a customer node, defaulting to 8 hours, 1 shift, pack of 1
    pub fn of(customer: &VsmNode) -> Self {
        Self {
            available_hours: customer.data.number_or("availableTime", 8.0),
            shifts: customer.data.number_or("shifts", 1.0),
            pack_size: customer.data.number_or("packSize", 1.0),
        }
    }

    /// Available production seconds per day
    pub fn available_seconds(&self) -> f64 {
        self.available_hours * 3600.0 * self.shifts
    }
}

/// Metrics engine
#[derive(Debug, Clone, Copy)]
pub struct MetricsEngine {
    hysteresis: f64,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TAKT_HYSTERESIS)
    }
}

impl MetricsEngine {
    /// Create an engine with a takt overwrite threshold
    pub fn new(hysteresis: f64) -> Self {
        Self {
            hysteresis: hysteresis.max(0.0),
        }
    }

    /// Derive metrics from a map given the currently visible takt
    pub fn compute(&self, map: &ValueStreamMap, current_takt: f64) -> MetricsReport {
        let customers: Vec<&VsmNode> = map.nodes().filter(|node| node.is_customer()).collect();

        let mut calculated_takt = 0.0;
        let mut pitch = 0.0;
        let mut takt_update = None;
        let daily_demand: f64 = customers.iter().map(|c| c.data.number("demand")).sum();

        if let Some(primary) = customers.first() {
            let calendar = Calendar::of(primary);
            if daily_demand > 0.0 {
                calculated_takt = calendar.available_seconds() / daily_demand;
                if (calculated_takt - current_takt).abs() > self.hysteresis {
                    info!(
                        previous = current_takt,
                        calculated = calculated_takt,
                        "Takt time follows customer demand"
                    );
                    takt_update = Some(calculated_takt);
                }
                pitch = calculated_takt * calendar.pack_size;
            }
        }

        let effective_takt = if calculated_takt > 0.0 {
            calculated_takt
        } else {
            current_takt
        };

        let mut total_ct = 0.0;
        let mut total_va = 0.0;
        let mut inventory_seconds = 0.0;
        let mut bottleneck: Option<Bottleneck> = None;
        let mut stock = Vec::new();
        let mut patches: IndexMap<NodeId, AttributeBag> = IndexMap::new();

        for node in map.nodes() {
            if node.is_processing() {
                let ct = node.cycle_time();
                total_ct += ct;
                total_va += node.value_added_time();

                if node.data.maybe_number("globalTakt") != Some(effective_takt) {
                    patches
                        .entry(node.id.clone())
                        .or_default()
                        .set("globalTakt", number_value(effective_takt));
                }

                if bottleneck.as_ref().map_or(true, |b| ct > b.cycle_time) {
                    bottleneck = Some(Bottleneck {
                        node_id: node.id.clone(),
                        name: node.display_name().to_string(),
                        cycle_time: ct,
                    });
                }
            }

            if node.holds_lead_time_stock() {
                if daily_demand > 0.0 {
                    let days = node.data.number("amount") / daily_demand;
                    let cached = round2(days);
                    if node.data.maybe_number("calculatedLT") != Some(cached) {
                        patches
                            .entry(node.id.clone())
                            .or_default()
                            .set("calculatedLT", number_value(cached));
                    }
                    let seconds = days * SECONDS_PER_DAY;
                    inventory_seconds += seconds;
                    stock.push(StockLeadTime {
                        node_id: node.id.clone(),
                        days: Some(days),
                        seconds,
                    });
                } else {
                    let seconds = node.data.number("time");
                    inventory_seconds += seconds;
                    stock.push(StockLeadTime {
                        node_id: node.id.clone(),
                        days: None,
                        seconds,
                    });
                }
            }
        }

        let total_lt = inventory_seconds + total_ct;
        let efficiency = if total_lt > 0.0 {
            total_va / total_lt * 100.0
        } else {
            0.0
        };

        let record = MetricsRecord {
            total_ct,
            total_va,
            total_lt,
            efficiency,
            takt_time: takt_update.unwrap_or(current_takt),
            calculated_takt,
            pitch,
        };

        debug!(
            total_ct,
            total_lt,
            efficiency,
            patched_nodes = patches.len(),
            "Computed value-stream metrics"
        );

        MetricsReport {
            record,
            daily_demand,
            takt_update,
            effective_takt,
            bottleneck,
            stock,
            patches,
        }
    }
}

/// Display predicate: the step is slower than the takt cached on it
pub fn is_bottleneck(node: &VsmNode) -> bool {
    let takt = node.data.number("globalTakt");
    takt > 0.0 && node.cycle_time() > takt
}
