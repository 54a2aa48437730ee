//! Display-oriented analyses built on top of the metrics pass

use super::{Calendar, SECONDS_PER_DAY};
use crate::aggregate::{MaterialFlow, ValueStreamMap, VsmNode};
use crate::value_objects::NodeId;
use serde::{Deserialize, Serialize};

/// Overall equipment effectiveness of a step as a fraction; missing factors count as 100%
pub fn oee(node: &VsmNode) -> f64 {
    let factor = |key: &str| node.data.number_or(key, 100.0) / 100.0;
    factor("uptime") * factor("performance") * factor("yield")
}

/// Operator loading of a step against takt, percent; `None` without a positive takt
pub fn operator_loading(node: &VsmNode, takt: f64) -> Option<f64> {
    if takt <= 0.0 {
        return None;
    }
    let operators = node.data.number_or("operators", 1.0);
    Some(node.cycle_time() / (takt * operators) * 100.0)
}

/// Per-step analysis row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepAnalysis {
    /// Node id
    pub node_id: NodeId,
    /// Display name
    pub name: String,
    /// Cycle time, seconds
    pub cycle_time: f64,
    /// OEE, fraction
    pub oee: f64,
    /// Operator loading, percent
    pub loading: Option<f64>,
    /// Cycle time exceeds takt
    pub over_takt: bool,
}

/// Analyse every processing step against a takt
pub fn analyze_steps(map: &ValueStreamMap, takt: f64) -> Vec<StepAnalysis> {
    map.nodes()
        .filter(|node| node.is_processing())
        .map(|node| StepAnalysis {
            node_id: node.id.clone(),
            name: node.display_name().to_string(),
            cycle_time: node.cycle_time(),
            oee: oee(node),
            loading: operator_loading(node, takt),
            over_takt: takt > 0.0 && node.cycle_time() > takt,
        })
        .collect()
}

/// Every-part-every-interval estimate for the slowest step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epei {
    /// The slowest processing step
    pub node_id: NodeId,
    /// Days needed to earn the changeover time; `None` when there is no spare time
    pub days: Option<f64>,
    /// At most one day
    pub healthy: bool,
}

/// EPEI of the slowest step against the first customer's calendar
///
/// Changeover is read in minutes. Missing customer demand defaults to 1000 pieces and a
/// missing cycle time to 1 second.
pub fn epei(map: &ValueStreamMap) -> Option<Epei> {
    let customer = map.nodes().find(|node| node.is_customer())?;
    let slowest = map
        .nodes()
        .filter(|node| node.is_processing())
        .fold(None::<&VsmNode>, |best, node| match best {
            Some(b) if node.cycle_time() <= b.cycle_time() => Some(b),
            _ => Some(node),
        })?;

    let available = Calendar::of(customer).available_seconds();
    let demand = customer.data.number_or("demand", 1000.0);
    let ct = slowest.data.number_or("ct", 1.0);
    let changeover = slowest.data.number("co") * 60.0;

    let spare = available - demand * ct;
    let days = (spare > 0.0).then(|| changeover / spare);
    Some(Epei {
        node_id: slowest.id.clone(),
        days,
        healthy: days.map_or(false, |d| d <= 1.0),
    })
}

/// How waits between ladder steps are estimated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitMethod {
    /// At least one takt between steps
    #[default]
    Takt,
    /// At least the mean of the neighbouring cycle times
    Cycle,
}

/// Kind of ladder segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Value-added processing
    ValueAdded,
    /// Waiting between steps
    Wait,
}

/// One rung of the lead-time ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderSegment {
    /// Segment id derived from the node ids
    pub id: String,
    /// Value-added or wait
    pub kind: SegmentKind,
    /// Caption
    pub name: String,
    /// Duration, seconds
    pub seconds: f64,
}

/// Lead-time ladder along a path of processing steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadTimeLadder {
    /// Segments in flow order
    pub segments: Vec<LadderSegment>,
    /// Value-added seconds
    pub total_va: f64,
    /// Waiting seconds
    pub total_nva: f64,
    /// Value-added plus waiting seconds
    pub lead_time: f64,
    /// Process cycle efficiency, percent
    pub pce: f64,
}

/// Build a ladder over the processing steps of `path`, ordered left to right
///
/// `base_wait_minutes` is the floor for every wait. `None` when the path holds no
/// processing step.
pub fn lead_time_ladder(
    map: &ValueStreamMap,
    path: &[NodeId],
    method: WaitMethod,
    base_wait_minutes: f64,
    takt: f64,
) -> Option<LeadTimeLadder> {
    let mut steps: Vec<&VsmNode> = path
        .iter()
        .filter_map(|id| map.node(id))
        .filter(|node| node.is_processing())
        .collect();
    if steps.is_empty() {
        return None;
    }
    steps.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));

    let base_wait = base_wait_minutes.max(0.0) * 60.0;
    let mut segments = Vec::with_capacity(steps.len() * 2);
    let mut total_va = 0.0;
    let mut total_nva = 0.0;

    for (idx, step) in steps.iter().enumerate() {
        let va = step.value_added_time().max(0.0);
        total_va += va;
        segments.push(LadderSegment {
            id: format!("{}-va", step.id),
            kind: SegmentKind::ValueAdded,
            name: step.display_name().to_string(),
            seconds: va,
        });

        if let Some(next) = steps.get(idx + 1) {
            let wait = match method {
                WaitMethod::Cycle => base_wait
                    .max((step.cycle_time().max(0.0) + next.cycle_time().max(0.0)) / 2.0),
                WaitMethod::Takt => base_wait.max(takt.max(0.0)),
            };
            total_nva += wait;
            segments.push(LadderSegment {
                id: format!("{}-wait-{}", step.id, next.id),
                kind: SegmentKind::Wait,
                name: format!("{} → {}", step.display_name(), next.display_name()),
                seconds: wait,
            });
        }
    }

    let lead_time = total_va + total_nva;
    let pce = if lead_time > 0.0 {
        total_va / lead_time * 100.0
    } else {
        0.0
    };
    Some(LeadTimeLadder {
        segments,
        total_va,
        total_nva,
        lead_time,
        pce,
    })
}

/// The material path into the first customer that passes the most processing steps
pub fn material_path(map: &ValueStreamMap) -> Vec<NodeId> {
    let Some(customer) = map.nodes().find(|node| node.is_customer()) else {
        return Vec::new();
    };
    MaterialFlow::build(map).heaviest_path_to(&customer.id, |id| {
        map.node(id).map_or(false, VsmNode::is_processing)
    })
}

/// One station of the value-stream timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStation {
    /// Node id
    pub node_id: NodeId,
    /// Display name
    pub name: String,
    /// Value-added seconds (processing steps)
    pub va: f64,
    /// Non-value-added seconds (stock, from the cached `calculatedLT` days)
    pub nva: f64,
}

/// Processing steps and stock ordered left to right, as drawn under a map
pub fn timeline(map: &ValueStreamMap) -> Vec<TimelineStation> {
    let mut stations: Vec<&VsmNode> = map
        .nodes()
        .filter(|node| node.is_processing() || node.holds_lead_time_stock())
        .collect();
    stations.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
    stations
        .into_iter()
        .map(|node| TimelineStation {
            node_id: node.id.clone(),
            name: node.display_name().to_string(),
            va: if node.is_processing() {
                node.value_added_time()
            } else {
                0.0
            },
            nva: if node.holds_lead_time_stock() {
                node.data.number("calculatedLT") * SECONDS_PER_DAY
            } else {
                0.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::VsmEdge;
    use crate::value_objects::{AttributeBag, NodeKind, Position2D, Symbol};
    use serde_json::json;

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     A[Analyses] --> O[OEE]
    ///     A --> L[Operator loading]
    ///     A --> E[EPEI]
    ///     A --> LL[Lead-time ladder]
    ///     A --> MP[Material path]
    /// ```

    fn step(id: &str, x: f64, data: AttributeBag) -> VsmNode {
        VsmNode::new(id, NodeKind::Process, Position2D::new(x, 0.0)).with_data(data)
    }

    #[test]
    fn test_oee_defaults_missing_factors() {
        let node = step("p", 0.0, AttributeBag::new().with("uptime", json!(90)).with("yield", json!(50)));
        assert!((oee(&node) - 0.45).abs() < 1e-12);
        assert_eq!(oee(&step("q", 0.0, AttributeBag::new())), 1.0);
    }

    #[test]
    fn test_operator_loading() {
        let node = step("p", 0.0, AttributeBag::new().with("ct", json!(90)).with("operators", json!(2)));
        assert_eq!(operator_loading(&node, 60.0), Some(75.0));
        assert_eq!(operator_loading(&node, 0.0), None);
    }

    #[test]
    fn test_epei_for_slowest_step() {
        let customer = VsmNode::from_symbol("c", &Symbol::Customer, Position2D::default()).with_data(
            AttributeBag::new()
                .with("symbolType", json!("customer"))
                .with("demand", json!(400))
                .with("availableTime", json!(8)),
        );
        let map = ValueStreamMap::from_parts(
            vec![
                customer,
                step("a", 0.0, AttributeBag::new().with("ct", json!(30)).with("co", json!(10))),
                step("b", 1.0, AttributeBag::new().with("ct", json!(60)).with("co", json!(30))),
            ],
            vec![],
        );
        let result = epei(&map).unwrap();
        assert_eq!(result.node_id.as_str(), "b");
        // 28800 - 400*60 = 4800 spare seconds; 1800 / 4800
        assert_eq!(result.days, Some(0.375));
        assert!(result.healthy);
    }

    #[test]
    fn test_epei_without_spare_time() {
        let customer = VsmNode::from_symbol("c", &Symbol::Customer, Position2D::default());
        let map = ValueStreamMap::from_parts(
            vec![customer, step("a", 0.0, AttributeBag::new().with("ct", json!(100)))],
            vec![],
        );
        let result = epei(&map).unwrap();
        assert_eq!(result.days, None);
        assert!(!result.healthy);
    }

    #[test]
    fn test_ladder_waits() {
        let map = ValueStreamMap::from_parts(
            vec![
                step("b", 500.0, AttributeBag::new().with("ct", json!(40)).with("va", json!(30))),
                step("a", 100.0, AttributeBag::new().with("ct", json!(20))),
            ],
            vec![],
        );
        let path = vec![NodeId::new("a"), NodeId::new("b")];

        let takt = lead_time_ladder(&map, &path, WaitMethod::Takt, 0.0, 60.0).unwrap();
        assert_eq!(takt.segments.len(), 3);
        assert_eq!(takt.segments[0].id, "a-va");
        assert_eq!(takt.segments[1].seconds, 60.0);
        assert_eq!(takt.total_va, 50.0);
        assert_eq!(takt.lead_time, 110.0);

        let cycle = lead_time_ladder(&map, &path, WaitMethod::Cycle, 0.0, 60.0).unwrap();
        assert_eq!(cycle.segments[1].seconds, 30.0);

        let floored = lead_time_ladder(&map, &path, WaitMethod::Cycle, 10.0, 60.0).unwrap();
        assert_eq!(floored.total_nva, 600.0);

        assert!(lead_time_ladder(&map, &[], WaitMethod::Takt, 0.0, 60.0).is_none());
    }

    #[test]
    fn test_material_path_and_timeline() {
        let customer = VsmNode::from_symbol("c", &Symbol::Customer, Position2D::new(900.0, 0.0));
        let inventory = VsmNode::new("i", NodeKind::Inventory, Position2D::new(300.0, 0.0))
            .with_data(AttributeBag::new().with("calculatedLT", json!(1.5)));
        let mut map = ValueStreamMap::from_parts(
            vec![
                step("a", 100.0, AttributeBag::new().with("ct", json!(20))),
                inventory,
                step("b", 500.0, AttributeBag::new().with("ct", json!(40))),
                customer,
            ],
            vec![],
        );
        map.add_edge(VsmEdge::new("e1", "a", "i")).unwrap();
        map.add_edge(VsmEdge::new("e2", "i", "b")).unwrap();
        map.add_edge(VsmEdge::new("e3", "b", "c")).unwrap();

        let path: Vec<String> = material_path(&map).iter().map(ToString::to_string).collect();
        assert_eq!(path, vec!["a", "i", "b", "c"]);

        let stations = timeline(&map);
        assert_eq!(stations.len(), 3);
        assert_eq!(stations[1].node_id.as_str(), "i");
        assert_eq!(stations[1].nva, 1.5 * SECONDS_PER_DAY);
    }
}
