//! Procedural map generation from a wizard description
//!
//! [`GraphGenerator`] lays a value stream out left to right: suppliers in the first column,
//! an optional receiving warehouse, the process chain with its buffers, then shipping and
//! the customer in the rightmost column. Production control sits above the chain and
//! information edges run from the customer through control to the pacemaker and every
//! supplier. Generation is deterministic and never fails; an empty process or supplier
//! list yields a smaller but well-formed map.

mod payload;
mod wizard;

pub use payload::{merge_suffix, GraphPayload, ImportMode};
pub use wizard::{
    BufferPolicy, ChangeoverUnit, CustomerProfile, CustomerSource, FlowType, InfoFlowMode,
    InputSource, Labels, LogisticsProfile, ProcessStep, ReceivingProfile, SupplierSpec,
    WizardId, WizardInput,
};

use crate::aggregate::{EdgeMarker, EdgeStyle, VsmEdge, VsmNode};
use crate::value_objects::{number_value, AttributeBag, FlowKind, NodeId, NodeKind, Position2D, Symbol};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::info;

const COLUMN_WIDTH: f64 = 450.0;
const ROW_HEIGHT: f64 = 250.0;
const CHAIN_Y: f64 = 350.0;
const PULL_COLOR: &str = "#ff9900";
const PUSH_COLOR: &str = "#fff";
const INFO_COLOR: &str = "#0078d4";
const DROP_SHIP_COLOR: &str = "#4caf50";

/// Builds a map from a [`WizardInput`]
#[derive(Debug, Clone, Copy)]
pub struct GraphGenerator {
    global_takt: f64,
}

impl GraphGenerator {
    /// Create a generator that stamps `global_takt` onto every node
    pub fn new(global_takt: f64) -> Self {
        Self { global_takt }
    }

    /// Generate a complete map
    pub fn generate(&self, input: &WizardInput) -> GraphPayload {
        let mut layout = Layout::new(input);
        let supply = layout.suppliers();
        let inbound = layout.receiving(&supply);
        let control = layout.control();
        let downstream = layout.customer(&inbound);
        let chain = layout.process_chain(&supply, &inbound);
        layout.close_chain(&chain, &downstream);
        layout.information_flow(&supply, &control, &downstream, chain.pacemaker.as_ref());

        let mut payload = GraphPayload::new(layout.nodes, layout.edges, Some(self.global_takt));
        payload.stamp_takt(self.global_takt);
        info!(
            nodes = payload.nodes.len(),
            edges = payload.edges.len(),
            processes = input.processes.len(),
            suppliers = input.suppliers.len(),
            "Generated value-stream map"
        );
        payload
    }
}

/// Per-supplier node ids
struct Supply {
    /// The supplier node itself
    nodes: HashMap<WizardId, NodeId>,
    /// The supplier's warehouse when it has one, else the supplier
    sources: HashMap<WizardId, NodeId>,
    /// Sources in supplier order
    ordered: Vec<NodeId>,
    first_source: Option<NodeId>,
    main_supplier: Option<WizardId>,
}

/// Where production input comes from
struct Inbound {
    sources: Vec<NodeId>,
    start_x: f64,
    /// Dedicated transports out of receiving, by process step
    transports: HashMap<WizardId, NodeId>,
}

struct Downstream {
    customer: NodeId,
    chain_target: NodeId,
}

struct Chain {
    last: Vec<NodeId>,
    pacemaker: Option<NodeId>,
}

struct Layout<'a> {
    input: &'a WizardInput,
    nodes: Vec<VsmNode>,
    edges: Vec<VsmEdge>,
}

impl<'a> Layout<'a> {
    fn new(input: &'a WizardInput) -> Self {
        Self {
            input,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn node(&mut self, id: &str, kind: NodeKind, x: f64, y: f64, data: Value) -> NodeId {
        let data = match data {
            Value::Object(map) => AttributeBag::from(map),
            _ => AttributeBag::new(),
        };
        let node = VsmNode::new(id, kind, Position2D::new(x, y)).with_data(data);
        let node_id = node.id.clone();
        self.nodes.push(node);
        node_id
    }

    fn symbol_node(&mut self, id: &str, symbol: &Symbol, x: f64, y: f64, mut data: Value) -> NodeId {
        if let Value::Object(map) = &mut data {
            map.insert("symbolType".to_string(), Value::from(symbol.as_str()));
        }
        self.node(id, NodeKind::Generic, x, y, data)
    }

    fn material(
        &mut self,
        id: String,
        source: &NodeId,
        target: &NodeId,
        style: EdgeStyle,
        marker: Option<EdgeMarker>,
    ) -> &mut VsmEdge {
        let mut edge = VsmEdge::new(id, source.clone(), target.clone())
            .with_flow(FlowKind::Material)
            .with_path_type("smoothstep")
            .with_style(style);
        edge.marker_end = marker;
        self.edges.push(edge);
        let last = self.edges.len() - 1;
        &mut self.edges[last]
    }

    fn suppliers(&mut self) -> Supply {
        let input = self.input;
        let mut supply = Supply {
            nodes: HashMap::new(),
            sources: HashMap::new(),
            ordered: Vec::new(),
            first_source: None,
            main_supplier: input.suppliers.first().map(|s| s.id.clone()),
        };

        for (index, supplier) in input.suppliers.iter().enumerate() {
            let y = 150.0 + index as f64 * ROW_HEIGHT;
            let sid = format!("node_supp_{}", supplier.id);
            let supplier_node = self.symbol_node(
                &sid,
                &Symbol::Supplier,
                50.0,
                y,
                json!({
                    "name": supplier.name,
                    "frequency": supplier.frequency,
                    "capacity": input.logistics.truck_capacity,
                }),
            );

            if let Some(mode) = &supplier.transport_mode {
                self.symbol_node(&format!("{sid}_transport"), mode, 120.0, y - 40.0, json!({ "name": "" }));
            }

            let mut source = supplier_node.clone();
            if supplier.has_warehouse {
                let warehouse = self.node(
                    &format!("node_wh_rm_{}", supplier.id),
                    NodeKind::Inventory,
                    220.0,
                    y,
                    json!({ "name": input.labels.raw_material_warehouse, "amount": 5000 }),
                );
                self.material(
                    format!("edge_supp_to_wh_{}", supplier.id),
                    &supplier_node,
                    &warehouse,
                    EdgeStyle::new(2.0, None, None),
                    None,
                );
                source = warehouse;
            }

            supply.nodes.insert(supplier.id.clone(), supplier_node);
            supply.sources.insert(supplier.id.clone(), source.clone());
            supply.ordered.push(source);
        }
        supply.first_source = supply.ordered.first().cloned();
        supply
    }

    fn receiving(&mut self, supply: &Supply) -> Inbound {
        let input = self.input;
        let mut inbound = Inbound {
            sources: supply.ordered.clone(),
            start_x: 450.0,
            transports: HashMap::new(),
        };
        if !input.receiving.enabled {
            return inbound;
        }

        inbound.start_x = 750.0;
        let receiving = self.symbol_node(
            "node_wh_receiving",
            &Symbol::WarehouseReceiving,
            400.0,
            150.0,
            json!({ "name": input.labels.receiving, "amount": input.receiving.amount }),
        );
        for (index, source) in supply.ordered.iter().enumerate() {
            self.material(
                format!("edge_supp_to_rec_{index}"),
                source,
                &receiving,
                EdgeStyle::new(2.0, None, None),
                None,
            );
        }

        let mut first_transport = None;
        let mut count = 0.0;
        for (index, step) in input.processes.iter().enumerate() {
            if step.input_source != InputSource::Receiving {
                continue;
            }
            let mode = step.transport_from_receiving.clone().unwrap_or(Symbol::Trolley);
            let transport = self.symbol_node(
                &format!("node_rec_transport_{index}"),
                &mode,
                550.0 + count * 150.0,
                150.0,
                json!({ "name": "" }),
            );
            self.handle_edge(format!("edge_rec_to_trans_{index}"), &receiving, &transport);
            inbound.transports.insert(step.id.clone(), transport.clone());
            first_transport.get_or_insert(transport);
            count += 1.0;
        }

        let entry = match first_transport {
            Some(transport) => transport,
            None => {
                let transport = self.symbol_node(
                    "node_rec_transport_default",
                    &input.receiving.transport_mode,
                    550.0,
                    150.0,
                    json!({ "name": "" }),
                );
                self.handle_edge("edge_rec_to_trans_default".to_string(), &receiving, &transport);
                transport
            }
        };
        inbound.sources = vec![entry];
        inbound
    }

    fn handle_edge(&mut self, id: String, source: &NodeId, target: &NodeId) {
        let edge = self.material(id, source, target, EdgeStyle::new(2.0, None, None), None);
        edge.extra.insert("sourceHandle".to_string(), Value::from("right"));
        edge.extra.insert("targetHandle".to_string(), Value::from("left"));
    }

    fn control(&mut self) -> NodeId {
        let input = self.input;
        let x = input.processes.len() as f64 * 200.0 + 600.0;
        let control = self.node(
            "node_control",
            NodeKind::ProductionControl,
            x,
            -150.0,
            json!({ "name": input.labels.production_control }),
        );
        if input.use_heijunka {
            self.symbol_node(
                "node_heijunka",
                &Symbol::HeijunkaBox,
                x - 100.0,
                -50.0,
                json!({ "name": input.labels.heijunka }),
            );
        }
        control
    }

    fn customer(&mut self, inbound: &Inbound) -> Downstream {
        let input = self.input;
        let profile = &input.customer;
        let extent = (input.processes.len() as f64 + 1.0) * COLUMN_WIDTH + 800.0;
        let x = extent.max(1200.0);

        let customer = self.symbol_node(
            "node_customer",
            &Symbol::Customer,
            x,
            CHAIN_Y,
            json!({
                "name": profile.name,
                "demand": profile.demand,
                "shifts": profile.shifts,
                "availableTime": profile.hours_per_shift,
                "packSize": profile.pack_size,
            }),
        );
        let shipping = self.symbol_node(
            "node_shipping_cust",
            &profile.transport_mode,
            x - 220.0,
            320.0,
            json!({ "name": input.labels.shipping }),
        );
        self.material(
            "edge_ship_to_cust".to_string(),
            &shipping,
            &customer,
            EdgeStyle::new(2.0, None, None),
            Some(EdgeMarker::closed(None)),
        );

        let chain_target = match profile.source {
            CustomerSource::Production => shipping,
            CustomerSource::Warehouse => {
                let warehouse = self.node(
                    "node_wh_fg",
                    NodeKind::Inventory,
                    x - 440.0,
                    CHAIN_Y,
                    json!({ "name": input.labels.finished_goods_warehouse, "amount": 2000 }),
                );
                self.material(
                    "edge_whfg_to_ship".to_string(),
                    &warehouse,
                    &shipping,
                    EdgeStyle::new(2.0, None, None),
                    None,
                );
                warehouse
            }
            CustomerSource::Supplier => {
                if let Some(source) = inbound.sources.first() {
                    self.material(
                        "edge_supp_direct_to_ship".to_string(),
                        source,
                        &shipping,
                        EdgeStyle::new(3.0, Some(DROP_SHIP_COLOR), None),
                        Some(EdgeMarker::closed(Some(DROP_SHIP_COLOR))),
                    );
                }
                customer.clone()
            }
        };
        Downstream {
            customer,
            chain_target,
        }
    }

    fn process_chain(&mut self, supply: &Supply, inbound: &Inbound) -> Chain {
        let input = self.input;
        let mut last: Vec<NodeId> = inbound.sources.clone();
        let mut branch_source = inbound.sources.first().cloned();
        let mut pacemaker = None;
        let mut current_x = inbound.start_x;
        let mut parallel_count = 0.0;

        for (index, step) in input.processes.iter().enumerate() {
            let (x, y) = if step.is_parallel {
                parallel_count += 1.0;
                (current_x - COLUMN_WIDTH, CHAIN_Y + parallel_count * ROW_HEIGHT)
            } else {
                parallel_count = 0.0;
                branch_source = last.first().cloned();
                (current_x, CHAIN_Y)
            };

            let process = self.process_node(index, step, x, y);
            if !step.is_parallel {
                pacemaker = Some(process.clone());
            }

            let targets = self.supplier_sources(step, supply);
            let style = connector_style(step.flow_type);
            let marker = connector_marker(step.flow_type);

            if !step.is_parallel {
                let dedicated = match step.input_source {
                    InputSource::Receiving => inbound.transports.get(&step.id),
                    InputSource::Previous => None,
                };
                if let Some(transport) = dedicated {
                    self.material(
                        format!("edge_trans_to_proc_{index}"),
                        transport,
                        &process,
                        style,
                        Some(marker),
                    );
                } else {
                    let (prefix, sources) = if index == 0 {
                        let sources = if input.receiving.enabled { last.clone() } else { targets };
                        ("edge_mat_init", sources)
                    } else {
                        ("edge_mat_merge", last.clone())
                    };
                    for (s, source) in sources.iter().enumerate() {
                        self.material(
                            format!("{prefix}_{index}_{s}"),
                            source,
                            &process,
                            style.clone(),
                            Some(marker.clone()),
                        );
                    }
                }
            } else {
                let extra_supplier = step.supplier_ids.as_ref().map_or(false, |ids| {
                    ids.iter().any(|id| Some(id) != supply.main_supplier.as_ref())
                });
                if extra_supplier && !input.receiving.enabled {
                    for (s, source) in targets.iter().enumerate() {
                        self.material(
                            format!("edge_mat_branch_supp_{index}_{s}"),
                            source,
                            &process,
                            style.clone(),
                            Some(marker.clone()),
                        );
                    }
                } else if let Some(source) = &branch_source {
                    self.material(
                        format!("edge_mat_branch_mid_{index}"),
                        source,
                        &process,
                        style,
                        Some(marker),
                    );
                }
            }

            let mut output = process.clone();
            if let Some(symbol) = step.buffer.symbol() {
                let data = json!({
                    "symbolType": symbol.as_str(),
                    "name": step.buffer.caption(),
                    "amount": step.buffer_qty,
                });
                let kind = match step.buffer {
                    BufferPolicy::Inventory => NodeKind::Inventory,
                    _ => NodeKind::Generic,
                };
                let buffer = self.node(&format!("node_buffer_{}", index + 1), kind, x + 220.0, y, data);
                self.material(
                    format!("edge_proc_to_buf_{index}"),
                    &process,
                    &buffer,
                    EdgeStyle::new(2.0, None, None),
                    Some(EdgeMarker::closed(None)),
                );
                output = buffer;
            }

            if step.is_parallel {
                last.push(output);
            } else {
                last = vec![output];
                current_x += COLUMN_WIDTH;
            }
        }

        if let Some(id) = &pacemaker {
            if let Some(node) = self.nodes.iter_mut().find(|node| &node.id == id) {
                node.data.set("processType", "pacemaker");
            }
        }
        Chain { last, pacemaker }
    }

    fn process_node(&mut self, index: usize, step: &ProcessStep, x: f64, y: f64) -> NodeId {
        let labels = &self.input.labels;
        let positive = |value: Option<f64>, default: f64| value.filter(|v| *v > 0.0).unwrap_or(default);
        let data = json!({
            "name": step.name,
            "ct": step.ct,
            "va": positive(step.va, step.ct),
            "co": number_value(step.changeover_minutes()),
            "workers": step.workers,
            "performance": step.performance,
            "yield": positive(step.yield_pct, 99.0),
            "uptime": positive(step.uptime, 95.0),
            "bom": step.bom,
        });
        let kaizen = step.has_kaizen.then(|| labels.kaizen.clone());
        let go_see = step.needs_go_see.then(|| labels.go_see.clone());

        let process = self.node(&format!("node_proc_{}", index + 1), NodeKind::Process, x, y, data);
        if let Some(name) = kaizen {
            self.symbol_node(
                &format!("node_kaizen_{}", index + 1),
                &Symbol::KaizenBurst,
                x + 50.0,
                y - 100.0,
                json!({ "name": name }),
            );
        }
        if let Some(name) = go_see {
            self.symbol_node(
                &format!("node_gosee_{}", index + 1),
                &Symbol::EyeObservation,
                x + 150.0,
                y - 100.0,
                json!({ "name": name }),
            );
        }
        process
    }

    /// Sources of the suppliers a step names, or of the first supplier
    fn supplier_sources(&self, step: &ProcessStep, supply: &Supply) -> Vec<NodeId> {
        let ids: Vec<&WizardId> = match &step.supplier_ids {
            Some(ids) => ids.iter().collect(),
            None => supply.main_supplier.iter().collect(),
        };
        ids.into_iter()
            .filter_map(|id| supply.sources.get(id).or(supply.first_source.as_ref()).cloned())
            .collect()
    }

    fn close_chain(&mut self, chain: &Chain, downstream: &Downstream) {
        for (index, last) in chain.last.iter().enumerate() {
            self.material(
                format!("edge_to_customer_target_{index}"),
                last,
                &downstream.chain_target,
                EdgeStyle::new(2.0, None, None),
                Some(EdgeMarker::closed(None)),
            );
        }
    }

    fn information_flow(
        &mut self,
        supply: &Supply,
        control: &NodeId,
        downstream: &Downstream,
        pacemaker: Option<&NodeId>,
    ) {
        let input = self.input;
        let (flow, dash) = match input.info_flow {
            InfoFlowMode::Electronic => (FlowKind::Electronic, "0"),
            InfoFlowMode::Manual => (FlowKind::Information, "5,5"),
        };
        let info = |id: String, source: &NodeId, target: &NodeId| {
            VsmEdge::new(id, source.clone(), target.clone())
                .with_flow(flow)
                .with_path_type("smoothstep")
                .with_style(EdgeStyle::new(1.0, Some(INFO_COLOR), Some(dash)))
                .with_marker(EdgeMarker::closed(Some(INFO_COLOR)))
        };

        self.edges
            .push(info("info_c_ctrl".to_string(), &downstream.customer, control));
        if let Some(pacemaker) = pacemaker {
            self.edges.push(
                info("info_ctrl_to_pacemaker".to_string(), control, pacemaker)
                    .with_label(input.labels.schedule.clone()),
            );
        }
        for supplier in &input.suppliers {
            if let Some(node) = supply.nodes.get(&supplier.id) {
                self.edges
                    .push(info(format!("info_ctrl_s_{}", supplier.id), control, node));
            }
        }
    }
}

fn connector_style(flow: FlowType) -> EdgeStyle {
    match flow {
        FlowType::Pull => EdgeStyle::new(3.0, Some(PULL_COLOR), Some("10,5")),
        FlowType::Push => EdgeStyle::new(2.0, Some(PUSH_COLOR), Some("0")),
    }
}

fn connector_marker(flow: FlowType) -> EdgeMarker {
    match flow {
        FlowType::Pull => EdgeMarker::closed(Some(PULL_COLOR)),
        FlowType::Push => EdgeMarker::closed(Some(PUSH_COLOR)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ValueStreamMap;

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     G[GraphGenerator] --> D[Default wizard]
    ///     G --> R[Receiving warehouse]
    ///     G --> P[Parallel branches]
    ///     G --> C[Customer source]
    ///     G --> E[Empty input]
    ///     G --> T[Takt stamping]
    /// ```

    fn ids(payload: &GraphPayload) -> Vec<&str> {
        payload.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn edge<'p>(payload: &'p GraphPayload, id: &str) -> &'p VsmEdge {
        payload
            .edges
            .iter()
            .find(|e| e.id.as_str() == id)
            .unwrap_or_else(|| panic!("missing edge {id}"))
    }

    fn node<'p>(payload: &'p GraphPayload, id: &str) -> &'p VsmNode {
        payload
            .nodes
            .iter()
            .find(|n| n.id.as_str() == id)
            .unwrap_or_else(|| panic!("missing node {id}"))
    }

    fn step(id: &str) -> ProcessStep {
        ProcessStep {
            id: WizardId::new(id),
            name: format!("Step {id}"),
            ..ProcessStep::default()
        }
    }

    fn supplier(id: &str) -> SupplierSpec {
        SupplierSpec {
            id: WizardId::new(id),
            name: format!("Supplier {id}"),
            ..SupplierSpec::default()
        }
    }

    #[test]
    fn test_default_wizard_layout() {
        let payload = GraphGenerator::new(57.6).generate(&WizardInput::default());

        assert_eq!(
            ids(&payload),
            vec![
                "node_supp_s1",
                "node_supp_s1_transport",
                "node_control",
                "node_customer",
                "node_shipping_cust",
                "node_proc_1",
                "node_buffer_1",
            ]
        );
        assert_eq!(payload.edges.len(), 7);
        assert_eq!(node(&payload, "node_proc_1").position, Position2D::new(450.0, 350.0));
        assert_eq!(node(&payload, "node_control").position, Position2D::new(800.0, -150.0));
        assert_eq!(node(&payload, "node_customer").position.x, 1700.0);

        let init = edge(&payload, "edge_mat_init_0_0");
        assert_eq!(init.source.as_str(), "node_supp_s1");
        assert_eq!(init.flow(), FlowKind::Material);

        let to_target = edge(&payload, "edge_to_customer_target_0");
        assert_eq!(to_target.source.as_str(), "node_buffer_1");
        assert_eq!(to_target.target.as_str(), "node_shipping_cust");

        let schedule = edge(&payload, "info_ctrl_to_pacemaker");
        assert_eq!(schedule.target.as_str(), "node_proc_1");
        assert_eq!(schedule.flow(), FlowKind::Electronic);

        let map = ValueStreamMap::from_parts(payload.nodes.clone(), payload.edges.clone());
        assert_eq!(map.edge_count(), payload.edges.len());
    }

    #[test]
    fn test_every_node_carries_takt() {
        let payload = GraphGenerator::new(57.6).generate(&WizardInput::default());
        assert!(payload.nodes.iter().all(|n| n.data.number("globalTakt") == 57.6));
        assert_eq!(payload.global_takt, Some(57.6));
    }

    #[test]
    fn test_customer_calendar_is_in_hours() {
        let payload = GraphGenerator::new(60.0).generate(&WizardInput::default());
        let customer = node(&payload, "node_customer");
        assert_eq!(customer.data.number("availableTime"), 8.0);
        assert_eq!(customer.data.number("demand"), 1000.0);
        assert!(customer.is_customer());
    }

    #[test]
    fn test_receiving_interposes_default_transport() {
        let mut input = WizardInput::default();
        input.receiving.enabled = true;
        let payload = GraphGenerator::new(60.0).generate(&input);

        assert_eq!(node(&payload, "node_proc_1").position.x, 750.0);
        assert_eq!(edge(&payload, "edge_supp_to_rec_0").target.as_str(), "node_wh_receiving");
        let transport = node(&payload, "node_rec_transport_default");
        assert_eq!(transport.symbol(), Symbol::Trolley);
        assert_eq!(
            edge(&payload, "edge_mat_init_0_0").source.as_str(),
            "node_rec_transport_default"
        );
        assert!(payload
            .edges
            .iter()
            .all(|e| !(e.source.as_str() == "node_supp_s1" && e.target.as_str() == "node_proc_1")));
    }

    #[test]
    fn test_receiving_dedicated_transports() {
        let mut input = WizardInput::default();
        input.receiving.enabled = true;
        input.processes = vec![step("1"), step("2")];
        input.processes[1].input_source = InputSource::Receiving;
        input.processes[1].transport_from_receiving = Some(Symbol::Forklift);

        let payload = GraphGenerator::new(60.0).generate(&input);
        let transport = node(&payload, "node_rec_transport_1");
        assert_eq!(transport.symbol(), Symbol::Forklift);
        assert_eq!(transport.position, Position2D::new(550.0, 150.0));
        assert_eq!(
            edge(&payload, "edge_trans_to_proc_1").source.as_str(),
            "node_rec_transport_1"
        );
        assert_eq!(
            edge(&payload, "edge_rec_to_trans_1").extra.get("sourceHandle"),
            Some(&Value::from("right"))
        );
    }

    #[test]
    fn test_parallel_branch_from_extra_supplier() {
        let mut input = WizardInput::default();
        input.suppliers = vec![supplier("s1"), supplier("s2")];
        input.processes = vec![step("1"), step("2"), step("3")];
        input.processes[1].is_parallel = true;
        input.processes[1].supplier_ids = Some(vec![WizardId::new("s2")]);
        input.processes[2].flow_type = FlowType::Pull;

        let payload = GraphGenerator::new(60.0).generate(&input);
        assert_eq!(node(&payload, "node_proc_2").position, Position2D::new(450.0, 600.0));
        assert_eq!(node(&payload, "node_proc_3").position, Position2D::new(900.0, 350.0));
        assert_eq!(
            edge(&payload, "edge_mat_branch_supp_1_0").source.as_str(),
            "node_supp_s2"
        );

        let merge_a = edge(&payload, "edge_mat_merge_2_0");
        let merge_b = edge(&payload, "edge_mat_merge_2_1");
        assert_eq!(merge_a.source.as_str(), "node_buffer_1");
        assert_eq!(merge_b.source.as_str(), "node_buffer_2");
        assert_eq!(merge_a.style.as_ref().and_then(|s| s.stroke.as_deref()), Some(PULL_COLOR));
        assert_eq!(merge_a.flow(), FlowKind::Material);

        assert_eq!(edge(&payload, "info_ctrl_to_pacemaker").target.as_str(), "node_proc_3");
        assert_eq!(node(&payload, "node_proc_3").data.text("processType"), Some("pacemaker"));
        assert!(payload.edges.iter().any(|e| e.id.as_str() == "info_ctrl_s_s2"));
    }

    #[test]
    fn test_parallel_branch_mid_stream() {
        let mut input = WizardInput::default();
        input.processes = vec![step("1"), step("2")];
        input.processes[1].is_parallel = true;

        let payload = GraphGenerator::new(60.0).generate(&input);
        assert_eq!(
            edge(&payload, "edge_mat_branch_mid_1").source.as_str(),
            "node_supp_s1"
        );
        assert_eq!(edge(&payload, "info_ctrl_to_pacemaker").target.as_str(), "node_proc_1");
    }

    #[test]
    fn test_customer_sources() {
        let mut input = WizardInput::default();
        input.customer.source = CustomerSource::Warehouse;
        let payload = GraphGenerator::new(60.0).generate(&input);
        assert_eq!(
            edge(&payload, "edge_to_customer_target_0").target.as_str(),
            "node_wh_fg"
        );
        assert_eq!(node(&payload, "node_wh_fg").kind, NodeKind::Inventory);

        input.customer.source = CustomerSource::Supplier;
        let payload = GraphGenerator::new(60.0).generate(&input);
        let direct = edge(&payload, "edge_supp_direct_to_ship");
        assert_eq!(direct.source.as_str(), "node_supp_s1");
        assert_eq!(
            edge(&payload, "edge_to_customer_target_0").target.as_str(),
            "node_customer"
        );
    }

    #[test]
    fn test_annotations_and_buffers() {
        let mut input = WizardInput::default();
        input.use_heijunka = true;
        input.processes[0].has_kaizen = true;
        input.processes[0].needs_go_see = true;
        input.processes[0].buffer = BufferPolicy::Supermarket;
        input.suppliers[0].has_warehouse = true;

        let payload = GraphGenerator::new(60.0).generate(&input);
        assert_eq!(node(&payload, "node_heijunka").position, Position2D::new(700.0, -50.0));
        assert_eq!(node(&payload, "node_kaizen_1").position, Position2D::new(500.0, 250.0));
        assert_eq!(node(&payload, "node_gosee_1").symbol(), Symbol::EyeObservation);
        let buffer = node(&payload, "node_buffer_1");
        assert_eq!(buffer.kind, NodeKind::Generic);
        assert_eq!(buffer.symbol(), Symbol::Supermarket);
        assert_eq!(
            edge(&payload, "edge_mat_init_0_0").source.as_str(),
            "node_wh_rm_s1"
        );
    }

    #[test]
    fn test_empty_input_is_well_formed() {
        let input = WizardInput {
            processes: vec![],
            suppliers: vec![],
            ..WizardInput::default()
        };
        let payload = GraphGenerator::new(60.0).generate(&input);

        assert_eq!(
            ids(&payload),
            vec!["node_control", "node_customer", "node_shipping_cust"]
        );
        let map = ValueStreamMap::from_parts(payload.nodes.clone(), payload.edges.clone());
        assert_eq!(map.edge_count(), payload.edges.len());
        assert_eq!(node(&payload, "node_customer").position.x, 1250.0);
    }

    #[test]
    fn test_manual_information_flow_is_dashed() {
        let mut input = WizardInput::default();
        input.info_flow = InfoFlowMode::Manual;
        let payload = GraphGenerator::new(60.0).generate(&input);
        let info = edge(&payload, "info_c_ctrl");
        assert_eq!(info.flow(), FlowKind::Information);
        assert!(info.style.as_ref().map_or(false, EdgeStyle::is_dashed));
    }
}
