//! Structured wizard description
//!
//! Every field has the wizard's default, so a partial JSON description is accepted.

use crate::value_objects::Symbol;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a wizard process step or supplier
///
/// Accepts JSON strings and numbers (`"s1"`, `1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawWizardId", into = "String")]
pub struct WizardId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWizardId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawWizardId> for WizardId {
    fn from(raw: RawWizardId) -> Self {
        match raw {
            RawWizardId::Text(s) => WizardId(s),
            RawWizardId::Number(n) => WizardId(n.to_string()),
        }
    }
}

impl From<WizardId> for String {
    fn from(id: WizardId) -> Self {
        id.0
    }
}

impl WizardId {
    /// Create an id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string form of the id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WizardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WizardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Where the customer is served from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomerSource {
    /// Straight from the process chain
    #[default]
    Production,
    /// Through a finished-goods warehouse
    Warehouse,
    /// Drop-shipped from the first supplier
    Supplier,
}

/// Stock held after a process step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BufferPolicy {
    /// No buffer
    None,
    /// Inventory triangle
    #[default]
    Inventory,
    /// Supermarket
    Supermarket,
    /// FIFO lane
    Fifo,
    /// Safety stock
    Safety,
}

impl BufferPolicy {
    /// The symbol a buffer node is drawn with
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            BufferPolicy::None => None,
            BufferPolicy::Inventory => Some(Symbol::Inventory),
            BufferPolicy::Supermarket => Some(Symbol::Supermarket),
            BufferPolicy::Fifo => Some(Symbol::Fifo),
            BufferPolicy::Safety => Some(Symbol::SafetyStock),
        }
    }

    /// Upper-case caption of the buffer node
    pub fn caption(&self) -> &'static str {
        match self {
            BufferPolicy::None => "NONE",
            BufferPolicy::Inventory => "INVENTORY",
            BufferPolicy::Supermarket => "SUPERMARKET",
            BufferPolicy::Fifo => "FIFO",
            BufferPolicy::Safety => "SAFETY",
        }
    }
}

/// Push or pull material flow into a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowType {
    /// Scheduled push
    #[default]
    Push,
    /// Kanban pull
    Pull,
}

/// Where a step takes its input from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputSource {
    /// The previous step (or the suppliers for the first one)
    #[default]
    Previous,
    /// A dedicated transport from the receiving warehouse
    Receiving,
}

/// How scheduling information travels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InfoFlowMode {
    /// Paper schedules
    Manual,
    /// Electronic schedules
    #[default]
    Electronic,
}

/// Unit the changeover is entered in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeoverUnit {
    /// Minutes
    #[default]
    Min,
    /// Seconds
    Sec,
}

/// Customer profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerProfile {
    pub name: String,
    /// Pieces per day
    pub demand: f64,
    pub shifts: f64,
    pub hours_per_shift: f64,
    pub pack_size: f64,
    /// Shipping transport symbol
    pub transport_mode: Symbol,
    pub source: CustomerSource,
}

impl Default for CustomerProfile {
    fn default() -> Self {
        Self {
            name: "Customer".to_string(),
            demand: 1000.0,
            shifts: 2.0,
            hours_per_shift: 8.0,
            pack_size: 24.0,
            transport_mode: Symbol::Truck,
            source: CustomerSource::Production,
        }
    }
}

/// One process step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessStep {
    pub id: WizardId,
    pub name: String,
    /// Cycle time, seconds
    pub ct: f64,
    /// Value-added time, seconds; the cycle time when absent or zero
    pub va: Option<f64>,
    /// Changeover in `co_unit`
    pub co: f64,
    pub co_unit: ChangeoverUnit,
    pub workers: f64,
    pub performance: f64,
    #[serde(rename = "yield")]
    pub yield_pct: Option<f64>,
    pub uptime: Option<f64>,
    pub buffer: BufferPolicy,
    pub buffer_qty: f64,
    pub is_parallel: bool,
    pub flow_type: FlowType,
    pub has_kaizen: bool,
    pub needs_go_see: bool,
    /// Suppliers feeding this step; the first supplier when absent
    pub supplier_ids: Option<Vec<WizardId>>,
    /// Bill of materials, passed through
    pub bom: Value,
    pub input_source: InputSource,
    /// Transport from receiving; trolley when absent
    pub transport_from_receiving: Option<Symbol>,
}

impl Default for ProcessStep {
    fn default() -> Self {
        Self {
            id: WizardId::new("1"),
            name: "Process 1".to_string(),
            ct: 30.0,
            va: None,
            co: 45.0,
            co_unit: ChangeoverUnit::Min,
            workers: 1.0,
            performance: 90.0,
            yield_pct: Some(99.0),
            uptime: Some(95.0),
            buffer: BufferPolicy::Inventory,
            buffer_qty: 500.0,
            is_parallel: false,
            flow_type: FlowType::Push,
            has_kaizen: false,
            needs_go_see: false,
            supplier_ids: None,
            bom: Value::Object(serde_json::Map::new()),
            input_source: InputSource::Previous,
            transport_from_receiving: None,
        }
    }
}

impl ProcessStep {
    /// Changeover in minutes
    pub fn changeover_minutes(&self) -> f64 {
        match self.co_unit {
            ChangeoverUnit::Min => self.co,
            ChangeoverUnit::Sec => crate::value_objects::round2(self.co / 60.0),
        }
    }
}

/// One supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplierSpec {
    pub id: WizardId,
    pub name: String,
    /// Deliveries per day
    pub frequency: f64,
    /// Inbound transport symbol drawn beside the supplier
    pub transport_mode: Option<Symbol>,
    /// Interpose a raw-material warehouse
    pub has_warehouse: bool,
}

impl Default for SupplierSpec {
    fn default() -> Self {
        Self {
            id: WizardId::new("s1"),
            name: "Supplier 1".to_string(),
            frequency: 1.0,
            transport_mode: Some(Symbol::Truck),
            has_warehouse: false,
        }
    }
}

/// Logistics profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogisticsProfile {
    pub milk_run_frequency: f64,
    pub truck_capacity: f64,
}

impl Default for LogisticsProfile {
    fn default() -> Self {
        Self {
            milk_run_frequency: 4.0,
            truck_capacity: 500.0,
        }
    }
}

/// Receiving warehouse toggle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReceivingProfile {
    pub enabled: bool,
    /// Default transport out of receiving
    pub transport_mode: Symbol,
    pub amount: f64,
}

impl Default for ReceivingProfile {
    fn default() -> Self {
        Self {
            enabled: false,
            transport_mode: Symbol::Trolley,
            amount: 1000.0,
        }
    }
}

/// Captions written onto generated nodes
///
/// Text lookup belongs to the caller; these are the English defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Labels {
    pub raw_material_warehouse: String,
    pub receiving: String,
    pub production_control: String,
    pub heijunka: String,
    pub shipping: String,
    pub finished_goods_warehouse: String,
    pub kaizen: String,
    pub go_see: String,
    pub schedule: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            raw_material_warehouse: "Raw Material WH".to_string(),
            receiving: "Receiving".to_string(),
            production_control: "PRODUCTION CONTROL".to_string(),
            heijunka: "HEIJUNKA".to_string(),
            shipping: "SHIPPING".to_string(),
            finished_goods_warehouse: "FG WAREHOUSE".to_string(),
            kaizen: "KAIZEN BURST!".to_string(),
            go_see: "GO SEE".to_string(),
            schedule: "SCHEDULE".to_string(),
        }
    }
}

/// Complete wizard description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WizardInput {
    pub customer: CustomerProfile,
    pub processes: Vec<ProcessStep>,
    pub suppliers: Vec<SupplierSpec>,
    pub logistics: LogisticsProfile,
    pub receiving: ReceivingProfile,
    pub info_flow: InfoFlowMode,
    pub use_heijunka: bool,
    pub labels: Labels,
}

impl Default for WizardInput {
    fn default() -> Self {
        Self {
            customer: CustomerProfile::default(),
            processes: vec![ProcessStep::default()],
            suppliers: vec![SupplierSpec::default()],
            logistics: LogisticsProfile::default(),
            receiving: ReceivingProfile::default(),
            info_flow: InfoFlowMode::Electronic,
            use_heijunka: false,
            labels: Labels::default(),
        }
    }
}

impl WizardInput {
    /// Parse a JSON description
    pub fn from_json_str(json: &str) -> crate::commands::VsmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
