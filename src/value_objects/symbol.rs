//! Value-stream symbols
//!
//! A node's coarse [`NodeKind`](super::NodeKind) is refined by the `symbolType` carried in its
//! data bag. [`Symbol`] is the closed set of known symbols plus an open fallback, and
//! [`SymbolRole`] groups them by the behaviour the metrics and simulation passes care about.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every symbol a value-stream map can place
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Symbol {
    // Process flow
    /// Process step
    Process,
    /// External supplier
    Supplier,
    /// External customer
    Customer,
    /// Data box annotation
    DataBox,
    /// Operator marker
    Operator,
    /// Improvement opportunity
    KaizenBurst,

    // Material flow
    /// Inventory triangle
    Inventory,
    /// Supermarket pull stock
    Supermarket,
    /// First-in first-out lane
    Fifo,
    /// Safety stock
    SafetyStock,
    /// Truck shipment
    Truck,
    /// Sea freight
    Sea,
    /// Air freight
    Air,
    /// Raw material
    RawMaterial,
    /// Push arrow
    PushArrow,
    /// Finished goods stock
    FinishedGoods,

    // Information flow
    /// Production control department
    ProductionControl,
    /// Electronic information flow
    ElectronicInfo,
    /// Manual information flow
    ManualInfo,
    /// Kanban post
    KanbanPost,
    /// Signal kanban
    SignalKanban,
    /// Production kanban
    KanbanProduction,
    /// Withdrawal kanban
    KanbanWithdrawal,
    /// Go-see scheduling
    EyeObservation,
    /// Load-leveling box
    HeijunkaBox,
    /// Buffer stock
    Buffer,

    // Timeline and custom
    /// Lead-time ladder
    Timeline,
    /// Receiving dock or warehouse
    WarehouseReceiving,
    /// Shipping dock or warehouse
    WarehouseShipping,
    /// Forklift transport
    Forklift,
    /// Trolley transport
    Trolley,
    /// Free text note
    TextNote,
    /// Step linked to an external project
    Project,
    /// Generic user item from the palette
    CustomItem,
    /// A symbol this crate does not know about (uploaded icons, newer clients)
    Custom(String),
}

/// Behavioural group of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolRole {
    /// Contributes cycle time and value-added time
    Processing,
    /// Holds stock and contributes lead time
    Stock,
    /// Sets demand and the plant calendar
    Customer,
    /// Material origin
    Supplier,
    /// Moves material between stations
    Transport,
    /// Schedules or signals production
    Control,
    /// Kanban cards and signals
    Signal,
    /// Notes and markers with no flow semantics
    Annotation,
    /// Anything else
    Other,
}

impl Symbol {
    /// Create a symbol from its wire string
    pub fn from_str(s: &str) -> Self {
        match s {
            "process" => Symbol::Process,
            "supplier" => Symbol::Supplier,
            "customer" => Symbol::Customer,
            "data_box" => Symbol::DataBox,
            "operator" => Symbol::Operator,
            "kaizen_burst" => Symbol::KaizenBurst,
            "inventory" => Symbol::Inventory,
            "supermarket" => Symbol::Supermarket,
            "fifo" => Symbol::Fifo,
            "safety_stock" => Symbol::SafetyStock,
            "truck" => Symbol::Truck,
            "sea" => Symbol::Sea,
            "air" => Symbol::Air,
            "raw_material" => Symbol::RawMaterial,
            "push_arrow" => Symbol::PushArrow,
            "finished_goods" => Symbol::FinishedGoods,
            "production_control" | "productionControl" => Symbol::ProductionControl,
            "electronic_info" => Symbol::ElectronicInfo,
            "manual_info" => Symbol::ManualInfo,
            "kanban_post" => Symbol::KanbanPost,
            "signal_kanban" => Symbol::SignalKanban,
            "kanban_production" => Symbol::KanbanProduction,
            "kanban_withdrawal" => Symbol::KanbanWithdrawal,
            "eye_observation" => Symbol::EyeObservation,
            "heijunka_box" => Symbol::HeijunkaBox,
            "buffer" => Symbol::Buffer,
            "timeline" => Symbol::Timeline,
            "warehouse_receiving" => Symbol::WarehouseReceiving,
            "warehouse_shipping" => Symbol::WarehouseShipping,
            "forklift" => Symbol::Forklift,
            "trolley" => Symbol::Trolley,
            "text_note" | "textNote" => Symbol::TextNote,
            "project" => Symbol::Project,
            "custom" => Symbol::CustomItem,
            _ => Symbol::Custom(s.to_string()),
        }
    }

    /// Get the wire string of the symbol
    pub fn as_str(&self) -> &str {
        match self {
            Symbol::Process => "process",
            Symbol::Supplier => "supplier",
            Symbol::Customer => "customer",
            Symbol::DataBox => "data_box",
            Symbol::Operator => "operator",
            Symbol::KaizenBurst => "kaizen_burst",
            Symbol::Inventory => "inventory",
            Symbol::Supermarket => "supermarket",
            Symbol::Fifo => "fifo",
            Symbol::SafetyStock => "safety_stock",
            Symbol::Truck => "truck",
            Symbol::Sea => "sea",
            Symbol::Air => "air",
            Symbol::RawMaterial => "raw_material",
            Symbol::PushArrow => "push_arrow",
            Symbol::FinishedGoods => "finished_goods",
            Symbol::ProductionControl => "production_control",
            Symbol::ElectronicInfo => "electronic_info",
            Symbol::ManualInfo => "manual_info",
            Symbol::KanbanPost => "kanban_post",
            Symbol::SignalKanban => "signal_kanban",
            Symbol::KanbanProduction => "kanban_production",
            Symbol::KanbanWithdrawal => "kanban_withdrawal",
            Symbol::EyeObservation => "eye_observation",
            Symbol::HeijunkaBox => "heijunka_box",
            Symbol::Buffer => "buffer",
            Symbol::Timeline => "timeline",
            Symbol::WarehouseReceiving => "warehouse_receiving",
            Symbol::WarehouseShipping => "warehouse_shipping",
            Symbol::Forklift => "forklift",
            Symbol::Trolley => "trolley",
            Symbol::TextNote => "text_note",
            Symbol::Project => "project",
            Symbol::CustomItem => "custom",
            Symbol::Custom(s) => s,
        }
    }

    /// Behavioural group of this symbol
    pub fn role(&self) -> SymbolRole {
        match self {
            Symbol::Process | Symbol::Project => SymbolRole::Processing,
            Symbol::Inventory
            | Symbol::Supermarket
            | Symbol::Fifo
            | Symbol::SafetyStock
            | Symbol::FinishedGoods
            | Symbol::RawMaterial
            | Symbol::Buffer
            | Symbol::WarehouseReceiving
            | Symbol::WarehouseShipping => SymbolRole::Stock,
            Symbol::Customer => SymbolRole::Customer,
            Symbol::Supplier => SymbolRole::Supplier,
            Symbol::Truck
            | Symbol::Sea
            | Symbol::Air
            | Symbol::Forklift
            | Symbol::Trolley
            | Symbol::PushArrow => SymbolRole::Transport,
            Symbol::ProductionControl
            | Symbol::HeijunkaBox
            | Symbol::EyeObservation
            | Symbol::ElectronicInfo
            | Symbol::ManualInfo => SymbolRole::Control,
            Symbol::KanbanPost
            | Symbol::SignalKanban
            | Symbol::KanbanProduction
            | Symbol::KanbanWithdrawal => SymbolRole::Signal,
            Symbol::DataBox
            | Symbol::Operator
            | Symbol::KaizenBurst
            | Symbol::Timeline
            | Symbol::TextNote => SymbolRole::Annotation,
            Symbol::CustomItem | Symbol::Custom(_) => SymbolRole::Other,
        }
    }

    /// Long-haul transports animated by lead time in the simulation
    pub fn is_freight(&self) -> bool {
        matches!(self, Symbol::Truck | Symbol::Sea | Symbol::Air)
    }

    /// Every known symbol, in palette order
    pub fn all() -> Vec<Symbol> {
        vec![
            Symbol::Process,
            Symbol::Supplier,
            Symbol::Customer,
            Symbol::DataBox,
            Symbol::Operator,
            Symbol::KaizenBurst,
            Symbol::Inventory,
            Symbol::Supermarket,
            Symbol::Fifo,
            Symbol::SafetyStock,
            Symbol::Truck,
            Symbol::Sea,
            Symbol::Air,
            Symbol::RawMaterial,
            Symbol::PushArrow,
            Symbol::FinishedGoods,
            Symbol::ProductionControl,
            Symbol::ElectronicInfo,
            Symbol::ManualInfo,
            Symbol::KanbanPost,
            Symbol::SignalKanban,
            Symbol::KanbanProduction,
            Symbol::KanbanWithdrawal,
            Symbol::EyeObservation,
            Symbol::HeijunkaBox,
            Symbol::Buffer,
            Symbol::Timeline,
            Symbol::WarehouseReceiving,
            Symbol::WarehouseShipping,
            Symbol::Forklift,
            Symbol::Trolley,
            Symbol::TextNote,
            Symbol::Project,
            Symbol::CustomItem,
        ]
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol::from_str(&s)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.as_str().to_string()
    }
}
