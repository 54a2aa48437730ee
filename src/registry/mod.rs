//! Symbol registry
//!
//! Maps every [`Symbol`] to the node kind it is placed as, the attribute bag a freshly
//! placed node starts with, and the numeric fields its data bag is checked against.
//! Nothing else in the crate branches on individual symbols for these concerns.

use crate::commands::{VsmError, VsmResult};
use crate::value_objects::{AttributeBag, NodeKind, Symbol};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Bounds for one numeric attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericField {
    /// Attribute key in the data bag
    pub key: &'static str,
    /// Smallest accepted value
    pub min: f64,
    /// Largest accepted value, if bounded
    pub max: Option<f64>,
}

const fn non_negative(key: &'static str) -> NumericField {
    NumericField { key, min: 0.0, max: None }
}

const fn percent(key: &'static str) -> NumericField {
    NumericField { key, min: 0.0, max: Some(100.0) }
}

/// A problem found in a node's data bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIssue {
    /// Offending attribute key
    pub key: String,
    /// What is wrong with it
    pub problem: FieldProblem,
}

/// Kinds of data-bag problems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldProblem {
    /// The value is present but cannot be read as a number
    NotNumeric,
    /// The value is below the field minimum
    BelowMinimum(f64),
    /// The value is above the field maximum
    AboveMaximum(f64),
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.problem {
            FieldProblem::NotNumeric => write!(f, "{} is not a number", self.key),
            FieldProblem::BelowMinimum(min) => write!(f, "{} must be at least {}", self.key, min),
            FieldProblem::AboveMaximum(max) => write!(f, "{} must be at most {}", self.key, max),
        }
    }
}

/// Node kind a symbol is placed as
pub fn node_kind(symbol: &Symbol) -> NodeKind {
    match symbol {
        Symbol::Process => NodeKind::Process,
        Symbol::Inventory => NodeKind::Inventory,
        Symbol::ProductionControl => NodeKind::ProductionControl,
        Symbol::TextNote => NodeKind::TextNote,
        _ => NodeKind::Generic,
    }
}

/// Attributes a freshly placed node of this symbol starts with
///
/// Unknown symbols get a bag holding only their name. The `symbolType` discriminator is
/// always set.
pub fn default_data(symbol: &Symbol) -> AttributeBag {
    let mut data = match initial_data(symbol) {
        Value::Object(map) => AttributeBag::from(map),
        _ => AttributeBag::new(),
    };
    if data.text("name").map_or(true, str::is_empty) && *symbol != Symbol::TextNote {
        data.set("name", symbol.as_str());
    }
    data.set("symbolType", symbol.as_str());
    data
}

fn initial_data(symbol: &Symbol) -> Value {
    match symbol {
        Symbol::Process => json!({
            "name": "Process",
            "ct": 60,
            "co": 30,
            "uptime": 95,
            "yield": 99,
            "performance": 90,
            "va": 60,
            "operators": 1,
            "shifts": 1,
            "startTime": "08:00",
            "endTime": "17:00",
            "processType": "normal",
            "variants": [],
            "inventoryCost": 0,
            "operatingCost": 0,
            "fohPerUnit": 0,
            "directMaterialCost": 0,
            "directLaborCost": 0,
            "machineCost": 0
        }),
        Symbol::Inventory => json!({
            "amount": 0,
            "unit": "pcs",
            "time": 0,
            "minStock": 100,
            "maxStock": 1000,
            "holdingCost": 0
        }),
        Symbol::Supplier => json!({
            "name": "Supplier",
            "reliability": 98,
            "leadTime": 5,
            "moq": 100,
            "unitPrice": 0
        }),
        // availableTime is hours per shift, the unit the takt calculation reads
        Symbol::Customer => json!({
            "name": "Customer",
            "demand": 1000,
            "unit": "pcs",
            "availableTime": 8,
            "shifts": 1,
            "daysPerMonth": 20,
            "packSize": 1,
            "taktTime": 0,
            "productMix": []
        }),
        Symbol::KaizenBurst => json!({ "name": "Problem/Idea" }),
        Symbol::ProductionControl => json!({
            "name": "Production Control",
            "planningFreq": "Daily",
            "horizon": 30
        }),
        Symbol::HeijunkaBox => json!({
            "name": "Heijunka Box",
            "description": "Load Leveling",
            "interval": 20,
            "pitch": 20
        }),
        Symbol::WarehouseReceiving => json!({
            "name": "Warehouse / Receiving",
            "capacity": 5000,
            "processingTime": 2,
            "dockDoors": 2
        }),
        Symbol::Truck => json!({
            "name": "Milk Run (Truck)",
            "frequency": 4,
            "capacity": 100,
            "leadTime": 30,
            "startTime": "08:00",
            "endTime": "17:00",
            "distance": 0,
            "costPerKm": 0,
            "fixedTripCost": 0,
            "emissionsFactor": 0.18
        }),
        Symbol::Forklift => json!({
            "name": "Forklift",
            "distance": 50,
            "speed": 60,
            "capacity": 1,
            "loadTime": 2,
            "unloadTime": 2,
            "operatingCost": 0
        }),
        Symbol::Trolley => json!({
            "name": "Trolley",
            "distance": 20,
            "speed": 40,
            "capacity": 10,
            "tripsPerShift": 10,
            "operatingCost": 0
        }),
        Symbol::SafetyStock => json!({
            "name": "Safety Stock",
            "amount": 100,
            "serviceLevel": 95,
            "demandStdDev": 10,
            "leadTimeVar": 2
        }),
        Symbol::Supermarket => json!({
            "name": "Supermarket",
            "minStock": 50,
            "maxStock": 500,
            "reorderPoint": 100,
            "replenishTime": 4
        }),
        Symbol::Buffer => json!({
            "name": "Buffer",
            "amount": 0,
            "maxCapacity": 200,
            "throughputRate": 50
        }),
        Symbol::Sea => json!({
            "name": "Sea Freight",
            "frequency": 1,
            "capacity": 5000,
            "leadTime": 30,
            "costPerShipment": 1000,
            "dutyRate": 0,
            "insuranceRate": 0
        }),
        Symbol::Air => json!({
            "name": "Air Freight",
            "frequency": 2,
            "capacity": 1000,
            "leadTime": 2,
            "costPerShipment": 5000,
            "dutyRate": 0,
            "insuranceRate": 0
        }),
        Symbol::Timeline => json!({ "name": "Timeline", "leadTime": 0, "vaTime": 0 }),
        Symbol::FinishedGoods => json!({ "name": "Finished Goods", "amount": 0 }),
        Symbol::TextNote => json!({ "text": "New Note", "color": "#ffff88", "fontSize": "14px" }),
        Symbol::Project => json!({
            "name": "Linked Project",
            "projectId": null,
            "projectName": "",
            "ct": 0,
            "outputPcs": 1,
            "co": 30,
            "uptime": 95,
            "yield": 99,
            "performance": 90,
            "va": 0,
            "operators": 1,
            "shifts": 1,
            "startTime": "08:00",
            "endTime": "17:00",
            "processType": "normal",
            "variants": []
        }),
        Symbol::CustomItem => json!({ "name": "Custom Item", "description": "" }),
        _ => json!({}),
    }
}

/// Numeric fields checked for a symbol
pub fn numeric_fields(symbol: &Symbol) -> &'static [NumericField] {
    const PROCESSING: &[NumericField] = &[
        non_negative("ct"),
        non_negative("co"),
        non_negative("va"),
        percent("uptime"),
        percent("yield"),
        percent("performance"),
        non_negative("operators"),
        non_negative("shifts"),
        NumericField { key: "outputPcs", min: 1.0, max: None },
    ];
    const STOCK: &[NumericField] = &[
        non_negative("amount"),
        non_negative("time"),
        non_negative("minStock"),
        non_negative("maxStock"),
    ];
    const CUSTOMER: &[NumericField] = &[
        non_negative("demand"),
        NumericField { key: "availableTime", min: 0.0, max: Some(24.0) },
        non_negative("shifts"),
        non_negative("packSize"),
    ];
    const SUPPLIER: &[NumericField] = &[percent("reliability"), non_negative("leadTime")];
    const TRANSPORT: &[NumericField] = &[
        non_negative("leadTime"),
        non_negative("frequency"),
        non_negative("capacity"),
        non_negative("distance"),
    ];
    const LEVELING: &[NumericField] = &[non_negative("interval"), non_negative("pitch")];

    match symbol {
        Symbol::Process | Symbol::Project => PROCESSING,
        Symbol::Inventory
        | Symbol::Supermarket
        | Symbol::SafetyStock
        | Symbol::Buffer
        | Symbol::FinishedGoods
        | Symbol::WarehouseReceiving => STOCK,
        Symbol::Customer => CUSTOMER,
        Symbol::Supplier => SUPPLIER,
        Symbol::Truck | Symbol::Sea | Symbol::Air | Symbol::Forklift | Symbol::Trolley => {
            TRANSPORT
        }
        Symbol::HeijunkaBox => LEVELING,
        _ => &[],
    }
}

/// Collect every problem in a data bag; absent fields are fine
pub fn inspect(symbol: &Symbol, data: &AttributeBag) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    for field in numeric_fields(symbol) {
        let Some(raw) = data.get(field.key) else {
            continue;
        };
        if raw.is_null() {
            continue;
        }
        let numeric = match raw {
            Value::Number(_) => true,
            Value::String(s) => s.trim().parse::<f64>().is_ok(),
            _ => false,
        };
        if !numeric {
            issues.push(FieldIssue {
                key: field.key.to_string(),
                problem: FieldProblem::NotNumeric,
            });
            continue;
        }
        let value = data.number(field.key);
        if value < field.min {
            issues.push(FieldIssue {
                key: field.key.to_string(),
                problem: FieldProblem::BelowMinimum(field.min),
            });
        } else if let Some(max) = field.max.filter(|max| value > *max) {
            issues.push(FieldIssue {
                key: field.key.to_string(),
                problem: FieldProblem::AboveMaximum(max),
            });
        }
    }
    issues
}

/// Validate a data bag, failing on the first batch of problems
pub fn validate(symbol: &Symbol, data: &AttributeBag) -> VsmResult<()> {
    let issues = inspect(symbol, data);
    if issues.is_empty() {
        return Ok(());
    }
    let message = issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(VsmError::Validation(format!("{symbol}: {message}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test Coverage
    ///
    /// ```mermaid
    /// graph TD
    ///     R[Registry] --> K[Node Kind]
    ///     R --> D[Default Data]
    ///     R --> V[Validation]
    /// ```

    #[test]
    fn test_node_kind_for_symbols() {
        assert_eq!(node_kind(&Symbol::Process), NodeKind::Process);
        assert_eq!(node_kind(&Symbol::Inventory), NodeKind::Inventory);
        assert_eq!(node_kind(&Symbol::ProductionControl), NodeKind::ProductionControl);
        assert_eq!(node_kind(&Symbol::Customer), NodeKind::Generic);
    }

    #[test]
    fn test_process_defaults() {
        let data = default_data(&Symbol::Process);
        assert_eq!(data.number("ct"), 60.0);
        assert_eq!(data.number("va"), 60.0);
        assert_eq!(data.text("processType"), Some("normal"));
        assert_eq!(data.text("symbolType"), Some("process"));
    }

    #[test]
    fn test_symbols_without_defaults_get_their_name() {
        let data = default_data(&Symbol::KanbanPost);
        assert_eq!(data.text("name"), Some("kanban_post"));
        assert_eq!(data.text("symbolType"), Some("kanban_post"));

        let note = default_data(&Symbol::TextNote);
        assert!(!note.contains("name"));
        assert_eq!(note.text("text"), Some("New Note"));
    }

    #[test]
    fn test_customer_calendar_is_in_hours() {
        let data = default_data(&Symbol::Customer);
        assert_eq!(data.number("availableTime"), 8.0);
        assert!(validate(&Symbol::Customer, &data).is_ok());
    }

    #[test]
    fn test_validation_reports_bad_fields() {
        let data = AttributeBag::new()
            .with("ct", json!("fast"))
            .with("uptime", json!(120))
            .with("co", json!(-5))
            .with("va", json!("12.5"));

        let issues = inspect(&Symbol::Process, &data);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].problem, FieldProblem::NotNumeric);
        assert_eq!(issues[1].problem, FieldProblem::BelowMinimum(0.0));
        assert_eq!(issues[2].problem, FieldProblem::AboveMaximum(100.0));

        match validate(&Symbol::Process, &data) {
            Err(VsmError::Validation(msg)) => assert!(msg.contains("ct is not a number")),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }
}
