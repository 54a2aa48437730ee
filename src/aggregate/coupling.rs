//! Field coupling rules for node data edits
//!
//! Writing one attribute may recompute others. Each rule names the field it reacts to and
//! the function that updates the rest of the bag after the write has been applied.

use crate::value_objects::{coerce_number, number_value, round2, AttributeBag};
use serde_json::Value;

/// Source of measured durations for project-linked nodes
pub trait DurationLookup {
    /// Sum of the measured durations of a project, in seconds
    fn total_duration(&self, project_id: &str) -> Option<f64>;
}

/// Lookup used when no project catalog is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProjects;

impl DurationLookup for NoProjects {
    fn total_duration(&self, _project_id: &str) -> Option<f64> {
        None
    }
}

impl<F> DurationLookup for F
where
    F: Fn(&str) -> Option<f64>,
{
    fn total_duration(&self, project_id: &str) -> Option<f64> {
        self(project_id)
    }
}

type Recompute = fn(&mut AttributeBag, &Value, &dyn DurationLookup);

/// One coupling rule
pub struct CouplingRule {
    /// Field whose write triggers the rule
    pub field: &'static str,
    recompute: Recompute,
}

/// All coupling rules, applied in order
pub const RULES: &[CouplingRule] = &[
    CouplingRule { field: "ct", recompute: pieces_from_cycle_time },
    CouplingRule { field: "pcsPerHour", recompute: cycle_time_from_pieces },
    CouplingRule { field: "amount", recompute: mirror_to_inventory },
    CouplingRule { field: "inventory", recompute: mirror_to_amount },
    CouplingRule { field: "outputPcs", recompute: cycle_time_from_project },
];

/// Write `value` into `field` and run every rule that reacts to it
pub fn apply(data: &mut AttributeBag, field: &str, value: Value, projects: &dyn DurationLookup) {
    data.set(field, value.clone());
    for rule in RULES.iter().filter(|rule| rule.field == field) {
        (rule.recompute)(data, &value, projects);
    }
}

/// Pieces per hour for a cycle time, 0 when the cycle time is not positive
pub fn pieces_per_hour(ct: f64) -> f64 {
    if ct > 0.0 {
        (3600.0 / ct).round()
    } else {
        0.0
    }
}

fn pieces_from_cycle_time(data: &mut AttributeBag, value: &Value, _: &dyn DurationLookup) {
    data.set("pcsPerHour", number_value(pieces_per_hour(coerce_number(value))));
}

fn cycle_time_from_pieces(data: &mut AttributeBag, value: &Value, _: &dyn DurationLookup) {
    // 3600/x is its own inverse
    data.set("ct", number_value(pieces_per_hour(coerce_number(value))));
}

fn mirror_to_inventory(data: &mut AttributeBag, value: &Value, _: &dyn DurationLookup) {
    data.set("inventory", value.clone());
}

fn mirror_to_amount(data: &mut AttributeBag, value: &Value, _: &dyn DurationLookup) {
    data.set("amount", value.clone());
}

fn cycle_time_from_project(data: &mut AttributeBag, value: &Value, projects: &dyn DurationLookup) {
    let Some(project_id) = project_id(data) else {
        return;
    };
    let Some(total) = projects.total_duration(&project_id) else {
        return;
    };
    let output = match coerce_number(value) {
        n if n == 0.0 => 1.0,
        n => n,
    };
    let ct = round2(total / output);
    data.set("ct", number_value(ct));
    data.set("pcsPerHour", number_value(pieces_per_hour(ct)));
}

/// Linked project id of a node, if any
pub fn project_id(data: &AttributeBag) -> Option<String> {
    match data.get("projectId")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
