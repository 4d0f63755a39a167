//! The protein factory scorer.
//!
//! Five fixed machines, each with a protein yield and an electricity draw
//! per run. A configuration picks a run count per machine; the score is the
//! linear sum over the table, and a configuration is valid iff its total
//! draw stays within [`ENERGY_LIMIT`]. That's the whole game.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// One machine in the fixed production table.
#[derive(Debug, Clone, Serialize)]
pub struct Machine {
    pub id: &'static str,
    pub name: &'static str,
    /// Grams of protein produced per run.
    pub protein: u64,
    /// Electricity drawn per run, in kW.
    pub electricity: u64,
}

impl Machine {
    /// Grams of protein per kW — the efficiency column of the machine table.
    pub fn efficiency(&self) -> f64 {
        self.protein as f64 / self.electricity as f64
    }
}

/// The machines available to every factory. Hardcoded, never mutated.
pub const MACHINES: [Machine; 5] = [
    Machine { id: "A", name: "Machine A", protein: 10, electricity: 2 },
    Machine { id: "B", name: "Machine B", protein: 20, electricity: 5 },
    Machine { id: "C", name: "Machine C", protein: 35, electricity: 10 },
    Machine { id: "D", name: "Machine D", protein: 50, electricity: 15 },
    Machine { id: "E", name: "Machine E", protein: 100, electricity: 40 },
];

/// Configurations drawing more than this many kW are invalid.
pub const ENERGY_LIMIT: u64 = 50;

/// A user-chosen run count per machine for one scoring attempt.
///
/// Transient — exists only for one scoring call, then (if valid) rides
/// along into the leaderboard entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig(BTreeMap<String, u64>);

impl RunConfig {
    pub fn new(runs: BTreeMap<String, u64>) -> Self {
        Self(runs)
    }

    /// Coerce arbitrary JSON values into run counts: negative numbers clamp
    /// to 0, numeric strings parse, anything else counts as 0. Floats are
    /// truncated. Unknown machine ids are kept — they contribute nothing to
    /// the totals but stay part of the stored configuration.
    pub fn coerce(raw: &BTreeMap<String, Value>) -> Self {
        let runs = raw
            .iter()
            .map(|(id, value)| (id.clone(), coerce_count(value)))
            .collect();
        Self(runs)
    }

    /// Run count for a machine id, 0 when absent.
    pub fn runs(&self, id: &str) -> u64 {
        self.0.get(id).copied().unwrap_or(0)
    }

    /// The canonical stored form: a JSON object mapping id to count.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.0).expect("map of integers is valid JSON")
    }
}

fn coerce_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.max(0) as u64
            } else {
                n.as_f64().map_or(0, |f| f.max(0.0).trunc() as u64)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                i.max(0) as u64
            } else if let Ok(f) = s.parse::<f64>() {
                f.max(0.0).trunc() as u64
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// The outcome of one scoring attempt. Derived, not persisted directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub valid: bool,
    /// Total grams of protein produced.
    pub protein: u64,
    /// Total electricity drawn, in kW.
    pub energy: u64,
    pub message: String,
}

/// Sum protein and electricity over the fixed table, in table order, and
/// check the draw against [`ENERGY_LIMIT`]. The limit itself is still valid.
pub fn score(config: &RunConfig) -> ScoreResult {
    let mut protein = 0;
    let mut energy = 0;

    for machine in &MACHINES {
        let runs = config.runs(machine.id);
        protein += machine.protein * runs;
        energy += machine.electricity * runs;
    }

    let valid = energy <= ENERGY_LIMIT;
    let message = if valid {
        format!("Valid! You produced {protein} grams of protein!")
    } else {
        format!(
            "Invalid! Your electricity consumption is too high! ({energy}kW / {ENERGY_LIMIT}kW)"
        )
    };

    ScoreResult {
        valid,
        protein,
        energy,
        message,
    }
}
