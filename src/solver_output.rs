//! Reading the JSON report of the ASP solver (`clingo --outf=2`).
//!
//! Only the parts needed downstream are modelled; everything else in the
//! report is ignored. Missing fields fall back to their defaults.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{self, Error, Result};
use crate::instance::{SlotId, TeamId};
use crate::naming::cached;

pub const SATISFIABLE: &str = "SATISFIABLE";
pub const OPTIMUM_FOUND: &str = "OPTIMUM FOUND";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SolverOutput {
    #[serde(default = "unknown")]
    pub result: String,
    #[serde(default)]
    pub time: Time,
    #[serde(default)]
    pub models: Option<Models>,
    #[serde(default)]
    pub call: Vec<Call>,
    #[serde(default)]
    pub threads: Option<u64>,
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

fn unknown() -> String {
    "UNKNOWN".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Time {
    pub total: Option<f64>,
    pub solve: Option<f64>,
    #[serde(rename = "CPU")]
    pub cpu: Option<f64>,
}

/// Either clingo's model summary or, in older reports, the list of models itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Models {
    Summary(ModelSummary),
    List(Vec<Witness>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelSummary {
    #[serde(default)]
    pub number: u64,
    pub optimum: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Call {
    #[serde(default)]
    pub witnesses: Vec<Witness>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Witness {
    #[serde(default)]
    pub value: Vec<String>,
    #[serde(default)]
    pub costs: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bounds {
    #[serde(default)]
    pub lower: Vec<f64>,
    #[serde(default)]
    pub upper: Vec<f64>,
}

/// One game of a schedule: `home` plays `away` at home in `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduledMatch {
    pub home: TeamId,
    pub away: TeamId,
    pub slot: SlotId,
}

/// Parses `schedule(home,away,slot)`.
pub fn parse_schedule_atom(atom: &str) -> Option<ScheduledMatch> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let caps = cached(&RE, r"^schedule\((\d+),(\d+),(\d+)\)").captures(atom.trim())?;
    Some(ScheduledMatch {
        home: caps[1].parse().ok()?,
        away: caps[2].parse().ok()?,
        slot: caps[3].parse().ok()?,
    })
}

impl Witness {
    /// First (highest priority) cost component.
    pub fn cost(&self) -> Option<i64> {
        self.costs.first().copied()
    }

    pub fn schedule(&self) -> Vec<ScheduledMatch> {
        self.value
            .iter()
            .filter(|atom| atom.starts_with("schedule("))
            .filter_map(|atom| parse_schedule_atom(atom))
            .collect()
    }
}

impl SolverOutput {
    pub fn from_json(json: &str, path: &Path) -> Result<SolverOutput> {
        serde_json::from_str(json).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_path(path: &Path) -> Result<SolverOutput> {
        let json = error::read_to_string(path)?;
        SolverOutput::from_json(&json, path)
    }

    /// The solver reported at least one model.
    pub fn has_solution(&self) -> bool {
        self.result == SATISFIABLE || self.result == OPTIMUM_FOUND
    }

    /// Witnesses of the first call, or the model list of older reports.
    pub fn witnesses(&self) -> &[Witness] {
        match (self.call.first(), self.models.as_ref()) {
            (Some(call), _) if !call.witnesses.is_empty() => &call.witnesses,
            (_, Some(Models::List(models))) => models,
            _ => &[],
        }
    }

    /// The witness with the smallest first cost; the last witness when none carries a cost.
    ///
    /// This is not necessarily the first witness, so costs taken from here can
    /// differ from tables built on the first witness. A report whose witnesses
    /// carry no cost still yields a schedule.
    pub fn best_witness(&self) -> Option<&Witness> {
        let witnesses = self.witnesses();
        let mut best: Option<&Witness> = None;
        for w in witnesses.iter() {
            if let Some(cost) = w.cost() {
                if best.and_then(Witness::cost).map_or(true, |b| cost < b) {
                    best = Some(w);
                }
            }
        }
        best.or_else(|| witnesses.last())
    }

    pub fn best_cost(&self) -> Option<i64> {
        self.best_witness().and_then(Witness::cost)
    }

    pub fn models_found(&self) -> u64 {
        match self.models.as_ref() {
            Some(Models::Summary(s)) => s.number,
            Some(Models::List(l)) => l.len() as u64,
            None => 0,
        }
    }

    pub fn is_optimal(&self) -> bool {
        match self.models.as_ref() {
            Some(Models::Summary(s)) => s.optimum.as_deref() == Some("yes"),
            _ => self.result == OPTIMUM_FOUND,
        }
    }

    pub fn lower_bound(&self) -> Option<f64> {
        self.bounds.as_ref().and_then(|b| b.lower.first().copied())
    }

    pub fn upper_bound(&self) -> Option<f64> {
        self.bounds.as_ref().and_then(|b| b.upper.first().copied())
    }
}
