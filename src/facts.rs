//! Transcription of an ITC2021 instance into ASP facts.
//!
//! The output starts with a comment naming the source, followed by the
//! structural facts (`team/1`, `num_teams/1`, `slot/1`, `num_slots/1`,
//! `phased/0`) and then one block of facts per constraint element, grouped by
//! category in the order CA1, CA2, CA3, CA4, GA1, BR1, BR2, FA2, SE1:
//!
//! ```text
//! ca1_param(ca1_1, type, hard).
//! ca1_param(ca1_1, max, 0).
//! ca1_param(ca1_1, mode, "H").
//! ca1_teams(ca1_1, 0).
//! ca1_slots(ca1_1, 0).
//! ```
//!
//! Downstream encodings rely on the category order; the order of facts inside
//! a category only follows the document.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use itertools::Itertools;
use log::*;

use crate::error::{self, Result};
use crate::instance::{self, Structure, Universe};
use crate::lists::{self, Grammar};
use crate::schema::{Category, ParamKind};

/// Append-only list of output lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactSequence {
    lines: Vec<String>,
}

impl FactSequence {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of facts, not counting comments and blank lines.
    pub fn fact_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.is_empty() && !l.starts_with('%')).count()
    }

    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in self.lines.iter() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Identifier of one constraint record, e.g. `ca2_4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId {
    pub category: Category,
    pub index: usize,
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category.prefix(), self.index)
    }
}

/// Result of transcribing one document.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub facts: FactSequence,
    /// Number of records per category.
    pub records: BTreeMap<Category, usize>,
    /// Tokens dropped from list attributes because they did not fit the grammar.
    pub skipped: usize,
}

/// Single-use transcoder; counters start at zero for every document.
#[derive(Debug, Default)]
pub struct Transcoder {
    counters: BTreeMap<Category, usize>,
    facts: FactSequence,
    skipped: usize,
}

impl Transcoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self, category: Category) -> RecordId {
        let counter = self.counters.entry(category).or_insert(0);
        *counter += 1;
        RecordId {
            category,
            index: *counter,
        }
    }

    pub fn transcode(mut self, doc: &roxmltree::Document, source: &str) -> Result<Transcript> {
        self.facts.push(format!("% ASP facts generated from {}", source));
        self.facts.push("");

        let structure = Structure::read(doc)?;
        self.structure(&structure);
        self.facts.push("");

        let mut elements: BTreeMap<Category, Vec<roxmltree::Node>> = BTreeMap::new();
        for node in doc.descendants().filter(|n| n.is_element()) {
            if let Some(category) = Category::from_tag(node.tag_name().name()) {
                elements.entry(category).or_default().push(node);
            }
        }

        for category in Category::ALL.iter().copied() {
            for element in elements.remove(&category).unwrap_or_default() {
                self.record(category, element);
            }
            debug!("{} ({}): {} records", category, category.description(), self.counters.get(&category).copied().unwrap_or(0));
        }

        Ok(Transcript {
            facts: self.facts,
            records: self.counters,
            skipped: self.skipped,
        })
    }

    fn structure(&mut self, structure: &Structure) {
        if let Some(teams) = structure.teams.as_ref() {
            self.universe(teams, "team", "num_teams");
        }
        if let Some(slots) = structure.slots.as_ref() {
            self.universe(slots, "slot", "num_slots");
        }
        if structure.phased {
            self.facts.push("phased.");
        }
    }

    fn universe(&mut self, universe: &Universe, member: &str, count: &str) {
        if universe.is_empty() {
            return;
        }
        match universe.max() {
            Some(max) if universe.is_contiguous() => {
                self.facts.push(format!("{}(0..{}).", member, max));
            }
            _ => {
                for id in universe.ids.iter() {
                    self.facts.push(format!("{}({}).", member, id));
                }
            }
        }
        self.facts.push(format!("{}({}).", count, universe.len()));
    }

    fn record(&mut self, category: Category, element: roxmltree::Node) {
        let id = self.next_id(category);
        let prefix = category.prefix();

        for param in category.params() {
            let raw = element.attribute(param.name).unwrap_or(param.default);
            let value = match param.kind {
                ParamKind::Polarity => raw.to_lowercase(),
                ParamKind::Number => raw.to_string(),
                ParamKind::Text => format!("\"{}\"", raw),
            };
            self.facts.push(format!("{}_param({}, {}, {}).", prefix, id, param.name, value));
        }

        for attr in category.lists() {
            let text = element.attribute(attr.name).unwrap_or("");
            let skipped = match attr.grammar {
                Grammar::Pairs => {
                    let parsed = lists::parse_pairs(text);
                    for (home, away) in parsed.values.iter() {
                        self.facts.push(format!("{}_{}({}, {}, {}).", prefix, attr.name, id, home, away));
                    }
                    parsed.skipped
                }
                Grammar::Plain | Grammar::RangeOrList => {
                    let parsed = if attr.grammar == Grammar::Plain {
                        lists::parse_list(text)
                    } else {
                        lists::parse_range(text)
                    };
                    for value in parsed.values.iter() {
                        self.facts.push(format!("{}_{}({}, {}).", prefix, attr.name, id, value));
                    }
                    parsed.skipped
                }
            };
            if skipped > 0 {
                warn!("{}: dropped {} malformed token(s) from {}={:?}", id, skipped, attr.name, text);
                self.skipped += skipped;
            }
        }
    }
}

pub fn transcode(doc: &roxmltree::Document, source: &str) -> Result<Transcript> {
    Transcoder::new().transcode(doc, source)
}

/// Loads, parses and transcribes an instance file.
pub fn transcode_file(input: &Path) -> Result<Transcript> {
    let xml = instance::load(input)?;
    let doc = instance::parse(&xml, input)?;
    info!("Parsed document");
    let transcript = transcode(&doc, &input.display().to_string())?;
    info!(
        "records: {}",
        transcript.records.iter().map(|(c, n)| format!("{}={}", c, n)).join(" ")
    );
    Ok(transcript)
}

pub fn write_facts(output: &Path, facts: &FactSequence) -> Result<()> {
    error::write(output, &facts.to_text())
}
