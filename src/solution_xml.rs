//! ITC2021 solution files, and their creation from solver reports.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use log::*;

use crate::error::{self, Result};
use crate::files;
use crate::instance;
use crate::naming::RunName;
use crate::solver_output::{ScheduledMatch, SolverOutput};

/// Header data of a solution file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionMeta {
    pub instance_name: String,
    pub contributor: String,
    pub date: NaiveDate,
}

impl SolutionMeta {
    pub fn for_run(run: &RunName, date: NaiveDate) -> SolutionMeta {
        SolutionMeta {
            instance_name: run.instance_file_name(),
            contributor: format!("ASP_{}", run.config),
            date,
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Solution document with the games ordered by slot.
///
/// No objective value is written; the validator computes it from the games.
pub fn format_solution_xml(meta: &SolutionMeta, games: &[ScheduledMatch]) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();

    let mut games = games.to_vec();
    games.sort_by_key(|g| g.slot);

    writeln!(&mut out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(&mut out, "<Solution>")?;
    writeln!(&mut out, "  <MetaData>")?;
    writeln!(&mut out, "    <InstanceName>{}</InstanceName>", escape(&meta.instance_name))?;
    writeln!(&mut out, "    <Contributor>{}</Contributor>", escape(&meta.contributor))?;
    writeln!(
        &mut out,
        "    <Date day=\"{}\" month=\"{}\" year=\"{}\"/>",
        meta.date.day(),
        meta.date.month(),
        meta.date.year()
    )?;
    writeln!(&mut out, "  </MetaData>")?;
    writeln!(&mut out, "  <Games>")?;
    for g in games.iter() {
        writeln!(&mut out, "    <ScheduledMatch home=\"{}\" away=\"{}\" slot=\"{}\"/>", g.home, g.away, g.slot)?;
    }
    writeln!(&mut out, "  </Games>")?;
    writeln!(&mut out, "</Solution>")?;

    Ok(out)
}

/// The `objective` attribute of `ObjectiveValue`, if the solution carries one.
pub fn objective_value(path: &Path) -> Result<Option<i64>> {
    let xml = error::read_to_string(path)?;
    let doc = instance::parse(&xml, path)?;
    Ok(instance::find(doc.root(), "ObjectiveValue")
        .and_then(|n| n.attribute("objective"))
        .and_then(|v| v.trim().parse().ok()))
}

/// Outcome of converting one solver report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Written(PathBuf),
    /// The file name does not follow the result naming scheme.
    UnknownName(String),
    /// The solver found no schedule.
    NoSolution(String),
}

pub fn convert(json_path: &Path, output_dir: &Path, date: NaiveDate) -> Result<Conversion> {
    let file_name = files::file_name(json_path);
    let run = match RunName::parse(&file_name) {
        Some(run) => run,
        None => return Ok(Conversion::UnknownName(file_name)),
    };

    let report = SolverOutput::from_path(json_path)?;
    let schedule = if report.has_solution() {
        report.best_witness().map(|w| w.schedule()).unwrap_or_default()
    } else {
        Vec::new()
    };
    if schedule.is_empty() {
        return Ok(Conversion::NoSolution(file_name));
    }
    debug!("{}: result {} cost {:?}, {} games", file_name, report.result, report.best_cost(), schedule.len());

    let meta = SolutionMeta::for_run(&run, date);
    let xml = format_solution_xml(&meta, &schedule)
        .map_err(|e| crate::error::Error::Malformed(format!("formatting solution: {}", e)))?;
    let output = output_dir.join(run.solution_file_name());
    error::write(&output, &xml)?;
    Ok(Conversion::Written(output))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub found: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Converts every `*.json` below `input_dir` into a solution file in `output_dir`.
pub fn convert_all(input_dir: &Path, output_dir: &Path, date: NaiveDate) -> Result<ConversionSummary> {
    std::fs::create_dir_all(output_dir).map_err(|e| crate::error::Error::io(output_dir, e))?;

    let json_files = files::find(input_dir, "**/*.json")?;
    println!("Found {} JSON files to process", json_files.len());

    let mut summary = ConversionSummary {
        found: json_files.len(),
        ..Default::default()
    };
    for path in json_files.iter() {
        println!("Processing: {}", files::file_name(path));
        match convert(path, output_dir, date) {
            Ok(Conversion::Written(out)) => {
                debug!("wrote {:?}", out);
                summary.successful += 1;
            }
            Ok(Conversion::UnknownName(name)) => {
                println!("Could not parse filename: {}", name);
                summary.failed += 1;
            }
            Ok(Conversion::NoSolution(name)) => {
                println!("Skipping {} - no solution found", name);
                summary.failed += 1;
            }
            Err(e) => {
                println!("Failed to process {}: {}", path.display(), e);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}
