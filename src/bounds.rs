//! Reference bounds of the competition repository.

use std::collections::HashMap;
use std::path::Path;

use log::*;

use crate::csv::{self, Table};
use crate::error::{self, Error, Result};
use crate::files;
use crate::instance;
use crate::naming;

/// Contents of one bound file.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFile {
    pub instance_name: String,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

fn objective(doc: &roxmltree::Document, bound: &str) -> Option<f64> {
    let node = instance::find(doc.root(), bound)?;
    let objective = instance::child(node, "Objective")?;
    objective.text()?.trim().parse().ok()
}

pub fn parse_bound_file(xml: &str, path: &Path) -> Result<BoundFile> {
    let doc = instance::parse(xml, path)?;
    let instance_name = instance::find(doc.root(), "InstanceName")
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .ok_or_else(|| Error::Malformed(format!("{}: no InstanceName", path.display())))?;
    Ok(BoundFile {
        instance_name,
        lower: objective(&doc, "LowerBound"),
        upper: objective(&doc, "UpperBound"),
    })
}

/// Best known bounds of one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceBounds {
    pub instance_key: String,
    pub instance_name: String,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub num_bound_files: usize,
}

fn min_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Merges bound files per instance key, keeping the first-seen order.
pub fn aggregate<I>(entries: I) -> Vec<ReferenceBounds>
where
    I: IntoIterator<Item = (String, BoundFile)>,
{
    let mut result: Vec<ReferenceBounds> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (key, file) in entries {
        match index.get(&key) {
            Some(&i) => {
                let entry = &mut result[i];
                entry.lower = min_opt(entry.lower, file.lower);
                entry.upper = min_opt(entry.upper, file.upper);
                entry.num_bound_files += 1;
            }
            None => {
                index.insert(key.clone(), result.len());
                result.push(ReferenceBounds {
                    instance_key: key,
                    instance_name: file.instance_name,
                    lower: file.lower,
                    upper: file.upper,
                    num_bound_files: 1,
                });
            }
        }
    }
    result
}

/// Reads every `*.xml` of `dir`. Files that cannot be parsed or named are skipped.
pub fn extract(dir: &Path) -> Result<Vec<ReferenceBounds>> {
    let paths = files::find(dir, "*.xml")?;
    println!("Found {} XML files", paths.len());

    let mut entries = Vec::new();
    for path in paths.iter() {
        let name = files::file_name(path);
        let parsed = error::read_to_string(path).and_then(|xml| parse_bound_file(&xml, path));
        let file = match parsed {
            Ok(file) => file,
            Err(e) => {
                warn!("Error parsing {}: {}", path.display(), e);
                continue;
            }
        };
        match naming::bound_instance_key(&name) {
            Some(key) => entries.push((key, file)),
            None => debug!("{}: not a bound file name", name),
        }
    }
    info!("Extracted {} bound entries", entries.len());
    Ok(aggregate(entries))
}

const COLUMNS: [&str; 7] = [
    "instance_key",
    "instance_name",
    "lower_bound",
    "upper_bound",
    "has_lower",
    "has_upper",
    "num_bound_files",
];

pub fn to_table(bounds: &[ReferenceBounds]) -> Table {
    let mut table = Table::new(&COLUMNS);
    for b in bounds.iter() {
        table.push(vec![
            b.instance_key.as_str().into(),
            b.instance_name.as_str().into(),
            b.lower.into(),
            b.upper.into(),
            b.lower.is_some().into(),
            b.upper.is_some().into(),
            b.num_bound_files.into(),
        ]);
    }
    table
}

pub fn write_csv(path: &Path, bounds: &[ReferenceBounds]) -> Result<()> {
    to_table(bounds).write(path)
}

/// Loads a table written by [`write_csv`], keyed by instance.
pub fn load_csv(path: &Path) -> Result<HashMap<String, ReferenceBounds>> {
    let mut bounds = HashMap::new();
    for record in csv::read(path)? {
        let key = match record.get("instance_key") {
            Some(key) => key.to_string(),
            None => continue,
        };
        bounds.insert(
            key.clone(),
            ReferenceBounds {
                instance_key: key,
                instance_name: record.get("instance_name").unwrap_or("Unknown").to_string(),
                lower: record.parse("lower_bound"),
                upper: record.parse("upper_bound"),
                num_bound_files: record.parse("num_bound_files").unwrap_or(0),
            },
        );
    }
    Ok(bounds)
}

/// Counts of instances with bounds per category, as (category, with lower, with upper, total).
pub fn category_counts(bounds: &[ReferenceBounds]) -> Vec<(String, usize, usize, usize)> {
    let mut counts: Vec<(String, usize, usize, usize)> = Vec::new();
    for b in bounds.iter() {
        let category = naming::split_instance_key(&b.instance_key)
            .map(|(c, _)| c)
            .unwrap_or_default();
        let i = match counts.iter().position(|c| c.0 == category) {
            Some(i) => i,
            None => {
                counts.push((category, 0, 0, 0));
                counts.len() - 1
            }
        };
        counts[i].1 += b.lower.is_some() as usize;
        counts[i].2 += b.upper.is_some() as usize;
        counts[i].3 += 1;
    }
    counts.sort();
    counts
}

/// Extracts the bounds of `dir` into the table `output` and prints an overview.
/// Returns the number of instances written; a missing directory writes nothing.
pub fn extract_to_csv(dir: &Path, output: &Path) -> Result<usize> {
    if !dir.exists() {
        println!("Bounds directory not found: {}", dir.display());
        println!("No bounds data found!");
        return Ok(0);
    }
    println!("Processing bounds files from: {}", dir.display());
    let bounds = extract(dir)?;
    if bounds.is_empty() {
        println!("No bounds data found!");
        return Ok(0);
    }
    write_csv(output, &bounds)?;

    println!();
    println!("Bounds data saved to: {}", output.display());
    println!("Total instances with bounds: {}", bounds.len());
    println!("Instances with lower bounds: {}", bounds.iter().filter(|b| b.lower.is_some()).count());
    println!("Instances with upper bounds: {}", bounds.iter().filter(|b| b.upper.is_some()).count());
    println!();
    println!("Bounds by instance type:");
    println!("{:<10} {:>9} {:>9} {:>6}", "type", "has_lower", "has_upper", "total");
    for (category, lower, upper, total) in category_counts(&bounds) {
        println!("{:<10} {:>9} {:>9} {:>6}", category, lower, upper, total);
    }
    Ok(bounds.len())
}
