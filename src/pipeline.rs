//! The post-processing pipeline: reference bounds, solution files and the
//! results analysis, run in that order inside one experiment directory.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::*;

use crate::analysis;
use crate::bounds;
use crate::error::{self, Error, Result};
use crate::solution_xml;

pub const RESULTS_DIR: &str = "Results/main_exp";
pub const SOLUTIONS_DIR: &str = "xml_solutions";
pub const REPORTS_DIR: &str = "reports";
pub const VALIDATOR: &str = "Validation/RobinX/RobinX";
pub const INSTANCES_DIR: &str = "Validation/RobinX/Repository/ITC2021/Instances/";
pub const BOUNDS_DIR: &str = "Validation/RobinX/Repository/ITC2021/Bounds/";
pub const REFERENCE_BOUNDS_CSV: &str = "reference_bounds.csv";
pub const COMPLETE_ANALYSIS_CSV: &str = "complete_analysis.csv";
pub const BEST_CONFIGURATIONS_CSV: &str = "best_configurations.csv";
pub const VALIDATION_CSV: &str = "validation_results.csv";
pub const REPORT_FILE: &str = "pipeline_report.txt";

/// Locations inside an experiment directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Workspace {
        Workspace { root: root.into() }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Inputs that must exist before the pipeline can run.
    pub fn required(&self) -> Vec<PathBuf> {
        [BOUNDS_DIR, INSTANCES_DIR, RESULTS_DIR, VALIDATOR]
            .iter()
            .map(|p| self.path(p))
            .collect()
    }

    pub fn missing(&self) -> Vec<PathBuf> {
        self.required().into_iter().filter(|p| !p.exists()).collect()
    }

    pub fn create_output_directories(&self) -> Result<()> {
        for dir in [SOLUTIONS_DIR, REPORTS_DIR].iter() {
            let path = self.path(dir);
            std::fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
            println!("Created directory: {}", dir);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ExtractBounds,
    ConvertSolutions,
    Analyse,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::ExtractBounds, Step::ConvertSolutions, Step::Analyse];

    pub fn description(self) -> &'static str {
        match self {
            Step::ExtractBounds => "Extract reference bounds from RobinX repository",
            Step::ConvertSolutions => "Convert ASP results to XML format",
            Step::Analyse => "Comprehensive results analysis with bounds comparison",
        }
    }

    pub fn run(self, ws: &Workspace, date: NaiveDate) -> Result<()> {
        match self {
            Step::ExtractBounds => {
                bounds::extract_to_csv(&ws.path(BOUNDS_DIR), &ws.path(REFERENCE_BOUNDS_CSV))?;
            }
            Step::ConvertSolutions => {
                let summary = solution_xml::convert_all(&ws.path(RESULTS_DIR), &ws.path(SOLUTIONS_DIR), date)?;
                println!("Successful: {}, failed: {}", summary.successful, summary.failed);
            }
            Step::Analyse => {
                analysis::run(
                    &ws.path(RESULTS_DIR),
                    &ws.path(REFERENCE_BOUNDS_CSV),
                    &ws.path(COMPLETE_ANALYSIS_CSV),
                    &ws.path(BEST_CONFIGURATIONS_CSV),
                )?;
            }
        }
        Ok(())
    }
}

pub fn report_text(timestamp: &str, solutions: usize) -> String {
    format!(
        "ASP RESULTS PROCESSING PIPELINE REPORT
Generated: {timestamp}
=====================================

1. BOUNDS EXTRACTION
   - Reference bounds of the RobinX ITC2021 repository
   - File: {bounds}

2. XML CONVERSION
   - {solutions} solution files in ITC2021 format
   - Directory: {solutions_dir}/

3. RESULTS ANALYSIS
   - Bounds comparison, gaps and configuration ranking per instance
   - Files: {analysis}, {best}

4. XML VALIDATION (manual)
   - Run validate_xml to check the solutions with RobinX
   - File: {validation}

OUTPUT FILES:
- {bounds}
- {analysis}
- {best}
- {solutions_dir}/
",
        timestamp = timestamp,
        bounds = REFERENCE_BOUNDS_CSV,
        solutions = solutions,
        solutions_dir = SOLUTIONS_DIR,
        analysis = COMPLETE_ANALYSIS_CSV,
        best = BEST_CONFIGURATIONS_CSV,
        validation = VALIDATION_CSV,
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Required inputs are missing; nothing was run.
    MissingInputs(Vec<PathBuf>),
    /// A step failed; the later steps were not run.
    Failed { step: Step, completed: usize },
    Completed { report: PathBuf },
}

fn banner(title: &str) {
    println!();
    println!("{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

fn count_solutions(dir: &Path) -> usize {
    crate::files::find(dir, "*.xml").map(|f| f.len()).unwrap_or(0)
}

pub fn run(ws: &Workspace) -> Result<Outcome> {
    let now = Local::now();
    println!("STARTING ASP RESULTS PROCESSING PIPELINE");
    println!("Timestamp: {}", now.format("%Y-%m-%d %H:%M:%S"));

    println!("Checking dependencies...");
    let missing = ws.missing();
    if !missing.is_empty() {
        println!("Missing required paths:");
        for path in missing.iter() {
            println!("  - {}", path.display());
        }
        return Ok(Outcome::MissingInputs(missing));
    }
    println!("All dependencies found");

    ws.create_output_directories()?;

    for (completed, step) in Step::ALL.iter().copied().enumerate() {
        banner(&format!("STEP: {}", step.description()));
        match step.run(ws, now.date_naive()) {
            Ok(()) => println!("SUCCESS: {} completed", step.description()),
            Err(e) => {
                error!("{:?} failed: {}", step, e);
                println!("PIPELINE STOPPED: {} failed: {}", step.description(), e);
                return Ok(Outcome::Failed { step, completed });
            }
        }
    }

    banner("OPTIONAL: XML Validation");
    println!("Run validate_xml manually to check the solutions with RobinX");

    let report = ws.path(REPORT_FILE);
    let text = report_text(
        &now.format("%Y-%m-%d %H:%M:%S").to_string(),
        count_solutions(&ws.path(SOLUTIONS_DIR)),
    );
    error::write(&report, &text)?;
    println!("Summary report generated: {}", REPORT_FILE);

    println!();
    println!("PIPELINE COMPLETED SUCCESSFULLY!");
    println!("Output files generated:");
    for file in [REFERENCE_BOUNDS_CSV, COMPLETE_ANALYSIS_CSV, BEST_CONFIGURATIONS_CSV, SOLUTIONS_DIR, REPORT_FILE].iter() {
        println!("  {}", file);
    }
    Ok(Outcome::Completed { report })
}
