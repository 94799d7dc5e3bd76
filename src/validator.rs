//! Checking solution files with the external RobinX validator.
//!
//! The validator is run once per solution as `<program> -i <instance> -s <solution>`.
//! Its report contains a line `Objective: <infeasibility> <objective>`, which
//! is compared with the cost the ASP solver reported for the same run.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

use itertools::Itertools;
use log::*;
use regex::Regex;

use crate::csv::Table;
use crate::error::{Error, Result};
use crate::files;
use crate::naming::{cached, SolutionName};
use crate::solution_xml;
use crate::solver_output::SolverOutput;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const SIGSEGV: i32 = 11;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// `(infeasibility, objective)` from the first line of the report carrying both numbers.
pub fn parse_objective(output: &str) -> Option<(i64, i64)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(&RE, r"Objective:\s+(\d+)\s+(\d+)");
    let caps = output.lines().find_map(|l| re.captures(l))?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Valid,
    Segfault,
    Error3,
    /// Non-zero exit, but an objective was reported.
    CalculatedRc(i32),
    Error(i32),
    Timeout,
    Exception,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Valid => write!(f, "VALID"),
            Status::Segfault => write!(f, "SEGFAULT"),
            Status::Error3 => write!(f, "ERROR_3"),
            Status::CalculatedRc(rc) => write!(f, "CALCULATED_RC{}", rc),
            Status::Error(rc) => write!(f, "ERROR_{}", rc),
            Status::Timeout => write!(f, "TIMEOUT"),
            Status::Exception => write!(f, "EXCEPTION"),
        }
    }
}

/// Outcome of one validator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub status: Status,
    pub return_code: i32,
    pub successful: bool,
    pub objective: Option<i64>,
    pub error: Option<String>,
}

impl Validation {
    fn failed(status: Status, error: String) -> Validation {
        Validation {
            status,
            return_code: -1,
            successful: false,
            objective: None,
            error: Some(error),
        }
    }
}

/// Classifies a finished run. Signals are passed as negative return codes.
pub fn classify(return_code: i32, stdout: &str, stderr: &str) -> Validation {
    let objective = parse_objective(&format!("{}{}", stdout, stderr)).map(|(_, objective)| objective);
    let (status, successful, error) = match return_code {
        0 => (Status::Valid, true, None),
        rc if rc == -SIGSEGV => (Status::Segfault, false, Some("Segmentation fault".to_string())),
        3 => (
            Status::Error3,
            false,
            Some("RobinX Error 3 - possible parsing issue".to_string()),
        ),
        rc if objective.is_some() => (
            Status::CalculatedRc(rc),
            true,
            Some(format!("Non-zero return code {} but objective calculated", rc)),
        ),
        rc => {
            let message = [stderr, stdout]
                .iter()
                .find(|s| !s.is_empty())
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("Return code: {}", rc));
            (Status::Error(rc), false, Some(message))
        }
    };
    Validation {
        status,
        return_code,
        successful,
        objective,
        error,
    }
}

fn return_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    status.code().unwrap_or(-1)
}

fn collect<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut bytes);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

fn join(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct Validator {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl Validator {
    pub fn new(program: impl Into<PathBuf>) -> Validator {
        Validator {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Validator {
        self.timeout = timeout;
        self
    }

    /// Fails with [`Error::ValidatorMissing`] when the program does not exist.
    pub fn check(&self) -> Result<()> {
        if self.program.exists() {
            Ok(())
        } else {
            Err(Error::ValidatorMissing(self.program.clone()))
        }
    }

    fn wait(&self, child: &mut Child) -> std::io::Result<Option<ExitStatus>> {
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if start.elapsed() >= self.timeout {
                child.kill()?;
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn validate(&self, instance: &Path, solution: &Path) -> Validation {
        debug!("{:?} -i {:?} -s {:?}", self.program, instance, solution);
        let mut child = match Command::new(&self.program)
            .arg("-i")
            .arg(instance)
            .arg("-s")
            .arg(solution)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => return Validation::failed(Status::Exception, e.to_string()),
        };

        let stdout = collect(child.stdout.take());
        let stderr = collect(child.stderr.take());

        match self.wait(&mut child) {
            Ok(Some(status)) => classify(return_code(status), &join(stdout), &join(stderr)),
            // readers are left to finish on their own, the pipes may be held by grandchildren
            Ok(None) => Validation::failed(
                Status::Timeout,
                format!("Timeout after {} seconds", self.timeout.as_secs()),
            ),
            Err(e) => Validation::failed(Status::Exception, e.to_string()),
        }
    }
}

/// Where solutions, instances and solver reports live.
#[derive(Debug, Clone)]
pub struct Layout {
    pub solutions: PathBuf,
    pub instances: PathBuf,
    pub results: PathBuf,
}

/// Cost reported by the ASP solver for a solution: the best witness of its
/// result file, else the objective stored in the solution itself.
pub fn asp_cost(name: &SolutionName, results: &Path, solution: &Path) -> Option<i64> {
    let from_json = name
        .result_candidates(results)
        .into_iter()
        .find(|p| p.exists())
        .and_then(|json| match SolverOutput::from_path(&json) {
            Ok(report) => report.best_cost(),
            Err(e) => {
                warn!("Error extracting ASP cost for {}: {}", files::file_name(solution), e);
                None
            }
        });
    from_json.or_else(|| match solution_xml::objective_value(solution) {
        Ok(cost) => cost,
        Err(e) => {
            warn!("Error extracting cost from {}: {}", solution.display(), e);
            None
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRecord {
    pub solution_file: String,
    pub instance_file: String,
    pub name: SolutionName,
    pub asp_cost: Option<i64>,
    pub validation: Validation,
}

impl ValidationRecord {
    pub fn cost_match(&self) -> Option<bool> {
        Some(self.asp_cost? == self.validation.objective?)
    }

    pub fn cost_difference(&self) -> Option<i64> {
        Some((self.asp_cost? - self.validation.objective?).abs())
    }
}

/// Validates the solutions of `layout.solutions`, at most `sample` of them.
pub fn validate_all(validator: &Validator, layout: &Layout, sample: Option<usize>) -> Result<Vec<ValidationRecord>> {
    if !layout.solutions.exists() {
        println!("Solutions directory not found: {}", layout.solutions.display());
        return Ok(Vec::new());
    }
    let mut solutions = files::find(&layout.solutions, "*.xml")?;
    match sample {
        Some(n) => {
            solutions.truncate(n);
            println!("Validating sample of {} XML files...", solutions.len());
        }
        None => println!("Validating {} XML files...", solutions.len()),
    }

    let mut records = Vec::new();
    for (i, path) in solutions.iter().enumerate() {
        let file_name = files::file_name(path);
        println!("Processing {}/{}: {}", i + 1, solutions.len(), file_name);

        let name = match SolutionName::parse(&file_name) {
            Some(name) => name,
            None => {
                println!("  Could not parse filename: {}", file_name);
                continue;
            }
        };
        let instance = match name.find_instance(&layout.instances) {
            Some(instance) => instance,
            None => {
                println!("  Instance file not found for {}_{}", name.category, name.number);
                continue;
            }
        };

        let asp_cost = asp_cost(&name, &layout.results, path);
        let validation = validator.validate(&instance, path);
        let record = ValidationRecord {
            solution_file: file_name,
            instance_file: files::file_name(&instance),
            name,
            asp_cost,
            validation,
        };

        if !record.validation.successful {
            println!(
                "  ✗ Validation failed: {}",
                record.validation.error.as_deref().unwrap_or_default()
            );
        } else if record.cost_match() == Some(true) {
            println!("  ✓ Valid (cost: {})", record.asp_cost.unwrap_or_default());
        } else {
            println!(
                "  ⚠ Valid but cost mismatch: ASP={:?}, RobinX={:?}",
                record.asp_cost, record.validation.objective
            );
        }
        records.push(record);
    }
    Ok(records)
}

const COLUMNS: [&str; 14] = [
    "solution_file",
    "instance_file",
    "instance_key",
    "category",
    "number",
    "configuration",
    "validation_successful",
    "asp_cost",
    "validation_objective",
    "cost_match",
    "cost_difference",
    "return_code",
    "validation_error",
    "status",
];

/// Result table, ordered by category, instance number and configuration.
pub fn to_table(records: &[ValidationRecord]) -> Table {
    let mut table = Table::new(&COLUMNS);
    let sorted = records.iter().sorted_by(|a, b| {
        let key = |r: &&ValidationRecord| (r.name.category.to_lowercase(), r.name.number, r.name.config.clone());
        key(a).cmp(&key(b))
    });
    for r in sorted {
        table.push(vec![
            r.solution_file.as_str().into(),
            r.instance_file.as_str().into(),
            r.name.instance_key().into(),
            r.name.category.to_lowercase().into(),
            r.name.number.into(),
            r.name.config.as_str().into(),
            r.validation.successful.into(),
            r.asp_cost.into(),
            r.validation.objective.into(),
            r.cost_match().into(),
            r.cost_difference().into(),
            (r.validation.return_code as i64).into(),
            r.validation.error.as_deref().into(),
            r.validation.status.to_string().into(),
        ]);
    }
    table
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn print_summary(records: &[ValidationRecord]) {
    if records.is_empty() {
        println!("No validation results to summarize");
        return;
    }

    println!();
    println!("{}", "=".repeat(50));
    println!("VALIDATION SUMMARY");
    println!("{}", "=".repeat(50));

    let total = records.len();
    let successful = records.iter().filter(|r| r.validation.successful).count();
    println!("Total validations: {}", total);
    println!("Successful: {} ({:.1}%)", successful, percent(successful, total));
    println!("Failed: {} ({:.1}%)", total - successful, percent(total - successful, total));

    let compared = records
        .iter()
        .filter(|r| r.validation.successful && r.cost_match().is_some())
        .collect::<Vec<_>>();
    println!();
    println!("Cost comparisons: {}", compared.len());
    if !compared.is_empty() {
        let matches = compared.iter().filter(|r| r.cost_match() == Some(true)).count();
        println!("Exact matches: {} ({:.1}%)", matches, percent(matches, compared.len()));
        let mismatches = compared.iter().filter(|r| r.cost_match() == Some(false)).collect::<Vec<_>>();
        if !mismatches.is_empty() {
            println!("Cost mismatches: {}", mismatches.len());
            println!("Sample mismatches:");
            for r in mismatches.iter().take(3) {
                println!(
                    "  {}: ASP={}, RobinX={}",
                    r.solution_file,
                    r.asp_cost.unwrap_or_default(),
                    r.validation.objective.unwrap_or_default()
                );
            }
        }
    }

    println!();
    println!("Validation by configuration:");
    println!("{:<20} {:>6} {:>10} {:>12}", "configuration", "count", "successful", "cost_match");
    let mut by_config: BTreeMap<&str, Vec<&ValidationRecord>> = BTreeMap::new();
    for r in records.iter() {
        by_config.entry(r.name.config.as_str()).or_default().push(r);
    }
    for (config, group) in by_config.iter() {
        println!(
            "{:<20} {:>6} {:>10} {:>12}",
            config,
            group.len(),
            group.iter().filter(|r| r.validation.successful).count(),
            group.iter().filter(|r| r.cost_match() == Some(true)).count()
        );
    }

    let failures = records.iter().filter(|r| !r.validation.successful).take(3).collect::<Vec<_>>();
    if !failures.is_empty() {
        println!();
        println!("Sample validation failures:");
        for r in failures {
            println!("  {}: {}", r.solution_file, r.validation.error.as_deref().unwrap_or_default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_line() {
        assert_eq!(parse_objective("Objective:             0                   1635"), Some((0, 1635)));
        assert_eq!(
            parse_objective("Reading instance\nObjective: 12 300\nObjective: 0 1\n"),
            Some((12, 300))
        );
        assert_eq!(
            parse_objective("Objective: infeasibility objective\nObjective:             0                   1635\n"),
            Some((0, 1635))
        );
        assert_eq!(parse_objective("Objective: n/a"), None);
        assert_eq!(parse_objective(""), None);
    }

    #[test]
    fn status_classification() {
        let v = classify(0, "Objective: 0 10", "");
        assert_eq!(v.status, Status::Valid);
        assert!(v.successful);
        assert_eq!(v.objective, Some(10));

        let v = classify(-11, "", "");
        assert_eq!(v.status, Status::Segfault);
        assert!(!v.successful);

        assert_eq!(classify(3, "Objective: 0 1", "").status, Status::Error3);

        let v = classify(2, "Objective: 4 77\n", "");
        assert_eq!(v.status, Status::CalculatedRc(2));
        assert!(v.successful);
        assert_eq!(v.objective, Some(77));

        let v = classify(1, "", "bad slot");
        assert_eq!(v.status, Status::Error(1));
        assert_eq!(v.error.as_deref(), Some("bad slot"));
        assert_eq!(classify(5, "", "").error.as_deref(), Some("Return code: 5"));
    }

    #[test]
    fn status_names() {
        assert_eq!(Status::CalculatedRc(1).to_string(), "CALCULATED_RC1");
        assert_eq!(Status::Error(-6).to_string(), "ERROR_-6");
        assert_eq!(Status::Timeout.to_string(), "TIMEOUT");
    }

    #[test]
    fn missing_program() {
        let validator = Validator::new("/nonexistent/RobinX");
        assert!(matches!(validator.check(), Err(Error::ValidatorMissing(_))));
        let v = validator.validate(Path::new("i.xml"), Path::new("s.xml"));
        assert_eq!(v.status, Status::Exception);
        assert_eq!(v.return_code, -1);
    }

    #[test]
    fn cost_from_result_file_then_solution() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        std::fs::create_dir_all(results.join("early")).unwrap();
        std::fs::write(
            results.join("early/early2_A.json"),
            r#"{"Result": "SATISFIABLE", "Call": [{"Witnesses": [{"Value": [], "Costs": [9]}, {"Value": [], "Costs": [4]}]}]}"#,
        )
        .unwrap();
        let solution = dir.path().join("Early_2_A.xml");
        std::fs::write(&solution, r#"<Solution><ObjectiveValue objective="30"/></Solution>"#).unwrap();

        let name = SolutionName::parse("Early_2_A.xml").unwrap();
        assert_eq!(asp_cost(&name, &results, &solution), Some(4));

        let other = SolutionName::parse("Early_2_B.xml").unwrap();
        assert_eq!(asp_cost(&other, &results, &solution), Some(30));
    }

    #[test]
    fn cost_comparison() {
        let record = ValidationRecord {
            solution_file: "Late_1_X.xml".to_string(),
            instance_file: "inst1_l.xml".to_string(),
            name: SolutionName::parse("Late_1_X.xml").unwrap(),
            asp_cost: Some(10),
            validation: classify(0, "Objective: 0 14", ""),
        };
        assert_eq!(record.cost_match(), Some(false));
        assert_eq!(record.cost_difference(), Some(4));

        let table = to_table(&[record]);
        assert_eq!(
            table.to_text().lines().nth(1),
            Some("Late_1_X.xml,inst1_l.xml,late1,late,1,X,True,10,14,False,4,0,,VALID")
        );
    }
}
