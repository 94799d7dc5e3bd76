//! Comparison of solver runs across configurations and against the
//! reference bounds.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use itertools::Itertools;
use log::*;

use crate::bounds::{self, ReferenceBounds};
use crate::csv::{Field, Table};
use crate::error::Result;
use crate::files;
use crate::naming::RunName;
use crate::solver_output::SolverOutput;

/// What one result file says about a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub filename: String,
    pub run: RunName,
    pub result: String,
    pub cost: Option<i64>,
    pub lower_bound_solver: Option<f64>,
    pub upper_bound_solver: Option<f64>,
    pub total_time: Option<f64>,
    pub solve_time: Option<f64>,
    pub cpu_time: Option<f64>,
    pub threads: Option<u64>,
    pub models_found: u64,
    pub is_optimal: bool,
}

impl RunRecord {
    /// `None` when the file name does not name a run.
    pub fn new(filename: &str, report: &SolverOutput) -> Option<RunRecord> {
        let run = RunName::parse(filename)?;
        let solved = report.has_solution();
        Some(RunRecord {
            filename: filename.to_string(),
            run,
            result: report.result.clone(),
            cost: if solved { report.best_cost() } else { None },
            lower_bound_solver: if solved { report.lower_bound() } else { None },
            upper_bound_solver: if solved { report.upper_bound() } else { None },
            total_time: report.time.total,
            solve_time: report.time.solve,
            cpu_time: report.time.cpu,
            threads: report.threads,
            models_found: report.models_found(),
            is_optimal: report.is_optimal(),
        })
    }
}

/// Reads every result file below `dir`; unreadable or unnamed files are reported and skipped.
pub fn load_runs(dir: &Path) -> Result<Vec<RunRecord>> {
    let paths = files::find(dir, "**/*.json")?;
    println!("Processing {} JSON result files...", paths.len());

    let mut runs = Vec::new();
    for path in paths.iter() {
        let filename = files::file_name(path);
        let report = match SolverOutput::from_path(path) {
            Ok(report) => report,
            Err(e) => {
                println!("Error processing {}: {}", path.display(), e);
                continue;
            }
        };
        match RunRecord::new(&filename, &report) {
            Some(run) => runs.push(run),
            None => println!("Could not parse filename: {}", filename),
        }
    }
    Ok(runs)
}

/// Relative distance of `cost` to the reference lower bound, in percent.
/// With a lower bound of zero the cost itself is the gap.
pub fn gap_percent(cost: Option<i64>, lower: Option<f64>) -> Option<f64> {
    let cost = cost? as f64;
    let lower = lower?;
    if lower == 0.0 {
        Some(cost)
    } else {
        Some((cost - lower) / lower * 100.0)
    }
}

/// "min" ranks of `costs`; missing costs share the rank after the last present one.
pub fn min_ranks(costs: &[Option<i64>]) -> Vec<usize> {
    let present = costs.iter().filter(|c| c.is_some()).count();
    costs
        .iter()
        .map(|cost| match cost {
            Some(c) => 1 + costs.iter().filter(|o| matches!(o, Some(x) if x < c)).count(),
            None => present + 1,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysedRun {
    pub run: RunRecord,
    pub ref_lower_bound: Option<f64>,
    pub ref_upper_bound: Option<f64>,
    pub ref_instance_name: String,
    pub gap_percent: Option<f64>,
    pub rank_by_instance: usize,
    pub best_config_for_instance: Option<String>,
    pub is_best_config: bool,
}

impl AnalysedRun {
    fn sort_key(&self) -> (String, u32, bool, i64) {
        (
            self.run.run.category.clone(),
            self.run.run.number,
            self.run.cost.is_none(),
            self.run.cost.unwrap_or(0),
        )
    }
}

/// Joins runs with the reference bounds and ranks them per instance.
/// The result is ordered by category, instance number and cost, missing costs last.
pub fn analyse(runs: Vec<RunRecord>, bounds: &HashMap<String, ReferenceBounds>) -> Vec<AnalysedRun> {
    let mut by_instance: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, r) in runs.iter().enumerate() {
        by_instance.entry(r.run.instance_key()).or_default().push(i);
    }

    let mut ranks = vec![0; runs.len()];
    let mut best: HashMap<String, Option<String>> = HashMap::new();
    for (key, members) in by_instance.iter() {
        let costs = members.iter().map(|&i| runs[i].cost).collect::<Vec<_>>();
        for (&i, rank) in members.iter().zip(min_ranks(&costs)) {
            ranks[i] = rank;
        }
        let best_run = members
            .iter()
            .filter_map(|&i| runs[i].cost.map(|c| (c, i)))
            .min_by_key(|&(c, i)| (c, i))
            .map(|(_, i)| runs[i].run.config.clone());
        best.insert(key.clone(), best_run);
    }

    let mut analysed = runs
        .into_iter()
        .zip(ranks)
        .map(|(run, rank_by_instance)| {
            let key = run.run.instance_key();
            let reference = bounds.get(&key);
            let ref_lower_bound = reference.and_then(|b| b.lower);
            let best_config_for_instance = best.get(&key).cloned().flatten();
            AnalysedRun {
                gap_percent: gap_percent(run.cost, ref_lower_bound),
                ref_lower_bound,
                ref_upper_bound: reference.and_then(|b| b.upper),
                ref_instance_name: reference
                    .map(|b| b.instance_name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                rank_by_instance,
                is_best_config: best_config_for_instance.as_deref() == Some(run.run.config.as_str()),
                best_config_for_instance,
                run,
            }
        })
        .collect::<Vec<_>>();
    analysed.sort_by_key(AnalysedRun::sort_key);
    analysed
}

/// The first run with the minimal cost of each instance, in output order.
pub fn best_runs(analysed: &[AnalysedRun]) -> Vec<&AnalysedRun> {
    analysed
        .iter()
        .filter(|a| a.run.cost.is_some())
        .unique_by(|a| a.run.run.instance_key())
        .collect()
}

const COLUMNS: [&str; 22] = [
    "instance_key",
    "instance_category",
    "instance_number",
    "configuration",
    "result",
    "cost",
    "ref_lower_bound",
    "ref_upper_bound",
    "gap_percent",
    "rank_by_instance",
    "is_best_config",
    "best_config_for_instance",
    "total_time",
    "solve_time",
    "cpu_time",
    "models_found",
    "is_optimal",
    "lower_bound_solver",
    "upper_bound_solver",
    "threads",
    "ref_instance_name",
    "filename",
];

fn row(a: &AnalysedRun) -> Vec<Field> {
    let r = &a.run;
    vec![
        r.run.instance_key().into(),
        r.run.category.as_str().into(),
        r.run.number.into(),
        r.run.config.as_str().into(),
        r.result.as_str().into(),
        r.cost.into(),
        a.ref_lower_bound.into(),
        a.ref_upper_bound.into(),
        a.gap_percent.into(),
        (a.rank_by_instance as f64).into(),
        a.is_best_config.into(),
        a.best_config_for_instance.clone().into(),
        r.total_time.into(),
        r.solve_time.into(),
        r.cpu_time.into(),
        r.models_found.into(),
        r.is_optimal.into(),
        r.lower_bound_solver.into(),
        r.upper_bound_solver.into(),
        r.threads.into(),
        a.ref_instance_name.as_str().into(),
        r.filename.as_str().into(),
    ]
}

pub fn to_table<'a, I>(analysed: I) -> Table
where
    I: IntoIterator<Item = &'a AnalysedRun>,
{
    let mut table = Table::new(&COLUMNS);
    for a in analysed {
        table.push(row(a));
    }
    table
}

/// Count, mean, sample standard deviation and minimum of some values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
}

impl Stats {
    pub fn of(values: &[f64]) -> Stats {
        let count = values.len();
        if count == 0 {
            return Stats {
                count,
                mean: None,
                std: None,
                min: None,
            };
        }
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            Some(var.sqrt())
        } else {
            None
        };
        Stats {
            count,
            mean: Some(mean),
            std,
            min: values.iter().copied().fold(None, |m: Option<f64>, v| Some(m.map_or(v, |m| m.min(v)))),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    Stats::of(values).mean
}

fn show(v: Option<f64>) -> String {
    v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn costs(runs: &[&AnalysedRun]) -> Vec<f64> {
    runs.iter().filter_map(|a| a.run.cost).map(|c| c as f64).collect()
}

fn solve_times(runs: &[&AnalysedRun]) -> Vec<f64> {
    runs.iter().filter_map(|a| a.run.solve_time).collect()
}

pub fn print_summary(analysed: &[AnalysedRun]) {
    println!();
    println!("{}", "=".repeat(60));
    println!("ASP RESULTS ANALYSIS SUMMARY");
    println!("{}", "=".repeat(60));

    let total = analysed.len();
    let solved = analysed.iter().filter(|a| a.run.cost.is_some()).count();
    let rate = if total == 0 { 0.0 } else { solved as f64 / total as f64 * 100.0 };
    println!(
        "Total instances: {}",
        analysed.iter().map(|a| a.run.run.instance_key()).unique().count()
    );
    println!(
        "Total configurations: {}",
        analysed.iter().map(|a| a.run.run.config.as_str()).unique().count()
    );
    println!("Total runs: {}", total);
    println!("Solutions found: {} ({:.1}%)", solved, rate);
    println!("Optimal solutions: {}", analysed.iter().filter(|a| a.run.is_optimal).count());

    println!();
    println!("Results by status:");
    let mut statuses: HashMap<&str, usize> = HashMap::new();
    for a in analysed.iter() {
        *statuses.entry(a.run.result.as_str()).or_insert(0) += 1;
    }
    for (status, count) in statuses.into_iter().sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0))) {
        println!("  {}: {}", status, count);
    }

    let mut by_config: BTreeMap<&str, Vec<&AnalysedRun>> = BTreeMap::new();
    let mut by_category: BTreeMap<&str, Vec<&AnalysedRun>> = BTreeMap::new();
    for a in analysed.iter() {
        by_config.entry(a.run.run.config.as_str()).or_default().push(a);
        by_category.entry(a.run.run.category.as_str()).or_default().push(a);
    }

    println!();
    println!("Performance by configuration:");
    println!(
        "{:<16} {:>6} {:>12} {:>12} {:>10} {:>11} {:>6}",
        "configuration", "count", "mean", "std", "min", "solve_time", "best"
    );
    for (config, runs) in by_config.iter() {
        let stats = Stats::of(&costs(runs));
        println!(
            "{:<16} {:>6} {:>12} {:>12} {:>10} {:>11} {:>6}",
            config,
            stats.count,
            show(stats.mean),
            show(stats.std),
            show(stats.min),
            show(mean(&solve_times(runs))),
            runs.iter().filter(|a| a.is_best_config).count()
        );
    }

    println!();
    println!("Performance by instance category:");
    println!(
        "{:<16} {:>6} {:>12} {:>12} {:>10} {:>10} {:>11}",
        "category", "count", "mean", "std", "min", "gap", "solve_time"
    );
    for (category, runs) in by_category.iter() {
        let stats = Stats::of(&costs(runs));
        let gaps = runs.iter().filter_map(|a| a.gap_percent).collect::<Vec<_>>();
        println!(
            "{:<16} {:>6} {:>12} {:>12} {:>10} {:>10} {:>11}",
            category,
            stats.count,
            show(stats.mean),
            show(stats.std),
            show(stats.min),
            show(mean(&gaps)),
            show(mean(&solve_times(runs)))
        );
    }

    let best_gaps = analysed
        .iter()
        .filter_map(|a| Some((a.gap_percent?, a.run.cost?, a)))
        .sorted_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal))
        .take(5)
        .collect::<Vec<_>>();
    if !best_gaps.is_empty() {
        println!();
        println!("Best results (smallest gaps):");
        for (gap, cost, a) in best_gaps {
            println!("  {} {}: cost={}, gap={:.1}%", a.run.run.instance_key(), a.run.run.config, cost, gap);
        }
    }
    debug!("summary printed for {} runs", total);
}

/// Loads runs and bounds, writes the analysis tables and prints the summary.
pub fn run(results: &Path, bounds_csv: &Path, output: &Path, best_output: &Path) -> Result<Vec<AnalysedRun>> {
    println!("Loading reference bounds...");
    let bounds = match bounds::load_csv(bounds_csv) {
        Ok(bounds) => bounds,
        Err(e) => {
            println!("Error loading bounds file: {}", e);
            HashMap::new()
        }
    };
    println!("Loaded bounds for {} instances", bounds.len());

    println!("Processing JSON results...");
    let runs = load_runs(results)?;
    println!("Processed {} result entries", runs.len());

    println!("Calculating analysis metrics...");
    let analysed = analyse(runs, &bounds);

    to_table(&analysed).write(output)?;
    println!("Complete analysis saved to: {}", output.display());
    let best = best_runs(&analysed);
    to_table(best.iter().copied()).write(best_output)?;
    println!("Best configurations saved to: {}", best_output.display());

    print_summary(&analysed);
    Ok(analysed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file: &str, cost: Option<i64>) -> RunRecord {
        RunRecord {
            filename: file.to_string(),
            run: RunName::parse(file).unwrap(),
            result: if cost.is_some() { "SATISFIABLE" } else { "UNKNOWN" }.to_string(),
            cost,
            lower_bound_solver: None,
            upper_bound_solver: None,
            total_time: Some(1.5),
            solve_time: Some(1.0),
            cpu_time: None,
            threads: None,
            models_found: cost.map_or(0, |_| 1),
            is_optimal: false,
        }
    }

    fn bounds(key: &str, lower: f64) -> HashMap<String, ReferenceBounds> {
        let mut map = HashMap::new();
        map.insert(
            key.to_string(),
            ReferenceBounds {
                instance_key: key.to_string(),
                instance_name: "ITC2021_Early_1".to_string(),
                lower: Some(lower),
                upper: None,
                num_bound_files: 1,
            },
        );
        map
    }

    #[test]
    fn gaps() {
        assert_eq!(gap_percent(Some(150), Some(100.0)), Some(50.0));
        assert_eq!(gap_percent(Some(42), Some(0.0)), Some(42.0));
        assert_eq!(gap_percent(None, Some(10.0)), None);
        assert_eq!(gap_percent(Some(1), None), None);
    }

    #[test]
    fn ranks() {
        assert_eq!(min_ranks(&[Some(5), Some(3), None, Some(3)]), vec![3, 1, 4, 1]);
        assert_eq!(min_ranks(&[None, None]), vec![1, 1]);
        assert!(min_ranks(&[]).is_empty());
    }

    #[test]
    fn sample_statistics() {
        let s = Stats::of(&[2.0, 4.0, 6.0]);
        assert_eq!(s.count, 3);
        assert_eq!(s.mean, Some(4.0));
        assert_eq!(s.std, Some(2.0));
        assert_eq!(s.min, Some(2.0));
        assert_eq!(Stats::of(&[1.0]).std, None);
        assert_eq!(Stats::of(&[]).mean, None);
    }

    #[test]
    fn analysis_joins_ranks_and_orders() {
        let runs = vec![
            record("late1_A.json", Some(7)),
            record("early1_A.json", Some(150)),
            record("early1_B.json", None),
            record("early1_C.json", Some(120)),
            record("early1_D.json", Some(120)),
        ];
        let analysed = analyse(runs, &bounds("early1", 100.0));
        let order = analysed.iter().map(|a| a.run.filename.as_str()).collect::<Vec<_>>();
        assert_eq!(
            order,
            vec!["early1_C.json", "early1_D.json", "early1_A.json", "early1_B.json", "late1_A.json"]
        );

        let c = &analysed[0];
        assert_eq!(c.rank_by_instance, 1);
        assert_eq!(c.gap_percent, Some(20.0));
        assert_eq!(c.best_config_for_instance.as_deref(), Some("C"));
        assert!(c.is_best_config);
        assert_eq!(c.ref_instance_name, "ITC2021_Early_1");

        assert_eq!(analysed[1].rank_by_instance, 1);
        assert!(!analysed[1].is_best_config);
        assert_eq!(analysed[2].rank_by_instance, 3);
        assert_eq!(analysed[3].rank_by_instance, 4);
        assert_eq!(analysed[3].gap_percent, None);

        let late = &analysed[4];
        assert_eq!(late.ref_instance_name, "Unknown");
        assert_eq!(late.gap_percent, None);
        assert!(late.is_best_config);

        let best = best_runs(&analysed);
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].run.filename, "early1_C.json");
        assert_eq!(best[1].run.filename, "late1_A.json");
    }

    #[test]
    fn table_rows() {
        let analysed = analyse(vec![record("early1_A.json", Some(150))], &bounds("early1", 100.0));
        let text = to_table(&analysed).to_text();
        let mut lines = text.lines();
        assert_eq!(lines.next().map(|l| l.split(',').count()), Some(22));
        assert_eq!(
            lines.next(),
            Some("early1,early,1,A,SATISFIABLE,150,100.0,,50.0,1.0,True,A,1.5,1.0,,1,False,,,,ITC2021_Early_1,early1_A.json")
        );
    }

    #[test]
    fn writes_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        std::fs::create_dir(&results).unwrap();
        std::fs::write(
            results.join("early1_A.json"),
            r#"{"Result": "SATISFIABLE", "Call": [{"Witnesses": [{"Value": [], "Costs": [150]}]}]}"#,
        )
        .unwrap();
        std::fs::write(results.join("early1_B.json"), r#"{"Result": "UNKNOWN"}"#).unwrap();
        std::fs::write(
            dir.path().join("reference_bounds.csv"),
            "instance_key,instance_name,lower_bound,upper_bound,has_lower,has_upper,num_bound_files\n\
             early1,ITC2021_Early_1,100.0,,True,False,1\n",
        )
        .unwrap();

        let output = dir.path().join("complete_analysis.csv");
        let best_output = dir.path().join("best_configurations.csv");
        let analysed = run(&results, &dir.path().join("reference_bounds.csv"), &output, &best_output).unwrap();
        assert_eq!(analysed.len(), 2);
        assert_eq!(analysed[0].gap_percent, Some(50.0));

        let complete = std::fs::read_to_string(&output).unwrap();
        assert_eq!(complete.lines().count(), 3);
        let best = std::fs::read_to_string(&best_output).unwrap();
        assert_eq!(best.lines().count(), 2);
        assert!(best.lines().nth(1).unwrap().starts_with("early1,early,1,A,"));
    }

    #[test]
    fn missing_bounds_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let analysed = run(
            dir.path(),
            &dir.path().join("reference_bounds.csv"),
            &dir.path().join("a.csv"),
            &dir.path().join("b.csv"),
        )
        .unwrap();
        assert!(analysed.is_empty());
        assert!(dir.path().join("a.csv").exists());
    }

    #[test]
    fn loads_runs_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("early")).unwrap();
        std::fs::write(
            dir.path().join("early/early3_X.json"),
            r#"{"Result": "OPTIMUM FOUND",
                "Call": [{"Witnesses": [{"Value": [], "Costs": [9]}, {"Value": [], "Costs": [3]}]}],
                "Models": {"Number": 2, "Optimum": "yes"},
                "Time": {"Total": 2.0, "Solve": 1.5, "CPU": 1.9},
                "Bounds": {"Lower": [3], "Upper": [3]}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("early4_X.json"), r#"{"Result": "UNKNOWN", "Bounds": {"Lower": [1]}}"#).unwrap();
        std::fs::write(dir.path().join("notes.json"), "{}").unwrap();
        std::fs::write(dir.path().join("early5_X.json"), "[").unwrap();

        let runs = load_runs(dir.path()).unwrap();
        assert_eq!(runs.len(), 2);
        let solved = runs.iter().find(|r| r.filename == "early3_X.json").unwrap();
        assert_eq!(solved.cost, Some(3));
        assert!(solved.is_optimal);
        assert_eq!(solved.models_found, 2);
        assert_eq!(solved.lower_bound_solver, Some(3.0));
        assert_eq!(solved.cpu_time, Some(1.9));

        let unknown = runs.iter().find(|r| r.filename == "early4_X.json").unwrap();
        assert_eq!(unknown.cost, None);
        assert_eq!(unknown.lower_bound_solver, None);
    }
}
