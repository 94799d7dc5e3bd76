//! File naming conventions of the experiment directories.
//!
//! * solver results: `early12_BB2.json` (category, instance number, configuration)
//! * solutions: `Early_12_BB2.xml`
//! * instances: `inst12_e.xml`, or `ITC2021_Early_12.xml` in older repositories
//! * reference bounds: `ITC2021_Early_12_Bound.xml`

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

pub(crate) fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("hard-coded pattern"))
}

/// `early` -> `Early`
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn stem(file_name: &str, extension: &str) -> String {
    file_name.replace(extension, "")
}

/// Name of one solver run, as encoded in the result file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunName {
    /// `early`, `middle` or `late`
    pub category: String,
    pub number: u32,
    /// Solver configuration label.
    pub config: String,
}

impl RunName {
    /// Parses `early12_BB2.json`.
    pub fn parse(file_name: &str) -> Option<RunName> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let base = stem(file_name, ".json");
        let caps = cached(&RE, r"^([a-z]+)(\d+)_(.+)").captures(&base)?;
        Some(RunName {
            category: caps[1].to_string(),
            number: caps[2].parse().ok()?,
            config: caps[3].to_string(),
        })
    }

    /// `early12`
    pub fn instance_key(&self) -> String {
        format!("{}{}", self.category, self.number)
    }

    /// `early12_BB2.json`
    pub fn json_file_name(&self) -> String {
        format!("{}{}_{}.json", self.category, self.number, self.config)
    }

    /// `Early_12_BB2.xml`
    pub fn solution_file_name(&self) -> String {
        format!("{}_{}_{}.xml", capitalize(&self.category), self.number, self.config)
    }

    /// Name of the competition instance, as written into solution files.
    pub fn instance_file_name(&self) -> String {
        match self.category.as_str() {
            "early" => format!("inst{}_e.xml", self.number),
            "late" => format!("inst{}_l.xml", self.number),
            "middle" => format!("inst{}_m.xml", self.number),
            other => format!("ITC2021_{}_{}.xml", capitalize(other), self.number),
        }
    }
}

/// Name of a solution file, `Early_12_BB2.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionName {
    /// Capitalised, `Early`
    pub category: String,
    pub number: u32,
    pub config: String,
}

impl SolutionName {
    pub fn parse(file_name: &str) -> Option<SolutionName> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let base = stem(file_name, ".xml");
        let caps = cached(&RE, r"^([A-Z][a-z]+)_(\d+)_(.+)").captures(&base)?;
        Some(SolutionName {
            category: caps[1].to_string(),
            number: caps[2].parse().ok()?,
            config: caps[3].to_string(),
        })
    }

    pub fn run(&self) -> RunName {
        RunName {
            category: self.category.to_lowercase(),
            number: self.number,
            config: self.config.clone(),
        }
    }

    pub fn instance_key(&self) -> String {
        self.run().instance_key()
    }

    /// Candidate instance files, in lookup order.
    pub fn instance_candidates(&self, instances_dir: &Path) -> Vec<PathBuf> {
        let short = self.category.to_lowercase().chars().next().unwrap_or('x');
        vec![
            instances_dir.join(format!("inst{}_{}.xml", self.number, short)),
            instances_dir.join(format!("ITC2021_{}_{}.xml", self.category, self.number)),
        ]
    }

    pub fn find_instance(&self, instances_dir: &Path) -> Option<PathBuf> {
        self.instance_candidates(instances_dir).into_iter().find(|p| p.exists())
    }

    /// Candidate solver result files, in lookup order.
    pub fn result_candidates(&self, results_dir: &Path) -> Vec<PathBuf> {
        let run = self.run();
        let json = run.json_file_name();
        vec![results_dir.join(&run.category).join(&json), results_dir.join(&json)]
    }
}

/// Instance key of a bound file, `ITC2021_Early_1_Bound.xml` -> `early1`.
pub fn bound_instance_key(file_name: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let base = stem(file_name, ".xml").replace("_Bound", "");
    let caps = cached(&RE, r"^ITC2021_(\w+)_(\d+)").captures(&base)?;
    let number: u32 = caps[2].parse().ok()?;
    Some(format!("{}{}", caps[1].to_lowercase(), number))
}

/// Splits an instance key into category and number, `early12` -> (`early`, 12).
pub fn split_instance_key(key: &str) -> Option<(String, u32)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let caps = cached(&RE, r"^([a-z]+)(\d+)").captures(key)?;
    Some((caps[1].to_string(), caps[2].parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_names() {
        let run = RunName::parse("early12_BB2.json").unwrap();
        assert_eq!(run.category, "early");
        assert_eq!(run.number, 12);
        assert_eq!(run.config, "BB2");
        assert_eq!(run.instance_key(), "early12");
        assert_eq!(run.solution_file_name(), "Early_12_BB2.xml");
        assert_eq!(run.json_file_name(), "early12_BB2.json");
        assert_eq!(run.instance_file_name(), "inst12_e.xml");

        let run = RunName::parse("middle5_USC15-CR.json").unwrap();
        assert_eq!(run.config, "USC15-CR");
        assert_eq!(run.instance_file_name(), "inst5_m.xml");

        assert_eq!(RunName::parse("test3.json"), None);
        assert_eq!(RunName::parse("Early12_BB2.json"), None);
    }

    #[test]
    fn unknown_category_uses_competition_name() {
        let run = RunName::parse("sample3_X.json").unwrap();
        assert_eq!(run.instance_file_name(), "ITC2021_Sample_3.xml");
    }

    #[test]
    fn solution_names() {
        let s = SolutionName::parse("Early_12_BB2.xml").unwrap();
        assert_eq!(s.category, "Early");
        assert_eq!(s.number, 12);
        assert_eq!(s.config, "BB2");
        assert_eq!(s.instance_key(), "early12");
        assert_eq!(
            s.instance_candidates(Path::new("inst")),
            vec![PathBuf::from("inst/inst12_e.xml"), PathBuf::from("inst/ITC2021_Early_12.xml")]
        );
        assert_eq!(
            s.result_candidates(Path::new("res")),
            vec![PathBuf::from("res/early/early12_BB2.json"), PathBuf::from("res/early12_BB2.json")]
        );
        assert_eq!(SolutionName::parse("early_12_BB2.xml"), None);
    }

    #[test]
    fn bound_keys() {
        assert_eq!(bound_instance_key("ITC2021_Early_1_Bound.xml").as_deref(), Some("early1"));
        assert_eq!(bound_instance_key("ITC2021_Late_15.xml").as_deref(), Some("late15"));
        assert_eq!(bound_instance_key("README.xml"), None);
    }

    #[test]
    fn instance_keys() {
        assert_eq!(split_instance_key("late7"), Some(("late".to_string(), 7)));
        assert_eq!(split_instance_key("7late"), None);
    }

    #[test]
    fn capitalization() {
        assert_eq!(capitalize("early"), "Early");
        assert_eq!(capitalize("MIDDLE"), "Middle");
        assert_eq!(capitalize(""), "");
    }
}
