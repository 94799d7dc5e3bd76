use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use log::*;
use structopt::StructOpt;

use itc2021asp::validator::{self, Layout, Validator};

/// Checks solution files with the RobinX validator and compares the costs.
#[derive(StructOpt, Debug)]
#[structopt(name = "validate_xml")]
struct Opt {
    #[structopt(long, parse(from_os_str), default_value = "xml_solutions")]
    solutions: PathBuf,

    #[structopt(long, parse(from_os_str), default_value = "Validation/RobinX/Repository/ITC2021/Instances/")]
    instances: PathBuf,

    #[structopt(long, parse(from_os_str), default_value = "Results/main_exp")]
    results: PathBuf,

    /// Validator executable
    #[structopt(long, parse(from_os_str), default_value = "Validation/RobinX/RobinX")]
    robinx: PathBuf,

    /// Seconds before a validator run is killed
    #[structopt(long, default_value = "10")]
    timeout: u64,

    /// Validate only the first N solutions
    #[structopt(long)]
    sample: Option<usize>,

    #[structopt(short, long, parse(from_os_str), default_value = "validation_results.csv")]
    output: PathBuf,

    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    #[structopt(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let options = Opt::from_args();
    itc2021asp::logging::init(module_path!(), options.verbose, options.quiet)?;
    info!("Arguments {:#?}", options);

    println!("Starting XML solution validation...");
    let validator = Validator::new(&options.robinx).with_timeout(Duration::from_secs(options.timeout));
    validator
        .check()
        .context("compile RobinX first using 'make' in the RobinX directory")?;

    let layout = Layout {
        solutions: options.solutions.clone(),
        instances: options.instances.clone(),
        results: options.results.clone(),
    };
    let records = validator::validate_all(&validator, &layout, options.sample)?;
    if records.is_empty() {
        println!("No validation results generated");
        return Ok(());
    }

    validator::to_table(&records)
        .write(&options.output)
        .with_context(|| format!("writing {}", options.output.display()))?;
    println!("Validation results saved to: {}", options.output.display());
    validator::print_summary(&records);
    Ok(())
}
