use std::path::PathBuf;

use anyhow::Context;
use log::*;
use structopt::StructOpt;

use itc2021asp::analysis;

/// Compares solver runs with each other and with the reference bounds.
#[derive(StructOpt, Debug)]
#[structopt(name = "analyze_results")]
struct Opt {
    #[structopt(short, long, parse(from_os_str), default_value = "Results/main_exp")]
    results: PathBuf,

    #[structopt(short, long, parse(from_os_str), default_value = "reference_bounds.csv")]
    bounds: PathBuf,

    #[structopt(short, long, parse(from_os_str), default_value = "complete_analysis.csv")]
    output: PathBuf,

    #[structopt(long, parse(from_os_str), default_value = "best_configurations.csv")]
    best_output: PathBuf,

    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    #[structopt(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let options = Opt::from_args();
    itc2021asp::logging::init(module_path!(), options.verbose, options.quiet)?;
    info!("Arguments {:#?}", options);

    println!("Starting comprehensive results analysis...");
    analysis::run(&options.results, &options.bounds, &options.output, &options.best_output)
        .context("analysing results")?;
    println!();
    println!("Analysis complete! Check {} for detailed results.", options.output.display());
    Ok(())
}
