use std::path::PathBuf;

use anyhow::Context;
use log::*;
use structopt::StructOpt;

use itc2021asp::bounds;

/// Collects the best known bounds of the competition instances into a CSV table.
#[derive(StructOpt, Debug)]
#[structopt(name = "extract_bounds")]
struct Opt {
    #[structopt(
        short,
        long,
        parse(from_os_str),
        default_value = "Validation/RobinX/Repository/ITC2021/Bounds/"
    )]
    bounds_dir: PathBuf,

    #[structopt(short, long, parse(from_os_str), default_value = "reference_bounds.csv")]
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

    println!("Extracting reference bounds from RobinX repository...");
    bounds::extract_to_csv(&options.bounds_dir, &options.output)
        .with_context(|| format!("extracting bounds from {}", options.bounds_dir.display()))?;
    Ok(())
}
