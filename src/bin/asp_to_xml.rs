use std::path::PathBuf;

use anyhow::Context;
use log::*;
use structopt::StructOpt;

use itc2021asp::{files, solution_xml};

/// Converts solver result files (JSON) into ITC2021 solution files.
#[derive(StructOpt, Debug)]
#[structopt(name = "asp_to_xml")]
struct Opt {
    /// Directory searched recursively for result files
    #[structopt(short, long, parse(from_os_str), default_value = "Results/main_exp")]
    input: PathBuf,

    /// Directory receiving the solution files
    #[structopt(short, long, parse(from_os_str), default_value = "xml_solutions")]
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

    let date = chrono::Local::now().date_naive();
    let summary = solution_xml::convert_all(&options.input, &options.output, date)
        .with_context(|| format!("converting results of {}", options.input.display()))?;

    println!();
    println!("Conversion complete:");
    println!("  Successful: {}", summary.successful);
    println!("  Failed: {}", summary.failed);
    println!("  Output directory: {}", options.output.display());

    let written = files::find(&options.output, "*.xml")?;
    println!("Generated {} XML files", written.len());
    Ok(())
}
