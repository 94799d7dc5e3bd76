use std::path::PathBuf;

use log::*;
use structopt::StructOpt;

use itc2021asp::pipeline::{self, Outcome, Workspace};

/// Runs bounds extraction, solution conversion and analysis in one go.
#[derive(StructOpt, Debug)]
#[structopt(name = "process_all")]
struct Opt {
    /// Experiment directory
    #[structopt(short, long, parse(from_os_str), default_value = ".")]
    root: PathBuf,

    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    #[structopt(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let options = Opt::from_args();
    itc2021asp::logging::init(module_path!(), options.verbose, options.quiet)?;
    info!("Arguments {:#?}", options);

    match pipeline::run(&Workspace::new(&options.root))? {
        Outcome::Completed { report } => {
            debug!("report written to {:?}", report);
            Ok(())
        }
        Outcome::MissingInputs(_) => {
            println!("PIPELINE FAILED: Missing dependencies");
            std::process::exit(1);
        }
        Outcome::Failed { completed, .. } => {
            println!("PIPELINE FAILED: Only {}/{} steps completed", completed, pipeline::Step::ALL.len());
            std::process::exit(1);
        }
    }
}
