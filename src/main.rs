use std::path::PathBuf;

use anyhow::Context;
use itertools::Itertools;
use log::*;
use structopt::StructOpt;

use itc2021asp::facts;

/// Converts an ITC2021 instance into ASP facts.
#[derive(StructOpt, Debug)]
#[structopt(name = "itc2021-facts")]
struct Opt {
    /// Instance file (XML)
    #[structopt(name = "INPUT", parse(from_os_str))]
    input: PathBuf,

    /// Destination of the facts
    #[structopt(name = "OUTPUT", parse(from_os_str))]
    output: PathBuf,

    /// Print progress and counts; repeat for more log output
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn run(options: &Opt) -> anyhow::Result<()> {
    let verbose = options.verbose > 0;
    if verbose {
        println!("Parsing {}", options.input.display());
    }

    let transcript = facts::transcode_file(&options.input)
        .with_context(|| format!("could not transcode {}", options.input.display()))?;

    if verbose {
        println!("Generated {} facts", transcript.facts.fact_count());
        println!(
            "Constraints: {}",
            transcript.records.iter().map(|(c, n)| format!("{} {}", c, n)).join(", ")
        );
        if transcript.skipped > 0 {
            println!("Skipped {} malformed list tokens", transcript.skipped);
        }
    }

    facts::write_facts(&options.output, &transcript.facts)
        .with_context(|| format!("could not write {}", options.output.display()))?;

    if verbose {
        println!("Facts written to {}", options.output.display());
    }
    Ok(())
}

fn main() {
    let options = Opt::from_args();

    if let Err(e) = itc2021asp::logging::init(module_path!(), options.verbose, false) {
        eprintln!("could not set up logging: {}", e);
    }
    info!("Arguments {:#?}", options);

    if let Err(e) = run(&options) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
