use clap::{Args, Parser};
use std::{fs, process};

use prefold::errors::PassError;
use prefold::run_pass;

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Source file to optimize
    source_name: Option<String>,

    /// Optimize an inline program instead of a file
    #[arg(long)]
    expr: Option<String>,
}

#[derive(Debug, Parser)]
struct Options {
    #[command(flatten)]
    input: InputArgs,

    /// Write the optimized program here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    #[arg(long)]
    debug: bool,
}

fn read_source(input: &InputArgs) -> Result<String, PassError> {
    match (&input.expr, &input.source_name) {
        (Some(expr), _) => Ok(expr.clone()),
        (None, Some(source_name)) => Ok(fs::read_to_string(source_name)?),
        (None, None) => unreachable!("clap enforces one input"),
    }
}

fn run(options: &Options) -> Result<(), PassError> {
    let source = read_source(&options.input)?;
    let optimized = run_pass(&source, options.debug)?;

    match &options.output {
        Some(path) => fs::write(path, optimized)?,
        None => println!("{}", optimized),
    }

    Ok(())
}

fn main() {
    let options = Options::parse();

    run(&options).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });
}
