//! CLI tool for compiling a text score to a MIDI file
//!
//! Usage: midiscribe <input.txt> [name]
//!
//! Writes `midis/<name>.midi`, where `name` defaults to the input file name.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use midiscribe::cli::{self, Report};
use midiscribe::{CompilerConfig, Result};

#[derive(Parser)]
#[command(name = "midiscribe")]
#[command(about = "Compile a text score into a Standard MIDI File", long_about = None)]
struct Cli {
    /// Path to the score file
    input: String,

    /// Output name (defaults to the input file name)
    name: Option<String>,

    /// RON configuration file with playback defaults and output settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to write into (overrides the configuration)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Log each interpreted command to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Cli) -> Result<Report> {
    let mut config = match &args.config {
        Some(path) => CompilerConfig::load(path)?,
        None => CompilerConfig::default(),
    };
    if let Some(dir) = &args.out_dir {
        config.output_dir = dir.clone();
    }

    cli::compile_to_file(&args.input, args.name.as_deref(), config)
}

fn main() -> ExitCode {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };
    cli::init_logging(args.verbose);

    let result = run(&args);
    match &result {
        Ok(report) => println!("{}", report),
        Err(e) => eprintln!("error: {}", e),
    }
    ExitCode::from(cli::exit_status(&result))
}
