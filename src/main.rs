use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// A small expression-oriented scripting language
#[derive(Parser, Debug)]
#[command(name = "tern", version, about)]
struct Cli {
    /// The script file to execute
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Start in interactive REPL mode (after running FILE, if given)
    #[arg(short, long)]
    interactive: bool,

    /// Print the script's final value
    #[arg(short, long)]
    print_result: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let env = tern::global_environment();

    if let Some(path) = &cli.file {
        if let Err(code) = run_file(path, &env, cli.print_result) {
            return code;
        }
        if !cli.interactive {
            return ExitCode::SUCCESS;
        }
    }

    tern::repl::start_with(&env);
    ExitCode::SUCCESS
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn run_file(path: &Path, env: &tern::Environment, print_result: bool) -> Result<(), ExitCode> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return Err(ExitCode::FAILURE);
        }
    };

    let filename = path.display().to_string();
    tracing::debug!(file = %filename, bytes = source.len(), "running script");

    match tern::runner::run_in(&source, Some(&filename), env) {
        Ok(value) => {
            if print_result {
                println!("{}", value);
            }
            Ok(())
        }
        Err(_) => Err(ExitCode::FAILURE),
    }
}
