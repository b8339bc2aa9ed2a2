//! CLI entry point: wires the parser, normalizer, truth table, and
//! resolver into the `spec.md` §6-7 command-line contract.

use anyhow::Context;
use clap::Parser as ClapParser;
use expert_system::config::Config;
use expert_system::error::ExpertError;
use expert_system::resolver::Resolver;
use expert_system::{interactive, print_answers, Program};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// A backward-chaining expert system over propositional logic.
#[derive(Debug, ClapParser)]
#[command(name = "expert-system", version, about)]
struct Cli {
    /// Input file containing logic rules, initial facts, and queries.
    input_file: PathBuf,

    /// Print a per-query reasoning trace instead of the bare answer.
    #[arg(long)]
    explain: bool,

    /// Enter an interactive prompt after resolving the file once.
    #[arg(long)]
    interactive: bool,
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    if config.logging.format.eq_ignore_ascii_case("json") {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}

/// Top-level driver. Internally every fallible step carries the precise
/// [`ExpertError`] variant `spec.md` §7 enumerates; `anyhow` only wraps
/// that at this outer boundary to attach file-path/stage context before
/// printing, the way the reference crate's binaries layer `anyhow` over
/// their own `thiserror` enums.
fn run() -> anyhow::Result<()> {
    let cli = Cli::try_parse().map_err(|e| ExpertError::Usage(e.to_string()))?;
    let config = Config::load().unwrap_or_else(|_| Config::default());
    init_logging(&config);

    let text = std::fs::read_to_string(&cli.input_file)
        .with_context(|| format!("failed to open input file {}", cli.input_file.display()))?;
    // Not wrapped in `.context(..)`: `spec.md` §7 requires the exact
    // "No valid states for the given rules." / syntax-error text on
    // stderr, so the `ExpertError` is propagated with its own `Display`
    // intact rather than layered under an extra anyhow message.
    let program = Program::build_with_limit(&text, config.resolver.max_symbols)?;

    let mut resolver = Resolver::new(&program.basic_rules, program.initial_facts.clone());
    if cli.explain {
        resolver = resolver.with_tracing();
    }

    match resolver.resolve(&program.queries, &program.truth_table) {
        Ok(answers) => print_answers(&answers, &resolver, &program.queries, cli.explain),
        Err(ExpertError::IncompatibleInitialFacts) => {
            eprintln!("No valid states with the given initial facts.");
        }
        Err(err) => return Err(err.into()),
    }

    if cli.interactive {
        interactive::run(&mut resolver, &program.queries, &program.truth_table, cli.explain)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
