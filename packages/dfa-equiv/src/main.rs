use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dfa_equiv_lib::{
    config::{DfaEquivConfig, GeneralConfig},
    definition::DfaDefinition,
    logger::{LogLevel, init_tracing},
    report::check_and_render,
};

pub mod output;
pub mod pages;
pub mod server;

#[derive(Parser, Debug)]
#[command(name = "DFA Equivalence Checker")]
#[command(version = "0.1")]
#[command(about = "Check whether two DFAs accept the same language", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the log level of the config file.
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two DFA definition files (TOML, or JSON with a `.json`
    /// extension).
    Check {
        left: PathBuf,
        right: PathBuf,

        /// Draw both automata into the configured output directory.
        #[arg(short, long)]
        render: bool,

        /// Print a human readable summary instead of JSON.
        #[arg(short, long)]
        text: bool,
    },
    /// Serve the comparison API over HTTP.
    Serve,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = DfaEquivConfig::from_optional_file(args.config.as_ref())
        .context("failed to load config file")?;
    if let Some(level) = args.log_level {
        let logger = config.get_logger().clone().with_log_level(level);
        config.set_logger(logger);
    }

    init_tracing(config.logger(), "dfa_equiv")?;

    match args.command {
        Command::Check {
            left,
            right,
            render,
            text,
        } => check(&config, &left, &right, render, text),
        Command::Serve => server::serve(config),
    }
}

fn load_definition(path: &Path) -> anyhow::Result<DfaDefinition> {
    DfaDefinition::from_file(path).with_context(|| format!("failed to read {}", path.display()))
}

fn check(
    config: &DfaEquivConfig,
    left: &Path,
    right: &Path,
    render: bool,
    text: bool,
) -> anyhow::Result<()> {
    let left_dfa = load_definition(left)?
        .build()
        .with_context(|| format!("invalid automaton in {}", left.display()))?;
    let right_dfa = load_definition(right)?
        .build()
        .with_context(|| format!("invalid automaton in {}", right.display()))?;

    let report = check_and_render(&left_dfa, &right_dfa, config, render)?;

    if text {
        println!("{}", output::format_report(&report));
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
