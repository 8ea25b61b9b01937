//! Command-line interface for building duty rosters.
//!
//! `rota solve` reads a roster file, searches for a roster and prints it as
//! a text grid or JSON; `rota template` prints a permissive roster file to
//! start from. Options for both commands layer from the command line,
//! `ROTA_*` environment variables and configuration files.
#![forbid(unsafe_code)]

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod render;
mod solve;
mod template;

pub use error::CliError;

use solve::{DefaultSolverBuilder, SolveArgs, SolverBuilder, run_solve_with};
use template::{TemplateArgs, run_template_with};

const ARG_SOLVE_ROSTER: &str = "roster";
const ENV_SOLVE_ROSTER: &str = "ROTA_CMDS_SOLVE_ROSTER_PATH";
const ARG_SOLVE_FORMAT: &str = "format";
const ARG_SOLVE_SEED: &str = "seed";
const ARG_SOLVE_TIME_LIMIT: &str = "time-limit-secs";
const ARG_SOLVE_STRATEGY: &str = "strategy";
const ARG_SOLVE_ATTEMPTS: &str = "attempts";
const ARG_TEMPLATE_SERVICES: &str = "services";
const ARG_TEMPLATE_DUTIES: &str = "duties";
const ARG_TEMPLATE_STAFF: &str = "staff";
const ARG_TEMPLATE_DAYS: &str = "days";

/// How a successful invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The command did what was asked.
    Success,
    /// The search ended without a roster, either proven infeasible or out of
    /// budget.
    NoRoster,
}

impl Completion {
    /// Process exit code: `0` on success, `2` when no roster was found.
    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::NoRoster => ExitCode::from(2),
        }
    }
}

/// Run the rota CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments, configuration or input files are
/// unusable, or when output cannot be written.
pub fn run() -> Result<Completion, CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &DefaultSolverBuilder, &mut stdout)
}

fn dispatch(
    command: Command,
    builder: &dyn SolverBuilder,
    writer: &mut dyn Write,
) -> Result<Completion, CliError> {
    match command {
        Command::Solve(args) => run_solve_with(args, builder, writer),
        Command::Template(args) => {
            run_template_with(args, writer)?;
            Ok(Completion::Success)
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "rota",
    about = "Build duty rosters covering services and standby duties",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search for a roster satisfying a roster file.
    Solve(SolveArgs),
    /// Print a permissive roster file to edit.
    Template(TemplateArgs),
}

#[cfg(test)]
mod tests;
