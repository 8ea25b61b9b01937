//! Solve command implementation for the rota CLI.

use std::io::{BufReader, Write};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use rota_core::{RosterConfig, RosterModel, SearchStrategy, SolvePlan, Solver, solve_roster};
use rota_solver_fd::{FdSolver, FdSolverConfig};
use serde::{Deserialize, Serialize};

use crate::fs::{is_regular_file, open_roster_file};
use crate::render::{SolveDocument, write_json, write_text};
use crate::{
    ARG_SOLVE_ATTEMPTS, ARG_SOLVE_FORMAT, ARG_SOLVE_ROSTER, ARG_SOLVE_SEED, ARG_SOLVE_STRATEGY,
    ARG_SOLVE_TIME_LIMIT, CliError, Completion, ENV_SOLVE_ROSTER,
};

/// Output layout of `rota solve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum OutputFormat {
    /// Week-grouped grids followed by a status line.
    #[default]
    Text,
    /// One JSON document with the report and the search summary.
    Json,
}

/// Branching strategy names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum StrategyName {
    /// Day-major order with rotating staff scans and restarts.
    #[default]
    RosterOrder,
    /// Smallest domain first over the roster order, with restarts.
    FirstFail,
    /// Seeded random values with restarts.
    Random,
}

impl From<StrategyName> for SearchStrategy {
    fn from(name: StrategyName) -> Self {
        match name {
            StrategyName::RosterOrder => Self::RosterOrder,
            StrategyName::FirstFail => Self::FirstFail,
            StrategyName::Random => Self::RandomValue,
        }
    }
}

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Solve a roster described by a JSON roster file. The file \
                 names the services, standby duties and staff and carries the \
                 availability, capability and compatibility tables; tables \
                 left out are read as fully permissive.",
    about = "Search for a roster"
)]
#[ortho_config(prefix = "ROTA")]
pub(crate) struct SolveArgs {
    /// Path to a JSON roster file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) roster_path: Option<Utf8PathBuf>,
    /// Output format.
    #[arg(long = ARG_SOLVE_FORMAT, value_enum)]
    #[serde(default)]
    pub(crate) format: Option<OutputFormat>,
    /// Seed for randomised branching.
    #[arg(long = ARG_SOLVE_SEED, value_name = "n")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Wall-clock budget per attempt, in seconds.
    #[arg(long = ARG_SOLVE_TIME_LIMIT, value_name = "secs")]
    #[serde(default)]
    pub(crate) time_limit_secs: Option<u64>,
    /// Branching strategy.
    #[arg(long = ARG_SOLVE_STRATEGY, value_enum)]
    #[serde(default)]
    pub(crate) strategy: Option<StrategyName>,
    /// Number of attempts, each scanning staff from a different start.
    #[arg(long = ARG_SOLVE_ATTEMPTS, value_name = "n")]
    #[serde(default)]
    pub(crate) attempts: Option<u32>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON roster file.
    pub(crate) roster_path: Utf8PathBuf,
    /// Output format.
    pub(crate) format: OutputFormat,
    /// Search parameters handed to the driver.
    pub(crate) plan: SolvePlan,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.roster_path, ARG_SOLVE_ROSTER)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match is_regular_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let roster_path = args.roster_path.ok_or(CliError::MissingArgument {
            field: ARG_SOLVE_ROSTER,
            env: ENV_SOLVE_ROSTER,
        })?;
        let defaults = SolvePlan::default();
        let plan = defaults
            .with_strategy(args.strategy.unwrap_or_default().into())
            .with_seed(args.seed.unwrap_or(defaults.seed))
            .with_time_limit(
                args.time_limit_secs
                    .map(Duration::from_secs)
                    .or(defaults.time_limit),
            )
            .with_attempts(args.attempts.unwrap_or(defaults.attempts));
        Ok(Self {
            roster_path,
            format: args.format.unwrap_or_default(),
            plan,
        })
    }
}

/// Builds a solver instance for the current solve invocation.
pub(crate) trait SolverBuilder {
    fn build(&self, config: &SolveConfig) -> Box<dyn Solver>;
}

pub(crate) struct DefaultSolverBuilder;

impl SolverBuilder for DefaultSolverBuilder {
    fn build(&self, config: &SolveConfig) -> Box<dyn Solver> {
        Box::new(FdSolver::with_config(FdSolverConfig {
            default_time_limit: config.plan.time_limit,
        }))
    }
}

pub(crate) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn SolverBuilder,
    writer: &mut dyn Write,
) -> Result<Completion, CliError> {
    let config = resolve_solve_config(args)?;
    let roster = load_roster(&config.roster_path)?;
    let solver = builder.build(&config);
    let outcome = solve_roster(&roster, solver.as_ref(), &config.plan)
        .map_err(|source| CliError::Solve { source })?;
    let document = SolveDocument::new(roster.grids(), &outcome);
    match config.format {
        OutputFormat::Text => write_text(writer, &document).map_err(CliError::WriteOutput)?,
        OutputFormat::Json => write_json(writer, &document)?,
    }
    Ok(if outcome.found() {
        Completion::Success
    } else {
        Completion::NoRoster
    })
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON roster file from disk and builds its constraint model.
pub(crate) fn load_roster(path: &Utf8Path) -> Result<RosterModel, CliError> {
    let file = open_roster_file(path).map_err(|source| CliError::OpenRoster {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let config: RosterConfig =
        serde_json::from_reader(reader).map_err(|source| CliError::ParseRoster {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        "loaded roster of {} staff over {} days from {path}",
        config.staff_count(),
        config.day_count
    );
    RosterModel::build(config).map_err(|source| CliError::InvalidRoster {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
