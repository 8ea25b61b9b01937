//! Test helpers for roster files and canned solver outcomes.

use camino::{Utf8Path, Utf8PathBuf};
use rota_core::test_support::{ten_resident_assignment, ten_resident_config};
use rota_core::{
    Model, RosterConfig, RosterModel, SearchRequest, SearchStats, SolveError, SolveOutcome,
    SolveStatus, Solver,
};
use tempfile::TempDir;

use crate::solve::{SolveConfig, SolverBuilder};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write test file");
}

/// A temporary directory holding `roster.json`.
pub(super) struct RosterFile {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl RosterFile {
    pub(super) fn empty() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            path: root.join("roster.json"),
            _dir: dir,
        }
    }

    pub(super) fn with_config(config: &RosterConfig) -> Self {
        let file = Self::empty();
        let payload = serde_json::to_string_pretty(config).expect("serialise roster");
        write_utf8(&file.path, payload.as_bytes());
        file
    }

    pub(super) fn path(&self) -> &Utf8Path {
        &self.path
    }
}

/// Solver returning a fixed outcome whatever it is asked.
#[derive(Debug, Clone)]
pub(super) struct CannedSolver {
    outcome: SolveOutcome,
}

impl Solver for CannedSolver {
    fn solve(&self, _model: &Model, _request: &SearchRequest) -> Result<SolveOutcome, SolveError> {
        Ok(self.outcome.clone())
    }
}

#[derive(Debug, Clone)]
pub(super) struct CannedSolverBuilder {
    outcome: SolveOutcome,
}

impl CannedSolverBuilder {
    /// Answers with the reference roster for the ten-resident scenario.
    pub(super) fn reference_roster() -> Self {
        let roster = RosterModel::build(ten_resident_config()).expect("valid roster");
        Self {
            outcome: SolveOutcome {
                status: SolveStatus::Optimal,
                values: Some(ten_resident_assignment(&roster)),
                objective: Some(0),
                stats: SearchStats {
                    nodes: 600,
                    ..SearchStats::default()
                },
            },
        }
    }

    /// Answers that no roster exists.
    pub(super) fn infeasible() -> Self {
        Self {
            outcome: SolveOutcome::without_solution(
                SolveStatus::Infeasible,
                SearchStats::default(),
            ),
        }
    }
}

impl SolverBuilder for CannedSolverBuilder {
    fn build(&self, _config: &SolveConfig) -> Box<dyn Solver> {
        Box::new(CannedSolver {
            outcome: self.outcome.clone(),
        })
    }
}
