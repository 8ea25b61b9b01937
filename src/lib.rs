//! Facade crate for the rota duty-roster engine.
//!
//! This crate re-exports the roster model, constraint library, solving
//! driver and reporting types, and exposes the bundled finite-domain solver
//! behind a feature flag.
//!
//! ```
//! # #[cfg(feature = "solver-fd")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use rota_engine::{FdSolver, RosterConfig, RosterModel, SolvePlan, solve_roster};
//!
//! let config = RosterConfig::permissive(&["MAT"], &["AST"], 2, 1).with_slacks(1, 1);
//! let roster = RosterModel::build(config)?;
//! let outcome = solve_roster(&roster, &FdSolver::new(), &SolvePlan::default())?;
//! assert!(outcome.found());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "solver-fd"))]
//! # fn main() {}
//! ```

#![forbid(unsafe_code)]

pub use rota_core::{
    Calendar, RosterConfig, RosterConfigError, RosterGrids, RosterModel, RosterOutcome,
    RosterReport, SearchStrategy, SoftPreferenceSummary, SolveError, SolveOutcome, SolvePlan,
    SolveStatus, SolvedRoster, Solver, StaffReport, Violation, Weekday, soft_preferences,
    solve_roster, verify,
};

pub use rota_core::constraints;

#[cfg(feature = "solver-fd")]
pub use rota_solver_fd::{FdSolver, FdSolverConfig};
