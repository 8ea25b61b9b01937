//! Core roster model for the rota engine.
//!
//! A duty roster assigns staff to services and standby duties over a horizon
//! of days. This crate turns a [`RosterConfig`] into a finite-domain
//! [`Model`] of 0/1 decision variables, posts the rostering rules as
//! constraints, and defines the [`Solver`] seam a search backend plugs into.
//! [`solve_roster`] drives a backend, and [`RosterReport`] and [`verify`]
//! read the result back.
//!
//! # Examples
//!
//! ```
//! use rota_core::{RosterConfig, RosterModel, RuleKind};
//!
//! # fn main() -> Result<(), rota_core::RosterConfigError> {
//! let config = RosterConfig::permissive(&["MAT", "SAMU", "BLOC"], &["AST"], 10, 15)
//!     .with_slacks(1, 2)
//!     .with_incompatible_pair(0, 1);
//! let roster = RosterModel::build(config)?;
//! assert_eq!(roster.model().count_for(RuleKind::SingleService), 150);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod calendar;
mod config;
pub mod constraints;
mod driver;
mod grid;
mod model;
mod objective;
mod report;
mod roster;
mod solution;
mod solver;
mod verify;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use calendar::{Calendar, DAYS_PER_WEEK, Weekday};
pub use config::{OptionalRules, RosterConfig, RosterConfigError};
pub use driver::{
    DEFAULT_TIME_LIMIT, RosterOutcome, SearchStrategy, SolvePlan, grid_order, roster_order,
    solve_roster,
};
pub use grid::{AssignmentGrid, Axis, GridIndex, GridShape};
pub use model::{
    Comparison, Constraint, ConstraintBatch, ConstraintSink, Domain, Literal, LinearConstraint,
    LinearExpr, Model, PostedConstraint, RuleKind, Term, VarAllocator, VarId,
};
pub use objective::post_objective;
pub use report::{RosterReport, StaffReport};
pub use roster::{OBJECTIVE_CEILING, RosterGrids, RosterModel};
pub use solution::SolvedRoster;
pub use solver::{
    RestartPolicy, SearchLimits, SearchRequest, SearchStats, SolveError, SolveOutcome,
    SolveStatus, Solver, ValueSelection, VariableSelection, validate_request,
};
pub use verify::{SoftPreferenceSummary, Tally, Violation, soft_preferences, verify};
