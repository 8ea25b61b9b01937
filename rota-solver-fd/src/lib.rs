//! Finite-domain search backend for the rota engine.
//!
//! [`FdSolver`] implements the [`Solver`](rota_core::Solver) seam with a
//! small propagation engine: interval domains kept on an undo trail, bounds
//! propagators for linear rows, implications and equalities, and a
//! depth-first branch and bound honouring the branching heuristics, restart
//! schedule, seed and limits of each
//! [`SearchRequest`](rota_core::SearchRequest).
//!
//! The search is deterministic for a given model, request and seed, up to
//! wall-clock limits.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod domains;
mod propagate;
mod search;
mod solver;

pub use solver::{FdSolver, FdSolverConfig};
