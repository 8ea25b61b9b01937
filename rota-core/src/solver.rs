//! The solving capability: search requests, outcomes and the `Solver` trait.

use std::time::Duration;

use thiserror::Error;

use crate::model::{Model, VarId};

/// How the next branching variable is picked among the unfixed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableSelection {
    /// First unfixed variable of the decision order.
    #[default]
    InputOrder,
    /// Smallest domain first. Ties go to the variable involved in the most
    /// failures, then to decision order.
    FirstFail,
    /// Variable involved in the most failures so far, ties broken by
    /// decision order.
    ConflictWeighted,
    /// Uniformly random unfixed variable.
    Random,
}

/// Which value of the chosen variable is tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueSelection {
    /// Domain minimum.
    #[default]
    Min,
    /// Domain maximum.
    Max,
    /// Minimum or maximum at random.
    Random,
}

/// When a search run is abandoned and restarted from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    /// Search the whole tree in one run.
    #[default]
    Never,
    /// Restart after `scale * luby(i)` failures in run `i`.
    Luby {
        /// Failures allowed in a unit-length run.
        scale: u64,
    },
}

/// Resource limits for one solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchLimits {
    /// Wall-clock budget.
    pub time: Option<Duration>,
    /// Maximum number of failures.
    pub failures: Option<u64>,
    /// Stop after this many improving solutions.
    pub solutions: Option<u64>,
}

/// Parameters of one solve call.
///
/// # Examples
///
/// ```rust
/// use rota_core::{SearchRequest, ValueSelection, VarId};
///
/// let request = SearchRequest::new(vec![VarId::new(0), VarId::new(1)])
///     .with_value_selection(ValueSelection::Max)
///     .with_seed(7);
/// assert_eq!(request.seed, 7);
/// assert!(request.objective.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchRequest {
    /// Decision variables, in the order the search should prefer them.
    pub decision_order: Vec<VarId>,
    /// Branching variable heuristic.
    pub variable_selection: VariableSelection,
    /// Branching value heuristic.
    pub value_selection: ValueSelection,
    /// Restart schedule.
    pub restarts: RestartPolicy,
    /// Variable to minimise; `None` asks for any solution.
    pub objective: Option<VarId>,
    /// Only accept solutions whose objective is at most this value.
    pub objective_upper_bound: Option<i64>,
    /// Seed for every random choice.
    pub seed: u64,
    /// Resource limits.
    pub limits: SearchLimits,
}

impl SearchRequest {
    /// Request branching on `decision_order` with default heuristics.
    #[must_use]
    pub fn new(decision_order: Vec<VarId>) -> Self {
        Self {
            decision_order,
            ..Self::default()
        }
    }

    /// Set the variable heuristic.
    #[must_use]
    pub const fn with_variable_selection(mut self, selection: VariableSelection) -> Self {
        self.variable_selection = selection;
        self
    }

    /// Set the value heuristic.
    #[must_use]
    pub const fn with_value_selection(mut self, selection: ValueSelection) -> Self {
        self.value_selection = selection;
        self
    }

    /// Set the restart schedule.
    #[must_use]
    pub const fn with_restarts(mut self, restarts: RestartPolicy) -> Self {
        self.restarts = restarts;
        self
    }

    /// Minimise `objective`.
    #[must_use]
    pub const fn minimising(mut self, objective: VarId) -> Self {
        self.objective = Some(objective);
        self
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the resource limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// How a solve call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// A solution was found and proven best, or any solution was requested
    /// and the search completed.
    Optimal,
    /// A solution was found but a limit stopped the search before it was
    /// proven best.
    Feasible,
    /// The search proved no solution exists.
    Infeasible,
    /// A limit stopped the search before any solution was found.
    Unknown,
}

impl SolveStatus {
    /// Whether the outcome carries a solution.
    #[must_use]
    pub const fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }

    /// Whether the search reached a definitive answer.
    #[must_use]
    pub const fn is_proven(self) -> bool {
        matches!(self, Self::Optimal | Self::Infeasible)
    }
}

/// Counters describing a finished search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Branching decisions taken.
    pub nodes: u64,
    /// Dead ends met.
    pub failures: u64,
    /// Runs restarted from the root.
    pub restarts: u64,
    /// Improving solutions found.
    pub solutions: u64,
}

/// Result of a solve call.
///
/// Infeasibility and exhausted limits are ordinary outcomes, reported through
/// [`SolveOutcome::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    /// How the search ended.
    pub status: SolveStatus,
    /// Best assignment found, indexed by variable.
    pub values: Option<Vec<i64>>,
    /// Objective value of `values`, when minimising.
    pub objective: Option<i64>,
    /// Search counters.
    pub stats: SearchStats,
}

impl SolveOutcome {
    /// Outcome without a solution.
    #[must_use]
    pub const fn without_solution(status: SolveStatus, stats: SearchStats) -> Self {
        Self {
            status,
            values: None,
            objective: None,
            stats,
        }
    }
}

/// Errors returned by [`Solver::solve`] for malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The request names a variable the model does not declare.
    #[error("variable {var} is not declared by the model")]
    UnknownVariable {
        /// Offending handle.
        var: VarId,
    },
    /// A variable was declared with no value in its domain.
    #[error("variable {var} has an empty domain")]
    EmptyDomain {
        /// Offending handle.
        var: VarId,
    },
}

/// A finite-domain engine able to search a [`Model`].
///
/// Implementations return [`SolveError`] only for malformed input; running
/// out of budget or proving infeasibility are reported as
/// [`SolveStatus`] values. Solvers must be `Send + Sync` so one instance can
/// serve several threads.
pub trait Solver: Send + Sync {
    /// Search `model` as directed by `request`.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError`] when the request or model is malformed.
    fn solve(&self, model: &Model, request: &SearchRequest) -> Result<SolveOutcome, SolveError>;
}

/// Check that every variable `request` mentions exists in `model` and that
/// every declared domain is non-empty.
///
/// Backends call this before searching.
///
/// # Errors
///
/// Returns the first [`SolveError`] found.
pub fn validate_request(model: &Model, request: &SearchRequest) -> Result<(), SolveError> {
    for (index, domain) in model.domains().enumerate() {
        if domain.is_empty() {
            return Err(SolveError::EmptyDomain {
                var: VarId::new(index),
            });
        }
    }
    let mentioned = request
        .decision_order
        .iter()
        .copied()
        .chain(request.objective);
    for var in mentioned {
        if model.domain(var).is_none() {
            return Err(SolveError::UnknownVariable { var });
        }
    }
    Ok(())
}
