//! [`FdSolver`], the [`Solver`] implementation of this crate.

use std::time::Duration;

use rota_core::{Model, SearchRequest, SolveError, SolveOutcome, Solver, validate_request};

use crate::search;

/// Configuration for [`FdSolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdSolverConfig {
    /// Wall-clock budget used when a request sets none.
    pub default_time_limit: Option<Duration>,
}

impl Default for FdSolverConfig {
    fn default() -> Self {
        Self {
            default_time_limit: Some(Duration::from_secs(60)),
        }
    }
}

/// Finite-domain solver using bounds propagation and depth-first branch and
/// bound.
///
/// The solver holds no search state, so one instance can serve concurrent
/// requests.
///
/// # Examples
///
/// ```
/// use rota_core::{
///     ConstraintSink, Domain, LinearConstraint, Model, RuleKind, SearchRequest, SolveStatus,
///     Solver, VarAllocator,
/// };
/// use rota_solver_fd::FdSolver;
///
/// let mut model = Model::default();
/// let a = model.new_var("a".into(), Domain::BOOLEAN);
/// let b = model.new_var("b".into(), Domain::BOOLEAN);
/// model.post_linear(RuleKind::AlwaysCovered, LinearConstraint::sum_eq([a, b], 1));
///
/// let outcome = FdSolver::new()
///     .solve(&model, &SearchRequest::new(vec![a, b]))
///     .expect("well-formed request");
/// assert_eq!(outcome.status, SolveStatus::Optimal);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FdSolver {
    config: FdSolverConfig,
}

impl FdSolver {
    /// Solver with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver with an explicit configuration.
    #[must_use]
    pub const fn with_config(config: FdSolverConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &FdSolverConfig {
        &self.config
    }
}

impl Solver for FdSolver {
    fn solve(&self, model: &Model, request: &SearchRequest) -> Result<SolveOutcome, SolveError> {
        validate_request(model, request)?;
        Ok(search::run(model, request, self.config.default_time_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::{SearchLimits, SolveStatus, VarId};
    use rstest::rstest;

    #[rstest]
    fn malformed_requests_are_rejected() {
        let err = FdSolver::new()
            .solve(&Model::default(), &SearchRequest::new(vec![VarId::new(2)]))
            .expect_err("unknown variable");
        assert_eq!(err, SolveError::UnknownVariable { var: VarId::new(2) });
    }

    #[rstest]
    fn empty_models_are_solved_trivially() {
        let outcome = FdSolver::new()
            .solve(&Model::default(), &SearchRequest::default())
            .expect("well-formed request");
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.values, Some(Vec::new()));
    }

    #[rstest]
    fn request_limits_override_the_default() {
        let solver = FdSolver::with_config(FdSolverConfig {
            default_time_limit: Some(Duration::from_secs(0)),
        });
        let request = SearchRequest::default().with_limits(SearchLimits {
            time: Some(Duration::from_secs(5)),
            ..SearchLimits::default()
        });
        let outcome = solver
            .solve(&Model::default(), &request)
            .expect("well-formed request");
        assert_eq!(outcome.status, SolveStatus::Optimal);
    }
}
