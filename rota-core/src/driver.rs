//! Drives a [`Solver`] over a [`RosterModel`].
//!
//! The driver turns a [`SolvePlan`] into search requests, runs one or more
//! attempts and keeps the best roster found. Strategy and seed are explicit
//! inputs so every run can be replayed.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::grid::GridIndex;
use crate::model::VarId;
use crate::roster::{RosterGrids, RosterModel};
use crate::solution::SolvedRoster;
use crate::solver::{
    RestartPolicy, SearchLimits, SearchRequest, SearchStats, SolveError, SolveOutcome,
    SolveStatus, Solver, ValueSelection, VariableSelection,
};

/// Failures allowed in a unit-length Luby run.
const LUBY_SCALE: u64 = 64;

/// Default wall-clock budget per attempt.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(30);

/// Branching strategy for the roster search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Day by day, service by service, scanning staff from a rotating start
    /// with soft-unavailable staff last. Tries assigning before excluding,
    /// learns from failures and restarts on a Luby schedule.
    #[default]
    RosterOrder,
    /// The roster order searched smallest domain first. Equal domains go to
    /// the variable involved in the most failures. Tries assigning before
    /// excluding and restarts on a Luby schedule.
    FirstFail,
    /// Grid order with seeded random values and Luby restarts.
    RandomValue,
}

/// Parameters steering [`solve_roster`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rota_core::{SearchStrategy, SolvePlan};
///
/// let plan = SolvePlan::default()
///     .with_strategy(SearchStrategy::RandomValue)
///     .with_seed(42)
///     .with_time_limit(Some(Duration::from_secs(5)));
/// assert_eq!(plan.attempts, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolvePlan {
    /// Branching strategy.
    pub strategy: SearchStrategy,
    /// Seed for random choices. Attempt `k` uses `seed + k`.
    pub seed: u64,
    /// Wall-clock budget per attempt.
    pub time_limit: Option<Duration>,
    /// Failure budget per attempt.
    pub failure_limit: Option<u64>,
    /// Number of attempts, each with a different staff scan.
    pub attempts: u32,
}

impl Default for SolvePlan {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::default(),
            seed: 0,
            time_limit: Some(DEFAULT_TIME_LIMIT),
            failure_limit: None,
            attempts: 1,
        }
    }
}

impl SolvePlan {
    /// Set the branching strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the per-attempt time budget.
    #[must_use]
    pub const fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Set the per-attempt failure budget.
    #[must_use]
    pub const fn with_failure_limit(mut self, failure_limit: Option<u64>) -> Self {
        self.failure_limit = failure_limit;
        self
    }

    /// Set the number of attempts; zero is read as one.
    #[must_use]
    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Search request for attempt `attempt`, only accepting objectives up to
    /// `objective_upper_bound`.
    #[must_use]
    pub fn request_for(
        &self,
        grids: &RosterGrids,
        attempt: u32,
        objective_upper_bound: Option<i64>,
    ) -> SearchRequest {
        let (order, variables, values, restarts) = match self.strategy {
            SearchStrategy::RosterOrder => (
                roster_order(grids, attempt),
                VariableSelection::ConflictWeighted,
                ValueSelection::Max,
                RestartPolicy::Luby { scale: LUBY_SCALE },
            ),
            SearchStrategy::FirstFail => (
                roster_order(grids, attempt),
                VariableSelection::FirstFail,
                ValueSelection::Max,
                RestartPolicy::Luby { scale: LUBY_SCALE },
            ),
            SearchStrategy::RandomValue => (
                grid_order(grids),
                VariableSelection::InputOrder,
                ValueSelection::Random,
                RestartPolicy::Luby { scale: LUBY_SCALE },
            ),
        };
        SearchRequest {
            decision_order: order,
            variable_selection: variables,
            value_selection: values,
            restarts,
            objective: Some(grids.objective()),
            objective_upper_bound,
            seed: self.seed.wrapping_add(u64::from(attempt)),
            limits: SearchLimits {
                time: self.time_limit,
                failures: self.failure_limit,
                solutions: None,
            },
        }
    }
}

/// Every shift variable, then every standby variable, in grid layout order.
#[must_use]
pub fn grid_order(grids: &RosterGrids) -> Vec<VarId> {
    grids
        .shifts()
        .iter()
        .chain(grids.standby().iter())
        .map(|(_, var)| var)
        .collect()
}

/// Day-major decision order.
///
/// Within a day the services come first, then the standby duties. Each slot
/// scans staff from an offset that advances with every slot, so consecutive
/// slots start with different people; odd attempts scan backwards. Staff who
/// asked for the day off are scanned last for services.
#[must_use]
pub fn roster_order(grids: &RosterGrids, attempt: u32) -> Vec<VarId> {
    let staff = grids.staff_count();
    let services = grids.service_count();
    let slots = services + grids.duty_count();
    let shift = usize::try_from(attempt).unwrap_or(0);
    let backwards = attempt.rem_euclid(2) == 1;
    let config = grids.config();
    let mut order = Vec::with_capacity(slots * staff * grids.day_count());
    for day in 0..grids.day_count() {
        for slot in 0..slots {
            let start = (day * slots + slot + shift).rem_euclid(staff.max(1));
            let scan = (0..staff).map(|step| {
                if backwards {
                    (start + staff - step).rem_euclid(staff)
                } else {
                    (start + step).rem_euclid(staff)
                }
            });
            let (grid, index) = if slot < services {
                (grids.shifts(), slot)
            } else {
                (grids.standby(), slot - services)
            };
            let soft = |member: &usize| slot < services && config.is_soft_unavailable(*member, day);
            let (later, first): (Vec<usize>, Vec<usize>) = scan.partition(soft);
            order.extend(
                first
                    .into_iter()
                    .chain(later)
                    .filter_map(|member| grid.get(GridIndex::new(index, member, day))),
            );
        }
    }
    order
}

/// What [`solve_roster`] found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterOutcome {
    /// Best status over all attempts.
    pub status: SolveStatus,
    /// Objective of the best roster.
    pub objective: Option<i64>,
    /// Counters summed over attempts; `elapsed` is the total wall time.
    pub stats: SearchStats,
    /// Attempts actually run.
    pub attempts: u32,
    /// Best roster found.
    pub roster: Option<SolvedRoster>,
}

impl RosterOutcome {
    /// Whether a roster was found.
    #[must_use]
    pub const fn found(&self) -> bool {
        self.roster.is_some()
    }
}

/// Run `plan` against `roster` with `solver`.
///
/// Attempts stop early on a proven answer. Later attempts only accept
/// rosters strictly better than the best so far, so an infeasible later
/// attempt proves the incumbent optimal.
///
/// # Errors
///
/// Returns [`SolveError`] when the solver rejects the model or request.
pub fn solve_roster<S>(
    roster: &RosterModel,
    solver: &S,
    plan: &SolvePlan,
) -> Result<RosterOutcome, SolveError>
where
    S: Solver + ?Sized,
{
    let started = Instant::now();
    let grids = roster.grids();
    let mut best: Option<SolveOutcome> = None;
    let mut status = SolveStatus::Unknown;
    let mut stats = SearchStats::default();
    let mut attempts = 0;

    for attempt in 0..plan.attempts.max(1) {
        let bound = best
            .as_ref()
            .and_then(|incumbent| incumbent.objective)
            .map(|objective| objective.saturating_sub(1));
        let request = plan.request_for(grids, attempt, bound);
        let outcome = solver.solve(roster.model(), &request)?;
        attempts += 1;
        accumulate(&mut stats, &outcome.stats);
        debug!(
            "attempt {attempt}: {:?} after {} nodes, {} failures",
            outcome.status, outcome.stats.nodes, outcome.stats.failures
        );
        match outcome.status {
            SolveStatus::Infeasible => {
                status = if best.is_some() {
                    SolveStatus::Optimal
                } else {
                    SolveStatus::Infeasible
                };
                break;
            }
            SolveStatus::Optimal => {
                status = SolveStatus::Optimal;
                best = Some(outcome);
                break;
            }
            SolveStatus::Feasible => {
                status = SolveStatus::Feasible;
                best = Some(outcome);
            }
            SolveStatus::Unknown => {}
        }
    }

    stats.elapsed = started.elapsed();
    let objective = best.as_ref().and_then(|outcome| outcome.objective);
    let solved = best
        .as_ref()
        .and_then(|outcome| outcome.values.as_deref())
        .and_then(|values| SolvedRoster::from_values(grids, values));
    info!(
        "roster search {status:?} in {:?} (objective {objective:?}, {} attempts)",
        stats.elapsed, attempts
    );
    Ok(RosterOutcome {
        status,
        objective,
        stats,
        attempts,
        roster: solved,
    })
}

const fn accumulate(total: &mut SearchStats, part: &SearchStats) {
    total.nodes = total.nodes.saturating_add(part.nodes);
    total.failures = total.failures.saturating_add(part.failures);
    total.restarts = total.restarts.saturating_add(part.restarts);
    total.solutions = total.solutions.saturating_add(part.solutions);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::test_support::{soft_preference_config, ten_resident_assignment, ten_resident_config};
    use rstest::{fixture, rstest};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Replays canned statuses and records the requests it saw.
    struct ScriptedSolver {
        script: Mutex<Vec<(SolveStatus, Option<i64>)>>,
        values: Vec<i64>,
        requests: Mutex<Vec<SearchRequest>>,
    }

    impl ScriptedSolver {
        fn new(values: Vec<i64>, script: Vec<(SolveStatus, Option<i64>)>) -> Self {
            Self {
                script: Mutex::new(script.into_iter().rev().collect()),
                values,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<SearchRequest> {
            self.requests.lock().expect("lock").clone()
        }
    }

    impl Solver for ScriptedSolver {
        fn solve(
            &self,
            _model: &Model,
            request: &SearchRequest,
        ) -> Result<SolveOutcome, SolveError> {
            self.requests.lock().expect("lock").push(request.clone());
            let (status, objective) = self
                .script
                .lock()
                .expect("lock")
                .pop()
                .unwrap_or((SolveStatus::Unknown, None));
            Ok(SolveOutcome {
                status,
                values: status.has_solution().then(|| self.values.clone()),
                objective,
                stats: SearchStats {
                    nodes: 10,
                    failures: 2,
                    ..SearchStats::default()
                },
            })
        }
    }

    #[fixture]
    fn roster() -> RosterModel {
        RosterModel::build(ten_resident_config()).expect("valid config")
    }

    #[rstest]
    fn roster_order_covers_every_cell_once(roster: RosterModel) {
        let order = roster_order(roster.grids(), 0);
        let unique: HashSet<_> = order.iter().copied().collect();
        assert_eq!(order.len(), 600);
        assert_eq!(unique.len(), 600);
        assert!(!unique.contains(&roster.grids().objective()));
    }

    #[rstest]
    fn roster_order_rotates_the_first_staff_member(roster: RosterModel) {
        let order = roster_order(roster.grids(), 0);
        let shifts = roster.grids().shifts();
        assert_eq!(order.first().copied(), shifts.get(GridIndex::new(0, 0, 0)));
        assert_eq!(order.get(10).copied(), shifts.get(GridIndex::new(1, 1, 0)));
        // Day 1 starts four slots further on.
        assert_eq!(order.get(40).copied(), shifts.get(GridIndex::new(0, 4, 1)));
    }

    #[rstest]
    fn odd_attempts_scan_backwards(roster: RosterModel) {
        let order = roster_order(roster.grids(), 1);
        let shifts = roster.grids().shifts();
        assert_eq!(order.first().copied(), shifts.get(GridIndex::new(0, 1, 0)));
        assert_eq!(order.get(1).copied(), shifts.get(GridIndex::new(0, 0, 0)));
    }

    #[rstest]
    fn soft_unavailable_staff_are_scanned_last() {
        let roster = RosterModel::build(soft_preference_config()).expect("valid config");
        let order = roster_order(roster.grids(), 0);
        let shifts = roster.grids().shifts();
        // Service 0 on day 0 would start at staff 0, who asked for the day off.
        assert_eq!(order.first().copied(), shifts.get(GridIndex::new(0, 1, 0)));
        assert_eq!(order.get(9).copied(), shifts.get(GridIndex::new(0, 0, 0)));
    }

    #[rstest]
    #[case(SearchStrategy::RosterOrder, VariableSelection::ConflictWeighted, ValueSelection::Max)]
    #[case(SearchStrategy::FirstFail, VariableSelection::FirstFail, ValueSelection::Max)]
    #[case(SearchStrategy::RandomValue, VariableSelection::InputOrder, ValueSelection::Random)]
    fn strategies_map_to_heuristics(
        roster: RosterModel,
        #[case] strategy: SearchStrategy,
        #[case] variables: VariableSelection,
        #[case] values: ValueSelection,
    ) {
        let plan = SolvePlan::default().with_strategy(strategy).with_seed(5);
        let request = plan.request_for(roster.grids(), 2, None);
        assert_eq!(request.variable_selection, variables);
        assert_eq!(request.value_selection, values);
        assert_eq!(request.restarts, RestartPolicy::Luby { scale: LUBY_SCALE });
        assert_eq!(request.objective, Some(roster.grids().objective()));
        assert_eq!(request.seed, 7);
        assert_eq!(request.decision_order.len(), 600);
    }

    #[rstest]
    fn proven_answer_stops_attempts(roster: RosterModel) {
        let values = ten_resident_assignment(&roster);
        let solver = ScriptedSolver::new(values, vec![(SolveStatus::Optimal, Some(0))]);
        let plan = SolvePlan::default().with_attempts(3);
        let outcome = solve_roster(&roster, &solver, &plan).expect("solve succeeds");
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.found());
        assert_eq!(outcome.stats.nodes, 10);
    }

    #[rstest]
    fn later_infeasibility_proves_the_incumbent(roster: RosterModel) {
        let values = ten_resident_assignment(&roster);
        let solver = ScriptedSolver::new(
            values,
            vec![
                (SolveStatus::Feasible, Some(3)),
                (SolveStatus::Infeasible, None),
            ],
        );
        let plan = SolvePlan::default().with_attempts(4);
        let outcome = solve_roster(&roster, &solver, &plan).expect("solve succeeds");
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.objective, Some(3));
        assert_eq!(outcome.attempts, 2);
        let bounds: Vec<_> = solver
            .requests()
            .iter()
            .map(|request| request.objective_upper_bound)
            .collect();
        assert_eq!(bounds, vec![None, Some(2)]);
    }

    #[rstest]
    fn infeasibility_without_incumbent_is_reported(roster: RosterModel) {
        let solver = ScriptedSolver::new(Vec::new(), vec![(SolveStatus::Infeasible, None)]);
        let outcome =
            solve_roster(&roster, &solver, &SolvePlan::default()).expect("solve succeeds");
        assert_eq!(outcome.status, SolveStatus::Infeasible);
        assert!(!outcome.found());
    }

    #[rstest]
    fn exhausted_attempts_report_unknown(roster: RosterModel) {
        let solver = ScriptedSolver::new(Vec::new(), Vec::new());
        let plan = SolvePlan::default().with_attempts(2);
        let outcome = solve_roster(&roster, &solver, &plan).expect("solve succeeds");
        assert_eq!(outcome.status, SolveStatus::Unknown);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.stats.failures, 4);
    }
}
