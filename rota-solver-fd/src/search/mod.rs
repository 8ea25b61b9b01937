//! Depth-first branch and bound over the compiled propagators.
//!
//! Each node fixes one variable to a bound value; on failure the sibling
//! branch removes that value. Runs are cut short on a Luby schedule when the
//! request asks for restarts, and every improving solution tightens the
//! objective at the root before the next run starts.

use std::cmp::Reverse;
use std::time::{Duration, Instant};

use log::debug;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rota_core::{
    Model, RestartPolicy, SearchRequest, SearchStats, SolveOutcome, SolveStatus, ValueSelection,
    VariableSelection,
};

use crate::domains::{Domains, Mark, Wipeout};
use crate::propagate::{Conflict, Propagators};

/// Term `index` of the Luby sequence `1, 1, 2, 1, 1, 2, 4, ...`, from one.
pub fn luby(index: u64) -> u64 {
    let mut current = index.max(1);
    loop {
        let mut size = 1_u64;
        while size < current {
            size = size.saturating_mul(2).saturating_add(1);
        }
        if size == current {
            return (size >> 1).saturating_add(1);
        }
        current = current.saturating_sub(size >> 1);
    }
}

/// Picks branching variables and values.
struct Brancher {
    order: Vec<usize>,
    variables: VariableSelection,
    values: ValueSelection,
    weights: Vec<u64>,
    rng: ChaCha8Rng,
}

impl Brancher {
    fn new(request: &SearchRequest, var_count: usize) -> Self {
        Self {
            order: request
                .decision_order
                .iter()
                .map(|var| var.index())
                .collect(),
            variables: request.variable_selection,
            values: request.value_selection,
            weights: vec![0; var_count],
            rng: ChaCha8Rng::seed_from_u64(request.seed),
        }
    }

    fn weight(&self, var: usize) -> u64 {
        self.weights.get(var).copied().unwrap_or(0)
    }

    fn select(&mut self, domains: &Domains) -> Option<usize> {
        let mut unfixed = self
            .order
            .iter()
            .copied()
            .filter(|&var| !domains.is_fixed(var));
        let chosen = match self.variables {
            VariableSelection::InputOrder => unfixed.next(),
            VariableSelection::FirstFail => {
                unfixed.min_by_key(|&var| (domains.width(var), Reverse(self.weight(var))))
            }
            VariableSelection::ConflictWeighted => {
                unfixed.min_by_key(|&var| Reverse(self.weight(var)))
            }
            VariableSelection::Random => {
                let candidates: Vec<usize> = unfixed.collect();
                candidates.choose(&mut self.rng).copied()
            }
        };
        chosen.or_else(|| (0..domains.var_count()).find(|&var| !domains.is_fixed(var)))
    }

    fn value(&mut self, domains: &Domains, var: usize) -> i64 {
        let take_max = match self.values {
            ValueSelection::Min => false,
            ValueSelection::Max => true,
            ValueSelection::Random => self.rng.gen_ratio(1, 2),
        };
        if take_max && self.order.contains(&var) {
            domains.hi(var)
        } else {
            domains.lo(var)
        }
    }

    fn bump(&mut self, conflict: Conflict, propagators: &Propagators) {
        for &var in propagators.vars_of(conflict.propagator) {
            if let Some(weight) = self.weights.get_mut(var) {
                *weight = weight.saturating_add(1);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Choice {
    var: usize,
    value: i64,
    mark: Mark,
    refuted: bool,
}

#[derive(Debug)]
enum RunEnd {
    Solution(Vec<i64>),
    Exhausted,
    Restart,
    Limit,
}

/// Failure of a branch: a propagator conflict or a decision that emptied a
/// domain.
type Dead = Option<Conflict>;

struct Search<'a> {
    request: &'a SearchRequest,
    propagators: Propagators,
    domains: Domains,
    brancher: Brancher,
    stats: SearchStats,
    started: Instant,
    deadline: Option<Instant>,
}

impl Search<'_> {
    fn out_of_budget(&self) -> bool {
        let failures = self
            .request
            .limits
            .failures
            .is_some_and(|limit| self.stats.failures >= limit);
        failures || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn apply(
        &mut self,
        change: impl FnOnce(&mut Domains) -> Result<bool, Wipeout>,
    ) -> Result<(), Dead> {
        change(&mut self.domains).map_err(|_| None)?;
        self.propagators
            .propagate_changes(&mut self.domains)
            .map_err(Some)
    }

    /// Undo refuted choices and take the first untried sibling branch.
    ///
    /// Returns `None` once the tree under the root is exhausted.
    fn backtrack(&mut self, stack: &mut Vec<Choice>) -> Option<Result<(), Dead>> {
        while let Some(choice) = stack.pop() {
            self.domains.undo_to(choice.mark);
            if !choice.refuted {
                stack.push(Choice {
                    refuted: true,
                    ..choice
                });
                return Some(self.apply(|domains| domains.exclude(choice.var, choice.value)));
            }
        }
        None
    }

    fn descend(&mut self, run_limit: Option<u64>) -> RunEnd {
        let mut stack: Vec<Choice> = Vec::new();
        let mut run_failures = 0_u64;
        loop {
            if self.out_of_budget() {
                return RunEnd::Limit;
            }
            let Some(var) = self.brancher.select(&self.domains) else {
                return self
                    .domains
                    .values()
                    .map_or(RunEnd::Exhausted, RunEnd::Solution);
            };
            let value = self.brancher.value(&self.domains, var);
            self.stats.nodes = self.stats.nodes.saturating_add(1);
            stack.push(Choice {
                var,
                value,
                mark: self.domains.mark(),
                refuted: false,
            });
            let mut outcome = self.apply(|domains| domains.assign(var, value));
            while let Err(dead) = outcome {
                self.stats.failures = self.stats.failures.saturating_add(1);
                run_failures = run_failures.saturating_add(1);
                if let Some(conflict) = dead {
                    self.brancher.bump(conflict, &self.propagators);
                }
                if self.out_of_budget() {
                    return RunEnd::Limit;
                }
                if run_limit.is_some_and(|limit| run_failures >= limit) {
                    return RunEnd::Restart;
                }
                let Some(next) = self.backtrack(&mut stack) else {
                    return RunEnd::Exhausted;
                };
                outcome = next;
            }
        }
    }

    fn run_limit(&self, run: u64) -> Option<u64> {
        match self.request.restarts {
            RestartPolicy::Never => None,
            RestartPolicy::Luby { scale } => Some(scale.max(1).saturating_mul(luby(run))),
        }
    }

    fn finish(mut self, status: SolveStatus, best: Option<Vec<i64>>) -> SolveOutcome {
        self.stats.elapsed = self.started.elapsed();
        debug!(
            "search {status:?}: {} nodes, {} failures, {} restarts",
            self.stats.nodes, self.stats.failures, self.stats.restarts
        );
        let objective = self
            .request
            .objective
            .and_then(|var| best.as_ref()?.get(var.index()).copied());
        SolveOutcome {
            status,
            values: best,
            objective,
            stats: self.stats,
        }
    }

    /// Run until the tree is exhausted, a limit is met or, without an
    /// objective, the first solution is found.
    fn optimise(mut self) -> SolveOutcome {
        let objective = self.request.objective.map(|var| var.index());
        let floor = objective.map(|var| self.domains.lo(var));
        let mut best: Option<Vec<i64>> = None;
        let mut run = 1_u64;
        loop {
            let root = self.domains.mark();
            let end = self.descend(self.run_limit(run));
            self.domains.undo_to(root);
            match end {
                RunEnd::Solution(values) => {
                    self.stats.solutions = self.stats.solutions.saturating_add(1);
                    let found = objective.and_then(|var| values.get(var).copied());
                    best = Some(values);
                    let (Some(var), Some(value)) = (objective, found) else {
                        return self.finish(SolveStatus::Optimal, best);
                    };
                    if floor.is_some_and(|lowest| value <= lowest) {
                        return self.finish(SolveStatus::Optimal, best);
                    }
                    debug!("improving solution with objective {value}");
                    let solutions_done = self
                        .request
                        .limits
                        .solutions
                        .is_some_and(|limit| self.stats.solutions >= limit);
                    if solutions_done {
                        return self.finish(SolveStatus::Feasible, best);
                    }
                    let bound = value.saturating_sub(1);
                    if self
                        .apply(|domains| domains.lower(var, bound))
                        .is_err()
                    {
                        return self.finish(SolveStatus::Optimal, best);
                    }
                }
                RunEnd::Exhausted => {
                    let status = if best.is_some() {
                        SolveStatus::Optimal
                    } else {
                        SolveStatus::Infeasible
                    };
                    return self.finish(status, best);
                }
                RunEnd::Restart => {
                    self.stats.restarts = self.stats.restarts.saturating_add(1);
                    run = run.saturating_add(1);
                }
                RunEnd::Limit => {
                    let status = if best.is_some() {
                        SolveStatus::Feasible
                    } else {
                        SolveStatus::Unknown
                    };
                    return self.finish(status, best);
                }
            }
        }
    }
}

/// Pin constants, cap the objective and propagate the root.
fn prepare_root(
    propagators: &Propagators,
    domains: &mut Domains,
    request: &SearchRequest,
) -> Result<(), Dead> {
    for &(var, value) in propagators.pins() {
        domains.assign(var, value).map_err(|_| None)?;
    }
    if let (Some(var), Some(bound)) = (request.objective, request.objective_upper_bound) {
        domains.lower(var.index(), bound).map_err(|_| None)?;
    }
    propagators.propagate_all(domains).map_err(Some)
}

/// Search `model` as `request` directs.
///
/// `default_time_limit` applies when the request carries no time limit.
pub fn run(
    model: &Model,
    request: &SearchRequest,
    default_time_limit: Option<Duration>,
) -> SolveOutcome {
    let started = Instant::now();
    let propagators = Propagators::compile(model);
    let mut domains = Domains::from_model(model);
    let deadline = request
        .limits
        .time
        .or(default_time_limit)
        .and_then(|limit| started.checked_add(limit));
    debug!(
        "searching {} variables under {} propagators",
        domains.var_count(),
        propagators.count()
    );
    let root = prepare_root(&propagators, &mut domains, request);
    let brancher = Brancher::new(request, domains.var_count());
    let search = Search {
        request,
        propagators,
        domains,
        brancher,
        stats: SearchStats::default(),
        started,
        deadline,
    };
    if root.is_err() {
        return search.finish(SolveStatus::Infeasible, None);
    }
    search.optimise()
}
