//! Behavioural tests for `FdSolver` using rstest-bdd.

use std::cell::RefCell;

use rota_core::test_support::single_resident_config;
use rota_core::{
    Comparison, ConstraintSink, Domain, LinearConstraint, LinearExpr, Model, RosterModel,
    RosterOutcome, RuleKind, SearchRequest, SolveError, SolveOutcome, SolvePlan, SolveStatus,
    Solver, VarAllocator, VarId, solve_roster,
};
use rota_solver_fd::FdSolver;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Debug, Default)]
struct SolverWorld {
    model: RefCell<Model>,
    decisions: RefCell<Vec<VarId>>,
    objective: RefCell<Option<VarId>>,
    outcome: RefCell<Option<Result<SolveOutcome, SolveError>>>,
    roster: RefCell<Option<RosterModel>>,
    roster_outcome: RefCell<Option<RosterOutcome>>,
}

impl SolverWorld {
    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_outcome(&self) -> Result<SolveOutcome, SolveError> {
        self.outcome
            .borrow()
            .clone()
            .expect("outcome should be recorded before assertions")
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_solution(&self) -> SolveOutcome {
        self.expect_outcome().expect("solve should succeed")
    }
}

#[fixture]
fn world() -> SolverWorld {
    SolverWorld::default()
}

#[given("two of four picks must be made")]
fn given_pick_two(world: &SolverWorld) {
    let mut model = world.model.borrow_mut();
    let picks: Vec<VarId> = (0..4)
        .map(|index| model.new_var(format!("pick{index}"), Domain::BOOLEAN))
        .collect();
    model.post_linear(
        RuleKind::AlwaysCovered,
        LinearConstraint::sum_eq(picks.iter().copied(), 2),
    );
    world.decisions.replace(picks);
}

#[given("the cost counts picks among the first two")]
fn given_cost(world: &SolverWorld) {
    let mut model = world.model.borrow_mut();
    let cost = model.new_var("cost".to_owned(), Domain::new(0, 4));
    let expr = LinearExpr::sum(world.decisions.borrow().iter().copied().take(2)).plus(-1, cost);
    model.post_linear(
        RuleKind::Objective,
        LinearConstraint::new(expr, Comparison::Eq, 0),
    );
    world.objective.replace(Some(cost));
}

#[given("a flag pinned both on and off")]
fn given_contradiction(world: &SolverWorld) {
    let mut model = world.model.borrow_mut();
    let flag = model.new_var("flag".to_owned(), Domain::BOOLEAN);
    model.post_fixed(RuleKind::HardUnavailability, flag, 0);
    model.post_fixed(RuleKind::Capability, flag, 1);
    world.decisions.replace(vec![flag]);
}

#[given("the request decides an undeclared variable")]
fn given_undeclared(world: &SolverWorld) {
    world.decisions.borrow_mut().push(VarId::new(99));
}

#[given("a roster of one staff member over fifteen days")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn given_single_resident(world: &SolverWorld) {
    let roster = RosterModel::build(single_resident_config()).expect("valid roster");
    world.roster.replace(Some(roster));
}

#[when("the model is solved")]
fn when_solved(world: &SolverWorld) {
    let mut request = SearchRequest::new(world.decisions.borrow().clone());
    if let Some(objective) = *world.objective.borrow() {
        request = request.minimising(objective);
    }
    let outcome = FdSolver::new().solve(&world.model.borrow(), &request);
    world.outcome.replace(Some(outcome));
}

#[when("the roster is solved")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn when_roster_solved(world: &SolverWorld) {
    let roster = world.roster.borrow();
    let outcome = solve_roster(
        roster.as_ref().expect("roster should be built first"),
        &FdSolver::new(),
        &SolvePlan::default(),
    )
    .expect("solve should succeed");
    world.roster_outcome.replace(Some(outcome));
}

#[then("the search proves a cost of zero")]
fn then_cost_zero(world: &SolverWorld) {
    let outcome = world.expect_solution();
    assert_eq!(outcome.status, SolveStatus::Optimal);
    assert_eq!(outcome.objective, Some(0));
}

#[then("the returned values satisfy every constraint")]
fn then_values_sound(world: &SolverWorld) {
    let outcome = world.expect_solution();
    let values = outcome.values.unwrap_or_default();
    assert!(!values.is_empty());
    assert!(world.model.borrow().violations(&values).is_empty());
}

#[then("the model is reported infeasible")]
fn then_infeasible(world: &SolverWorld) {
    let outcome = world.expect_solution();
    assert_eq!(outcome.status, SolveStatus::Infeasible);
    assert!(outcome.values.is_none());
}

#[then("the request is rejected as naming an unknown variable")]
fn then_unknown_variable(world: &SolverWorld) {
    assert_eq!(
        world.expect_outcome(),
        Err(SolveError::UnknownVariable {
            var: VarId::new(99)
        })
    );
}

#[then("the roster is reported infeasible")]
fn then_roster_infeasible(world: &SolverWorld) {
    let outcome = world.roster_outcome.borrow().clone();
    assert!(matches!(
        outcome,
        Some(RosterOutcome {
            status: SolveStatus::Infeasible,
            roster: None,
            ..
        })
    ));
}

#[scenario(path = "tests/features/fd_solver.feature", index = 0)]
fn minimising_a_pick_two_model(world: SolverWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/fd_solver.feature", index = 1)]
fn contradictory_pins(world: SolverWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/fd_solver.feature", index = 2)]
fn request_naming_an_undeclared_variable(world: SolverWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/fd_solver.feature", index = 3)]
fn one_resident_for_three_services(world: SolverWorld) {
    let _ = world;
}
