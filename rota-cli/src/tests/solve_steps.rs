//! Behaviour-driven step definitions driving the solve CLI scenarios.

use super::helpers::{CannedSolverBuilder, RosterFile, write_utf8};
use super::*;
use rota_core::RosterConfig;
use rota_core::test_support::{single_resident_config, ten_resident_config};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

struct SolveWorld {
    roster: RosterFile,
    include_roster: RefCell<bool>,
    builder: RefCell<Option<CannedSolverBuilder>>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<Completion, CliError>>>,
}

impl SolveWorld {
    fn new() -> Self {
        Self {
            roster: RosterFile::empty(),
            include_roster: RefCell::new(true),
            builder: RefCell::new(None),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn write_roster(&self, config: &RosterConfig) {
        let payload = serde_json::to_string_pretty(config).expect("serialise roster");
        write_utf8(self.roster.path(), payload.as_bytes());
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["rota".to_owned(), "solve".to_owned()];
        if *self.include_roster.borrow() {
            argv.push(self.roster.path().as_str().to_owned());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn stdout_text(&self) -> String {
        String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8")
    }

    fn expect_error(&self) -> CliError {
        self.result
            .borrow_mut()
            .take()
            .expect("result recorded")
            .expect_err("expected error")
    }
}

#[fixture]
fn world() -> SolveWorld {
    SolveWorld::new()
}

#[given("a roster file for ten residents exists on disk")]
fn ten_resident_roster_exists(#[from(world)] world: &SolveWorld) {
    world.write_roster(&ten_resident_config());
    world
        .builder
        .replace(Some(CannedSolverBuilder::reference_roster()));
}

#[given("a roster file for one resident exists on disk")]
fn single_resident_roster_exists(#[from(world)] world: &SolveWorld) {
    world.write_roster(&single_resident_config());
}

#[given("I ask for JSON output")]
fn ask_for_json(#[from(world)] world: &SolveWorld) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_SOLVE_FORMAT}"), "json".to_owned()]);
}

#[given("the roster file contains invalid JSON")]
fn roster_contains_invalid_json(#[from(world)] world: &SolveWorld) {
    write_utf8(world.roster.path(), b"{ not valid json");
}

#[given("I omit the roster path")]
fn omit_roster_path(#[from(world)] world: &SolveWorld) {
    *world.include_roster.borrow_mut() = false;
}

#[when("I run the solve command")]
fn run_solve_command(#[from(world)] world: &SolveWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| {
        let canned = world.builder.borrow().clone();
        let builder: &dyn SolverBuilder = match &canned {
            Some(stub) => stub,
            None => &DefaultSolverBuilder,
        };
        let mut buffer = world.stdout.borrow_mut();
        dispatch(cli.command, builder, &mut *buffer)
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints the roster grid")]
fn command_succeeds_and_prints_grid(#[from(world)] world: &SolveWorld) {
    let completion = world.result.borrow_mut().take().expect("result recorded");
    assert_eq!(completion.expect("expected success"), Completion::Success);
    let stdout = world.stdout_text();
    assert!(stdout.starts_with("Shifts\n"));
    assert!(stdout.contains("\nStandby\n"));
}

#[then("the command succeeds and prints JSON output")]
fn command_succeeds_and_prints_json(#[from(world)] world: &SolveWorld) {
    let completion = world.result.borrow_mut().take().expect("result recorded");
    assert_eq!(completion.expect("expected success"), Completion::Success);
    let document: serde_json::Value =
        serde_json::from_str(&world.stdout_text()).expect("output should be JSON");
    assert_eq!(
        document.pointer("/report/services"),
        Some(&serde_json::json!(["MAT", "SAMU", "BLOC"]))
    );
}

#[then("the command reports that no roster exists")]
fn command_reports_no_roster(#[from(world)] world: &SolveWorld) {
    let completion = world.result.borrow_mut().take().expect("result recorded");
    assert_eq!(completion.expect("expected success"), Completion::NoRoster);
    assert!(world.stdout_text().starts_with("status: infeasible"));
}

#[then("the command fails because the roster JSON is invalid")]
fn command_fails_invalid_json(#[from(world)] world: &SolveWorld) {
    match world.expect_error() {
        CliError::ParseRoster { path, .. } => assert_eq!(path, world.roster.path()),
        other => panic!("expected ParseRoster, found {other:?}"),
    }
}

#[then("the command fails because the roster path is missing")]
fn command_fails_missing_roster_path(#[from(world)] world: &SolveWorld) {
    match world.expect_error() {
        CliError::MissingArgument { field, .. } => assert_eq!(field, ARG_SOLVE_ROSTER),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_solve_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/solve_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SolveWorld) {
            let _ = world;
        }
    };
}

register_solve_scenario!(solve_as_text, "solving a roster file as text");
register_solve_scenario!(solve_as_json, "solving a roster file as JSON");
register_solve_scenario!(solve_infeasible, "reporting an infeasible roster");
register_solve_scenario!(solve_invalid_json, "rejecting invalid JSON input");
register_solve_scenario!(solve_missing_roster, "rejecting missing roster paths");
