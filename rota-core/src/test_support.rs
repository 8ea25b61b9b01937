//! Roster scenarios and assignment builders shared by unit, behaviour and
//! backend tests.

use crate::config::RosterConfig;
use crate::grid::GridIndex;
use crate::roster::RosterModel;

/// Services used by the reference scenarios.
pub const SERVICES: [&str; 3] = ["MAT", "SAMU", "BLOC"];

/// Standby duties used by the reference scenarios.
pub const DUTIES: [&str; 1] = ["AST"];

/// Ten staff over fifteen days with three services and one standby duty.
///
/// Shift slack is one, standby slack two, `SAMU` is balanced on its own and
/// staff 0 is incompatible with staff 1 and staff 2.
#[must_use]
pub fn ten_resident_config() -> RosterConfig {
    fully_compatible_config()
        .with_incompatible_pair(0, 1)
        .with_incompatible_pair(0, 2)
}

/// [`ten_resident_config`] without any incompatible pair.
#[must_use]
pub fn fully_compatible_config() -> RosterConfig {
    RosterConfig::permissive(&SERVICES, &DUTIES, 10, 15)
        .with_slacks(1, 2)
        .with_balanced_service("SAMU")
}

/// [`ten_resident_config`] with staff 0 unable to work on days 0 to 8.
#[must_use]
pub fn hard_block_config() -> RosterConfig {
    ten_resident_config().with_hard_unavailability(0, 0..9)
}

/// [`ten_resident_config`] with staff 0 preferring days 0 to 8 off and
/// staff 1 preferring days 7 to 14 off.
#[must_use]
pub fn soft_preference_config() -> RosterConfig {
    ten_resident_config()
        .with_soft_unavailability(0, 0..9)
        .with_soft_unavailability(1, 7..15)
}

/// One staff member asked to cover three services every day.
#[must_use]
pub fn single_resident_config() -> RosterConfig {
    RosterConfig::permissive(&SERVICES, &DUTIES, 1, 15).with_slacks(1, 2)
}

/// Builds complete assignments for a [`RosterModel`] cell by cell.
///
/// Every variable starts at its domain minimum.
#[derive(Debug, Clone)]
pub struct AssignmentBuilder<'a> {
    roster: &'a RosterModel,
    values: Vec<i64>,
}

impl<'a> AssignmentBuilder<'a> {
    /// All-zero assignment for `roster`.
    #[must_use]
    pub fn new(roster: &'a RosterModel) -> Self {
        let values = roster.model().domains().map(|domain| domain.min).collect();
        Self { roster, values }
    }

    /// Put `staff` on `service` on `day`.
    #[must_use]
    pub fn shift(mut self, service: usize, staff: usize, day: usize) -> Self {
        if let Some(var) = self
            .roster
            .grids()
            .shifts()
            .get(GridIndex::new(service, staff, day))
        {
            self.set(var.index(), 1);
        }
        self
    }

    /// Put `staff` on standby `duty` on `day`.
    #[must_use]
    pub fn standby(mut self, duty: usize, staff: usize, day: usize) -> Self {
        if let Some(var) = self
            .roster
            .grids()
            .standby()
            .get(GridIndex::new(duty, staff, day))
        {
            self.set(var.index(), 1);
        }
        self
    }

    /// Set the objective variable.
    #[must_use]
    pub fn objective(mut self, value: i64) -> Self {
        let index = self.roster.grids().objective().index();
        self.set(index, value);
        self
    }

    /// Finished assignment indexed by variable.
    #[must_use]
    pub fn build(self) -> Vec<i64> {
        self.values
    }

    fn set(&mut self, index: usize, value: i64) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }
}

/// A complete, rule-abiding roster for [`ten_resident_config`].
///
/// A fixed plan, so tests of the verifier and reporter do not need a solver.
#[must_use]
pub fn ten_resident_assignment(roster: &RosterModel) -> Vec<i64> {
    // (day, [MAT, SAMU, BLOC], standby)
    const PLAN: [(usize, [usize; 3], usize); 15] = [
        (0, [5, 7, 4], 0),
        (1, [2, 8, 6], 0),
        (2, [0, 9, 4], 1),
        (3, [2, 8, 6], 1),
        (4, [9, 4, 1], 2),
        (5, [8, 0, 5], 2),
        (6, [1, 9, 4], 2),
        (7, [6, 2, 3], 7),
        (8, [0, 4, 5], 7),
        (9, [7, 6, 9], 4),
        (10, [3, 0, 5], 4),
        (11, [7, 2, 8], 5),
        (12, [9, 1, 3], 5),
        (13, [8, 7, 2], 5),
        (14, [6, 3, 0], 1),
    ];
    PLAN.iter()
        .fold(
            AssignmentBuilder::new(roster),
            |builder, &(day, staff, standby)| {
                staff
                    .iter()
                    .enumerate()
                    .fold(builder, |acc, (service, &member)| {
                        acc.shift(service, member, day)
                    })
                    .standby(0, standby, day)
            },
        )
        .build()
}
