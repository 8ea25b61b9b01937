//! The roster model: configuration, grids and the posted rule set.

use log::debug;

use crate::calendar::{Calendar, Weekday};
use crate::config::{RosterConfig, RosterConfigError};
use crate::constraints;
use crate::grid::{AssignmentGrid, GridShape};
use crate::model::{ConstraintBatch, Domain, Model, RuleKind, VarAllocator, VarId};
use crate::objective;

/// Smallest upper bound given to the objective variable.
pub const OBJECTIVE_CEILING: i64 = 999;

/// Read-only view of everything constraint procedures consume.
///
/// Holds the validated configuration, its calendar and the two assignment
/// grids: `X[service][staff][day]` for shifts and `Y[duty][staff][day]` for
/// standby duty.
#[derive(Debug, Clone)]
pub struct RosterGrids {
    config: RosterConfig,
    calendar: Calendar,
    balanced_services: Vec<usize>,
    shifts: AssignmentGrid,
    standby: AssignmentGrid,
    objective: VarId,
}

impl RosterGrids {
    /// Validated configuration.
    #[must_use]
    pub const fn config(&self) -> &RosterConfig {
        &self.config
    }

    /// Calendar derived from the configuration.
    #[must_use]
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Shift grid `X[service][staff][day]`.
    #[must_use]
    pub const fn shifts(&self) -> &AssignmentGrid {
        &self.shifts
    }

    /// Standby grid `Y[duty][staff][day]`.
    #[must_use]
    pub const fn standby(&self) -> &AssignmentGrid {
        &self.standby
    }

    /// Variable counting violated soft preferences.
    #[must_use]
    pub const fn objective(&self) -> VarId {
        self.objective
    }

    /// Indices of services balanced on their own.
    #[must_use]
    pub fn balanced_services(&self) -> &[usize] {
        &self.balanced_services
    }

    /// Number of services.
    #[must_use]
    pub const fn service_count(&self) -> usize {
        self.config.service_count()
    }

    /// Number of standby duties.
    #[must_use]
    pub const fn duty_count(&self) -> usize {
        self.config.duty_count()
    }

    /// Number of staff members.
    #[must_use]
    pub const fn staff_count(&self) -> usize {
        self.config.staff_count()
    }

    /// Length of the horizon.
    #[must_use]
    pub const fn day_count(&self) -> usize {
        self.config.day_count
    }

    /// Average shifts per staff member: `(days * services) / staff`.
    #[must_use]
    pub fn theoretical_shift_count(&self) -> i64 {
        per_staff(self.day_count() * self.service_count(), self.staff_count())
    }

    /// Average shifts on one service per staff member: `days / staff`.
    #[must_use]
    pub fn theoretical_service_count(&self) -> i64 {
        per_staff(self.day_count(), self.staff_count())
    }

    /// Average shifts on one weekday per staff member:
    /// `(days * services / 7) / staff`.
    #[must_use]
    pub fn theoretical_weekday_count(&self) -> i64 {
        let weekly = (self.day_count() * self.service_count())
            .checked_div(crate::calendar::DAYS_PER_WEEK)
            .unwrap_or(0);
        per_staff(weekly, self.staff_count())
    }

    /// Average standby days per staff member: `days / staff`.
    ///
    /// The same value bounds the posted standby balance and the verified
    /// standby totals.
    #[must_use]
    pub fn theoretical_standby_count(&self) -> i64 {
        per_staff(self.day_count(), self.staff_count())
    }

    /// Allowed deviation from the shift averages.
    #[must_use]
    pub fn shift_slack(&self) -> i64 {
        i64::from(self.config.shift_slack)
    }

    /// Allowed deviation from the standby average.
    #[must_use]
    pub fn standby_slack(&self) -> i64 {
        i64::from(self.config.standby_slack)
    }

    /// Inclusive bounds on a staff member's total shifts.
    #[must_use]
    pub fn shift_bounds(&self) -> (i64, i64) {
        bounds(self.theoretical_shift_count(), self.shift_slack())
    }

    /// Inclusive bounds on a staff member's shifts on one balanced service.
    #[must_use]
    pub fn service_bounds(&self) -> (i64, i64) {
        bounds(self.theoretical_service_count(), self.shift_slack())
    }

    /// Inclusive bounds on a staff member's shifts on one balanced weekday.
    #[must_use]
    pub fn weekday_bounds(&self) -> (i64, i64) {
        bounds(self.theoretical_weekday_count(), self.shift_slack())
    }

    /// Inclusive bounds on a staff member's standby days.
    #[must_use]
    pub fn standby_bounds(&self) -> (i64, i64) {
        bounds(self.theoretical_standby_count(), self.standby_slack())
    }

    /// Days of the horizon falling on `weekday`.
    pub fn days_on(&self, weekday: Weekday) -> impl Iterator<Item = usize> + '_ {
        self.calendar.days_on(weekday, self.day_count())
    }
}

fn per_staff(total: usize, staff: usize) -> i64 {
    let share = total.checked_div(staff).unwrap_or(0);
    i64::try_from(share).unwrap_or(i64::MAX)
}

const fn bounds(theoretical: i64, slack: i64) -> (i64, i64) {
    (theoretical.saturating_sub(slack), theoretical.saturating_add(slack))
}

type RuleProcedure = fn(&RosterGrids, &mut ConstraintBatch);

/// Rule procedures in posting order.
const RULES: [(RuleKind, RuleProcedure); 16] = [
    (RuleKind::SingleService, constraints::post_single_service),
    (RuleKind::AlwaysCovered, constraints::post_always_covered),
    (RuleKind::ShiftBalance, constraints::post_shift_balance),
    (RuleKind::RestNextDay, constraints::post_rest_next_day),
    (
        RuleKind::RotationContinuity,
        constraints::post_rotation_continuity,
    ),
    (
        RuleKind::HardUnavailability,
        constraints::post_hard_unavailability,
    ),
    (RuleKind::Capability, constraints::post_capability),
    (RuleKind::Incompatibility, constraints::post_incompatibility),
    (RuleKind::StandbyGrouping, constraints::post_standby_grouping),
    (
        RuleKind::AlwaysOneStandby,
        constraints::post_always_one_standby,
    ),
    (
        RuleKind::ShiftStandbyExclusivity,
        constraints::post_shift_standby_exclusivity,
    ),
    (RuleKind::ServiceBalance, constraints::post_service_balance),
    (
        RuleKind::AlternatingPattern,
        constraints::post_alternating_pattern,
    ),
    (RuleKind::WeekdayBalance, constraints::post_weekday_balance),
    (RuleKind::StandbyBalance, constraints::post_standby_balance),
    (RuleKind::Objective, objective::post_objective),
];

/// Roster grids plus the constraint model posted against them.
///
/// # Examples
///
/// ```
/// use rota_core::{RosterConfig, RosterModel, RuleKind};
///
/// # fn main() -> Result<(), rota_core::RosterConfigError> {
/// let config = RosterConfig::permissive(&["MAT", "SAMU", "BLOC"], &["AST"], 10, 15)
///     .with_slacks(1, 2);
/// let roster = RosterModel::build(config)?;
/// assert_eq!(roster.grids().theoretical_shift_count(), 4);
/// assert_eq!(roster.model().count_for(RuleKind::AlwaysCovered), 45);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RosterModel {
    grids: RosterGrids,
    model: Model,
    posted: bool,
}

impl RosterModel {
    /// Validate `config` and allocate the grids without posting any rule.
    ///
    /// # Errors
    ///
    /// Returns [`RosterConfigError`] when the configuration is inconsistent.
    pub fn new(config: RosterConfig) -> Result<Self, RosterConfigError> {
        config.validate()?;
        let balanced_services = config.balanced_service_indices()?;
        let mut model = Model::default();
        let shifts = AssignmentGrid::allocate(
            &mut model,
            GridShape {
                slots: config.service_count(),
                staff: config.staff_count(),
                days: config.day_count,
            },
            "x",
        );
        let standby = AssignmentGrid::allocate(
            &mut model,
            GridShape {
                slots: config.duty_count(),
                staff: config.staff_count(),
                days: config.day_count,
            },
            "y",
        );
        let violation_cells = config
            .soft_unavailable_cells()
            .saturating_mul(config.service_count());
        let ceiling = i64::try_from(violation_cells)
            .unwrap_or(i64::MAX)
            .max(OBJECTIVE_CEILING);
        let objective = model.new_var("objective".to_owned(), Domain::new(0, ceiling));
        let calendar = Calendar::starting_on(config.first_weekday);
        Ok(Self {
            grids: RosterGrids {
                config,
                calendar,
                balanced_services,
                shifts,
                standby,
                objective,
            },
            model,
            posted: false,
        })
    }

    /// Validate `config`, allocate the grids and post every rule.
    ///
    /// # Errors
    ///
    /// Returns [`RosterConfigError`] when the configuration is inconsistent.
    pub fn build(config: RosterConfig) -> Result<Self, RosterConfigError> {
        let mut roster = Self::new(config)?;
        roster.post_rules();
        Ok(roster)
    }

    /// Post every rule and the objective link. Later calls do nothing.
    pub fn post_rules(&mut self) {
        if self.posted {
            return;
        }
        for (rule, procedure) in RULES {
            let mut batch = ConstraintBatch::default();
            procedure(&self.grids, &mut batch);
            debug!("posted {} {rule} constraints", batch.len());
            self.model.extend(batch);
        }
        self.posted = true;
    }

    /// Grids and tables.
    #[must_use]
    pub const fn grids(&self) -> &RosterGrids {
        &self.grids
    }

    /// Posted constraint model.
    #[must_use]
    pub const fn model(&self) -> &Model {
        &self.model
    }

    /// Configuration the model was built from.
    #[must_use]
    pub const fn config(&self) -> &RosterConfig {
        self.grids.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn base() -> RosterConfig {
        RosterConfig::permissive(&["MAT", "SAMU", "BLOC"], &["AST"], 10, 15).with_slacks(1, 2)
    }

    #[rstest]
    fn allocation_declares_both_grids_and_the_objective() {
        let roster = RosterModel::new(base()).expect("valid config");
        assert_eq!(roster.model().var_count(), 3 * 10 * 15 + 10 * 15 + 1);
        assert_eq!(roster.model().constraint_count(), 0);
        assert_eq!(
            roster.model().domain(roster.grids().objective()),
            Some(Domain::new(0, OBJECTIVE_CEILING))
        );
    }

    #[rstest]
    fn theoretical_counts_use_integer_division() {
        let roster = RosterModel::new(base()).expect("valid config");
        let grids = roster.grids();
        assert_eq!(grids.theoretical_shift_count(), 4);
        assert_eq!(grids.theoretical_service_count(), 1);
        assert_eq!(grids.theoretical_weekday_count(), 0);
        assert_eq!(grids.theoretical_standby_count(), 1);
        assert_eq!(grids.shift_bounds(), (3, 5));
        assert_eq!(grids.standby_bounds(), (-1, 3));
    }

    #[rstest]
    fn invalid_configuration_fails_before_allocation() {
        let mut config = base();
        config.accepts_rotation.pop();
        assert!(matches!(
            RosterModel::new(config),
            Err(RosterConfigError::DimensionMismatch { .. })
        ));
    }

    #[rstest]
    fn posting_twice_keeps_a_single_rule_set() {
        let mut roster = RosterModel::build(base()).expect("valid config");
        let posted = roster.model().constraint_count();
        roster.post_rules();
        assert_eq!(roster.model().constraint_count(), posted);
    }

    #[rstest]
    fn large_soft_tables_widen_the_objective() {
        let mut config = RosterConfig::permissive(&["A", "B", "C"], &["D"], 30, 40);
        config.soft_unavailable = vec![vec![true; 40]; 30];
        let roster = RosterModel::new(config).expect("valid config");
        assert_eq!(
            roster.model().domain(roster.grids().objective()),
            Some(Domain::new(0, 3600))
        );
    }
}
