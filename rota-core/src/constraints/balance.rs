//! Fairness bounds: every count stays within its theoretical average plus or
//! minus the configured slack.

use crate::calendar::Weekday;
use crate::model::{Comparison, ConstraintSink, LinearConstraint, LinearExpr, RuleKind};
use crate::roster::RosterGrids;

/// Weekdays whose shifts are balanced on their own.
pub const BALANCED_WEEKDAYS: [Weekday; 3] = [Weekday::Thursday, Weekday::Saturday, Weekday::Sunday];

fn post_bounded<S: ConstraintSink>(
    sink: &mut S,
    rule: RuleKind,
    expr: LinearExpr,
    (min, max): (i64, i64),
) {
    sink.post_linear(rule, LinearConstraint::new(expr.clone(), Comparison::Ge, min));
    sink.post_linear(rule, LinearConstraint::new(expr, Comparison::Le, max));
}

/// Total shifts per staff member.
pub fn post_shift_balance<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let bounds = grids.shift_bounds();
    for staff in 0..grids.staff_count() {
        let expr = LinearExpr::sum(grids.shifts().cells_of_staff(staff));
        post_bounded(sink, RuleKind::ShiftBalance, expr, bounds);
    }
}

/// Shifts per staff member on each balanced service.
pub fn post_service_balance<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let bounds = grids.service_bounds();
    for &service in grids.balanced_services() {
        for staff in 0..grids.staff_count() {
            let expr = LinearExpr::sum(grids.shifts().days_of(service, staff));
            post_bounded(sink, RuleKind::ServiceBalance, expr, bounds);
        }
    }
}

/// Shifts per staff member on Thursdays, Saturdays and Sundays, each
/// weekday counted separately over every week of the horizon.
pub fn post_weekday_balance<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let bounds = grids.weekday_bounds();
    let shifts = grids.shifts();
    for weekday in BALANCED_WEEKDAYS {
        let days: Vec<usize> = grids.days_on(weekday).collect();
        if days.is_empty() {
            continue;
        }
        for staff in 0..grids.staff_count() {
            let expr = days.iter().fold(LinearExpr::default(), |sum, &day| {
                sum.plus_all(shifts.slots_of(staff, day))
            });
            post_bounded(sink, RuleKind::WeekdayBalance, expr, bounds);
        }
    }
}

/// Standby days per staff member, over every duty.
pub fn post_standby_balance<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let bounds = grids.standby_bounds();
    for staff in 0..grids.staff_count() {
        let expr = LinearExpr::sum(grids.standby().cells_of_staff(staff));
        post_bounded(sink, RuleKind::StandbyBalance, expr, bounds);
    }
}
