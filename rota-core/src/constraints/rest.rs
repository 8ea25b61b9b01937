//! Rest after a shift, the Friday/Sunday rotation and the alternating
//! pattern.

use crate::calendar::Weekday;
use crate::model::{Comparison, ConstraintSink, LinearConstraint, LinearExpr, Literal, RuleKind};
use crate::roster::RosterGrids;

/// A shift on day `t` leaves day `t + 1` free of shifts.
pub fn post_rest_next_day<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let shifts = grids.shifts();
    for (index, var) in shifts.iter() {
        let next = index.day + 1;
        if next >= grids.day_count() {
            continue;
        }
        sink.post_if_then(
            RuleKind::RestNextDay,
            Literal::is_set(var),
            LinearConstraint::sum_eq(shifts.slots_of(index.staff, next), 0),
        );
    }
}

/// For staff accepting the rotation, a Friday shift implies a shift on the
/// following Sunday and a Sunday shift implies one on the preceding Friday.
///
/// Days whose partner falls outside the horizon post nothing.
pub fn post_rotation_continuity<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let shifts = grids.shifts();
    let calendar = grids.calendar();
    let config = grids.config();
    for (index, var) in shifts.iter() {
        if !config.accepts_rotation(index.staff) {
            continue;
        }
        let partner_day = match calendar.weekday(index.day) {
            Weekday::Friday => Some(index.day + 2).filter(|&day| day < grids.day_count()),
            Weekday::Sunday => index.day.checked_sub(2),
            _ => None,
        };
        let Some(partner) = partner_day else {
            continue;
        };
        sink.post_if_then(
            RuleKind::RotationContinuity,
            Literal::is_set(var),
            LinearConstraint::sum_eq(shifts.slots_of(index.staff, partner), 1),
        );
    }
}

/// Nobody works on days `t`, `t + 2` and `t + 4` together.
///
/// Only posted when the roster enables the alternating-pattern rule.
pub fn post_alternating_pattern<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    if !grids.config().rules.alternating_pattern {
        return;
    }
    let shifts = grids.shifts();
    for staff in 0..grids.staff_count() {
        for day in (0..grids.day_count()).filter(|start| start + 4 < grids.day_count()) {
            let expr = [day, day + 2, day + 4]
                .into_iter()
                .fold(LinearExpr::default(), |sum, pattern_day| {
                    sum.plus_all(shifts.slots_of(staff, pattern_day))
                });
            sink.post_linear(
                RuleKind::AlternatingPattern,
                LinearConstraint::new(expr, Comparison::Le, 2),
            );
        }
    }
}
