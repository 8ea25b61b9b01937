//! Daily coverage: one service per person, one person per service and duty.

use crate::model::{ConstraintSink, LinearConstraint, RuleKind};
use crate::roster::RosterGrids;

/// Nobody holds more than one service on the same day.
pub fn post_single_service<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let shifts = grids.shifts();
    for staff in 0..grids.staff_count() {
        for day in 0..grids.day_count() {
            sink.post_linear(
                RuleKind::SingleService,
                LinearConstraint::sum_le(shifts.slots_of(staff, day), 1),
            );
        }
    }
}

/// Every service is covered by exactly one person every day.
pub fn post_always_covered<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let shifts = grids.shifts();
    for service in 0..grids.service_count() {
        for day in 0..grids.day_count() {
            sink.post_linear(
                RuleKind::AlwaysCovered,
                LinearConstraint::sum_eq(shifts.staff_of(service, day), 1),
            );
        }
    }
}

/// Every standby duty is held by exactly one person every day.
pub fn post_always_one_standby<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let standby = grids.standby();
    for duty in 0..grids.duty_count() {
        for day in 0..grids.day_count() {
            sink.post_linear(
                RuleKind::AlwaysOneStandby,
                LinearConstraint::sum_eq(standby.staff_of(duty, day), 1),
            );
        }
    }
}
