//! Who may work when: hard unavailability, capability and incompatible pairs.

use crate::grid::GridIndex;
use crate::model::{ConstraintSink, LinearConstraint, Literal, RuleKind};
use crate::roster::RosterGrids;

/// Hard-unavailable staff hold no service on the flagged day.
pub fn post_hard_unavailability<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let config = grids.config();
    for (index, var) in grids.shifts().iter() {
        if config.is_hard_unavailable(index.staff, index.day) {
            sink.post_fixed(RuleKind::HardUnavailability, var, 0);
        }
    }
}

/// Staff never cover a service they are not capable of on that day.
pub fn post_capability<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let config = grids.config();
    for (index, var) in grids.shifts().iter() {
        if !config.is_capable(index.slot, index.staff, index.day) {
            sink.post_fixed(RuleKind::Capability, var, 0);
        }
    }
}

/// Incompatible staff never both work on the same day.
///
/// A pair is incompatible when either member refuses the other. Both
/// implications are posted for every service and day.
pub fn post_incompatibility<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let config = grids.config();
    let shifts = grids.shifts();
    let staff = grids.staff_count();
    let pairs = (0..staff)
        .flat_map(|first| (first + 1..staff).map(move |second| (first, second)))
        .filter(|&(first, second)| config.is_incompatible_pair(first, second));
    for (first, second) in pairs {
        for day in 0..grids.day_count() {
            for service in 0..grids.service_count() {
                for (worker, other) in [(first, second), (second, first)] {
                    let Some(var) = shifts.get(GridIndex::new(service, worker, day)) else {
                        continue;
                    };
                    sink.post_if_then(
                        RuleKind::Incompatibility,
                        Literal::is_set(var),
                        LinearConstraint::sum_eq(shifts.slots_of(other, day), 0),
                    );
                }
            }
        }
    }
}
