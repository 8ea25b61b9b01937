//! Standby blocks and the split between shifts and standby duty.

use crate::grid::GridIndex;
use crate::model::{ConstraintSink, LinearConstraint, Literal, RuleKind};
use crate::roster::RosterGrids;

/// Standby duty is held for whole blocks: `{Mon, Tue}`, `{Wed, Thu}` and
/// `{Fri, Sat, Sun}`.
///
/// The first day of each block is tied to every later day of the block.
/// Blocks cut by either end of the horizon are tied over the days that
/// remain.
pub fn post_standby_grouping<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let standby = grids.standby();
    let blocks: Vec<_> = grids
        .calendar()
        .standby_blocks(grids.day_count())
        .collect();
    for duty in 0..grids.duty_count() {
        for staff in 0..grids.staff_count() {
            for block in &blocks {
                let Some(leader) = standby.get(GridIndex::new(duty, staff, block.start)) else {
                    continue;
                };
                for day in block.start + 1..block.end {
                    if let Some(member) = standby.get(GridIndex::new(duty, staff, day)) {
                        sink.post_equal(RuleKind::StandbyGrouping, leader, member);
                    }
                }
            }
        }
    }
}

/// Nobody on shift holds a standby duty the same day.
pub fn post_shift_standby_exclusivity<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let standby = grids.standby();
    for (index, var) in grids.shifts().iter() {
        sink.post_if_then(
            RuleKind::ShiftStandbyExclusivity,
            Literal::is_set(var),
            LinearConstraint::sum_eq(standby.slots_of(index.staff, index.day), 0),
        );
    }
}
