//! Independent checks of a solved roster against its configuration.
//!
//! The checks read the configuration tables directly rather than the posted
//! constraints, so a roster returned by any backend can be audited without
//! trusting the model it was solved from.

use std::fmt;

use crate::calendar::Weekday;
use crate::constraints::BALANCED_WEEKDAYS;
use crate::roster::RosterGrids;
use crate::solution::SolvedRoster;

/// A rule broken by a solved roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A staff member covers more than one service on a day.
    DoubleBooked {
        /// Staff member.
        staff: usize,
        /// Day.
        day: usize,
    },
    /// A service is not covered by exactly one person.
    Uncovered {
        /// Service.
        service: usize,
        /// Day.
        day: usize,
        /// People covering it.
        covered_by: usize,
    },
    /// A standby duty is not held by exactly one person.
    StandbyUncovered {
        /// Duty.
        duty: usize,
        /// Day.
        day: usize,
        /// People holding it.
        held_by: usize,
    },
    /// Shifts on two consecutive days.
    RestViolated {
        /// Staff member.
        staff: usize,
        /// First of the two days.
        day: usize,
    },
    /// A Friday or Sunday shift without its weekend partner.
    RotationBroken {
        /// Staff member.
        staff: usize,
        /// Day of the unpaired shift.
        day: usize,
    },
    /// A shift on a day the staff member cannot work.
    HardUnavailable {
        /// Staff member.
        staff: usize,
        /// Day.
        day: usize,
    },
    /// A shift on a service the staff member cannot cover that day.
    NotCapable {
        /// Service.
        service: usize,
        /// Staff member.
        staff: usize,
        /// Day.
        day: usize,
    },
    /// Two incompatible staff members working the same day.
    IncompatiblePair {
        /// Lower staff index.
        first: usize,
        /// Higher staff index.
        second: usize,
        /// Day.
        day: usize,
    },
    /// A shift and a standby duty on the same day.
    ShiftDuringStandby {
        /// Staff member.
        staff: usize,
        /// Day.
        day: usize,
    },
    /// A standby block held only in part.
    StandbyBlockSplit {
        /// Duty.
        duty: usize,
        /// Staff member.
        staff: usize,
        /// First day of the block.
        block_start: usize,
    },
    /// Shifts worked on days `t`, `t + 2` and `t + 4`.
    AlternatingPattern {
        /// Staff member.
        staff: usize,
        /// Day `t`.
        day: usize,
    },
    /// A balanced total outside its allowed range.
    OutOfBalance {
        /// What was counted.
        tally: Tally,
        /// Staff member.
        staff: usize,
        /// Count found.
        total: i64,
        /// Smallest allowed count.
        min: i64,
        /// Largest allowed count.
        max: i64,
    },
    /// The objective does not count the overridden soft preferences.
    ObjectiveMismatch {
        /// Shifts worked on soft-unavailable days.
        expected: i64,
        /// Objective carried by the roster.
        found: i64,
    },
}

/// Balanced quantities checked by [`verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    /// Shifts over every service.
    Shifts,
    /// Shifts on one balanced service.
    Service(usize),
    /// Shifts on one balanced weekday.
    Weekday(Weekday),
    /// Standby days over every duty.
    Standby,
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shifts => f.write_str("shift total"),
            Self::Service(service) => write!(f, "service {service} total"),
            Self::Weekday(weekday) => write!(f, "{weekday:?} total"),
            Self::Standby => f.write_str("standby total"),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoubleBooked { staff, day } => {
                write!(f, "staff {staff} covers several services on day {day}")
            }
            Self::Uncovered {
                service,
                day,
                covered_by,
            } => write!(
                f,
                "service {service} on day {day} is covered by {covered_by} people"
            ),
            Self::StandbyUncovered { duty, day, held_by } => {
                write!(f, "duty {duty} on day {day} is held by {held_by} people")
            }
            Self::RestViolated { staff, day } => {
                write!(f, "staff {staff} works days {day} and {}", day + 1)
            }
            Self::RotationBroken { staff, day } => {
                write!(f, "staff {staff} works day {day} without its weekend partner")
            }
            Self::HardUnavailable { staff, day } => {
                write!(f, "staff {staff} works unavailable day {day}")
            }
            Self::NotCapable {
                service,
                staff,
                day,
            } => write!(f, "staff {staff} cannot cover service {service} on day {day}"),
            Self::IncompatiblePair { first, second, day } => {
                write!(f, "staff {first} and {second} both work day {day}")
            }
            Self::ShiftDuringStandby { staff, day } => {
                write!(f, "staff {staff} works and holds standby on day {day}")
            }
            Self::StandbyBlockSplit {
                duty,
                staff,
                block_start,
            } => write!(
                f,
                "staff {staff} holds part of the duty {duty} block starting day {block_start}"
            ),
            Self::AlternatingPattern { staff, day } => write!(
                f,
                "staff {staff} works days {day}, {} and {}",
                day + 2,
                day + 4
            ),
            Self::OutOfBalance {
                tally,
                staff,
                total,
                min,
                max,
            } => write!(f, "staff {staff} {tally} is {total}, outside {min}..={max}"),
            Self::ObjectiveMismatch { expected, found } => {
                write!(f, "objective is {found} but {expected} preferences are overridden")
            }
        }
    }
}

/// Every rule `solved` breaks, grouped by rule.
///
/// An empty result means the roster honours every hard rule of `grids`.
#[must_use]
pub fn verify(grids: &RosterGrids, solved: &SolvedRoster) -> Vec<Violation> {
    let mut found = Vec::new();
    check_coverage(grids, solved, &mut found);
    check_staff_days(grids, solved, &mut found);
    check_rotation(grids, solved, &mut found);
    check_incompatibility(grids, solved, &mut found);
    check_standby_blocks(grids, solved, &mut found);
    check_alternating_pattern(grids, solved, &mut found);
    check_balance(grids, solved, &mut found);
    check_objective(grids, solved, &mut found);
    found
}

fn check_coverage(grids: &RosterGrids, solved: &SolvedRoster, found: &mut Vec<Violation>) {
    let staff = grids.staff_count();
    for day in 0..grids.day_count() {
        for service in 0..grids.service_count() {
            let covered_by = (0..staff)
                .filter(|&member| solved.is_on_shift(service, member, day))
                .count();
            if covered_by != 1 {
                found.push(Violation::Uncovered {
                    service,
                    day,
                    covered_by,
                });
            }
        }
        for duty in 0..grids.duty_count() {
            let held_by = (0..staff)
                .filter(|&member| solved.is_on_standby(duty, member, day))
                .count();
            if held_by != 1 {
                found.push(Violation::StandbyUncovered { duty, day, held_by });
            }
        }
    }
}

fn check_staff_days(grids: &RosterGrids, solved: &SolvedRoster, found: &mut Vec<Violation>) {
    let config = grids.config();
    for staff in 0..grids.staff_count() {
        for day in 0..grids.day_count() {
            let services: Vec<usize> = solved.services_of(staff, day).collect();
            if services.len() > 1 {
                found.push(Violation::DoubleBooked { staff, day });
            }
            if services.is_empty() {
                continue;
            }
            if solved.works(staff, day + 1) {
                found.push(Violation::RestViolated { staff, day });
            }
            if config.is_hard_unavailable(staff, day) {
                found.push(Violation::HardUnavailable { staff, day });
            }
            found.extend(
                services
                    .iter()
                    .filter(|&&service| !config.is_capable(service, staff, day))
                    .map(|&service| Violation::NotCapable {
                        service,
                        staff,
                        day,
                    }),
            );
            if solved.duties_of(staff, day).next().is_some() {
                found.push(Violation::ShiftDuringStandby { staff, day });
            }
        }
    }
}

fn check_rotation(grids: &RosterGrids, solved: &SolvedRoster, found: &mut Vec<Violation>) {
    let calendar = grids.calendar();
    let days = grids.day_count();
    let config = grids.config();
    for staff in (0..grids.staff_count()).filter(|&member| config.accepts_rotation(member)) {
        for day in (0..days).filter(|&worked| solved.works(staff, worked)) {
            let partner = match calendar.weekday(day) {
                Weekday::Friday => Some(day + 2).filter(|&sunday| sunday < days),
                Weekday::Sunday => day.checked_sub(2),
                _ => None,
            };
            if partner.is_some_and(|other| !solved.works(staff, other)) {
                found.push(Violation::RotationBroken { staff, day });
            }
        }
    }
}

fn check_incompatibility(grids: &RosterGrids, solved: &SolvedRoster, found: &mut Vec<Violation>) {
    let config = grids.config();
    let staff = grids.staff_count();
    for first in 0..staff {
        for second in first + 1..staff {
            if !config.is_incompatible_pair(first, second) {
                continue;
            }
            found.extend(
                (0..grids.day_count())
                    .filter(|&day| solved.works(first, day) && solved.works(second, day))
                    .map(|day| Violation::IncompatiblePair { first, second, day }),
            );
        }
    }
}

fn check_standby_blocks(grids: &RosterGrids, solved: &SolvedRoster, found: &mut Vec<Violation>) {
    let blocks: Vec<_> = grids
        .calendar()
        .standby_blocks(grids.day_count())
        .collect();
    for duty in 0..grids.duty_count() {
        for staff in 0..grids.staff_count() {
            for block in &blocks {
                let held = block
                    .clone()
                    .filter(|&day| solved.is_on_standby(duty, staff, day))
                    .count();
                if held != 0 && held != block.len() {
                    found.push(Violation::StandbyBlockSplit {
                        duty,
                        staff,
                        block_start: block.start,
                    });
                }
            }
        }
    }
}

fn check_alternating_pattern(
    grids: &RosterGrids,
    solved: &SolvedRoster,
    found: &mut Vec<Violation>,
) {
    if !grids.config().rules.alternating_pattern {
        return;
    }
    for staff in 0..grids.staff_count() {
        found.extend(
            (0..grids.day_count())
                .filter(|&day| {
                    day + 4 < grids.day_count()
                        && [day, day + 2, day + 4]
                            .into_iter()
                            .all(|pattern_day| solved.works(staff, pattern_day))
                })
                .map(|day| Violation::AlternatingPattern { staff, day }),
        );
    }
}

fn check_balance(grids: &RosterGrids, solved: &SolvedRoster, found: &mut Vec<Violation>) {
    let count = |total: usize| i64::try_from(total).unwrap_or(i64::MAX);
    for staff in 0..grids.staff_count() {
        let mut tallies = vec![
            (
                Tally::Shifts,
                count(solved.shift_total(staff)),
                grids.shift_bounds(),
            ),
            (
                Tally::Standby,
                count(solved.standby_total(staff)),
                grids.standby_bounds(),
            ),
        ];
        tallies.extend(grids.balanced_services().iter().map(|&service| {
            (
                Tally::Service(service),
                count(solved.service_total(service, staff)),
                grids.service_bounds(),
            )
        }));
        tallies.extend(BALANCED_WEEKDAYS.iter().map(|&weekday| {
            let worked = grids
                .days_on(weekday)
                .filter(|&day| solved.works(staff, day))
                .count();
            (Tally::Weekday(weekday), count(worked), grids.weekday_bounds())
        }));
        found.extend(
            tallies
                .into_iter()
                .filter(|&(_, total, (min, max))| total < min || total > max)
                .map(|(tally, total, (min, max))| Violation::OutOfBalance {
                    tally,
                    staff,
                    total,
                    min,
                    max,
                }),
        );
    }
}

fn check_objective(grids: &RosterGrids, solved: &SolvedRoster, found: &mut Vec<Violation>) {
    let overridden: usize = soft_preferences(grids, solved)
        .iter()
        .map(|summary| summary.overridden)
        .sum();
    let expected = i64::try_from(overridden).unwrap_or(i64::MAX);
    if expected != solved.objective() {
        found.push(Violation::ObjectiveMismatch {
            expected,
            found: solved.objective(),
        });
    }
}

/// How one staff member's day-off requests fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftPreferenceSummary {
    /// Staff member.
    pub staff: usize,
    /// Days the staff member asked to have off.
    pub requested: usize,
    /// Requested days the roster leaves free.
    pub honoured: usize,
    /// Shifts worked on requested days.
    pub overridden: usize,
}

impl SoftPreferenceSummary {
    /// Whether at least half of the requests are honoured.
    #[must_use]
    pub const fn honours_half(&self) -> bool {
        self.honoured * 2 >= self.requested
    }
}

/// Soft preference outcome for every staff member.
#[must_use]
pub fn soft_preferences(grids: &RosterGrids, solved: &SolvedRoster) -> Vec<SoftPreferenceSummary> {
    let config = grids.config();
    (0..grids.staff_count())
        .map(|staff| {
            let requested: Vec<usize> = (0..grids.day_count())
                .filter(|&day| config.is_soft_unavailable(staff, day))
                .collect();
            let overridden = requested
                .iter()
                .map(|&day| solved.services_of(staff, day).count())
                .sum();
            let honoured = requested
                .iter()
                .filter(|&&day| !solved.works(staff, day))
                .count();
            SoftPreferenceSummary {
                staff,
                requested: requested.len(),
                honoured,
                overridden,
            }
        })
        .collect()
}
