//! Per-staff summaries of a solved roster.
//!
//! A [`RosterReport`] carries everything a renderer needs: which services
//! and duties each person holds every day, per-service and per-duty totals,
//! and the weekday of each day so output can be grouped by week.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::calendar::Weekday;
use crate::roster::RosterGrids;
use crate::solution::SolvedRoster;

/// One staff member's line in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StaffReport {
    /// Staff member's name.
    pub name: String,
    /// Per day, whether each service is covered: `shifts[day][service]`.
    pub shifts: Vec<Vec<bool>>,
    /// Per day, whether each duty is held: `standby[day][duty]`.
    pub standby: Vec<Vec<bool>>,
    /// Shifts per service.
    pub service_totals: Vec<usize>,
    /// Shifts over every service.
    pub shift_total: usize,
    /// Standby days per duty.
    pub duty_totals: Vec<usize>,
    /// Standby days over every duty.
    pub standby_total: usize,
    /// Days worked that the staff member asked to have off.
    pub soft_days_worked: usize,
}

/// Tabular view of a solved roster.
///
/// # Examples
///
/// ```
/// use rota_core::{RosterConfig, RosterModel, RosterReport, SolvedRoster};
///
/// # fn main() -> Result<(), rota_core::RosterConfigError> {
/// let roster = RosterModel::build(RosterConfig::permissive(&["MAT"], &["AST"], 2, 2))?;
/// // x[MAT] for staff 0 on days 0-1, staff 1 on days 0-1, then y[AST], then objective.
/// let values = [1, 0, 0, 1, 0, 0, 1, 0, 0];
/// let solved = SolvedRoster::from_values(roster.grids(), &values).expect("complete");
/// let report = RosterReport::new(roster.grids(), &solved);
/// assert_eq!(report.staff[0].shift_total, 1);
/// assert_eq!(report.staff[1].standby_total, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RosterReport {
    /// Service names in column order.
    pub services: Vec<String>,
    /// Duty names in column order.
    pub duties: Vec<String>,
    /// Weekday of each day in the horizon.
    pub weekdays: Vec<Weekday>,
    /// Number of soft preferences the roster overrides.
    pub objective: i64,
    /// One entry per staff member, in input order.
    pub staff: Vec<StaffReport>,
}

impl RosterReport {
    /// Summarise `solved` using the names and calendar of `grids`.
    #[must_use]
    pub fn new(grids: &RosterGrids, solved: &SolvedRoster) -> Self {
        let config = grids.config();
        let days = grids.day_count();
        let staff = config
            .staff_names
            .iter()
            .enumerate()
            .map(|(member, name)| StaffReport {
                name: name.clone(),
                shifts: (0..days)
                    .map(|day| {
                        (0..grids.service_count())
                            .map(|service| solved.is_on_shift(service, member, day))
                            .collect()
                    })
                    .collect(),
                standby: (0..days)
                    .map(|day| {
                        (0..grids.duty_count())
                            .map(|duty| solved.is_on_standby(duty, member, day))
                            .collect()
                    })
                    .collect(),
                service_totals: (0..grids.service_count())
                    .map(|service| solved.service_total(service, member))
                    .collect(),
                shift_total: solved.shift_total(member),
                duty_totals: (0..grids.duty_count())
                    .map(|duty| solved.duty_total(duty, member))
                    .collect(),
                standby_total: solved.standby_total(member),
                soft_days_worked: (0..days)
                    .filter(|&day| {
                        config.is_soft_unavailable(member, day) && solved.works(member, day)
                    })
                    .count(),
            })
            .collect();
        Self {
            services: config.service_names.clone(),
            duties: config.duty_names.clone(),
            weekdays: (0..days).map(|day| grids.calendar().weekday(day)).collect(),
            objective: solved.objective(),
            staff,
        }
    }

    /// Number of days in the horizon.
    #[must_use]
    pub const fn day_count(&self) -> usize {
        self.weekdays.len()
    }

    /// Whether `day` opens a new week in the output.
    #[must_use]
    pub fn starts_week(&self, day: usize) -> bool {
        day > 0 && self.weekdays.get(day) == Some(&Weekday::Monday)
    }
}
