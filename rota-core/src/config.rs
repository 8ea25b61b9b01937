//! Roster configuration and its validation.
//!
//! A [`RosterConfig`] describes the people, services, standby duties and
//! calendar a roster is built for, together with the availability,
//! capability and compatibility tables that restrict who may work when.
//! Tables left empty are read as fully permissive, which keeps hand-written
//! roster files short.

use std::ops::Range;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::calendar::Weekday;

/// Rules that are off unless a roster opts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptionalRules {
    /// Forbid working days `t`, `t + 2` and `t + 4` together.
    pub alternating_pattern: bool,
}

/// Input tables and parameters for one roster.
///
/// Counts are the lengths of the name lists plus [`RosterConfig::day_count`].
/// Nested tables are indexed `[staff][day]`, `[staff][staff]` and
/// `[service][staff][day]`.
///
/// # Examples
///
/// ```
/// use rota_core::RosterConfig;
///
/// let config = RosterConfig::permissive(&["MAT", "SAMU"], &["AST"], 6, 14)
///     .with_incompatible_pair(0, 1)
///     .with_hard_unavailability(2, 0..3);
/// assert!(config.validate().is_ok());
/// assert!(!config.can_work_with(1, 0));
/// assert!(config.is_hard_unavailable(2, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RosterConfig {
    /// Names of the services needing one person per day.
    pub service_names: Vec<String>,
    /// Names of the standby duties needing one person per day.
    pub duty_names: Vec<String>,
    /// Names of the staff members being rostered.
    pub staff_names: Vec<String>,
    /// Length of the horizon in days.
    pub day_count: usize,
    /// Allowed deviation from the theoretical shift counts.
    #[cfg_attr(feature = "serde", serde(default))]
    pub shift_slack: u32,
    /// Allowed deviation from the theoretical standby count.
    #[cfg_attr(feature = "serde", serde(default))]
    pub standby_slack: u32,
    /// Weekday of day zero.
    #[cfg_attr(feature = "serde", serde(default))]
    pub first_weekday: Weekday,
    /// Services whose per-person count is balanced on its own.
    #[cfg_attr(feature = "serde", serde(default))]
    pub balanced_services: Vec<String>,
    /// Opt-in rules.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rules: OptionalRules,
    /// Per staff member, whether the Friday/Sunday rotation rule applies.
    #[cfg_attr(feature = "serde", serde(default))]
    pub accepts_rotation: Vec<bool>,
    /// Days on which a staff member must not work.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hard_unavailable: Vec<Vec<bool>>,
    /// Days a staff member would rather not work.
    #[cfg_attr(feature = "serde", serde(default))]
    pub soft_unavailable: Vec<Vec<bool>>,
    /// Whether two staff members may work on the same day.
    #[cfg_attr(feature = "serde", serde(default))]
    pub can_work_with: Vec<Vec<bool>>,
    /// Whether a staff member may cover a service on a given day.
    #[cfg_attr(feature = "serde", serde(default))]
    pub capability: Vec<Vec<Vec<bool>>>,
}

/// Errors returned by [`RosterConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterConfigError {
    /// A dimension of the roster is empty.
    #[error("roster must declare at least one {dimension}")]
    EmptyDimension {
        /// Name of the empty dimension.
        dimension: &'static str,
    },
    /// A table does not match the declared counts.
    #[error("{table} has {found} entries but {expected} were expected")]
    DimensionMismatch {
        /// Path of the offending table, e.g. `capability[1]`.
        table: String,
        /// Length implied by the declared counts.
        expected: usize,
        /// Length found in the configuration.
        found: usize,
    },
    /// A balanced service is not one of the declared services.
    #[error("balanced service {name:?} is not a declared service")]
    UnknownService {
        /// Name that failed to resolve.
        name: String,
    },
}

impl RosterConfig {
    /// Configuration in which everyone may work every service on every day.
    ///
    /// Staff are named `staff 0`, `staff 1` and so on. Every staff member
    /// accepts the rotation rule and slacks are zero.
    #[must_use]
    pub fn permissive(services: &[&str], duties: &[&str], staff: usize, days: usize) -> Self {
        Self {
            service_names: services.iter().map(|name| (*name).to_owned()).collect(),
            duty_names: duties.iter().map(|name| (*name).to_owned()).collect(),
            staff_names: (0..staff).map(|index| format!("staff {index}")).collect(),
            day_count: days,
            accepts_rotation: vec![true; staff],
            ..Self::default()
        }
    }

    /// Set both slacks.
    #[must_use]
    pub const fn with_slacks(mut self, shift_slack: u32, standby_slack: u32) -> Self {
        self.shift_slack = shift_slack;
        self.standby_slack = standby_slack;
        self
    }

    /// Balance `service` on its own as well as within the overall count.
    #[must_use]
    pub fn with_balanced_service(mut self, service: &str) -> Self {
        self.balanced_services.push(service.to_owned());
        self
    }

    /// Start day zero on `weekday`.
    #[must_use]
    pub const fn with_first_weekday(mut self, weekday: Weekday) -> Self {
        self.first_weekday = weekday;
        self
    }

    /// Enable or disable the alternating-pattern rule.
    #[must_use]
    pub const fn with_alternating_pattern(mut self, enabled: bool) -> Self {
        self.rules.alternating_pattern = enabled;
        self
    }

    /// Forbid `first` and `second` from working on the same day, both ways.
    #[must_use]
    pub fn with_incompatible_pair(mut self, first: usize, second: usize) -> Self {
        let staff = self.staff_count();
        if self.can_work_with.is_empty() {
            self.can_work_with = vec![vec![true; staff]; staff];
        }
        for (row, column) in [(first, second), (second, first)] {
            if let Some(cell) = self
                .can_work_with
                .get_mut(row)
                .and_then(|entries| entries.get_mut(column))
            {
                *cell = false;
            }
        }
        self
    }

    /// Mark `staff` as unable to work on `days`.
    #[must_use]
    pub fn with_hard_unavailability(mut self, staff: usize, days: Range<usize>) -> Self {
        let (staff_count, day_count) = (self.staff_count(), self.day_count);
        mark_days(
            &mut self.hard_unavailable,
            staff_count,
            day_count,
            staff,
            days,
        );
        self
    }

    /// Mark `staff` as preferring not to work on `days`.
    #[must_use]
    pub fn with_soft_unavailability(mut self, staff: usize, days: Range<usize>) -> Self {
        let (staff_count, day_count) = (self.staff_count(), self.day_count);
        mark_days(
            &mut self.soft_unavailable,
            staff_count,
            day_count,
            staff,
            days,
        );
        self
    }

    /// Record whether `staff` may cover `service` on `day`.
    #[must_use]
    pub fn with_capability(mut self, service: usize, staff: usize, day: usize, able: bool) -> Self {
        if self.capability.is_empty() {
            self.capability =
                vec![vec![vec![true; self.day_count]; self.staff_count()]; self.service_count()];
        }
        if let Some(cell) = self
            .capability
            .get_mut(service)
            .and_then(|rows| rows.get_mut(staff))
            .and_then(|days| days.get_mut(day))
        {
            *cell = able;
        }
        self
    }

    /// Number of services.
    #[must_use]
    pub const fn service_count(&self) -> usize {
        self.service_names.len()
    }

    /// Number of standby duties.
    #[must_use]
    pub const fn duty_count(&self) -> usize {
        self.duty_names.len()
    }

    /// Number of staff members.
    #[must_use]
    pub const fn staff_count(&self) -> usize {
        self.staff_names.len()
    }

    /// Whether the rotation rule applies to `staff`.
    #[must_use]
    pub fn accepts_rotation(&self, staff: usize) -> bool {
        self.accepts_rotation.get(staff).copied().unwrap_or(true)
    }

    /// Whether `staff` must not work on `day`.
    #[must_use]
    pub fn is_hard_unavailable(&self, staff: usize, day: usize) -> bool {
        flag(&self.hard_unavailable, staff, day).unwrap_or(false)
    }

    /// Whether `staff` would rather not work on `day`.
    #[must_use]
    pub fn is_soft_unavailable(&self, staff: usize, day: usize) -> bool {
        flag(&self.soft_unavailable, staff, day).unwrap_or(false)
    }

    /// Whether `first` may work on the same day as `second`.
    ///
    /// The table need not be symmetric; callers wanting the pair relation
    /// should use [`RosterConfig::is_incompatible_pair`].
    #[must_use]
    pub fn can_work_with(&self, first: usize, second: usize) -> bool {
        flag(&self.can_work_with, first, second).unwrap_or(true)
    }

    /// Whether either member of the pair refuses to work with the other.
    #[must_use]
    pub fn is_incompatible_pair(&self, first: usize, second: usize) -> bool {
        first != second && !(self.can_work_with(first, second) && self.can_work_with(second, first))
    }

    /// Whether `staff` may cover `service` on `day`.
    #[must_use]
    pub fn is_capable(&self, service: usize, staff: usize, day: usize) -> bool {
        self.capability
            .get(service)
            .and_then(|rows| flag(rows, staff, day))
            .unwrap_or(true)
    }

    /// Index of the service called `name`.
    #[must_use]
    pub fn service_index(&self, name: &str) -> Option<usize> {
        self.service_names.iter().position(|candidate| candidate == name)
    }

    /// Indices of the balanced services.
    ///
    /// # Errors
    ///
    /// Returns [`RosterConfigError::UnknownService`] for a name that is not
    /// declared.
    pub fn balanced_service_indices(&self) -> Result<Vec<usize>, RosterConfigError> {
        self.balanced_services
            .iter()
            .map(|name| {
                self.service_index(name)
                    .ok_or_else(|| RosterConfigError::UnknownService { name: name.clone() })
            })
            .collect()
    }

    /// Number of soft-unavailable staff/day cells.
    #[must_use]
    pub fn soft_unavailable_cells(&self) -> usize {
        self.soft_unavailable
            .iter()
            .map(|days| days.iter().filter(|&&flagged| flagged).count())
            .sum()
    }

    /// Check every table against the declared counts.
    ///
    /// Empty tables are accepted and read as permissive.
    ///
    /// # Errors
    ///
    /// Returns [`RosterConfigError`] describing the first inconsistency.
    pub fn validate(&self) -> Result<(), RosterConfigError> {
        for (dimension, count) in [
            ("service", self.service_count()),
            ("standby duty", self.duty_count()),
            ("staff member", self.staff_count()),
            ("day", self.day_count),
        ] {
            if count == 0 {
                return Err(RosterConfigError::EmptyDimension { dimension });
            }
        }

        let staff = self.staff_count();
        let days = self.day_count;
        check_len("accepts_rotation", self.accepts_rotation.len(), staff)?;
        check_table("hard_unavailable", &self.hard_unavailable, staff, days)?;
        check_table("soft_unavailable", &self.soft_unavailable, staff, days)?;
        check_table("can_work_with", &self.can_work_with, staff, staff)?;
        if !self.capability.is_empty() {
            check_len("capability", self.capability.len(), self.service_count())?;
            for (service, rows) in self.capability.iter().enumerate() {
                check_table(&format!("capability[{service}]"), rows, staff, days)?;
            }
        }
        self.balanced_service_indices()?;
        Ok(())
    }
}

fn flag(table: &[Vec<bool>], row: usize, column: usize) -> Option<bool> {
    table.get(row).and_then(|entries| entries.get(column)).copied()
}

fn mark_days(
    table: &mut Vec<Vec<bool>>,
    staff_count: usize,
    day_count: usize,
    staff: usize,
    days: Range<usize>,
) {
    if table.is_empty() {
        *table = vec![vec![false; day_count]; staff_count];
    }
    if let Some(row) = table.get_mut(staff) {
        for cell in row.iter_mut().take(days.end).skip(days.start) {
            *cell = true;
        }
    }
}

fn check_len(table: &str, found: usize, expected: usize) -> Result<(), RosterConfigError> {
    if found == 0 || found == expected {
        Ok(())
    } else {
        Err(RosterConfigError::DimensionMismatch {
            table: table.to_owned(),
            expected,
            found,
        })
    }
}

fn check_table(
    table: &str,
    rows: &[Vec<bool>],
    expected_rows: usize,
    expected_columns: usize,
) -> Result<(), RosterConfigError> {
    if rows.is_empty() {
        return Ok(());
    }
    check_len(table, rows.len(), expected_rows)?;
    for (index, row) in rows.iter().enumerate() {
        if row.len() != expected_columns {
            return Err(RosterConfigError::DimensionMismatch {
                table: format!("{table}[{index}]"),
                expected: expected_columns,
                found: row.len(),
            });
        }
    }
    Ok(())
}
