//! Read-only view over a solved assignment.

use crate::grid::{AssignmentGrid, GridIndex};
use crate::roster::RosterGrids;

/// Shift and standby cells of a solved roster.
///
/// Built from the values a solver returned; the model is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvedRoster {
    services: usize,
    duties: usize,
    staff: usize,
    days: usize,
    shifts: Vec<bool>,
    standby: Vec<bool>,
    objective: i64,
}

impl SolvedRoster {
    /// Read the grid cells of `grids` out of a complete assignment.
    ///
    /// Returns `None` when `values` does not cover every grid variable.
    #[must_use]
    pub fn from_values(grids: &RosterGrids, values: &[i64]) -> Option<Self> {
        let read = |grid: &AssignmentGrid| -> Option<Vec<bool>> {
            grid.iter()
                .map(|(_, var)| values.get(var.index()).map(|&value| value != 0))
                .collect()
        };
        Some(Self {
            services: grids.service_count(),
            duties: grids.duty_count(),
            staff: grids.staff_count(),
            days: grids.day_count(),
            shifts: read(grids.shifts())?,
            standby: read(grids.standby())?,
            objective: *values.get(grids.objective().index())?,
        })
    }

    const fn offset(&self, slots: usize, index: GridIndex) -> Option<usize> {
        if index.slot < slots && index.staff < self.staff && index.day < self.days {
            Some((index.slot * self.staff + index.staff) * self.days + index.day)
        } else {
            None
        }
    }

    /// Whether `staff` covers `service` on `day`.
    #[must_use]
    pub fn is_on_shift(&self, service: usize, staff: usize, day: usize) -> bool {
        self.offset(self.services, GridIndex::new(service, staff, day))
            .and_then(|offset| self.shifts.get(offset))
            .copied()
            .unwrap_or(false)
    }

    /// Whether `staff` holds standby `duty` on `day`.
    #[must_use]
    pub fn is_on_standby(&self, duty: usize, staff: usize, day: usize) -> bool {
        self.offset(self.duties, GridIndex::new(duty, staff, day))
            .and_then(|offset| self.standby.get(offset))
            .copied()
            .unwrap_or(false)
    }

    /// Services `staff` covers on `day`.
    pub fn services_of(&self, staff: usize, day: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.services).filter(move |&service| self.is_on_shift(service, staff, day))
    }

    /// Duties `staff` holds on `day`.
    pub fn duties_of(&self, staff: usize, day: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.duties).filter(move |&duty| self.is_on_standby(duty, staff, day))
    }

    /// Whether `staff` covers any service on `day`.
    #[must_use]
    pub fn works(&self, staff: usize, day: usize) -> bool {
        self.services_of(staff, day).next().is_some()
    }

    /// Number of shifts `staff` covers on `service`.
    #[must_use]
    pub fn service_total(&self, service: usize, staff: usize) -> usize {
        (0..self.days)
            .filter(|&day| self.is_on_shift(service, staff, day))
            .count()
    }

    /// Number of standby days `staff` holds on `duty`.
    #[must_use]
    pub fn duty_total(&self, duty: usize, staff: usize) -> usize {
        (0..self.days)
            .filter(|&day| self.is_on_standby(duty, staff, day))
            .count()
    }

    /// Number of shifts `staff` covers.
    #[must_use]
    pub fn shift_total(&self, staff: usize) -> usize {
        (0..self.services)
            .map(|service| self.service_total(service, staff))
            .sum()
    }

    /// Number of standby days `staff` holds.
    #[must_use]
    pub fn standby_total(&self, staff: usize) -> usize {
        (0..self.duties).map(|duty| self.duty_total(duty, staff)).sum()
    }

    /// Objective value of the assignment.
    #[must_use]
    pub const fn objective(&self) -> i64 {
        self.objective
    }

    /// Number of staff members.
    #[must_use]
    pub const fn staff_count(&self) -> usize {
        self.staff
    }

    /// Length of the horizon.
    #[must_use]
    pub const fn day_count(&self) -> usize {
        self.days
    }
}
