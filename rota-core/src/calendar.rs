//! Day and weekday arithmetic for a roster horizon.
//!
//! Days are numbered from zero. The [`Calendar`] records which weekday day
//! zero falls on, so every rule that depends on the weekly cycle asks the
//! calendar instead of assuming the horizon starts on a Monday.

use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of days in the weekly cycle.
pub const DAYS_PER_WEEK: usize = 7;

/// Day of the week, indexed from Monday.
///
/// # Examples
///
/// ```
/// use rota_core::Weekday;
///
/// assert_eq!(Weekday::Friday.index(), 4);
/// assert_eq!(Weekday::from_index(9), Weekday::Wednesday);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Weekday {
    /// First day of the cycle.
    #[default]
    Monday,
    /// Second day of the cycle.
    Tuesday,
    /// Third day of the cycle.
    Wednesday,
    /// Fourth day of the cycle.
    Thursday,
    /// Fifth day of the cycle.
    Friday,
    /// Sixth day of the cycle.
    Saturday,
    /// Last day of the cycle.
    Sunday,
}

impl Weekday {
    /// Every weekday in cycle order.
    pub const ALL: [Self; DAYS_PER_WEEK] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Position of the weekday in the cycle, Monday being `0`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    /// Weekday at `index` modulo the cycle length.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        match index.rem_euclid(DAYS_PER_WEEK) {
            0 => Self::Monday,
            1 => Self::Tuesday,
            2 => Self::Wednesday,
            3 => Self::Thursday,
            4 => Self::Friday,
            5 => Self::Saturday,
            _ => Self::Sunday,
        }
    }

    /// Days before and after this weekday inside its standby block.
    ///
    /// The weekly cycle splits into the blocks `{Mon, Tue}`, `{Wed, Thu}` and
    /// `{Fri, Sat, Sun}`.
    #[must_use]
    pub const fn standby_span(self) -> (usize, usize) {
        match self {
            Self::Monday | Self::Wednesday => (0, 1),
            Self::Tuesday | Self::Thursday => (1, 0),
            Self::Friday => (0, 2),
            Self::Saturday => (1, 1),
            Self::Sunday => (2, 0),
        }
    }
}

/// Maps horizon days onto weekdays.
///
/// # Examples
///
/// ```
/// use rota_core::{Calendar, Weekday};
///
/// let calendar = Calendar::default();
/// assert_eq!(calendar.weekday(4), Weekday::Friday);
///
/// let shifted = Calendar::starting_on(Weekday::Wednesday);
/// assert_eq!(shifted.weekday(2), Weekday::Friday);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Calendar {
    first_weekday: Weekday,
}

impl Calendar {
    /// Calendar whose day zero falls on `first_weekday`.
    #[must_use]
    pub const fn starting_on(first_weekday: Weekday) -> Self {
        Self { first_weekday }
    }

    /// Weekday of day zero.
    #[must_use]
    pub const fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    /// Weekday of `day`.
    #[must_use]
    pub const fn weekday(&self, day: usize) -> Weekday {
        Weekday::from_index(self.first_weekday.index() + day.rem_euclid(DAYS_PER_WEEK))
    }

    /// Whether `day` starts a new week in the calendar.
    #[must_use]
    pub const fn starts_week(&self, day: usize) -> bool {
        matches!(self.weekday(day), Weekday::Monday)
    }

    /// Days of a `horizon`-day roster falling on `weekday`.
    pub fn days_on(&self, weekday: Weekday, horizon: usize) -> impl Iterator<Item = usize> + '_ {
        (0..horizon).filter(move |&day| self.weekday(day) == weekday)
    }

    /// Days of the standby block containing `day`, clipped to the horizon.
    ///
    /// ```
    /// use rota_core::Calendar;
    ///
    /// let calendar = Calendar::default();
    /// assert_eq!(calendar.standby_block(5, 15), 4..7);
    /// assert_eq!(calendar.standby_block(14, 15), 14..15);
    /// ```
    #[must_use]
    pub fn standby_block(&self, day: usize, horizon: usize) -> Range<usize> {
        let (back, forward) = self.weekday(day).standby_span();
        let start = day.saturating_sub(back);
        let end = (day + forward + 1).min(horizon);
        start..end.max(start)
    }

    /// Consecutive standby blocks covering a `horizon`-day roster.
    pub fn standby_blocks(&self, horizon: usize) -> impl Iterator<Item = Range<usize>> + '_ {
        std::iter::successors(
            (horizon > 0).then(|| self.standby_block(0, horizon)),
            move |previous| {
                (previous.end < horizon).then(|| self.standby_block(previous.end, horizon))
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Weekday::Monday)]
    #[case(3, Weekday::Thursday)]
    #[case(6, Weekday::Sunday)]
    #[case(7, Weekday::Monday)]
    #[case(13, Weekday::Sunday)]
    fn monday_calendar_maps_days(#[case] day: usize, #[case] expected: Weekday) {
        assert_eq!(Calendar::default().weekday(day), expected);
    }

    #[rstest]
    fn offset_calendar_wraps_around_the_week() {
        let calendar = Calendar::starting_on(Weekday::Saturday);
        assert_eq!(calendar.weekday(0), Weekday::Saturday);
        assert_eq!(calendar.weekday(1), Weekday::Sunday);
        assert_eq!(calendar.weekday(2), Weekday::Monday);
        assert!(calendar.starts_week(2));
    }

    #[rstest]
    fn days_on_lists_every_occurrence() {
        let thursdays: Vec<usize> = Calendar::default().days_on(Weekday::Thursday, 15).collect();
        assert_eq!(thursdays, vec![3, 10]);
    }

    #[rstest]
    fn weekday_indices_round_trip() {
        for weekday in Weekday::ALL {
            assert_eq!(Weekday::from_index(weekday.index()), weekday);
        }
    }

    #[rstest]
    fn standby_blocks_tile_the_horizon() {
        let blocks: Vec<_> = Calendar::default().standby_blocks(15).collect();
        assert_eq!(blocks, vec![0..2, 2..4, 4..7, 7..9, 9..11, 11..14, 14..15]);
    }

    #[rstest]
    fn standby_block_of_a_partial_first_week_is_clipped() {
        let calendar = Calendar::starting_on(Weekday::Saturday);
        assert_eq!(calendar.standby_block(0, 10), 0..2);
        assert_eq!(calendar.standby_block(1, 10), 0..2);
        assert_eq!(calendar.standby_block(2, 10), 2..4);
    }

    #[rstest]
    fn standby_block_groups_weekend() {
        assert_eq!(Calendar::default().standby_block(13, 15), 11..14);
    }
}
