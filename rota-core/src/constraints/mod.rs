//! Rule procedures posting the hard and balance constraints of a roster.
//!
//! Every procedure reads a [`RosterGrids`](crate::RosterGrids) and posts one
//! class of rule into a [`ConstraintSink`](crate::ConstraintSink). They are
//! independent of each other and of the order they run in.

mod availability;
mod balance;
mod coverage;
mod rest;
mod standby;

pub use availability::{post_capability, post_hard_unavailability, post_incompatibility};
pub use balance::{
    BALANCED_WEEKDAYS, post_service_balance, post_shift_balance, post_standby_balance,
    post_weekday_balance,
};
pub use coverage::{post_always_covered, post_always_one_standby, post_single_service};
pub use rest::{post_alternating_pattern, post_rest_next_day, post_rotation_continuity};
pub use standby::{post_shift_standby_exclusivity, post_standby_grouping};
