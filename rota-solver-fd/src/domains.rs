//! Interval domains with an undo trail.
//!
//! Every bound change is logged on a linear trail. A search node records the
//! trail length before branching and rolls back to it on backtrack, restoring
//! every bound touched below that node in reverse order.

use rota_core::Model;

/// Raised when a bound update empties a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wipeout {
    /// Variable whose domain became empty.
    pub var: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrailEntry {
    var: usize,
    lo: i64,
    hi: i64,
}

/// Position on the trail to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(usize);

/// Current bounds of every variable.
#[derive(Debug, Clone, Default)]
pub struct Domains {
    lo: Vec<i64>,
    hi: Vec<i64>,
    trail: Vec<TrailEntry>,
    changed: Vec<usize>,
}

impl Domains {
    /// Initial bounds as declared by `model`.
    pub fn from_model(model: &Model) -> Self {
        let (lo, hi) = model.domains().map(|domain| (domain.min, domain.max)).unzip();
        Self {
            lo,
            hi,
            trail: Vec::new(),
            changed: Vec::new(),
        }
    }

    /// Number of variables.
    pub const fn var_count(&self) -> usize {
        self.lo.len()
    }

    /// Lower bound of `var`.
    pub fn lo(&self, var: usize) -> i64 {
        self.lo.get(var).copied().unwrap_or(i64::MAX)
    }

    /// Upper bound of `var`.
    pub fn hi(&self, var: usize) -> i64 {
        self.hi.get(var).copied().unwrap_or(i64::MIN)
    }

    /// Number of values left minus one.
    pub fn width(&self, var: usize) -> i64 {
        self.hi(var).saturating_sub(self.lo(var))
    }

    /// Whether `var` has a single value left.
    pub fn is_fixed(&self, var: usize) -> bool {
        self.lo(var) == self.hi(var)
    }

    /// Whether `var` may still take `value`.
    pub fn contains(&self, var: usize, value: i64) -> bool {
        self.lo(var) <= value && value <= self.hi(var)
    }

    /// Raise the lower bound of `var` to `value`.
    ///
    /// Returns whether the bound moved.
    pub fn raise(&mut self, var: usize, value: i64) -> Result<bool, Wipeout> {
        if value <= self.lo(var) {
            return Ok(false);
        }
        if value > self.hi(var) {
            return Err(Wipeout { var });
        }
        self.record(var);
        if let Some(lo) = self.lo.get_mut(var) {
            *lo = value;
        }
        Ok(true)
    }

    /// Lower the upper bound of `var` to `value`.
    ///
    /// Returns whether the bound moved.
    pub fn lower(&mut self, var: usize, value: i64) -> Result<bool, Wipeout> {
        if value >= self.hi(var) {
            return Ok(false);
        }
        if value < self.lo(var) {
            return Err(Wipeout { var });
        }
        self.record(var);
        if let Some(hi) = self.hi.get_mut(var) {
            *hi = value;
        }
        Ok(true)
    }

    /// Fix `var` to `value`.
    pub fn assign(&mut self, var: usize, value: i64) -> Result<bool, Wipeout> {
        let raised = self.raise(var, value)?;
        let lowered = self.lower(var, value)?;
        Ok(raised || lowered)
    }

    /// Remove `value` from the domain of `var` when it is a bound.
    ///
    /// Interior values cannot be removed from an interval and are left in
    /// place.
    pub fn exclude(&mut self, var: usize, value: i64) -> Result<bool, Wipeout> {
        if value == self.lo(var) {
            self.raise(var, value.saturating_add(1))
        } else if value == self.hi(var) {
            self.lower(var, value.saturating_sub(1))
        } else {
            Ok(false)
        }
    }

    fn record(&mut self, var: usize) {
        self.trail.push(TrailEntry {
            var,
            lo: self.lo(var),
            hi: self.hi(var),
        });
        self.changed.push(var);
    }

    /// Current trail position.
    pub const fn mark(&self) -> Mark {
        Mark(self.trail.len())
    }

    /// Undo every change made after `mark`.
    pub fn undo_to(&mut self, mark: Mark) {
        while self.trail.len() > mark.0 {
            let Some(entry) = self.trail.pop() else {
                break;
            };
            if let Some(lo) = self.lo.get_mut(entry.var) {
                *lo = entry.lo;
            }
            if let Some(hi) = self.hi.get_mut(entry.var) {
                *hi = entry.hi;
            }
        }
        self.changed.clear();
    }

    /// Variables whose bounds moved since the last call.
    pub fn take_changed(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.changed)
    }

    /// Forget pending change notifications.
    pub fn clear_changed(&mut self) {
        self.changed.clear();
    }

    /// Values of a fully fixed store.
    pub fn values(&self) -> Option<Vec<i64>> {
        (0..self.var_count())
            .map(|var| self.is_fixed(var).then(|| self.lo(var)))
            .collect()
    }
}
