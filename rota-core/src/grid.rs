//! Three-dimensional grids of assignment variables.
//!
//! A grid owns one flat vector laid out `[slot][staff][day]`, where a slot is
//! a service for the shift grid and a standby duty for the standby grid. Rules
//! that sum along a different axis ask for a [`AssignmentGrid::line`] instead
//! of building transposed copies.

use crate::model::{Domain, VarAllocator, VarId};

/// Axis of an [`AssignmentGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Services or standby duties.
    Slot,
    /// Staff members.
    Staff,
    /// Days of the horizon.
    Day,
}

/// Coordinates of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridIndex {
    /// Service or duty index.
    pub slot: usize,
    /// Staff index.
    pub staff: usize,
    /// Day index.
    pub day: usize,
}

impl GridIndex {
    /// Cell at `(slot, staff, day)`.
    #[must_use]
    pub const fn new(slot: usize, staff: usize, day: usize) -> Self {
        Self { slot, staff, day }
    }

    const fn with(self, axis: Axis, position: usize) -> Self {
        match axis {
            Axis::Slot => Self {
                slot: position,
                ..self
            },
            Axis::Staff => Self {
                staff: position,
                ..self
            },
            Axis::Day => Self {
                day: position,
                ..self
            },
        }
    }
}

/// Extent of each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    /// Number of services or duties.
    pub slots: usize,
    /// Number of staff members.
    pub staff: usize,
    /// Number of days.
    pub days: usize,
}

impl GridShape {
    /// Length of `axis`.
    #[must_use]
    pub const fn len(&self, axis: Axis) -> usize {
        match axis {
            Axis::Slot => self.slots,
            Axis::Staff => self.staff,
            Axis::Day => self.days,
        }
    }

    /// Number of cells.
    #[must_use]
    pub const fn cells(&self) -> usize {
        self.slots * self.staff * self.days
    }

    const fn offset(&self, index: GridIndex) -> Option<usize> {
        if index.slot < self.slots && index.staff < self.staff && index.day < self.days {
            Some((index.slot * self.staff + index.staff) * self.days + index.day)
        } else {
            None
        }
    }
}

/// Boolean decision variables for every `(slot, staff, day)` cell.
///
/// # Examples
///
/// ```
/// use rota_core::{AssignmentGrid, Axis, GridIndex, GridShape, Model};
///
/// let mut model = Model::default();
/// let shape = GridShape { slots: 2, staff: 3, days: 4 };
/// let grid = AssignmentGrid::allocate(&mut model, shape, "x");
/// assert_eq!(model.var_count(), 24);
///
/// // Everyone on service 1, day 2.
/// let column: Vec<_> = grid.line(Axis::Staff, GridIndex::new(1, 0, 2)).collect();
/// assert_eq!(column.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentGrid {
    shape: GridShape,
    vars: Vec<VarId>,
}

impl AssignmentGrid {
    /// Declare one boolean variable per cell, named `prefix[slot,staff,day]`.
    pub fn allocate<A: VarAllocator>(allocator: &mut A, shape: GridShape, prefix: &str) -> Self {
        let mut vars = Vec::with_capacity(shape.cells());
        for slot in 0..shape.slots {
            for staff in 0..shape.staff {
                for day in 0..shape.days {
                    let name = format!("{prefix}[{slot},{staff},{day}]");
                    vars.push(allocator.new_var(name, Domain::BOOLEAN));
                }
            }
        }
        Self { shape, vars }
    }

    /// Extent of the grid.
    #[must_use]
    pub const fn shape(&self) -> GridShape {
        self.shape
    }

    /// Variable at `index`, if inside the grid.
    #[must_use]
    pub fn get(&self, index: GridIndex) -> Option<VarId> {
        self.shape
            .offset(index)
            .and_then(|offset| self.vars.get(offset))
            .copied()
    }

    /// Variables along `axis` with the other two coordinates taken from
    /// `anchor`.
    pub fn line(&self, axis: Axis, anchor: GridIndex) -> impl Iterator<Item = VarId> + '_ {
        (0..self.shape.len(axis)).filter_map(move |position| self.get(anchor.with(axis, position)))
    }

    /// Every slot held by `staff` on `day`.
    pub fn slots_of(&self, staff: usize, day: usize) -> impl Iterator<Item = VarId> + '_ {
        self.line(Axis::Slot, GridIndex::new(0, staff, day))
    }

    /// Every staff member's cell for `slot` on `day`.
    pub fn staff_of(&self, slot: usize, day: usize) -> impl Iterator<Item = VarId> + '_ {
        self.line(Axis::Staff, GridIndex::new(slot, 0, day))
    }

    /// Every day of `staff` on `slot`.
    pub fn days_of(&self, slot: usize, staff: usize) -> impl Iterator<Item = VarId> + '_ {
        self.line(Axis::Day, GridIndex::new(slot, staff, 0))
    }

    /// Every cell belonging to `staff`.
    pub fn cells_of_staff(&self, staff: usize) -> impl Iterator<Item = VarId> + '_ {
        (0..self.shape.slots).flat_map(move |slot| self.days_of(slot, staff))
    }

    /// All cells with their coordinates, in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (GridIndex, VarId)> + '_ {
        let shape = self.shape;
        (0..shape.slots)
            .flat_map(move |slot| {
                (0..shape.staff).flat_map(move |staff| {
                    (0..shape.days).map(move |day| GridIndex::new(slot, staff, day))
                })
            })
            .zip(self.vars.iter().copied())
    }
}
