//! Bounds propagators compiled from a [`Model`].
//!
//! Linear relations are normalised to `sum(a * x) <= rhs`; equalities become
//! two such rows and `>=` rows are negated. Implications propagate their body
//! once the trigger is fixed to its value and exclude the trigger once the
//! body can no longer hold.

use std::collections::VecDeque;

use rota_core::{Comparison, Constraint, LinearConstraint, Model};

use crate::domains::{Domains, Wipeout};

/// A propagator found its constraint unsatisfiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    /// Index of the failing propagator.
    pub propagator: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LinearLe {
    terms: Vec<(i64, usize)>,
    rhs: i64,
}

impl LinearLe {
    fn rows(linear: &LinearConstraint) -> Vec<Self> {
        let terms: Vec<(i64, usize)> = linear
            .expr
            .terms()
            .iter()
            .filter(|term| term.coefficient != 0)
            .map(|term| (term.coefficient, term.var.index()))
            .collect();
        let negated = || Self {
            terms: terms
                .iter()
                .map(|&(coefficient, var)| (coefficient.saturating_neg(), var))
                .collect(),
            rhs: linear.rhs.saturating_neg(),
        };
        let direct = || Self {
            terms: terms.clone(),
            rhs: linear.rhs,
        };
        match linear.comparison {
            Comparison::Le => vec![direct()],
            Comparison::Ge => vec![negated()],
            Comparison::Eq => vec![direct(), negated()],
        }
    }

    fn min_term(coefficient: i64, var: usize, domains: &Domains) -> i64 {
        if coefficient > 0 {
            coefficient.saturating_mul(domains.lo(var))
        } else {
            coefficient.saturating_mul(domains.hi(var))
        }
    }

    fn min_sum(&self, domains: &Domains) -> i64 {
        self.terms
            .iter()
            .map(|&(coefficient, var)| Self::min_term(coefficient, var, domains))
            .fold(0_i64, i64::saturating_add)
    }

    fn is_disentailed(&self, domains: &Domains) -> bool {
        self.min_sum(domains) > self.rhs
    }

    fn propagate(&self, domains: &mut Domains) -> Result<(), Failed> {
        let min_sum = self.min_sum(domains);
        if min_sum > self.rhs {
            return Err(Failed);
        }
        for &(coefficient, var) in &self.terms {
            let rest = min_sum.saturating_sub(Self::min_term(coefficient, var, domains));
            let slack = self.rhs.saturating_sub(rest);
            if coefficient > 0 {
                domains.lower(var, slack.div_euclid(coefficient))?;
            } else {
                let magnitude = coefficient.saturating_neg();
                domains.raise(var, slack.div_euclid(magnitude).saturating_neg())?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Failed;

impl From<Wipeout> for Failed {
    fn from(_: Wipeout) -> Self {
        Self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Propagator {
    Linear(LinearLe),
    Implication {
        trigger: usize,
        value: i64,
        body: Vec<LinearLe>,
    },
    Equal(usize, usize),
}

impl Propagator {
    fn vars(&self) -> Vec<usize> {
        let mut vars: Vec<usize> = match self {
            Self::Linear(row) => row.terms.iter().map(|&(_, var)| var).collect(),
            Self::Implication { trigger, body, .. } => std::iter::once(*trigger)
                .chain(body.iter().flat_map(|row| row.terms.iter().map(|&(_, var)| var)))
                .collect(),
            Self::Equal(lhs, rhs) => vec![*lhs, *rhs],
        };
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    fn propagate(&self, domains: &mut Domains) -> Result<(), Failed> {
        match self {
            Self::Linear(row) => row.propagate(domains),
            Self::Implication {
                trigger,
                value,
                body,
            } => {
                if domains.is_fixed(*trigger) && domains.lo(*trigger) == *value {
                    body.iter().try_for_each(|row| row.propagate(domains))
                } else if domains.contains(*trigger, *value)
                    && body.iter().any(|row| row.is_disentailed(domains))
                {
                    domains.exclude(*trigger, *value)?;
                    Ok(())
                } else {
                    Ok(())
                }
            }
            Self::Equal(lhs, rhs) => {
                let lo = domains.lo(*lhs).max(domains.lo(*rhs));
                let hi = domains.hi(*lhs).min(domains.hi(*rhs));
                for var in [*lhs, *rhs] {
                    domains.raise(var, lo)?;
                    domains.lower(var, hi)?;
                }
                Ok(())
            }
        }
    }
}

/// Every propagator of a model plus the watch lists linking variables to
/// the propagators that read them.
#[derive(Debug, Clone, Default)]
pub struct Propagators {
    propagators: Vec<Propagator>,
    vars: Vec<Vec<usize>>,
    watches: Vec<Vec<usize>>,
    pins: Vec<(usize, i64)>,
}

impl Propagators {
    /// Compile every posted constraint of `model`.
    pub fn compile(model: &Model) -> Self {
        let mut propagators = Vec::new();
        let mut pins = Vec::new();
        for posted in model.constraints() {
            match &posted.constraint {
                Constraint::Linear(linear) => {
                    propagators.extend(LinearLe::rows(linear).into_iter().map(Propagator::Linear));
                }
                Constraint::IfThen { condition, then } => {
                    propagators.push(Propagator::Implication {
                        trigger: condition.var.index(),
                        value: condition.value,
                        body: LinearLe::rows(then),
                    });
                }
                Constraint::Equal { lhs, rhs } => {
                    propagators.push(Propagator::Equal(lhs.index(), rhs.index()));
                }
                Constraint::Fixed { var, value } => pins.push((var.index(), *value)),
            }
        }
        let vars: Vec<Vec<usize>> = propagators.iter().map(Propagator::vars).collect();
        let mut watches = vec![Vec::new(); model.var_count()];
        for (index, watched) in vars.iter().enumerate() {
            for &var in watched {
                if let Some(list) = watches.get_mut(var) {
                    list.push(index);
                }
            }
        }
        Self {
            propagators,
            vars,
            watches,
            pins,
        }
    }

    /// Number of propagators.
    pub const fn count(&self) -> usize {
        self.propagators.len()
    }

    /// Variables read by propagator `index`.
    pub fn vars_of(&self, index: usize) -> &[usize] {
        self.vars.get(index).map_or(&[], Vec::as_slice)
    }

    /// Variables pinned to constants, applied once at the root.
    pub fn pins(&self) -> &[(usize, i64)] {
        &self.pins
    }

    /// Run every propagator to a fixpoint.
    pub fn propagate_all(&self, domains: &mut Domains) -> Result<(), Conflict> {
        domains.clear_changed();
        self.run((0..self.count()).collect(), domains)
    }

    /// Run the propagators watching variables changed since the last call.
    pub fn propagate_changes(&self, domains: &mut Domains) -> Result<(), Conflict> {
        let mut seeds: Vec<usize> = domains
            .take_changed()
            .iter()
            .flat_map(|&var| self.watches.get(var).into_iter().flatten().copied())
            .collect();
        seeds.sort_unstable();
        seeds.dedup();
        self.run(seeds, domains)
    }

    fn run(&self, seeds: Vec<usize>, domains: &mut Domains) -> Result<(), Conflict> {
        let mut queued = vec![false; self.count()];
        for &seed in &seeds {
            if let Some(flag) = queued.get_mut(seed) {
                *flag = true;
            }
        }
        let mut queue = VecDeque::from(seeds);
        while let Some(index) = queue.pop_front() {
            if let Some(flag) = queued.get_mut(index) {
                *flag = false;
            }
            let Some(propagator) = self.propagators.get(index) else {
                continue;
            };
            if propagator.propagate(domains).is_err() {
                domains.clear_changed();
                return Err(Conflict { propagator: index });
            }
            for var in domains.take_changed() {
                for &watcher in self.watches.get(var).into_iter().flatten() {
                    if let Some(flag) = queued.get_mut(watcher)
                        && !*flag
                    {
                        *flag = true;
                        queue.push_back(watcher);
                    }
                }
            }
        }
        Ok(())
    }
}
