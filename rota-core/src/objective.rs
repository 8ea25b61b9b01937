//! Soft day-off preferences folded into one counter to minimise.

use crate::model::{Comparison, ConstraintSink, LinearConstraint, LinearExpr, RuleKind};
use crate::roster::RosterGrids;

/// Tie the objective variable to the number of shifts falling on days their
/// staff member asked to keep free.
///
/// Posts `sum(violations) - objective = 0`. Without soft preferences this
/// pins the objective to zero.
pub fn post_objective<S: ConstraintSink>(grids: &RosterGrids, sink: &mut S) {
    let config = grids.config();
    let shifts = grids.shifts();
    let violations = (0..grids.staff_count())
        .flat_map(|staff| (0..grids.day_count()).map(move |day| (staff, day)))
        .filter(|&(staff, day)| config.is_soft_unavailable(staff, day))
        .fold(LinearExpr::default(), |sum, (staff, day)| {
            sum.plus_all(shifts.slots_of(staff, day))
        });
    let expr = violations.plus(-1, grids.objective());
    sink.post_linear(
        RuleKind::Objective,
        LinearConstraint::new(expr, Comparison::Eq, 0),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;
    use crate::model::{Constraint, Model};
    use crate::roster::RosterModel;
    use rstest::rstest;

    fn objective_terms(config: RosterConfig) -> usize {
        let roster = RosterModel::new(config).expect("valid config");
        let mut model = Model::default();
        post_objective(roster.grids(), &mut model);
        match model.constraints().first().map(|posted| &posted.constraint) {
            Some(Constraint::Linear(linear)) => linear.expr.terms().len(),
            other => panic!("expected a linear objective link, found {other:?}"),
        }
    }

    #[rstest]
    fn every_service_on_a_soft_day_counts() {
        let config = RosterConfig::permissive(&["A", "B", "C"], &["D"], 4, 7)
            .with_soft_unavailability(1, 2..4);
        assert_eq!(objective_terms(config), 2 * 3 + 1);
    }

    #[rstest]
    fn no_preferences_leave_only_the_objective() {
        let config = RosterConfig::permissive(&["A"], &["D"], 2, 3);
        assert_eq!(objective_terms(config), 1);
    }

    #[rstest]
    fn objective_matches_the_violation_count() {
        let config =
            RosterConfig::permissive(&["A"], &["D"], 2, 2).with_soft_unavailability(0, 0..2);
        let roster = RosterModel::new(config).expect("valid config");
        let mut model = Model::default();
        post_objective(roster.grids(), &mut model);
        let objective = roster.grids().objective().index();
        let mut values = vec![0; roster.model().var_count()];
        for (index, var) in roster.grids().shifts().iter() {
            if index.staff == 0
                && let Some(value) = values.get_mut(var.index())
            {
                *value = 1;
            }
        }
        if let Some(value) = values.get_mut(objective) {
            *value = 2;
        }
        assert!(model.violations(&values).is_empty());
        if let Some(value) = values.get_mut(objective) {
            *value = 1;
        }
        assert_eq!(model.violations(&values).len(), 1);
    }
}
