//! Solver-independent constraint model.
//!
//! Constraint procedures never talk to a solving engine directly. They
//! declare variables through [`VarAllocator`] and post constraints through
//! [`ConstraintSink`], one method per constraint shape. [`Model`] records
//! everything so any backend implementing [`crate::Solver`] can consume it.

use std::fmt;

/// Handle to a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    /// Handle for the variable declared at `index`.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the variable in declaration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Inclusive integer range a variable may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    /// Smallest permitted value.
    pub min: i64,
    /// Largest permitted value.
    pub max: i64,
}

impl Domain {
    /// The `{0, 1}` domain used by assignment cells.
    pub const BOOLEAN: Self = Self { min: 0, max: 1 };

    /// Domain covering `min..=max`.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Whether the domain holds no value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Whether `value` lies in the domain.
    #[must_use]
    pub const fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// One `coefficient * var` summand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    /// Multiplier applied to the variable.
    pub coefficient: i64,
    /// Variable being weighted.
    pub var: VarId,
}

/// Weighted sum of variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinearExpr {
    terms: Vec<Term>,
}

impl LinearExpr {
    /// Sum of `vars`, each with coefficient one.
    #[must_use]
    pub fn sum<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = VarId>,
    {
        Self {
            terms: vars
                .into_iter()
                .map(|var| Term {
                    coefficient: 1,
                    var,
                })
                .collect(),
        }
    }

    /// Append `coefficient * var`.
    #[must_use]
    pub fn plus(mut self, coefficient: i64, var: VarId) -> Self {
        self.terms.push(Term { coefficient, var });
        self
    }

    /// Append every variable of `vars` with coefficient one.
    #[must_use]
    pub fn plus_all<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = VarId>,
    {
        self.terms.extend(vars.into_iter().map(|var| Term {
            coefficient: 1,
            var,
        }));
        self
    }

    /// Summands of the expression.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Value of the expression under `values`, if every variable is assigned.
    #[must_use]
    pub fn evaluate(&self, values: &[i64]) -> Option<i64> {
        self.terms.iter().try_fold(0_i64, |total, term| {
            let value = values.get(term.var.index())?;
            total.checked_add(term.coefficient.checked_mul(*value)?)
        })
    }
}

/// Relation between a linear expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `expr = rhs`
    Eq,
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
}

impl Comparison {
    /// Whether `lhs` relates to `rhs` as required.
    #[must_use]
    pub const fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Le => lhs <= rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

/// `expr <comparison> rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Relation to enforce.
    pub comparison: Comparison,
    /// Constant right-hand side.
    pub rhs: i64,
}

impl LinearConstraint {
    /// `expr <comparison> rhs`.
    #[must_use]
    pub const fn new(expr: LinearExpr, comparison: Comparison, rhs: i64) -> Self {
        Self {
            expr,
            comparison,
            rhs,
        }
    }

    /// Sum of `vars` equal to `rhs`.
    #[must_use]
    pub fn sum_eq<I: IntoIterator<Item = VarId>>(vars: I, rhs: i64) -> Self {
        Self::new(LinearExpr::sum(vars), Comparison::Eq, rhs)
    }

    /// Sum of `vars` at most `rhs`.
    #[must_use]
    pub fn sum_le<I: IntoIterator<Item = VarId>>(vars: I, rhs: i64) -> Self {
        Self::new(LinearExpr::sum(vars), Comparison::Le, rhs)
    }

    /// Sum of `vars` at least `rhs`.
    #[must_use]
    pub fn sum_ge<I: IntoIterator<Item = VarId>>(vars: I, rhs: i64) -> Self {
        Self::new(LinearExpr::sum(vars), Comparison::Ge, rhs)
    }

    /// Whether the constraint holds under `values`.
    #[must_use]
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        self.expr
            .evaluate(values)
            .is_some_and(|lhs| self.comparison.holds(lhs, self.rhs))
    }
}

/// `var == value`, used as the trigger of a conditional constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    /// Variable tested.
    pub var: VarId,
    /// Value that makes the literal true.
    pub value: i64,
}

impl Literal {
    /// Literal true when `var` is one.
    #[must_use]
    pub const fn is_set(var: VarId) -> Self {
        Self { var, value: 1 }
    }

    /// Whether the literal holds under `values`.
    #[must_use]
    pub fn holds(&self, values: &[i64]) -> bool {
        values.get(self.var.index()) == Some(&self.value)
    }
}

/// Constraint shapes understood by every backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Plain linear relation.
    Linear(LinearConstraint),
    /// The linear relation must hold whenever the literal does.
    IfThen {
        /// Trigger.
        condition: Literal,
        /// Relation enforced once the trigger holds.
        then: LinearConstraint,
    },
    /// Two variables take the same value.
    Equal {
        /// First variable.
        lhs: VarId,
        /// Second variable.
        rhs: VarId,
    },
    /// A variable is pinned to a constant.
    Fixed {
        /// Pinned variable.
        var: VarId,
        /// Constant value.
        value: i64,
    },
}

impl Constraint {
    /// Whether the constraint holds under a complete assignment.
    #[must_use]
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        match self {
            Self::Linear(linear) => linear.is_satisfied(values),
            Self::IfThen { condition, then } => {
                !condition.holds(values) || then.is_satisfied(values)
            }
            Self::Equal { lhs, rhs } => {
                let left = values.get(lhs.index());
                left.is_some() && left == values.get(rhs.index())
            }
            Self::Fixed { var, value } => values.get(var.index()) == Some(value),
        }
    }

    /// Variables mentioned by the constraint.
    #[must_use]
    pub fn vars(&self) -> Vec<VarId> {
        match self {
            Self::Linear(linear) => linear.expr.terms().iter().map(|term| term.var).collect(),
            Self::IfThen { condition, then } => std::iter::once(condition.var)
                .chain(then.expr.terms().iter().map(|term| term.var))
                .collect(),
            Self::Equal { lhs, rhs } => vec![*lhs, *rhs],
            Self::Fixed { var, .. } => vec![*var],
        }
    }
}

/// Business rule a posted constraint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    /// At most one service per staff member per day.
    SingleService,
    /// Exactly one staff member per service per day.
    AlwaysCovered,
    /// No shift on the day after a shift.
    RestNextDay,
    /// Friday and Sunday shifts come together.
    RotationContinuity,
    /// No shift on hard-unavailable days.
    HardUnavailability,
    /// No shift on a service the staff member cannot cover.
    Capability,
    /// Incompatible staff never share a day.
    Incompatibility,
    /// Standby duty spans whole weekly blocks.
    StandbyGrouping,
    /// Exactly one staff member per standby duty per day.
    AlwaysOneStandby,
    /// No standby duty on a day with a shift.
    ShiftStandbyExclusivity,
    /// Total shifts per staff member near the average.
    ShiftBalance,
    /// Shifts on a named service per staff member near the average.
    ServiceBalance,
    /// Thursday, Saturday and Sunday shifts near the average.
    WeekdayBalance,
    /// Standby days per staff member near the average.
    StandbyBalance,
    /// No shifts on days `t`, `t + 2` and `t + 4` together.
    AlternatingPattern,
    /// Links the objective to soft-preference violations.
    Objective,
}

impl RuleKind {
    /// Every rule kind, in posting order.
    pub const ALL: [Self; 16] = [
        Self::SingleService,
        Self::AlwaysCovered,
        Self::ShiftBalance,
        Self::RestNextDay,
        Self::RotationContinuity,
        Self::HardUnavailability,
        Self::Capability,
        Self::Incompatibility,
        Self::StandbyGrouping,
        Self::AlwaysOneStandby,
        Self::ShiftStandbyExclusivity,
        Self::ServiceBalance,
        Self::AlternatingPattern,
        Self::WeekdayBalance,
        Self::StandbyBalance,
        Self::Objective,
    ];

    /// Short kebab-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SingleService => "single-service",
            Self::AlwaysCovered => "always-covered",
            Self::RestNextDay => "rest-next-day",
            Self::RotationContinuity => "rotation-continuity",
            Self::HardUnavailability => "hard-unavailability",
            Self::Capability => "capability",
            Self::Incompatibility => "incompatibility",
            Self::StandbyGrouping => "standby-grouping",
            Self::AlwaysOneStandby => "always-one-standby",
            Self::ShiftStandbyExclusivity => "shift-standby-exclusivity",
            Self::ShiftBalance => "shift-balance",
            Self::ServiceBalance => "service-balance",
            Self::WeekdayBalance => "weekday-balance",
            Self::StandbyBalance => "standby-balance",
            Self::AlternatingPattern => "alternating-pattern",
            Self::Objective => "objective",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A constraint tagged with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedConstraint {
    /// Producing rule.
    pub rule: RuleKind,
    /// The constraint itself.
    pub constraint: Constraint,
}

/// Declares decision variables.
pub trait VarAllocator {
    /// Declare a variable named `name` ranging over `domain`.
    fn new_var(&mut self, name: String, domain: Domain) -> VarId;
}

/// Receives constraints, one method per shape.
pub trait ConstraintSink {
    /// Post `linear`.
    fn post_linear(&mut self, rule: RuleKind, linear: LinearConstraint);

    /// Post `then`, enforced whenever `condition` holds.
    fn post_if_then(&mut self, rule: RuleKind, condition: Literal, then: LinearConstraint);

    /// Post `lhs == rhs`.
    fn post_equal(&mut self, rule: RuleKind, lhs: VarId, rhs: VarId);

    /// Pin `var` to `value`.
    fn post_fixed(&mut self, rule: RuleKind, var: VarId, value: i64);
}

/// Constraints gathered for later merging into a [`Model`].
///
/// Batches only read shared tables and only append to themselves, so
/// independent rules can be gathered separately and merged afterwards.
#[derive(Debug, Clone, Default)]
pub struct ConstraintBatch {
    constraints: Vec<PostedConstraint>,
}

impl ConstraintBatch {
    /// Number of constraints gathered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether nothing was gathered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    fn push(&mut self, rule: RuleKind, constraint: Constraint) {
        self.constraints.push(PostedConstraint { rule, constraint });
    }
}

impl ConstraintSink for ConstraintBatch {
    fn post_linear(&mut self, rule: RuleKind, linear: LinearConstraint) {
        self.push(rule, Constraint::Linear(linear));
    }

    fn post_if_then(&mut self, rule: RuleKind, condition: Literal, then: LinearConstraint) {
        self.push(rule, Constraint::IfThen { condition, then });
    }

    fn post_equal(&mut self, rule: RuleKind, lhs: VarId, rhs: VarId) {
        self.push(rule, Constraint::Equal { lhs, rhs });
    }

    fn post_fixed(&mut self, rule: RuleKind, var: VarId, value: i64) {
        self.push(rule, Constraint::Fixed { var, value });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct VarDecl {
    name: String,
    domain: Domain,
}

/// Recorded variables and constraints ready to hand to a solver.
///
/// # Examples
///
/// ```
/// use rota_core::{ConstraintSink, Domain, LinearConstraint, Model, RuleKind, VarAllocator};
///
/// let mut model = Model::default();
/// let a = model.new_var("a".into(), Domain::BOOLEAN);
/// let b = model.new_var("b".into(), Domain::BOOLEAN);
/// model.post_linear(RuleKind::AlwaysCovered, LinearConstraint::sum_eq([a, b], 1));
/// assert_eq!(model.count_for(RuleKind::AlwaysCovered), 1);
/// assert!(model.violations(&[1, 0]).is_empty());
/// assert_eq!(model.violations(&[1, 1]).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Model {
    vars: Vec<VarDecl>,
    constraints: Vec<PostedConstraint>,
}

impl Model {
    /// Number of declared variables.
    #[must_use]
    pub const fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Number of posted constraints.
    #[must_use]
    pub const fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of constraints posted for `rule`.
    #[must_use]
    pub fn count_for(&self, rule: RuleKind) -> usize {
        self.constraints
            .iter()
            .filter(|posted| posted.rule == rule)
            .count()
    }

    /// Domain declared for `var`.
    #[must_use]
    pub fn domain(&self, var: VarId) -> Option<Domain> {
        self.vars.get(var.index()).map(|decl| decl.domain)
    }

    /// Name declared for `var`.
    #[must_use]
    pub fn var_name(&self, var: VarId) -> Option<&str> {
        self.vars.get(var.index()).map(|decl| decl.name.as_str())
    }

    /// Declared domains in variable order.
    pub fn domains(&self) -> impl Iterator<Item = Domain> + '_ {
        self.vars.iter().map(|decl| decl.domain)
    }

    /// Posted constraints in posting order.
    #[must_use]
    pub fn constraints(&self) -> &[PostedConstraint] {
        &self.constraints
    }

    /// Append a batch gathered elsewhere.
    pub fn extend(&mut self, batch: ConstraintBatch) {
        self.constraints.extend(batch.constraints);
    }

    /// Constraints violated by a complete assignment.
    ///
    /// Values outside their declared domain are not reported here; they are
    /// a solver defect rather than a rule violation.
    #[must_use]
    pub fn violations(&self, values: &[i64]) -> Vec<&PostedConstraint> {
        self.constraints
            .iter()
            .filter(|posted| !posted.constraint.is_satisfied(values))
            .collect()
    }
}

impl VarAllocator for Model {
    fn new_var(&mut self, name: String, domain: Domain) -> VarId {
        self.vars.push(VarDecl { name, domain });
        VarId::new(self.vars.len() - 1)
    }
}

impl ConstraintSink for Model {
    fn post_linear(&mut self, rule: RuleKind, linear: LinearConstraint) {
        self.constraints.push(PostedConstraint {
            rule,
            constraint: Constraint::Linear(linear),
        });
    }

    fn post_if_then(&mut self, rule: RuleKind, condition: Literal, then: LinearConstraint) {
        self.constraints.push(PostedConstraint {
            rule,
            constraint: Constraint::IfThen { condition, then },
        });
    }

    fn post_equal(&mut self, rule: RuleKind, lhs: VarId, rhs: VarId) {
        self.constraints.push(PostedConstraint {
            rule,
            constraint: Constraint::Equal { lhs, rhs },
        });
    }

    fn post_fixed(&mut self, rule: RuleKind, var: VarId, value: i64) {
        self.constraints.push(PostedConstraint {
            rule,
            constraint: Constraint::Fixed { var, value },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn three_bools() -> (Model, [VarId; 3]) {
        let mut model = Model::default();
        let vars = [
            model.new_var("a".into(), Domain::BOOLEAN),
            model.new_var("b".into(), Domain::BOOLEAN),
            model.new_var("c".into(), Domain::BOOLEAN),
        ];
        (model, vars)
    }

    #[rstest]
    fn declared_variables_keep_their_names(three_bools: (Model, [VarId; 3])) {
        let (model, [_, b, _]) = three_bools;
        assert_eq!(model.var_count(), 3);
        assert_eq!(model.var_name(b), Some("b"));
        assert_eq!(model.domain(b), Some(Domain::BOOLEAN));
        assert_eq!(model.domain(VarId::new(9)), None);
    }

    #[rstest]
    #[case(Comparison::Eq, 2, true)]
    #[case(Comparison::Le, 1, false)]
    #[case(Comparison::Ge, 3, false)]
    #[case(Comparison::Ge, 2, true)]
    fn weighted_sums_compare_against_rhs(
        three_bools: (Model, [VarId; 3]),
        #[case] comparison: Comparison,
        #[case] rhs: i64,
        #[case] expected: bool,
    ) {
        let (_, [a, b, c]) = three_bools;
        let expr = LinearExpr::sum([a, b]).plus(-1, c);
        let constraint = LinearConstraint::new(expr, comparison, rhs);
        assert_eq!(constraint.is_satisfied(&[1, 1, 0]), expected);
    }

    #[rstest]
    fn conditional_only_binds_when_triggered(three_bools: (Model, [VarId; 3])) {
        let (_, [a, b, c]) = three_bools;
        let rule = Constraint::IfThen {
            condition: Literal::is_set(a),
            then: LinearConstraint::sum_eq([b, c], 0),
        };
        assert!(rule.is_satisfied(&[0, 1, 1]));
        assert!(rule.is_satisfied(&[1, 0, 0]));
        assert!(!rule.is_satisfied(&[1, 0, 1]));
        assert_eq!(rule.vars(), vec![a, b, c]);
    }

    #[rstest]
    fn missing_values_never_satisfy(three_bools: (Model, [VarId; 3])) {
        let (_, [a, _, c]) = three_bools;
        assert!(!Constraint::Equal { lhs: a, rhs: c }.is_satisfied(&[0, 0]));
        assert!(!LinearConstraint::sum_le([c], 1).is_satisfied(&[0]));
    }

    #[rstest]
    fn batches_merge_with_their_rule_tags(three_bools: (Model, [VarId; 3])) {
        let (mut model, [a, b, c]) = three_bools;
        let mut batch = ConstraintBatch::default();
        batch.post_equal(RuleKind::StandbyGrouping, a, b);
        batch.post_fixed(RuleKind::Capability, c, 0);
        assert_eq!(batch.len(), 2);
        model.extend(batch);
        assert_eq!(model.constraint_count(), 2);
        assert_eq!(model.count_for(RuleKind::StandbyGrouping), 1);
        assert_eq!(model.violations(&[1, 1, 1]).len(), 1);
    }
}
