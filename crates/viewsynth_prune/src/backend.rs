//! The MaxSMT backend abstraction of spec §9's design note: "Isolate SMT
//! calls behind an interface: `add_hard(expr)`, `add_soft(expr, weight)`,
//! `minimize/maximize(expr)`, `check_with_deadline(d)`, `model()`. This
//! allows swapping backends (Z3, OptiMathSAT, custom) without touching the
//! pruner."
//!
//! The SMT solver itself is an external collaborator (spec §1): this crate
//! isolates it behind [`MaxSmtBackend`] and ships exactly one concrete
//! implementation, [`GreedyMaxSmt`], a deterministic propagate-then-rank
//! solver adequate for the small, per-focus subproblems the hierarchical
//! pruner issues. It is not a general SMT solver: it handles linear
//! equalities and inequalities over rationals, boolean selector
//! implications, at-most-one groups, and exact-count pseudo-boolean
//! constraints, which is exactly the shape §4.5's encoding produces.

use std::collections::HashMap;
use std::time::Instant;
use viewsynth_core::Rational;

/// Opaque handle to one MaxSMT rational variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub usize);

/// Opaque handle to one MaxSMT boolean selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVar(pub usize);

/// A linear expression over rational variables: `Σ cᵢ·varᵢ + k`.
#[derive(Clone, Debug, Default)]
pub struct LinExpr {
    terms: Vec<(Rational, Var)>,
    constant: Rational,
}

impl LinExpr {
    pub fn constant(k: Rational) -> Self {
        Self {
            terms: Vec::new(),
            constant: k,
        }
    }

    pub fn var(v: Var) -> Self {
        Self {
            terms: vec![(Rational::from_integer(1), v)],
            constant: Rational::from_integer(0),
        }
    }

    pub fn scaled(coeff: Rational, v: Var) -> Self {
        Self {
            terms: vec![(coeff, v)],
            constant: Rational::from_integer(0),
        }
    }

    pub fn plus_constant(mut self, k: Rational) -> Self {
        self.constant += k;
        self
    }

    pub fn plus_scaled(mut self, coeff: Rational, v: Var) -> Self {
        self.terms.push((coeff, v));
        self
    }

    fn eval(&self, values: &HashMap<Var, Rational>) -> Option<Rational> {
        let mut acc = self.constant;
        for (c, v) in &self.terms {
            acc += *c * *values.get(v)?;
        }
        Some(acc)
    }

    /// If every term but one is already known, solve for the remaining
    /// unknown variable given that this expression must equal `target`.
    fn solve_for_unknown(&self, values: &HashMap<Var, Rational>, target: Rational) -> Option<(Var, Rational)> {
        let mut unknown: Option<(Rational, Var)> = None;
        let mut known_sum = self.constant;
        for (c, v) in &self.terms {
            match values.get(v) {
                Some(val) => known_sum += *c * *val,
                None => {
                    if unknown.is_some() {
                        return None;
                    }
                    unknown = Some((*c, *v));
                }
            }
        }
        let (coeff, var) = unknown?;
        if coeff == Rational::from_integer(0) {
            return None;
        }
        Some((var, (target - known_sum) / coeff))
    }
}

/// A comparison relation between two linear expressions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rel {
    Eq,
    Le,
    Ge,
}

/// A hard (must-hold) assertion, per spec §4.5.
#[derive(Clone, Debug)]
pub enum HardAssertion {
    /// `lhs rel rhs`, unconditionally.
    Plain { lhs: LinExpr, rel: Rel, rhs: LinExpr },
    /// `selector -> (lhs rel rhs)`: the candidate-implication encoding.
    Implies {
        selector: BoolVar,
        lhs: LinExpr,
        rel: Rel,
        rhs: LinExpr,
    },
    /// At most one of `selectors` may be active (no double-determination).
    AtMostOne { selectors: Vec<BoolVar> },
    /// Exactly `k` of `selectors` must be active (the determinism
    /// pseudo-boolean constraint).
    ExactlyK { selectors: Vec<BoolVar>, k: usize },
}

/// A weighted soft assertion: `soft-assert selector with weight w`.
#[derive(Clone, Copy, Debug)]
pub struct SoftAssertion {
    pub selector: BoolVar,
    pub weight: i64,
}

/// Result of a MaxSMT query under a wall-clock deadline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    Sat,
    Unsat,
    Timeout,
}

/// A generic MaxSMT backend over rational variables and boolean selectors.
pub trait MaxSmtBackend {
    fn new_var(&mut self) -> Var;
    fn new_bool(&mut self) -> BoolVar;
    fn add_hard(&mut self, assertion: HardAssertion);
    fn add_soft(&mut self, assertion: SoftAssertion);
    /// Optimization queries used by child-dimension inference (spec
    /// §4.5). In a system whose determinism constraints hold, the model is
    /// already exactly determined, so a compliant backend may treat these
    /// as no-ops and let `var_value` report the (unique) resolved value.
    fn minimize(&mut self, expr: &LinExpr);
    fn maximize(&mut self, expr: &LinExpr);
    fn check_with_deadline(&mut self, deadline: Instant) -> SolveOutcome;
    fn bool_value(&self, b: BoolVar) -> bool;
    fn var_value(&self, v: Var) -> Option<Rational>;
}

/// The reference [`MaxSmtBackend`]: propagate every `Plain` equality to a
/// fixed point, then greedily activate `Implies` selectors in descending
/// soft-weight order, rejecting any activation that would violate an
/// `AtMostOne` group or contradict an already-known variable value.
///
/// This is not a complete MaxSMT solver — it does no backtracking, so it
/// can miss the true optimum when two high-weight candidates conflict in a
/// way only visible after a third, lower-weight candidate is also
/// considered. It is adequate for the per-focus subproblems the
/// hierarchical pruner issues, which are small by construction (spec
/// §4.4's decomposition is exactly what keeps each query tractable).
#[derive(Debug, Default)]
pub struct GreedyMaxSmt {
    next_var: usize,
    next_bool: usize,
    hard: Vec<HardAssertion>,
    soft: Vec<SoftAssertion>,
    values: HashMap<Var, Rational>,
    bool_values: HashMap<BoolVar, bool>,
}

impl GreedyMaxSmt {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve_equality(&mut self, lhs: &LinExpr, rhs: &LinExpr) -> bool {
        if let Some(target) = lhs.eval(&self.values) {
            if let Some((var, val)) = rhs.solve_for_unknown(&self.values, target) {
                self.values.insert(var, val);
                return true;
            }
        }
        if let Some(target) = rhs.eval(&self.values) {
            if let Some((var, val)) = lhs.solve_for_unknown(&self.values, target) {
                self.values.insert(var, val);
                return true;
            }
        }
        false
    }

    fn check_rel(&self, lhs: &LinExpr, rel: Rel, rhs: &LinExpr) -> bool {
        match (lhs.eval(&self.values), rhs.eval(&self.values)) {
            (Some(l), Some(r)) => match rel {
                Rel::Eq => l == r,
                Rel::Le => l <= r,
                Rel::Ge => l >= r,
            },
            // Not fully resolved yet: don't reject, a later propagation
            // round may pin down the remaining variable.
            _ => true,
        }
    }

    fn propagate_plain(&mut self) -> bool {
        let plains: Vec<(LinExpr, Rel, LinExpr)> = self
            .hard
            .iter()
            .filter_map(|a| match a {
                HardAssertion::Plain { lhs, rel, rhs } => Some((lhs.clone(), *rel, rhs.clone())),
                _ => None,
            })
            .collect();

        let mut progress = true;
        while progress {
            progress = false;
            for (lhs, rel, rhs) in &plains {
                if *rel == Rel::Eq && self.resolve_equality(lhs, rhs) {
                    progress = true;
                }
            }
        }

        plains.iter().all(|(lhs, rel, rhs)| self.check_rel(lhs, *rel, rhs))
    }

    fn violates_at_most_one(&self, selector: BoolVar) -> bool {
        self.hard.iter().any(|a| match a {
            HardAssertion::AtMostOne { selectors } => {
                selectors.contains(&selector)
                    && selectors
                        .iter()
                        .any(|&other| other != selector && self.bool_value(other))
            }
            _ => false,
        })
    }

    fn try_activate(&mut self, selector: BoolVar) -> bool {
        let snapshot = self.values.clone();
        let implications: Vec<(LinExpr, Rel, LinExpr)> = self
            .hard
            .iter()
            .filter_map(|a| match a {
                HardAssertion::Implies {
                    selector: s,
                    lhs,
                    rel,
                    rhs,
                } if *s == selector => Some((lhs.clone(), *rel, rhs.clone())),
                _ => None,
            })
            .collect();

        for (lhs, rel, rhs) in &implications {
            let ok = if *rel == Rel::Eq {
                self.resolve_equality(lhs, rhs) || self.check_rel(lhs, *rel, rhs)
            } else {
                self.check_rel(lhs, *rel, rhs)
            };
            if !ok {
                self.values = snapshot;
                return false;
            }
        }
        true
    }
}

impl MaxSmtBackend for GreedyMaxSmt {
    fn new_var(&mut self) -> Var {
        let v = Var(self.next_var);
        self.next_var += 1;
        v
    }

    fn new_bool(&mut self) -> BoolVar {
        let b = BoolVar(self.next_bool);
        self.next_bool += 1;
        b
    }

    fn add_hard(&mut self, assertion: HardAssertion) {
        self.hard.push(assertion);
    }

    fn add_soft(&mut self, assertion: SoftAssertion) {
        self.soft.push(assertion);
    }

    fn minimize(&mut self, _expr: &LinExpr) {
        // See the struct doc comment: determinism already pins the model.
    }

    fn maximize(&mut self, _expr: &LinExpr) {}

    fn check_with_deadline(&mut self, deadline: Instant) -> SolveOutcome {
        self.values.clear();
        self.bool_values.clear();

        if !self.propagate_plain() {
            return SolveOutcome::Unsat;
        }

        let mut order: Vec<usize> = (0..self.soft.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.soft[i].weight));

        for i in order {
            if Instant::now() > deadline {
                return SolveOutcome::Timeout;
            }
            let selector = self.soft[i].selector;
            let activated = !self.violates_at_most_one(selector) && self.try_activate(selector);
            self.bool_values.insert(selector, activated);
        }

        for a in self.hard.clone() {
            if let HardAssertion::ExactlyK { selectors, k } = a {
                let count = selectors
                    .iter()
                    .filter(|s| self.bool_value(**s))
                    .count();
                if count != k {
                    return SolveOutcome::Unsat;
                }
            }
        }

        SolveOutcome::Sat
    }

    fn bool_value(&self, b: BoolVar) -> bool {
        self.bool_values.get(&b).copied().unwrap_or(false)
    }

    fn var_value(&self, v: Var) -> Option<Rational> {
        self.values.get(&v).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewsynth_core::rational::int;

    #[test]
    fn plain_equalities_propagate_to_a_fixed_point() {
        let mut b = GreedyMaxSmt::new();
        let left = b.new_var();
        let right = b.new_var();
        let width = b.new_var();
        b.add_hard(HardAssertion::Plain {
            lhs: LinExpr::var(left),
            rel: Rel::Eq,
            rhs: LinExpr::constant(int(0)),
        });
        b.add_hard(HardAssertion::Plain {
            lhs: LinExpr::var(right),
            rel: Rel::Eq,
            rhs: LinExpr::constant(int(800)),
        });
        b.add_hard(HardAssertion::Plain {
            lhs: LinExpr::var(width),
            rel: Rel::Eq,
            rhs: LinExpr::var(right).plus_scaled(-int(1), left),
        });
        let outcome = b.check_with_deadline(Instant::now() + std::time::Duration::from_secs(1));
        assert_eq!(outcome, SolveOutcome::Sat);
        assert_eq!(b.var_value(width), Some(int(800)));
    }

    #[test]
    fn at_most_one_rejects_the_lower_weighted_conflicting_selector() {
        let mut b = GreedyMaxSmt::new();
        let y = b.new_var();
        let s1 = b.new_bool();
        let s2 = b.new_bool();
        b.add_hard(HardAssertion::AtMostOne {
            selectors: vec![s1, s2],
        });
        b.add_hard(HardAssertion::Implies {
            selector: s1,
            lhs: LinExpr::var(y),
            rel: Rel::Eq,
            rhs: LinExpr::constant(int(1)),
        });
        b.add_hard(HardAssertion::Implies {
            selector: s2,
            lhs: LinExpr::var(y),
            rel: Rel::Eq,
            rhs: LinExpr::constant(int(2)),
        });
        b.add_soft(SoftAssertion { selector: s1, weight: 900 });
        b.add_soft(SoftAssertion { selector: s2, weight: 100 });
        b.check_with_deadline(Instant::now() + std::time::Duration::from_secs(1));
        assert!(b.bool_value(s1));
        assert!(!b.bool_value(s2));
    }

    #[test]
    fn exactly_k_rejects_under_determined_selection() {
        let mut b = GreedyMaxSmt::new();
        let s1 = b.new_bool();
        b.add_hard(HardAssertion::ExactlyK {
            selectors: vec![s1],
            k: 2,
        });
        let outcome = b.check_with_deadline(Instant::now() + std::time::Duration::from_secs(1));
        assert_eq!(outcome, SolveOutcome::Unsat);
    }
}
