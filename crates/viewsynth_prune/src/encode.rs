//! Building the per-focus MaxSMT subproblem of spec §4.5: variables,
//! geometry axioms, containment, candidate implications, and the
//! determinism pseudo-boolean constraints.

use std::collections::HashMap;

use viewsynth_core::{Attribute, Conformance, ConstraintCandidate, Op, Rational, ViewId, ViewTree};

use crate::backend::{BoolVar, HardAssertion, LinExpr, MaxSmtBackend, Rel, SoftAssertion, Var};

/// Maps `(view name, attribute, conformance index)` to the backend
/// variable representing that anchor at that test point, allocating
/// lazily so only anchors actually referenced get a variable.
#[derive(Default)]
pub struct VarTable {
    vars: HashMap<(String, Attribute, usize), Var>,
}

impl VarTable {
    pub fn get_or_create<B: MaxSmtBackend>(
        &mut self,
        backend: &mut B,
        view: &str,
        attr: Attribute,
        j: usize,
    ) -> Var {
        *self
            .vars
            .entry((view.to_string(), attr, j))
            .or_insert_with(|| backend.new_var())
    }

    pub fn get(&self, view: &str, attr: Attribute, j: usize) -> Option<Var> {
        self.vars.get(&(view.to_string(), attr, j)).copied()
    }
}

fn ensure_view_vars<B: MaxSmtBackend>(
    backend: &mut B,
    vars: &mut VarTable,
    tree: &ViewTree,
    view: ViewId,
    num_conformances: usize,
) {
    let name = tree.name(view).to_string();
    for j in 0..num_conformances {
        for attr in Attribute::ALL {
            vars.get_or_create(backend, &name, attr, j);
        }
    }
}

/// The four geometry axioms of spec §4.5: size-from-edges, center-from-edges,
/// and the two non-degeneracy inequalities.
fn add_geometry_axioms<B: MaxSmtBackend>(backend: &mut B, vars: &VarTable, view: &str, j: usize) {
    let left = vars.get(view, Attribute::Left, j).unwrap();
    let top = vars.get(view, Attribute::Top, j).unwrap();
    let right = vars.get(view, Attribute::Right, j).unwrap();
    let bottom = vars.get(view, Attribute::Bottom, j).unwrap();
    let center_x = vars.get(view, Attribute::CenterX, j).unwrap();
    let center_y = vars.get(view, Attribute::CenterY, j).unwrap();
    let width = vars.get(view, Attribute::Width, j).unwrap();
    let height = vars.get(view, Attribute::Height, j).unwrap();

    let half = Rational::new(1, 2);

    backend.add_hard(HardAssertion::Plain {
        lhs: LinExpr::var(width),
        rel: Rel::Eq,
        rhs: LinExpr::var(right).plus_scaled(-Rational::from_integer(1), left),
    });
    backend.add_hard(HardAssertion::Plain {
        lhs: LinExpr::var(height),
        rel: Rel::Eq,
        rhs: LinExpr::var(bottom).plus_scaled(-Rational::from_integer(1), top),
    });
    backend.add_hard(HardAssertion::Plain {
        lhs: LinExpr::var(center_x),
        rel: Rel::Eq,
        rhs: LinExpr::scaled(half, left).plus_scaled(half, right),
    });
    backend.add_hard(HardAssertion::Plain {
        lhs: LinExpr::var(center_y),
        rel: Rel::Eq,
        rhs: LinExpr::scaled(half, top).plus_scaled(half, bottom),
    });
    backend.add_hard(HardAssertion::Plain {
        lhs: LinExpr::var(left),
        rel: Rel::Le,
        rhs: LinExpr::var(right),
    });
    backend.add_hard(HardAssertion::Plain {
        lhs: LinExpr::var(top),
        rel: Rel::Le,
        rhs: LinExpr::var(bottom),
    });
}

/// Weak containment of `child` within `parent` (spec's Open Question:
/// touching edges are allowed, so these are `<=`/`>=`, not strict).
fn add_containment<B: MaxSmtBackend>(
    backend: &mut B,
    vars: &VarTable,
    parent: &str,
    child: &str,
    j: usize,
) {
    let p_left = vars.get(parent, Attribute::Left, j).unwrap();
    let p_top = vars.get(parent, Attribute::Top, j).unwrap();
    let p_right = vars.get(parent, Attribute::Right, j).unwrap();
    let p_bottom = vars.get(parent, Attribute::Bottom, j).unwrap();
    let c_left = vars.get(child, Attribute::Left, j).unwrap();
    let c_top = vars.get(child, Attribute::Top, j).unwrap();
    let c_right = vars.get(child, Attribute::Right, j).unwrap();
    let c_bottom = vars.get(child, Attribute::Bottom, j).unwrap();

    backend.add_hard(HardAssertion::Plain {
        lhs: LinExpr::var(c_left),
        rel: Rel::Ge,
        rhs: LinExpr::var(p_left),
    });
    backend.add_hard(HardAssertion::Plain {
        lhs: LinExpr::var(c_top),
        rel: Rel::Ge,
        rhs: LinExpr::var(p_top),
    });
    backend.add_hard(HardAssertion::Plain {
        lhs: LinExpr::var(c_right),
        rel: Rel::Le,
        rhs: LinExpr::var(p_right),
    });
    backend.add_hard(HardAssertion::Plain {
        lhs: LinExpr::var(c_bottom),
        rel: Rel::Le,
        rhs: LinExpr::var(p_bottom),
    });
}

fn op_to_rel(op: Op) -> Rel {
    match op {
        Op::Eq => Rel::Eq,
        Op::Le => Rel::Le,
        Op::Ge => Rel::Ge,
    }
}

fn add_candidate_implication<B: MaxSmtBackend>(
    backend: &mut B,
    vars: &mut VarTable,
    cand: &ConstraintCandidate,
    selector: BoolVar,
    j: usize,
) {
    let c = &cand.constraint;
    let y_var = vars.get_or_create(backend, &c.y.view, c.y.attr, j);
    let rhs = match &c.x {
        Some(x) => {
            let x_var = vars.get_or_create(backend, &x.view, x.attr, j);
            LinExpr::scaled(c.a, x_var).plus_constant(c.b)
        }
        None => LinExpr::constant(c.b),
    };
    backend.add_hard(HardAssertion::Implies {
        selector,
        lhs: LinExpr::var(y_var),
        rel: op_to_rel(c.op),
        rhs,
    });
}

/// Everything a solved focus subproblem needs to hand back: which
/// candidates were selected, and the backend/vars table to read resolved
/// child anchor values from (for child-dimension inference).
pub struct ProblemBuild {
    pub selectors: Vec<(usize, BoolVar)>,
}

/// Build the hard/soft assertions for one focus subproblem.
///
/// `root_view`'s own anchors are fixed directly from `conformances`;
/// `scope` is the set of views that get full geometry/containment/
/// candidate-implication/determinism treatment relative to their actual
/// parent in `tree` (which must be `root_view` or another scope member).
/// This single routine serves both the hierarchical pruner (`scope` =
/// immediate children of one focus) and the monolithic baseline (`scope`
/// = every non-root view at once).
#[allow(clippy::too_many_arguments)]
pub fn build_problem<B: MaxSmtBackend>(
    backend: &mut B,
    vars: &mut VarTable,
    tree: &ViewTree,
    root_view: ViewId,
    scope: &[ViewId],
    candidates: &[ConstraintCandidate],
    conformances: &[Conformance],
) -> ProblemBuild {
    ensure_view_vars(backend, vars, tree, root_view, conformances.len());
    let root_name = tree.name(root_view).to_string();
    for (j, k) in conformances.iter().enumerate() {
        let left = vars.get(&root_name, Attribute::Left, j).unwrap();
        let top = vars.get(&root_name, Attribute::Top, j).unwrap();
        let right = vars.get(&root_name, Attribute::Right, j).unwrap();
        let bottom = vars.get(&root_name, Attribute::Bottom, j).unwrap();
        backend.add_hard(HardAssertion::Plain {
            lhs: LinExpr::var(left),
            rel: Rel::Eq,
            rhs: LinExpr::constant(k.x),
        });
        backend.add_hard(HardAssertion::Plain {
            lhs: LinExpr::var(top),
            rel: Rel::Eq,
            rhs: LinExpr::constant(k.y),
        });
        backend.add_hard(HardAssertion::Plain {
            lhs: LinExpr::var(right),
            rel: Rel::Eq,
            rhs: LinExpr::constant(k.x + k.width),
        });
        backend.add_hard(HardAssertion::Plain {
            lhs: LinExpr::var(bottom),
            rel: Rel::Eq,
            rhs: LinExpr::constant(k.y + k.height),
        });
        add_geometry_axioms(backend, vars, &root_name, j);
    }

    for &view in scope {
        ensure_view_vars(backend, vars, tree, view, conformances.len());
        let name = tree.name(view).to_string();
        let parent = tree
            .parent_of(view)
            .expect("scope members always have a parent (root_view is never in scope)");
        let parent_name = tree.name(parent).to_string();
        for j in 0..conformances.len() {
            add_geometry_axioms(backend, vars, &name, j);
            add_containment(backend, vars, &parent_name, &name, j);
        }
    }

    let mut selectors = Vec::new();
    for (i, cand) in candidates.iter().enumerate() {
        let y_in_scope = scope.iter().any(|&v| tree.name(v) == cand.constraint.y.view);
        if !y_in_scope {
            continue;
        }
        let selector = backend.new_bool();
        selectors.push((i, selector));
        for j in 0..conformances.len() {
            add_candidate_implication(backend, vars, cand, selector, j);
        }
        backend.add_soft(SoftAssertion {
            selector,
            weight: cand.whole_score(),
        });
    }

    for &view in scope {
        let name = tree.name(view).to_string();
        for attr in Attribute::ALL {
            let per_anchor: Vec<BoolVar> = selectors
                .iter()
                .filter(|(i, _)| {
                    let y = &candidates[*i].constraint.y;
                    y.view == name && y.attr == attr
                })
                .map(|(_, s)| *s)
                .collect();
            if per_anchor.len() > 1 {
                backend.add_hard(HardAssertion::AtMostOne { selectors: per_anchor });
            }
        }
        for axis_is_horizontal in [true, false] {
            let axis_selectors: Vec<BoolVar> = selectors
                .iter()
                .filter(|(i, _)| {
                    let y = &candidates[*i].constraint.y;
                    y.view == name && y.attr.is_horizontal() == axis_is_horizontal
                })
                .map(|(_, s)| *s)
                .collect();
            backend.add_hard(HardAssertion::ExactlyK {
                selectors: axis_selectors,
                k: 2,
            });
        }
    }

    ProblemBuild { selectors }
}

/// Read the resolved `(x, y, width, height)` rect of `view` at conformance
/// `j` off a solved backend. Determinism guarantees the model pins every
/// anchor to exactly one value, so this is a direct read rather than an
/// optimization query (see [`crate::backend::MaxSmtBackend::minimize`]'s
/// doc comment).
pub fn read_rect<B: MaxSmtBackend>(
    backend: &B,
    vars: &VarTable,
    view: &str,
    j: usize,
) -> Option<(Rational, Rational, Rational, Rational)> {
    let left = backend.var_value(vars.get(view, Attribute::Left, j)?)?;
    let top = backend.var_value(vars.get(view, Attribute::Top, j)?)?;
    let width = backend.var_value(vars.get(view, Attribute::Width, j)?)?;
    let height = backend.var_value(vars.get(view, Attribute::Height, j)?)?;
    Some((left, top, width, height))
}
