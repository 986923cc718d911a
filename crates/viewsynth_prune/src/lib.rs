// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The hierarchical MaxSMT pruner (spec §4.4–§4.5).
//!
//! Given the learner's per-template candidates, select a consistent subset
//! that determines every view's geometry exactly, by decomposing the whole
//! problem into one small MaxSMT query per internal "focus" view instead of
//! one monolithic query over the entire tree. [`prune_hierarchical`] is the
//! production entry point; [`prune_baseline`] runs the equivalent monolithic
//! query and exists for the consistency check of spec §8's S6 scenario.

pub mod backend;
pub mod encode;
pub mod sampling;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use viewsynth_core::{
    Conformance, ConstraintCandidate, Diagnostic, Rational, ViewId, ViewSynthError, ViewTree,
};

use backend::{GreedyMaxSmt, MaxSmtBackend, SolveOutcome};
use encode::{build_problem, read_rect, VarTable};

/// The fixed number of test conformances sampled per focus (spec §4.4: "the
/// paper uses 3" — min, mid, max).
pub const NUM_CONFORMANCES: usize = 3;

/// The root screen-size range the synthesis run is meant to be robust
/// across, used to seed the root focus's conformances.
#[derive(Copy, Clone, Debug)]
pub struct TestBounds {
    pub min_width: Rational,
    pub min_height: Rational,
    pub max_width: Rational,
    pub max_height: Rational,
    pub origin_x: Rational,
    pub origin_y: Rational,
}

impl TestBounds {
    pub fn new(min_width: Rational, min_height: Rational, max_width: Rational, max_height: Rational) -> Self {
        Self {
            min_width,
            min_height,
            max_width,
            max_height,
            origin_x: Rational::from_integer(0),
            origin_y: Rational::from_integer(0),
        }
    }

    fn root_conformances(&self) -> [Conformance; NUM_CONFORMANCES] {
        sampling::three_point(
            self.min_width,
            self.min_height,
            self.max_width,
            self.max_height,
            self.origin_x,
            self.origin_y,
        )
    }
}

/// Tuning knobs for the pruner beyond the screen-size range.
#[derive(Copy, Clone, Debug)]
pub struct PruneOptions {
    /// Minimum number of a focus's children that must be independently
    /// linked to it (spec §4.5's linking heuristic) before the selection is
    /// trusted rather than merely flagged as possibly degenerate. This is
    /// an Open Question the spec leaves as a tunable heuristic, not a hard
    /// solver constraint, so a violation is recorded as a [`Diagnostic`]
    /// rather than rejected.
    pub min_linked_children: usize,
    /// Per-focus MaxSMT query budget.
    pub per_focus_timeout: Duration,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self {
            min_linked_children: 2,
            per_focus_timeout: Duration::from_secs(5),
        }
    }
}

/// Candidates relevant to a focus view `F` (spec §4.4): `y` belongs to an
/// immediate child of `F`, and `x` (if present) belongs to `F` or one of
/// `F`'s immediate children.
fn relevant_candidates(
    tree: &ViewTree,
    focus: ViewId,
    candidates: &[ConstraintCandidate],
) -> Vec<ConstraintCandidate> {
    let focus_name = tree.name(focus);
    let child_names: Vec<&str> = tree.children_of(focus).iter().map(|&c| tree.name(c)).collect();
    candidates
        .iter()
        .filter(|cand| {
            let y_ok = child_names.contains(&cand.constraint.y.view.as_str());
            let x_ok = match &cand.constraint.x {
                None => true,
                Some(x) => x.view == focus_name || child_names.contains(&x.view.as_str()),
            };
            y_ok && x_ok
        })
        .cloned()
        .collect()
}

/// Whether `focus`'s selection satisfies the linking heuristic: at least
/// `min_linked_children` distinct children have some selected anchor whose
/// `x` anchor belongs to `focus` itself.
fn linking_satisfied(
    tree: &ViewTree,
    focus: ViewId,
    selected: &[ConstraintCandidate],
    min_linked_children: usize,
) -> bool {
    let focus_name = tree.name(focus);
    let children = tree.children_of(focus);
    if children.len() < 2 {
        return true;
    }
    let linked = children
        .iter()
        .filter(|&&child| {
            let child_name = tree.name(child);
            selected.iter().any(|cand| {
                cand.constraint.y.view == child_name
                    && cand
                        .constraint
                        .x
                        .as_ref()
                        .is_some_and(|x| x.view == focus_name)
            })
        })
        .count();
    linked >= min_linked_children.min(children.len())
}

fn solve_focus<B: MaxSmtBackend + Default>(
    tree: &ViewTree,
    focus: ViewId,
    candidates: &[ConstraintCandidate],
    conformances: &[Conformance],
    timeout: Duration,
) -> (B, VarTable, SolveOutcome, Vec<(usize, backend::BoolVar)>) {
    let mut solver = B::default();
    let mut vars = VarTable::default();
    let children: Vec<ViewId> = tree.children_of(focus).to_vec();
    tracing::debug!(
        focus = tree.name(focus),
        children = children.len(),
        candidates = candidates.len(),
        "solving focus"
    );
    let build = build_problem(&mut solver, &mut vars, tree, focus, &children, candidates, conformances);
    let outcome = solver.check_with_deadline(Instant::now() + timeout);
    tracing::debug!(focus = tree.name(focus), ?outcome, "focus solved");
    (solver, vars, outcome, build.selectors)
}

fn child_dims<B: MaxSmtBackend>(tree: &ViewTree, child: ViewId, solver: &B, vars: &VarTable) -> [Conformance; NUM_CONFORMANCES] {
    let name = tree.name(child);
    let mut out = [Conformance::new(
        Rational::from_integer(0),
        Rational::from_integer(0),
        Rational::from_integer(0),
        Rational::from_integer(0),
    ); NUM_CONFORMANCES];
    for j in 0..NUM_CONFORMANCES {
        if let Some((x, y, width, height)) = read_rect(solver, vars, name, j) {
            out[j] = Conformance::new(width, height, x, y);
        }
    }
    out
}

/// Run the hierarchical pruner with a caller-chosen backend type.
#[tracing::instrument(skip(candidates, tree, bounds, opts))]
pub fn prune_hierarchical_with<B: MaxSmtBackend + Default>(
    candidates: &[ConstraintCandidate],
    tree: &ViewTree,
    bounds: &TestBounds,
    opts: &PruneOptions,
) -> (Vec<ConstraintCandidate>, Vec<Diagnostic>) {
    let mut selected = Vec::new();
    let mut diagnostics = Vec::new();
    let mut worklist: VecDeque<(ViewId, [Conformance; NUM_CONFORMANCES])> = VecDeque::new();
    worklist.push_back((tree.root(), bounds.root_conformances()));

    while let Some((focus, conformances)) = worklist.pop_front() {
        if tree.is_leaf(focus) {
            // A leaf has no immediate children and is not queried.
            continue;
        }
        let relevant = relevant_candidates(tree, focus, candidates);
        let (solver, vars, outcome, selectors) =
            solve_focus::<B>(tree, focus, &relevant, &conformances, opts.per_focus_timeout);

        match outcome {
            SolveOutcome::Sat => {
                let picked: Vec<ConstraintCandidate> = selectors
                    .iter()
                    .filter(|(_, s)| solver.bool_value(*s))
                    .map(|(i, _)| relevant[*i].clone())
                    .collect();

                if !linking_satisfied(tree, focus, &picked, opts.min_linked_children) {
                    diagnostics.push(Diagnostic::new(
                        ViewSynthError::TemplateRejected(
                            "fewer than the configured minimum number of children are independently linked to their parent; the selection may be a degenerate rigid block".to_string(),
                        ),
                        tree.name(focus).to_string(),
                    ));
                }

                for &child in tree.children_of(focus) {
                    if !tree.is_leaf(child) {
                        worklist.push_back((child, child_dims(tree, child, &solver, &vars)));
                    }
                }
                selected.extend(picked);
            }
            SolveOutcome::Unsat => {
                diagnostics.push(Diagnostic::new(
                    ViewSynthError::SmtUnsat {
                        focus: tree.name(focus).to_string(),
                    },
                    "no consistent selection found for this focus".to_string(),
                ));
                for &child in tree.children_of(focus) {
                    if !tree.is_leaf(child) {
                        worklist.push_back((child, conformances));
                    }
                }
            }
            SolveOutcome::Timeout => {
                diagnostics.push(Diagnostic::new(
                    ViewSynthError::SmtTimeout {
                        focus: tree.name(focus).to_string(),
                    },
                    "per-focus deadline exceeded".to_string(),
                ));
                for &child in tree.children_of(focus) {
                    if !tree.is_leaf(child) {
                        worklist.push_back((child, conformances));
                    }
                }
            }
        }
    }

    tracing::info!(
        selected = selected.len(),
        diagnostics = diagnostics.len(),
        "hierarchical pruning finished"
    );
    (selected, diagnostics)
}

/// [`prune_hierarchical_with`] instantiated with the reference
/// [`GreedyMaxSmt`] backend.
pub fn prune_hierarchical(
    candidates: &[ConstraintCandidate],
    tree: &ViewTree,
    bounds: &TestBounds,
    opts: &PruneOptions,
) -> (Vec<ConstraintCandidate>, Vec<Diagnostic>) {
    prune_hierarchical_with::<GreedyMaxSmt>(candidates, tree, bounds, opts)
}

/// Run a single monolithic MaxSMT query over the entire tree at once,
/// rather than decomposing by focus view. Used by spec §8's S6 scenario to
/// check that the hierarchical decomposition agrees with the non-hierarchical
/// baseline on small trees.
#[tracing::instrument(skip(candidates, tree, bounds, opts))]
pub fn prune_baseline_with<B: MaxSmtBackend + Default>(
    candidates: &[ConstraintCandidate],
    tree: &ViewTree,
    bounds: &TestBounds,
    opts: &PruneOptions,
) -> (Vec<ConstraintCandidate>, Vec<Diagnostic>) {
    let conformances = bounds.root_conformances();
    let scope: Vec<ViewId> = tree.iter().filter(|&v| v != tree.root()).collect();

    let mut solver = B::default();
    let mut vars = VarTable::default();
    let build = build_problem(&mut solver, &mut vars, tree, tree.root(), &scope, candidates, &conformances);
    let outcome = solver.check_with_deadline(Instant::now() + opts.per_focus_timeout);
    tracing::debug!(?outcome, scope = scope.len(), "monolithic baseline query solved");

    match outcome {
        SolveOutcome::Sat => {
            let picked: Vec<ConstraintCandidate> = build
                .selectors
                .iter()
                .filter(|(_, s)| solver.bool_value(*s))
                .map(|(i, _)| candidates[*i].clone())
                .collect();
            (picked, Vec::new())
        }
        SolveOutcome::Unsat => (
            Vec::new(),
            vec![Diagnostic::new(
                ViewSynthError::SmtUnsat {
                    focus: tree.name(tree.root()).to_string(),
                },
                "monolithic baseline query was unsatisfiable".to_string(),
            )],
        ),
        SolveOutcome::Timeout => (
            Vec::new(),
            vec![Diagnostic::new(
                ViewSynthError::SmtTimeout {
                    focus: tree.name(tree.root()).to_string(),
                },
                "monolithic baseline query exceeded its deadline".to_string(),
            )],
        ),
    }
}

/// [`prune_baseline_with`] instantiated with the reference [`GreedyMaxSmt`]
/// backend.
pub fn prune_baseline(
    candidates: &[ConstraintCandidate],
    tree: &ViewTree,
    bounds: &TestBounds,
    opts: &PruneOptions,
) -> (Vec<ConstraintCandidate>, Vec<Diagnostic>) {
    prune_baseline_with::<GreedyMaxSmt>(candidates, tree, bounds, opts)
}
