// SPDX-License-Identifier: Apache-2.0 OR MIT

//! viewsynth instantiate: the template instantiator of spec §4.2.
//!
//! Given a set of example [`ViewTree`]s, assumed structurally isomorphic
//! (same view names and hierarchy, possibly different coordinates),
//! [`instantiate`] enumerates every well-formed constraint sketch: a
//! [`Constraint`] with `sample_count == 0` and default parameters, whose
//! `(kind, y, x)` is fixed but whose numeric parameters are not. The
//! `viewsynth_learn` crate fits those parameters from the example values.

pub mod predicates;

use std::collections::BTreeSet;
use viewsynth_core::{AnchorId, Attribute, Constraint, ConstraintKind, ViewId, ViewSynthError, ViewTree};
use viewsynth_visibility::{visible_pairs, EdgePair};

/// Enumerate all constraint sketches over `examples`.
///
/// Every example must share the same view names and hierarchy (spec §1's
/// Non-goal on non-isomorphic example sets); mismatches are reported as
/// [`ViewSynthError::InvalidInput`].
pub fn instantiate(examples: &[ViewTree]) -> Result<Vec<Constraint>, ViewSynthError> {
    let topology = examples
        .first()
        .ok_or_else(|| ViewSynthError::invalid_input("no example trees were given"))?;
    for other in &examples[1..] {
        if !viewsynth_core::same_topology(topology, other) {
            return Err(ViewSynthError::invalid_input(
                "example trees are not structurally isomorphic",
            ));
        }
    }

    let mut union_pairs: BTreeSet<EdgePair> = BTreeSet::new();
    for example in examples {
        union_pairs.extend(visible_pairs(example));
    }

    let mut out = Vec::new();
    for view in topology.iter() {
        size_constant_sketches(topology, view, &mut out);
        aspect_ratio_sketch(topology, view, &mut out);
        parent_ratio_sketches(topology, view, &mut out);
        parent_offset_sketches(topology, view, &union_pairs, &mut out);
        sibling_sketches(topology, view, &union_pairs, &mut out);
    }
    Ok(out)
}

/// `SIZE_CONSTANT`: a single anchor `y` with `is_size(y)`.
fn size_constant_sketches(tree: &ViewTree, view: ViewId, out: &mut Vec<Constraint>) {
    let name = tree.name(view);
    for attr in [Attribute::Width, Attribute::Height] {
        out.push(Constraint::template(
            ConstraintKind::SizeConstant,
            AnchorId::new(name, attr),
            None,
        ));
    }
}

/// `SIZE_ASPECT_RATIO`: `same_view ∧ both_size ∧ is_horizontal(y) ∧ is_vertical(x)`.
///
/// `Width` and `Height` are the only size attributes, so the only pair
/// satisfying `is_horizontal(y) ∧ is_vertical(x)` is `y = width, x = height`.
fn aspect_ratio_sketch(tree: &ViewTree, view: ViewId, out: &mut Vec<Constraint>) {
    let name = tree.name(view);
    out.push(Constraint::template(
        ConstraintKind::SizeAspectRatio,
        AnchorId::new(name, Attribute::Width),
        Some(AnchorId::new(name, Attribute::Height)),
    ));
}

/// `SIZE_RATIO`: `parent ∧ both_size ∧ (both_h ∨ both_v)`.
///
/// The only same-category size pairs are `width/width` and `height/height`.
fn parent_ratio_sketches(tree: &ViewTree, view: ViewId, out: &mut Vec<Constraint>) {
    let Some(parent) = tree.parent_of(view) else {
        return;
    };
    let name = tree.name(view);
    let parent_name = tree.name(parent);
    for attr in [Attribute::Width, Attribute::Height] {
        out.push(Constraint::template(
            ConstraintKind::SizeRatio,
            AnchorId::new(name, attr),
            Some(AnchorId::new(parent_name, attr)),
        ));
    }
}

/// `POS_LTRB_OFFSET` (adjacent, parent branch):
/// `parent ∧ both_pos ∧ same_attr ∧ visible`.
fn parent_offset_sketches(
    tree: &ViewTree,
    view: ViewId,
    union_pairs: &BTreeSet<EdgePair>,
    out: &mut Vec<Constraint>,
) {
    let Some(parent) = tree.parent_of(view) else {
        return;
    };
    let name = tree.name(view);
    let parent_name = tree.name(parent);
    for attr in Attribute::ALL.into_iter().filter(|a| a.is_position()) {
        let y = AnchorId::new(name, attr);
        let x = AnchorId::new(parent_name, attr);
        if predicates::visible(union_pairs, &y, &x) {
            out.push(Constraint::template(
                ConstraintKind::PosLtrbOffset,
                y,
                Some(x),
            ));
        }
    }
}

/// `POS_LTRB_OFFSET`, both branches keyed on siblings:
/// adjacent (`sibling ∧ both_pos ∧ dual_attr ∧ visible`) and aligned
/// (`sibling ∧ both_pos ∧ same_attr ∧ cross_axis_view_visible`).
fn sibling_sketches(
    tree: &ViewTree,
    view: ViewId,
    union_pairs: &BTreeSet<EdgePair>,
    out: &mut Vec<Constraint>,
) {
    let name = tree.name(view);
    for sib in tree.siblings_of(view) {
        let sib_name = tree.name(sib);

        for attr_y in [
            Attribute::Left,
            Attribute::Right,
            Attribute::Top,
            Attribute::Bottom,
        ] {
            let Some(attr_x) = attr_y.dual() else {
                continue;
            };
            let y = AnchorId::new(name, attr_y);
            let x = AnchorId::new(sib_name, attr_x);
            if predicates::visible(union_pairs, &y, &x) {
                out.push(Constraint::template(
                    ConstraintKind::PosLtrbOffset,
                    y,
                    Some(x),
                ));
            }
        }

        for attr in Attribute::ALL.into_iter().filter(|a| a.is_position()) {
            let y = AnchorId::new(name, attr);
            let x = AnchorId::new(sib_name, attr);
            if predicates::cross_axis_view_visible(union_pairs, attr, name, sib_name) {
                out.push(Constraint::template(
                    ConstraintKind::PosLtrbOffset,
                    y,
                    Some(x),
                ));
            }
        }
    }
}
