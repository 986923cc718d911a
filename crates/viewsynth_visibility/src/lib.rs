// SPDX-License-Identifier: Apache-2.0 OR MIT

//! viewsynth visibility: the sweep-line visibility engine of spec §4.1.
//!
//! Given one example's [`ViewTree`], [`visible_pairs`] returns the set of
//! unordered anchor pairs such that an axis-aligned line can join a point
//! on one edge to a point on the other without crossing any other view's
//! edge. The instantiator (`viewsynth_instantiate`) unions this result
//! across every example to decide which anchor pairs are eligible for an
//! adjacency or alignment sketch.
//!
//! ## Algorithm
//!
//! For each non-leaf view `V` with children `{C1..Ck}`, two independent
//! sweeps run:
//!
//! - A **vertical sweep** over the x-coordinates where children start or
//!   end, querying which children's top/bottom edges span that x, sorted
//!   by y, bracketed by `V`'s own top and bottom. Adjacent entries in that
//!   order are visible to each other.
//! - A **horizontal sweep**, symmetric, over y-coordinates, vertical edges,
//!   bracketed by `V`'s own left and right.
//!
//! Each adjacent pair also contributes a `center_y`-`center_y` (vertical
//! sweep) or `center_x`-`center_x` (horizontal sweep) pair for the same two
//! views, used downstream for center-alignment sketches.
//!
//! This is a pure function of geometry: it never fails.

use std::collections::BTreeSet;
use viewsynth_core::{Attribute, AnchorId, ViewId, ViewTree, Rational};

/// An unordered pair of anchors with unobstructed line of sight between
/// their edges.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgePair(pub AnchorId, pub AnchorId);

impl EdgePair {
    /// Construct a pair in canonical (sorted) order so that `(a, b)` and
    /// `(b, a)` compare equal and hash identically.
    pub fn new(a: AnchorId, b: AnchorId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// Whether `id` is one of this pair's two anchors.
    pub fn contains(&self, id: &AnchorId) -> bool {
        &self.0 == id || &self.1 == id
    }
}

#[derive(Clone, Copy)]
struct Candidate<'a> {
    view: ViewId,
    attr: Attribute,
    name: &'a str,
    /// The fixed coordinate along the attribute's own axis.
    at: Rational,
    /// Perpendicular span start.
    span_lo: Rational,
    /// Perpendicular span end.
    span_hi: Rational,
}

/// Compute the full visibility pair set for every non-leaf view in `tree`.
pub fn visible_pairs(tree: &ViewTree) -> BTreeSet<EdgePair> {
    let mut out = BTreeSet::new();
    for view in tree.iter() {
        if !tree.is_leaf(view) {
            sweep_view(tree, view, &mut out);
        }
    }
    out
}

fn sweep_view(tree: &ViewTree, view: ViewId, out: &mut BTreeSet<EdgePair>) {
    let children = tree.children_of(view);
    let rect = tree.rect(view);

    // Vertical sweep: horizontal edges (top/bottom) bracketed by V.top/V.bottom.
    let mut hedges: Vec<Candidate<'_>> = Vec::with_capacity(children.len() * 2);
    let mut sweep_xs: Vec<Rational> = Vec::with_capacity(children.len() * 2);
    for &c in children {
        let cr = tree.rect(c);
        let name = tree.name(c);
        hedges.push(Candidate {
            view: c,
            attr: Attribute::Top,
            name,
            at: cr.top(),
            span_lo: cr.left(),
            span_hi: cr.right(),
        });
        hedges.push(Candidate {
            view: c,
            attr: Attribute::Bottom,
            name,
            at: cr.bottom(),
            span_lo: cr.left(),
            span_hi: cr.right(),
        });
        sweep_xs.push(cr.left());
        sweep_xs.push(cr.right());
    }
    sweep_xs.sort();
    sweep_xs.dedup();

    let v_name = tree.name(view);
    let top_sentinel = Candidate {
        view,
        attr: Attribute::Top,
        name: v_name,
        at: rect.top(),
        span_lo: rect.left(),
        span_hi: rect.right(),
    };
    let bottom_sentinel = Candidate {
        view,
        attr: Attribute::Bottom,
        name: v_name,
        at: rect.bottom(),
        span_lo: rect.left(),
        span_hi: rect.right(),
    };

    for &x in &sweep_xs {
        let mut hits: Vec<Candidate<'_>> = hedges
            .iter()
            .copied()
            .filter(|e| !(cr_empty(e.span_lo, e.span_hi)) && e.span_lo <= x && x <= e.span_hi)
            .collect();
        hits.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.name.cmp(b.name)));

        let mut sequence = Vec::with_capacity(hits.len() + 2);
        sequence.push(top_sentinel);
        sequence.extend(hits.drain(..));
        sequence.push(bottom_sentinel);

        emit_adjacent(&sequence, Attribute::CenterY, out);
    }

    // Horizontal sweep: vertical edges (left/right) bracketed by V.left/V.right.
    let mut vedges: Vec<Candidate<'_>> = Vec::with_capacity(children.len() * 2);
    let mut sweep_ys: Vec<Rational> = Vec::with_capacity(children.len() * 2);
    for &c in children {
        let cr = tree.rect(c);
        let name = tree.name(c);
        vedges.push(Candidate {
            view: c,
            attr: Attribute::Left,
            name,
            at: cr.left(),
            span_lo: cr.top(),
            span_hi: cr.bottom(),
        });
        vedges.push(Candidate {
            view: c,
            attr: Attribute::Right,
            name,
            at: cr.right(),
            span_lo: cr.top(),
            span_hi: cr.bottom(),
        });
        sweep_ys.push(cr.top());
        sweep_ys.push(cr.bottom());
    }
    sweep_ys.sort();
    sweep_ys.dedup();

    let left_sentinel = Candidate {
        view,
        attr: Attribute::Left,
        name: v_name,
        at: rect.left(),
        span_lo: rect.top(),
        span_hi: rect.bottom(),
    };
    let right_sentinel = Candidate {
        view,
        attr: Attribute::Right,
        name: v_name,
        at: rect.right(),
        span_lo: rect.top(),
        span_hi: rect.bottom(),
    };

    for &y in &sweep_ys {
        let mut hits: Vec<Candidate<'_>> = vedges
            .iter()
            .copied()
            .filter(|e| !(cr_empty(e.span_lo, e.span_hi)) && e.span_lo <= y && y <= e.span_hi)
            .collect();
        hits.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.name.cmp(b.name)));

        let mut sequence = Vec::with_capacity(hits.len() + 2);
        sequence.push(left_sentinel);
        sequence.extend(hits.drain(..));
        sequence.push(right_sentinel);

        emit_adjacent(&sequence, Attribute::CenterX, out);
    }
}

/// A zero-area span never participates in a sweep hit (spec §4.1's
/// "zero-area views are ignored" edge case).
fn cr_empty(lo: Rational, hi: Rational) -> bool {
    lo >= hi
}

fn emit_adjacent(sequence: &[Candidate<'_>], center_attr: Attribute, out: &mut BTreeSet<EdgePair>) {
    for pair in sequence.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        if p1.view == p2.view {
            // Edges belonging to the same view are never paired.
            continue;
        }
        out.insert(EdgePair::new(
            AnchorId::new(p1.name, p1.attr),
            AnchorId::new(p2.name, p2.attr),
        ));
        out.insert(EdgePair::new(
            AnchorId::new(p1.name, center_attr),
            AnchorId::new(p2.name, center_attr),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewsynth_core::{Rect, ViewSpec};
    use viewsynth_core::rational::int;

    fn rect(l: i64, t: i64, r: i64, b: i64) -> Rect {
        Rect::new(int(l), int(t), int(r), int(b)).unwrap()
    }

    fn leaf(name: &str, r: Rect) -> ViewSpec {
        ViewSpec {
            name: name.into(),
            rect: r,
            children: vec![],
        }
    }

    #[test]
    fn adjacent_siblings_are_visible_but_not_through_a_blocker() {
        // Three horizontally-adjacent siblings A|B|C.
        let spec = ViewSpec {
            name: "root".into(),
            rect: rect(0, 0, 300, 100),
            children: vec![
                leaf("a", rect(0, 0, 100, 100)),
                leaf("b", rect(100, 0, 200, 100)),
                leaf("c", rect(200, 0, 300, 100)),
            ],
        };
        let tree = ViewTree::build(spec).unwrap();
        let pairs = visible_pairs(&tree);

        let ar = AnchorId::new("a", Attribute::Right);
        let bl = AnchorId::new("b", Attribute::Left);
        let br = AnchorId::new("b", Attribute::Right);
        let cl = AnchorId::new("c", Attribute::Left);
        let al = AnchorId::new("a", Attribute::Left);
        let cr = AnchorId::new("c", Attribute::Right);

        assert!(pairs.contains(&EdgePair::new(ar.clone(), bl.clone())));
        assert!(pairs.contains(&EdgePair::new(br.clone(), cl.clone())));
        assert!(!pairs.contains(&EdgePair::new(ar, cl)));
        assert!(!pairs.contains(&EdgePair::new(al, cr)));
    }

    #[test]
    fn visibility_pairs_are_symmetric_by_construction() {
        let a = AnchorId::new("a", Attribute::Right);
        let b = AnchorId::new("b", Attribute::Left);
        assert_eq!(EdgePair::new(a.clone(), b.clone()), EdgePair::new(b, a));
    }

    #[test]
    fn header_visible_to_both_sidebar_and_main() {
        let spec = ViewSpec {
            name: "root".into(),
            rect: rect(0, 0, 1000, 600),
            children: vec![
                leaf("header", rect(0, 0, 1000, 80)),
                leaf("sidebar", rect(0, 80, 200, 600)),
                leaf("main", rect(200, 80, 1000, 600)),
            ],
        };
        let tree = ViewTree::build(spec).unwrap();
        let pairs = visible_pairs(&tree);
        assert!(pairs.contains(&EdgePair::new(
            AnchorId::new("header", Attribute::Bottom),
            AnchorId::new("sidebar", Attribute::Top),
        )));
        assert!(pairs.contains(&EdgePair::new(
            AnchorId::new("header", Attribute::Bottom),
            AnchorId::new("main", Attribute::Top),
        )));
    }

    #[test]
    fn zero_area_view_is_ignored() {
        let spec = ViewSpec {
            name: "root".into(),
            rect: rect(0, 0, 100, 100),
            children: vec![leaf("degenerate", rect(50, 50, 50, 90))],
        };
        let tree = ViewTree::build(spec).unwrap();
        let pairs = visible_pairs(&tree);
        for pair in &pairs {
            assert!(!pair.contains(&AnchorId::new("degenerate", Attribute::Top)));
            assert!(!pair.contains(&AnchorId::new("degenerate", Attribute::Bottom)));
        }
    }
}
