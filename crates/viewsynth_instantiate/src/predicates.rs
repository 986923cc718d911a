//! Relationship predicates over ordered anchor pairs (spec §4.2).

use std::collections::BTreeSet;
use viewsynth_core::{Attribute, ViewId, ViewTree};
use viewsynth_visibility::EdgePair;

/// `y`'s view is the same as `x`'s view.
pub fn same_view(yv: ViewId, xv: ViewId) -> bool {
    yv == xv
}

/// `y`'s view is an immediate child of `x`'s view.
pub fn parent(tree: &ViewTree, yv: ViewId, xv: ViewId) -> bool {
    tree.parent_of(yv) == Some(xv)
}

/// `y` and `x` are distinct views sharing a parent.
pub fn sibling(tree: &ViewTree, yv: ViewId, xv: ViewId) -> bool {
    yv != xv && tree.parent_of(yv).is_some() && tree.parent_of(yv) == tree.parent_of(xv)
}

pub fn same_attr(ya: Attribute, xa: Attribute) -> bool {
    ya == xa
}

/// `LEFT<->RIGHT` or `TOP<->BOTTOM`.
pub fn dual_attr(ya: Attribute, xa: Attribute) -> bool {
    ya.is_dual_of(xa)
}

pub fn both_size(ya: Attribute, xa: Attribute) -> bool {
    ya.is_size() && xa.is_size()
}

pub fn both_pos(ya: Attribute, xa: Attribute) -> bool {
    ya.is_position() && xa.is_position()
}

pub fn both_h(ya: Attribute, xa: Attribute) -> bool {
    ya.is_horizontal() && xa.is_horizontal()
}

pub fn both_v(ya: Attribute, xa: Attribute) -> bool {
    ya.is_vertical() && xa.is_vertical()
}

/// The union, across every example, of whether the edge pair `(y, x)` is in
/// that example's visibility set.
pub fn visible(
    union_pairs: &BTreeSet<EdgePair>,
    y: &viewsynth_core::AnchorId,
    x: &viewsynth_core::AnchorId,
) -> bool {
    union_pairs.contains(&EdgePair::new(y.clone(), x.clone()))
}

/// Alignment visibility: two sibling views are "visible" for a same-attribute
/// alignment sketch iff they are mutually visible along the perpendicular
/// axis, derived from pair visibility aggregated to the view level
/// (`h_vis_view`/`v_vis_view`): presence of the corresponding
/// `center_x`-`center_x` or `center_y`-`center_y` pair, which our sweep
/// emits whenever two views are adjacent along that axis.
pub fn cross_axis_view_visible(
    union_pairs: &BTreeSet<EdgePair>,
    attr: Attribute,
    y_view_name: &str,
    x_view_name: &str,
) -> bool {
    let center = attr.axis_center();
    // The *perpendicular* axis's center attribute is the opposite of the
    // shared attribute's own axis: a vertical attribute (Top/Bottom/CenterY)
    // aligns via horizontal (CenterX) mutual visibility, and vice versa.
    let perpendicular_center = match center {
        Attribute::CenterX => Attribute::CenterY,
        Attribute::CenterY => Attribute::CenterX,
        _ => unreachable!("axis_center always returns CenterX or CenterY"),
    };
    let a = viewsynth_core::AnchorId::new(y_view_name, perpendicular_center);
    let b = viewsynth_core::AnchorId::new(x_view_name, perpendicular_center);
    union_pairs.contains(&EdgePair::new(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewsynth_core::rational::int;
    use viewsynth_core::{Rect, ViewSpec};

    fn rect(l: i64, t: i64, r: i64, b: i64) -> Rect {
        Rect::new(int(l), int(t), int(r), int(b)).unwrap()
    }

    #[test]
    fn relationship_predicates() {
        let spec = ViewSpec {
            name: "root".into(),
            rect: rect(0, 0, 100, 100),
            children: vec![
                ViewSpec {
                    name: "a".into(),
                    rect: rect(0, 0, 50, 100),
                    children: vec![],
                },
                ViewSpec {
                    name: "b".into(),
                    rect: rect(50, 0, 100, 100),
                    children: vec![],
                },
            ],
        };
        let tree = ViewTree::build(spec).unwrap();
        let root = tree.root();
        let a = tree.by_name("a").unwrap();
        let b = tree.by_name("b").unwrap();

        assert!(parent(&tree, a, root));
        assert!(!parent(&tree, root, a));
        assert!(sibling(&tree, a, b));
        assert!(!sibling(&tree, a, root));
        assert!(same_view(a, a));
        assert!(!same_view(a, b));
    }
}
