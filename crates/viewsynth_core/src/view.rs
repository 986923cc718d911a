//! The view tree: an arena of immutable, named rectangular views.
//!
//! Per the design notes, the tree is the sole owner of its nodes; anchors
//! and edges never hold their own reference-counted pointers into it, they
//! are keyed lookups by `(view_name, attribute)` resolved against a
//! `&ViewTree` borrow. This avoids any cyclic ownership between view,
//! anchor, and edge.

use crate::error::ViewSynthError;
use crate::geometry::Rect;
use std::collections::HashMap;

/// Opaque index of a view within its owning [`ViewTree`]'s arena.
///
/// Not meaningful across trees; always resolve anchors by name instead of
/// carrying a `ViewId` between examples.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ViewId(usize);

struct ViewNode {
    name: String,
    rect: Rect,
    parent: Option<ViewId>,
    children: Vec<ViewId>,
}

/// A single example layout: an immutable tree of named rectangular views.
pub struct ViewTree {
    nodes: Vec<ViewNode>,
    by_name: HashMap<String, ViewId>,
    root: ViewId,
}

/// The plain recursive shape used to build a [`ViewTree`], independent of
/// any serialization format (that lives in the `viewsynth_io` crate).
#[derive(Clone, Debug)]
pub struct ViewSpec {
    pub name: String,
    pub rect: Rect,
    pub children: Vec<ViewSpec>,
}

impl ViewTree {
    /// Build a tree from a [`ViewSpec`], validating that view names are
    /// unique within the tree.
    pub fn build(spec: ViewSpec) -> Result<Self, ViewSynthError> {
        let mut nodes = Vec::new();
        let mut by_name = HashMap::new();
        let root = Self::insert(&mut nodes, &mut by_name, spec, None)?;
        Ok(Self {
            nodes,
            by_name,
            root,
        })
    }

    fn insert(
        nodes: &mut Vec<ViewNode>,
        by_name: &mut HashMap<String, ViewId>,
        spec: ViewSpec,
        parent: Option<ViewId>,
    ) -> Result<ViewId, ViewSynthError> {
        if by_name.contains_key(&spec.name) {
            return Err(ViewSynthError::invalid_input(format!(
                "duplicate view name `{}`",
                spec.name
            )));
        }
        let id = ViewId(nodes.len());
        nodes.push(ViewNode {
            name: spec.name.clone(),
            rect: spec.rect,
            parent,
            children: Vec::new(),
        });
        by_name.insert(spec.name, id);
        let mut children = Vec::with_capacity(spec.children.len());
        for child in spec.children {
            children.push(Self::insert(nodes, by_name, child, Some(id))?);
        }
        nodes[id.0].children = children;
        Ok(id)
    }

    /// The root view's id.
    pub fn root(&self) -> ViewId {
        self.root
    }

    /// Look up a view by name.
    pub fn by_name(&self, name: &str) -> Option<ViewId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: ViewId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn rect(&self, id: ViewId) -> Rect {
        self.nodes[id.0].rect
    }

    pub fn parent_of(&self, id: ViewId) -> Option<ViewId> {
        self.nodes[id.0].parent
    }

    pub fn children_of(&self, id: ViewId) -> &[ViewId] {
        &self.nodes[id.0].children
    }

    pub fn is_leaf(&self, id: ViewId) -> bool {
        self.children_of(id).is_empty()
    }

    /// Number of views in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate all view ids in arena (pre-order-ish, stable) order.
    pub fn iter(&self) -> impl Iterator<Item = ViewId> + '_ {
        (0..self.nodes.len()).map(ViewId)
    }

    /// Pre-order depth-first traversal starting from `id`.
    pub fn walk_preorder(&self, id: ViewId) -> Vec<ViewId> {
        let mut out = Vec::new();
        self.walk_preorder_into(id, &mut out);
        out
    }

    fn walk_preorder_into(&self, id: ViewId, out: &mut Vec<ViewId>) {
        out.push(id);
        for &child in self.children_of(id) {
            self.walk_preorder_into(child, out);
        }
    }

    /// Sibling views of `id` (all other children of `id`'s parent), excluding `id` itself.
    pub fn siblings_of(&self, id: ViewId) -> Vec<ViewId> {
        match self.parent_of(id) {
            None => Vec::new(),
            Some(p) => self
                .children_of(p)
                .iter()
                .copied()
                .filter(|&c| c != id)
                .collect(),
        }
    }
}

/// Check that two example trees share the same view names and hierarchy
/// (spec §1's Non-goal: "dealing with structurally non-isomorphic example
/// sets" is out of scope, so callers are expected to reject mismatches
/// up front using this check).
pub fn same_topology(a: &ViewTree, b: &ViewTree) -> bool {
    fn same_subtree(a: &ViewTree, ai: ViewId, b: &ViewTree, bi: ViewId) -> bool {
        if a.name(ai) != b.name(bi) {
            return false;
        }
        let ac = a.children_of(ai);
        let bc = b.children_of(bi);
        if ac.len() != bc.len() {
            return false;
        }
        ac.iter()
            .zip(bc.iter())
            .all(|(&x, &y)| same_subtree(a, x, b, y))
    }
    a.len() == b.len() && same_subtree(a, a.root(), b, b.root())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::int;

    fn rect(l: i64, t: i64, r: i64, b: i64) -> Rect {
        Rect::new(int(l), int(t), int(r), int(b)).unwrap()
    }

    fn sample() -> ViewSpec {
        ViewSpec {
            name: "root".into(),
            rect: rect(0, 0, 800, 600),
            children: vec![ViewSpec {
                name: "header".into(),
                rect: rect(0, 0, 800, 80),
                children: vec![],
            }],
        }
    }

    #[test]
    fn build_and_lookup() {
        let tree = ViewTree::build(sample()).unwrap();
        assert_eq!(tree.len(), 2);
        let header = tree.by_name("header").unwrap();
        assert_eq!(tree.name(header), "header");
        assert_eq!(tree.parent_of(header), Some(tree.root()));
        assert!(tree.is_leaf(header));
        assert!(!tree.is_leaf(tree.root()));
    }

    #[test]
    fn duplicate_names_rejected() {
        let spec = ViewSpec {
            name: "root".into(),
            rect: rect(0, 0, 10, 10),
            children: vec![
                ViewSpec {
                    name: "a".into(),
                    rect: rect(0, 0, 5, 5),
                    children: vec![],
                },
                ViewSpec {
                    name: "a".into(),
                    rect: rect(5, 5, 10, 10),
                    children: vec![],
                },
            ],
        };
        assert!(ViewTree::build(spec).is_err());
    }

    #[test]
    fn topology_matches_same_shape_different_coords() {
        let a = ViewTree::build(sample()).unwrap();
        let mut spec2 = sample();
        spec2.rect = rect(0, 0, 1200, 800);
        spec2.children[0].rect = rect(0, 0, 1200, 80);
        let b = ViewTree::build(spec2).unwrap();
        assert!(same_topology(&a, &b));
    }

    #[test]
    fn topology_mismatch_detected() {
        let a = ViewTree::build(sample()).unwrap();
        let spec2 = ViewSpec {
            name: "root".into(),
            rect: rect(0, 0, 800, 600),
            children: vec![],
        };
        let b = ViewTree::build(spec2).unwrap();
        assert!(!same_topology(&a, &b));
    }
}
