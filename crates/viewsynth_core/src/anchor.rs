//! Anchor identifiers and their materialization against a concrete
//! [`ViewTree`] example.

use crate::attribute::Attribute;
use crate::rational::Rational;
use crate::view::{ViewId, ViewTree};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Globally unique (within one example tree) identifier of an anchor:
/// a view name paired with one of its eight attributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId {
    pub view: String,
    pub attr: Attribute,
}

impl AnchorId {
    pub fn new(view: impl Into<String>, attr: Attribute) -> Self {
        Self {
            view: view.into(),
            attr,
        }
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.view, self.attr)
    }
}

/// The axis a 1-D [`Edge`] segment runs along.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// The segment spans an x-interval at a fixed y (e.g. a view's top/bottom).
    Horizontal,
    /// The segment spans a y-interval at a fixed x (e.g. a view's left/right).
    Vertical,
}

/// A 1-D line segment perpendicular to a position attribute's axis.
///
/// `header.bottom`'s edge is the horizontal segment from `header.left` to
/// `header.right` at `y = header.bottom`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub axis: Axis,
    /// The coordinate held fixed along the attribute's own axis.
    pub at: Rational,
    /// Start of the perpendicular span (x for horizontal edges, y for vertical).
    pub from: Rational,
    /// End of the perpendicular span.
    pub to: Rational,
}

/// A materialized anchor: the attribute's concrete value under one example,
/// plus its edge when the attribute is a position attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    pub id: AnchorId,
    pub value: Rational,
    pub edge: Option<Edge>,
}

/// Compute the [`Edge`] of a position attribute for a view, or `None` for
/// size attributes (which have no edge).
pub fn edge_of(tree: &ViewTree, view: ViewId, attr: Attribute) -> Option<Edge> {
    if attr.is_size() {
        return None;
    }
    let rect = tree.rect(view);
    let at = rect.value_of(attr);
    if attr.is_horizontal() {
        Some(Edge {
            axis: Axis::Vertical,
            at,
            from: rect.top(),
            to: rect.bottom(),
        })
    } else {
        Some(Edge {
            axis: Axis::Horizontal,
            at,
            from: rect.left(),
            to: rect.right(),
        })
    }
}

/// Materialize an [`AnchorId`] against a tree, or `None` if the view does
/// not exist.
pub fn materialize(tree: &ViewTree, id: &AnchorId) -> Option<Anchor> {
    let view = tree.by_name(&id.view)?;
    let value = tree.rect(view).value_of(id.attr);
    let edge = edge_of(tree, view, id.attr);
    Some(Anchor {
        id: id.clone(),
        value,
        edge,
    })
}
