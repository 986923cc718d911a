// SPDX-License-Identifier: Apache-2.0 OR MIT

//! viewsynth core: the shared data model for the layout-constraint
//! synthesis engine.
//!
//! This crate has no knowledge of JSON, SMT, or Bayesian inference; it only
//! defines the immutable building blocks every other `viewsynth_*` crate
//! operates over:
//!
//! - [`rational`]: the exact-rational type and the Stern-Brocot/Farey
//!   simplicity measures the learner's prior is built on.
//! - [`attribute`]: the eight view anchor attributes and their
//!   classification predicates.
//! - [`geometry`]: exact-rational rectangles.
//! - [`view`]: the immutable, arena-backed view tree.
//! - [`anchor`]: anchor identifiers, materialization, and edges.
//! - [`constraint`]: constraint kinds, constraints, candidates, conformances.
//! - [`error`]: the shared error taxonomy (spec §7) used by every
//!   downstream crate.
//!
//! ## API overview
//!
//! - [`view::ViewTree`]: build with [`view::ViewTree::build`], query with
//!   [`view::ViewTree::by_name`], [`view::ViewTree::children_of`],
//!   [`view::ViewTree::parent_of`].
//! - [`anchor::materialize`] resolves an [`anchor::AnchorId`] against a tree
//!   into a concrete [`anchor::Anchor`] (value + optional [`anchor::Edge`]).
//! - [`constraint::Constraint::template`] builds an unlearned sketch;
//!   [`constraint::Constraint::instantiate`] performs the functional
//!   substitution that turns a template into a learned constraint.

pub mod anchor;
pub mod attribute;
pub mod constraint;
pub mod error;
pub mod geometry;
pub mod rational;
pub mod view;

pub use anchor::{Anchor, AnchorId, Axis, Edge};
pub use attribute::Attribute;
pub use constraint::{Conformance, Constraint, ConstraintCandidate, ConstraintKind, Op};
pub use error::{Diagnostic, ViewSynthError};
pub use geometry::Rect;
pub use rational::Rational;
pub use view::{same_topology, ViewId, ViewSpec, ViewTree};
