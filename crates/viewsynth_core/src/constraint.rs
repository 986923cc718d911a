//! Constraint kinds, constraints, candidates, and conformances.

use crate::anchor::AnchorId;
use crate::rational::Rational;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// The nine constraint kinds of spec §3.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// `y = b`
    SizeConstant,
    /// `y >= b` or `y <= b`; low-priority fallback when learning yields only a bound.
    SizeConstantBound,
    /// `y = x + b`
    SizeOffset,
    /// `y = a*x` (line through the origin)
    SizeRatio,
    /// `y = a*x + b`
    SizeRatioGeneral,
    /// `y = a*x`, `y` and `x` perpendicular-axis size attributes of the same view.
    SizeAspectRatio,
    /// `y = a*x + b`, same shape as [`SizeAspectRatio`](ConstraintKind::SizeAspectRatio) but general.
    SizeAspectRatioGeneral,
    /// `y = x + b`, used for both adjacency (`b != 0`) and alignment (`b == 0`).
    PosLtrbOffset,
    /// `y = x` on center attributes.
    PosCentering,
}

impl ConstraintKind {
    /// Number of unknown rational parameters this kind's template carries.
    pub const fn num_free_vars(self) -> u8 {
        use ConstraintKind::*;
        match self {
            PosCentering => 0,
            SizeConstant | SizeConstantBound | SizeOffset | SizeRatio | SizeAspectRatio
            | PosLtrbOffset => 1,
            SizeRatioGeneral | SizeAspectRatioGeneral => 2,
        }
    }

    /// `y = b` or `y op b` forms (no `x` anchor).
    pub const fn is_constant_form(self) -> bool {
        matches!(
            self,
            ConstraintKind::SizeConstant | ConstraintKind::SizeConstantBound
        )
    }

    /// `y = x + b` forms (slope fixed at 1, intercept unknown).
    pub const fn is_add_only_form(self) -> bool {
        matches!(
            self,
            ConstraintKind::SizeOffset | ConstraintKind::PosLtrbOffset
        )
    }

    /// `y = a*x` forms (intercept fixed at 0, slope unknown).
    pub const fn is_mul_only_form(self) -> bool {
        matches!(
            self,
            ConstraintKind::SizeRatio | ConstraintKind::SizeAspectRatio
        )
    }

    /// `y = a*x + b` forms (both parameters unknown).
    pub const fn is_general_form(self) -> bool {
        matches!(
            self,
            ConstraintKind::SizeRatioGeneral | ConstraintKind::SizeAspectRatioGeneral
        )
    }

    /// Whether this kind constrains a position attribute.
    pub const fn is_position_kind(self) -> bool {
        matches!(
            self,
            ConstraintKind::PosLtrbOffset | ConstraintKind::PosCentering
        )
    }

    /// Whether this kind constrains a size attribute.
    pub const fn is_size_kind(self) -> bool {
        !self.is_position_kind()
    }

    /// Whether `x` is present for this kind (constant forms have no `x`).
    pub const fn has_x(self) -> bool {
        !self.is_constant_form()
    }

    /// The default `(a, b)` pair a freshly instantiated (unlearned) template
    /// of this kind carries, per spec §3's kind-consistency table.
    pub fn default_params(self) -> (Rational, Rational) {
        use ConstraintKind::*;
        let zero = Rational::zero();
        let one = Rational::from_integer(1);
        match self {
            SizeConstant | SizeConstantBound => (zero, zero),
            SizeOffset | PosLtrbOffset => (one, zero),
            SizeRatio | SizeAspectRatio => (one, zero),
            SizeRatioGeneral | SizeAspectRatioGeneral => (one, zero),
            PosCentering => (one, zero),
        }
    }
}

/// Comparison operator relating `y` to `a*x + b` (or just `b` for constant forms).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Eq,
    Le,
    Ge,
}

impl Op {
    pub const fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Le => "<=",
            Op::Ge => ">=",
        }
    }
}

/// An arithmetic constraint over one or two anchors: `y op a*x + b`.
///
/// `sample_count == 0` marks a template emitted by the instantiator with
/// unknown parameters; `sample_count > 0` marks a candidate produced by the
/// learner with concrete `a`, `b` fitted from that many examples.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub y: AnchorId,
    pub x: Option<AnchorId>,
    pub a: Rational,
    pub b: Rational,
    pub op: Op,
    pub score: f64,
    pub sample_count: u32,
}

impl Constraint {
    /// Build a fresh template (`sample_count = 0`, default parameters, `=`).
    pub fn template(kind: ConstraintKind, y: AnchorId, x: Option<AnchorId>) -> Self {
        debug_assert_eq!(kind.has_x(), x.is_some());
        let (a, b) = kind.default_params();
        Self {
            kind,
            y,
            x,
            a,
            b,
            op: Op::Eq,
            score: 0.0,
            sample_count: 0,
        }
    }

    /// Whether this constraint is an unlearned template.
    pub fn is_template(&self) -> bool {
        self.sample_count == 0
    }

    /// Functional substitution: return a new, fully learned constraint with
    /// the given parameters, operator, score, and sample count. The
    /// original template is left untouched (constraints are immutable).
    pub fn instantiate(&self, a: Rational, b: Rational, op: Op, score: f64, sample_count: u32) -> Self {
        Self {
            kind: self.kind,
            y: self.y.clone(),
            x: self.x.clone(),
            a,
            b,
            op,
            score,
            sample_count,
        }
    }

    /// Evaluate `a*x + b` given a concrete `x` value (or just `b` for
    /// constant forms, where `x_value` is ignored).
    pub fn rhs(&self, x_value: Rational) -> Rational {
        if self.x.is_none() {
            self.b
        } else {
            self.a * x_value + self.b
        }
    }

    /// Whether `y_value op rhs(x_value)` holds.
    pub fn holds(&self, y_value: Rational, x_value: Rational) -> bool {
        let rhs = self.rhs(x_value);
        match self.op {
            Op::Eq => y_value == rhs,
            Op::Le => y_value <= rhs,
            Op::Ge => y_value >= rhs,
        }
    }
}

/// A fully-instantiated constraint paired with its Bayesian posterior score.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintCandidate {
    pub constraint: Constraint,
    pub score: f64,
}

impl ConstraintCandidate {
    pub fn new(constraint: Constraint, score: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&score));
        Self { constraint, score }
    }

    /// The integer soft-assertion weight used by the MaxSMT encoding
    /// (spec §4.5): `round(1000 * score)`, plus a small tie-break bonus that
    /// favors an exact `SizeConstant` over the low-priority
    /// `SizeConstantBound` fallback at equal posterior.
    pub fn whole_score(&self) -> i64 {
        let base = (self.score * 1000.0).round() as i64;
        let bonus = match self.constraint.kind {
            ConstraintKind::SizeConstant => 1,
            ConstraintKind::SizeConstantBound => 0,
            _ => 0,
        };
        base + bonus
    }
}

/// A concrete test screen size: the root rectangle `(x, y, x+width, y+height)`
/// at one test point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Conformance {
    pub width: Rational,
    pub height: Rational,
    pub x: Rational,
    pub y: Rational,
}

impl Conformance {
    pub fn new(width: Rational, height: Rational, x: Rational, y: Rational) -> Self {
        Self { width, height, x, y }
    }
}
