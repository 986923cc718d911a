//! Exact-rational rectangles.

use crate::attribute::Attribute;
use crate::rational::Rational;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with exact rational coordinates.
///
/// Invariant: `left <= right` and `top <= bottom`. Construction validates
/// this; all derived quantities assume it holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    left: Rational,
    top: Rational,
    right: Rational,
    bottom: Rational,
}

impl Rect {
    /// Build a rectangle from its four edges, returning `None` if the edges
    /// are inverted (`left > right` or `top > bottom`).
    pub fn new(left: Rational, top: Rational, right: Rational, bottom: Rational) -> Option<Self> {
        if left > right || top > bottom {
            return None;
        }
        Some(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Build a rectangle from origin and non-negative size.
    pub fn from_xywh(x: Rational, y: Rational, w: Rational, h: Rational) -> Option<Self> {
        if w < Rational::zero() || h < Rational::zero() {
            return None;
        }
        Self::new(x, y, x + w, y + h)
    }

    /// The zero rectangle at the origin.
    pub fn zero() -> Self {
        Self {
            left: Rational::zero(),
            top: Rational::zero(),
            right: Rational::zero(),
            bottom: Rational::zero(),
        }
    }

    pub fn left(&self) -> Rational {
        self.left
    }

    pub fn top(&self) -> Rational {
        self.top
    }

    pub fn right(&self) -> Rational {
        self.right
    }

    pub fn bottom(&self) -> Rational {
        self.bottom
    }

    pub fn width(&self) -> Rational {
        self.right - self.left
    }

    pub fn height(&self) -> Rational {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> Rational {
        (self.left + self.right) / Rational::from_integer(2)
    }

    pub fn center_y(&self) -> Rational {
        (self.top + self.bottom) / Rational::from_integer(2)
    }

    /// The value of one of the eight attributes for this rectangle.
    pub fn value_of(&self, attr: Attribute) -> Rational {
        match attr {
            Attribute::Left => self.left(),
            Attribute::Top => self.top(),
            Attribute::Right => self.right(),
            Attribute::Bottom => self.bottom(),
            Attribute::CenterX => self.center_x(),
            Attribute::CenterY => self.center_y(),
            Attribute::Width => self.width(),
            Attribute::Height => self.height(),
        }
    }

    /// Whether `other` lies fully within `self` (weak containment, matching
    /// spec §9's note that upstream uses weak inequalities throughout).
    pub fn contains(&self, other: &Rect) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::int;

    #[test]
    fn derived_quantities() {
        let r = Rect::new(int(0), int(0), int(800), int(600)).unwrap();
        assert_eq!(r.width(), int(800));
        assert_eq!(r.height(), int(600));
        assert_eq!(r.center_x(), int(400));
        assert_eq!(r.center_y(), int(300));
    }

    #[test]
    fn inverted_rect_rejected() {
        assert!(Rect::new(int(10), int(0), int(0), int(5)).is_none());
    }

    #[test]
    fn containment_is_weak() {
        let parent = Rect::new(int(0), int(0), int(100), int(100)).unwrap();
        let same = Rect::new(int(0), int(0), int(100), int(100)).unwrap();
        assert!(parent.contains(&same));
    }
}
