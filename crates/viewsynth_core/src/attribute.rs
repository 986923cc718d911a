//! The eight view anchor attributes and their classification predicates.

use serde::{Deserialize, Serialize};

/// One of the eight scalar attributes a view exposes as an anchor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    /// `view.left`
    Left,
    /// `view.top`
    Top,
    /// `view.right`
    Right,
    /// `view.bottom`
    Bottom,
    /// `view.center_x`
    CenterX,
    /// `view.center_y`
    CenterY,
    /// `view.width`
    Width,
    /// `view.height`
    Height,
}

impl Attribute {
    /// All eight attributes, in a stable order used for deterministic iteration.
    pub const ALL: [Attribute; 8] = [
        Attribute::Left,
        Attribute::Top,
        Attribute::Right,
        Attribute::Bottom,
        Attribute::CenterX,
        Attribute::CenterY,
        Attribute::Width,
        Attribute::Height,
    ];

    /// `true` for `Width`/`Height`.
    pub const fn is_size(self) -> bool {
        matches!(self, Attribute::Width | Attribute::Height)
    }

    /// `true` for everything except `Width`/`Height`.
    pub const fn is_position(self) -> bool {
        !self.is_size()
    }

    /// `true` for `Left`, `Right`, `CenterX`, `Width`.
    pub const fn is_horizontal(self) -> bool {
        matches!(
            self,
            Attribute::Left | Attribute::Right | Attribute::CenterX | Attribute::Width
        )
    }

    /// `true` for `Top`, `Bottom`, `CenterY`, `Height`.
    pub const fn is_vertical(self) -> bool {
        !self.is_horizontal()
    }

    /// The dual attribute for an LTRB pair (`Left`<->`Right`, `Top`<->`Bottom`).
    /// Center and size attributes have no dual.
    pub const fn dual(self) -> Option<Attribute> {
        match self {
            Attribute::Left => Some(Attribute::Right),
            Attribute::Right => Some(Attribute::Left),
            Attribute::Top => Some(Attribute::Bottom),
            Attribute::Bottom => Some(Attribute::Top),
            _ => None,
        }
    }

    /// Whether `self` and `other` form a dual LTRB pair.
    pub fn is_dual_of(self, other: Attribute) -> bool {
        self.dual() == Some(other)
    }

    /// The centering attribute on this attribute's axis (`CenterX` for
    /// horizontal attributes, `CenterY` for vertical ones).
    pub const fn axis_center(self) -> Attribute {
        if self.is_horizontal() {
            Attribute::CenterX
        } else {
            Attribute::CenterY
        }
    }
}

impl core::fmt::Display for Attribute {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Attribute::Left => "left",
            Attribute::Top => "top",
            Attribute::Right => "right",
            Attribute::Bottom => "bottom",
            Attribute::CenterX => "center_x",
            Attribute::CenterY => "center_y",
            Attribute::Width => "width",
            Attribute::Height => "height",
        };
        f.write_str(s)
    }
}
