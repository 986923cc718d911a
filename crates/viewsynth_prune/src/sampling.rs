//! Conformance sampling: the "3-point" test point generation described in
//! spec §4.4 ("Test point generation") and §4.5 ("Child dimension
//! inference"), pulled into one place instead of duplicating the
//! min/mid/max construction at every call site.

use viewsynth_core::{Conformance, Rational};

/// Build the min/mid/max conformance triple for a screen-size range
/// `[min_width, max_width] x [min_height, max_height]` anchored at
/// `(origin_x, origin_y)`.
pub fn three_point(
    min_width: Rational,
    min_height: Rational,
    max_width: Rational,
    max_height: Rational,
    origin_x: Rational,
    origin_y: Rational,
) -> [Conformance; 3] {
    let mid_w = (min_width + max_width) / Rational::from_integer(2);
    let mid_h = (min_height + max_height) / Rational::from_integer(2);
    [
        Conformance::new(min_width, min_height, origin_x, origin_y),
        Conformance::new(mid_w, mid_h, origin_x, origin_y),
        Conformance::new(max_width, max_height, origin_x, origin_y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewsynth_core::rational::int;

    #[test]
    fn midpoint_is_the_arithmetic_mean() {
        let points = three_point(int(300), int(200), int(900), int(800), int(0), int(0));
        assert_eq!(points[1].width, int(600));
        assert_eq!(points[1].height, int(500));
    }
}
