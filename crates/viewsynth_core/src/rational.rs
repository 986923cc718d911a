//! Exact rational arithmetic and the "simplicity" measures the learner prior
//! is built on: Stern-Brocot depth and Farey-sequence enumeration.
//!
//! All downstream crates are expected to do their arithmetic in [`Rational`]
//! rather than floating point; the only place floats are permitted is an
//! external, non-core evaluation consumer (see spec §9's design notes).

use num_traits::{One, Zero};

/// The exact rational type shared by the whole workspace.
///
/// Backed by `i64` numerator/denominator, which comfortably covers the
/// configured caps on offsets (`max_offset`) and denominators
/// (`max_denominator`) used by the learner.
pub type Rational = num_rational::Ratio<i64>;

/// Convenience constructor for an integer-valued [`Rational`].
pub fn int(n: i64) -> Rational {
    Rational::from_integer(n)
}

/// The sum of continued-fraction terms of `r` in lowest terms.
///
/// This is the "Stern-Brocot depth" used as a simplicity prior: `1/2` has
/// depth 2 (`[0; 2]`), `47/83` has a long continued fraction and therefore a
/// high depth. Depth of an integer is its own continued-fraction term count,
/// which is always 1.
pub fn sb_depth(r: Rational) -> u32 {
    let mut num = r.numer().abs();
    let mut den = r.denom().abs();
    if den.is_zero() {
        return u32::MAX;
    }
    let mut depth = 0u32;
    loop {
        let q = num.div_euclid(den);
        depth += 1;
        let rem = num - q * den;
        if rem.is_zero() {
            break;
        }
        num = den;
        den = rem;
    }
    depth
}

/// Reduce `r` to lowest terms with a positive denominator.
///
/// `num_rational::Ratio` already keeps this invariant internally; this
/// helper exists so callers working with raw `(i64, i64)` pairs can
/// normalize before comparison without constructing a `Ratio` first.
pub fn canonicalize(num: i64, den: i64) -> Rational {
    Rational::new(num, den)
}

/// Common "round" rational values a prior should favor even when their
/// continued-fraction depth alone would not stand out: `0`, `±1`, and the
/// two improper forms used to represent "no slope" in bound candidates.
pub fn common_values() -> [Rational; 5] {
    [
        Rational::zero(),
        Rational::one(),
        -Rational::one(),
        Rational::new(1, 2),
        Rational::new(-1, 2),
    ]
}

/// Enumerate the Farey sequence of order `max_denominator`, restricted to
/// the closed interval `[lo, hi]`.
///
/// This is the classic mediant-splitting Farey/Stern-Brocot walk, seeded at
/// the two rationals nearest `lo` and `hi` with denominator 1 and refined by
/// mediant insertion until no further term with denominator `<= max_denominator`
/// fits strictly between the running boundaries. The result is sorted
/// ascending and deduplicated.
pub fn farey_between(lo: Rational, hi: Rational, max_denominator: i64) -> Vec<Rational> {
    assert!(max_denominator >= 1);
    if lo > hi {
        return Vec::new();
    }
    let mut out = Vec::new();
    let shift = lo.floor().to_integer().min(0);
    let lo_s = lo - Rational::from_integer(shift);
    let hi_s = hi - Rational::from_integer(shift);
    farey_walk(lo_s, hi_s, max_denominator, &mut out);
    out.sort();
    out.dedup();
    for v in &mut out {
        *v += Rational::from_integer(shift);
    }
    out
}

/// Recursive mediant refinement of the Farey sequence restricted to `[lo, hi]`,
/// both assumed non-negative and `lo <= hi`.
fn farey_walk(lo: Rational, hi: Rational, max_denominator: i64, out: &mut Vec<Rational>) {
    // Collect every a/b with 0 <= a, 1 <= b <= max_denominator inside [lo, hi].
    // The search space is small in practice (max_denominator defaults to 100),
    // so a direct denominator sweep is simpler and just as fast as a Stern-Brocot
    // tree descent, and it trivially handles the integer-shifted interval.
    for den in 1..=max_denominator {
        let lo_n = (lo * Rational::from_integer(den)).ceil().to_integer();
        let hi_n = (hi * Rational::from_integer(den)).floor().to_integer();
        let mut n = lo_n.max(0);
        while n <= hi_n {
            let cand = Rational::new(n, den);
            if cand >= lo && cand <= hi {
                out.push(cand);
            }
            n += 1;
        }
    }
}

/// All integers in the closed interval `[lo, hi]`, intersected with
/// `[-max_offset, max_offset]`.
pub fn integers_between(lo: Rational, hi: Rational, max_offset: i64) -> Vec<i64> {
    if lo > hi {
        return Vec::new();
    }
    let lo_i = lo.ceil().to_integer().max(-max_offset);
    let hi_i = hi.floor().to_integer().min(max_offset);
    if lo_i > hi_i {
        return Vec::new();
    }
    (lo_i..=hi_i).collect()
}
