//! Small self-contained approximations for the normal and chi-square
//! distributions used by the learner's confidence intervals and
//! goodness-of-fit test. None of the pack's dependency stack carries a
//! statistics crate, so these are implemented directly from well-known
//! closed-form rational/polynomial approximations rather than pulled in
//! from an external crate.

/// Approximate inverse CDF of the standard normal distribution (Peter
/// Acklam's rational approximation, accurate to about 1.15e-9).
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    const A: [f64; 6] = [
        -3.969_683_028_665_376e+01,
        2.209_460_984_245_205e+02,
        -2.759_285_104_469_687e+02,
        1.383_577_518_672_690e+02,
        -3.066_479_806_614_716e+01,
        2.506_628_277_459_239e+00,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e+01,
        1.615_858_368_580_409e+02,
        -1.556_989_798_598_866e+02,
        6.680_131_188_771_972e+01,
        -1.328_068_155_288_572e+01,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-03,
        -3.223_964_580_411_365e-01,
        -2.400_758_277_161_838e+00,
        -2.549_732_539_343_734e+00,
        4.374_664_141_464_968e+00,
        2.938_163_982_698_783e+00,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-03,
        3.224_671_290_700_398e-01,
        2.445_134_137_142_996e+00,
        3.754_408_661_907_416e+00,
    ];
    const P_LOW: f64 = 0.024_25;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Abramowitz & Stegun 7.1.26 approximation of the error function.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t) * (-x * x).exp();
    sign * y
}

/// CDF of the standard normal distribution.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Upper-tail probability `P(Z > z)` of the standard normal distribution.
pub fn normal_sf(z: f64) -> f64 {
    1.0 - normal_cdf(z)
}

/// Upper-tail probability `P(X > x)` of a chi-square distribution with
/// `df` degrees of freedom, via the Wilson-Hilferty cube-root
/// normal approximation. Used as the learner's goodness-of-fit p-value
/// (spec §4.3's "F-test or equivalent").
pub fn chi_square_sf(x: f64, df: f64) -> f64 {
    if x <= 0.0 || df <= 0.0 {
        return 1.0;
    }
    let h = 2.0 / (9.0 * df);
    let z = ((x / df).powf(1.0 / 3.0) - (1.0 - h)) / h.sqrt();
    normal_sf(z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_normal_cdf_of_half_is_zero() {
        assert!(inverse_normal_cdf(0.5).abs() < 1e-9);
    }

    #[test]
    fn inverse_normal_cdf_matches_known_quantile() {
        // 97.5th percentile of the standard normal is ~1.95996.
        let z = inverse_normal_cdf(0.975);
        assert!((z - 1.959_96).abs() < 1e-4);
    }

    #[test]
    fn normal_cdf_is_symmetric_around_zero() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-9);
        assert!((normal_cdf(1.0) + normal_cdf(-1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn chi_square_sf_decreases_with_larger_statistic() {
        let small = chi_square_sf(1.0, 5.0);
        let large = chi_square_sf(50.0, 5.0);
        assert!(small > large);
    }

    #[test]
    fn chi_square_sf_of_mean_is_near_half() {
        // For df degrees of freedom, the mean of the distribution is df itself.
        let p = chi_square_sf(5.0, 5.0);
        assert!((p - 0.5).abs() < 0.1);
    }
}
