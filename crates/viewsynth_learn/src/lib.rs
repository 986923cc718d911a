// SPDX-License-Identifier: Apache-2.0 OR MIT

//! viewsynth learn: the noise-tolerant Bayesian parameter learner of
//! spec §4.3.
//!
//! Given a template (a [`Constraint`] sketch with `sample_count == 0`) and
//! the example trees it was instantiated from, [`learn`] fits the
//! template's free parameter(s) by ordinary least squares, rejects
//! templates that don't fit well, and otherwise enumerates a small set of
//! "simple" rational candidates (nearby Farey fractions for a slope,
//! nearby integers for an offset), each scored by a Stern-Brocot-depth
//! prior times a Gaussian likelihood. [`learn_all`] fans this out over
//! rayon, since per-template learning is independent (spec §5).

pub mod regression;
pub mod stats;

use num_traits::{One, Zero};
use rayon::prelude::*;
use regression::Sample;
use viewsynth_core::rational::{self, Rational};
use viewsynth_core::{
    AnchorId, Constraint, ConstraintCandidate, Diagnostic, Op, ViewSynthError, ViewTree,
};

/// Tuning knobs for the learner (spec §4.3 and §9's "Bayesian prior tuning"
/// design note).
#[derive(Clone, Debug)]
pub struct LearnOptions {
    /// Confidence level for the multiplicative parameter `a`'s CI.
    pub a_alpha: f64,
    /// Confidence level for the additive parameter `b`'s CI.
    pub b_alpha: f64,
    /// Minimum acceptable goodness-of-fit p-value.
    pub cutoff_fit: f64,
    /// Maximum acceptable residual standard deviation.
    pub cutoff_spread: f64,
    /// Cap on the magnitude of an additive offset candidate.
    pub max_offset: i64,
    /// Cap on a multiplicative candidate's denominator.
    pub max_denominator: i64,
    /// The Stern-Brocot depth the prior centers on.
    pub expected_depth: i64,
    /// Keep only the top-K candidates per template (`None` keeps all).
    pub top_k: Option<usize>,
}

impl Default for LearnOptions {
    fn default() -> Self {
        Self {
            a_alpha: 0.005,
            b_alpha: 0.005,
            cutoff_fit: 0.05,
            cutoff_spread: 3.0,
            max_offset: 1000,
            max_denominator: 100,
            expected_depth: 5,
            top_k: None,
        }
    }
}

/// The outcome of learning a single template: zero or more candidates, and
/// an optional [`Diagnostic`] explaining why none were produced.
#[derive(Clone, Debug, Default)]
pub struct LearnOutcome {
    pub candidates: Vec<ConstraintCandidate>,
    pub diagnostic: Option<Diagnostic>,
}

/// Learn every template in `templates` against `examples`, fanning the
/// independent per-template work out over a rayon thread pool and
/// restoring template order afterward so the result is deterministic
/// regardless of worker scheduling (spec §5).
pub fn learn_all(
    templates: &[Constraint],
    examples: &[ViewTree],
    opts: &LearnOptions,
) -> (Vec<ConstraintCandidate>, Vec<Diagnostic>) {
    let mut indexed: Vec<(usize, LearnOutcome)> = templates
        .par_iter()
        .enumerate()
        .map(|(i, template)| (i, learn(template, examples, opts)))
        .collect();
    indexed.sort_by_key(|(i, _)| *i);

    let mut candidates = Vec::new();
    let mut diagnostics = Vec::new();
    for (_, outcome) in indexed {
        candidates.extend(outcome.candidates);
        diagnostics.extend(outcome.diagnostic);
    }
    (candidates, diagnostics)
}

/// Learn a single template against `examples`.
pub fn learn(template: &Constraint, examples: &[ViewTree], opts: &LearnOptions) -> LearnOutcome {
    let outcome = learn_inner(template, examples, opts);
    if let Some(diag) = &outcome.diagnostic {
        tracing::debug!(
            context = %diag.context,
            error = %diag.error,
            "template learning produced no candidates",
        );
    }
    outcome
}

fn learn_inner(template: &Constraint, examples: &[ViewTree], opts: &LearnOptions) -> LearnOutcome {
    let samples = match extract_samples(template, examples) {
        Ok(s) => s,
        Err(msg) => {
            return rejected(
                ViewSynthError::LearnerFailure(msg),
                describe(template),
            )
        }
    };

    if template.kind.is_constant_form() {
        learn_constant(template, &samples, opts)
    } else if template.kind.is_mul_only_form() {
        learn_mul_only(template, &samples, opts)
    } else if template.kind.is_add_only_form() {
        learn_add_only(template, &samples, opts)
    } else if template.kind.num_free_vars() == 0 {
        // No rule in the instantiator's table currently emits a zero-free-var
        // kind (`PosCentering`'s only current member) for the learner to see;
        // `learn_general` assumes two free params, so routing a zero-free-var
        // kind there would silently misfit rather than fail loudly.
        unreachable!(
            "{:?} has no free parameters and is never dispatched to a parameter learner",
            template.kind
        )
    } else {
        learn_general(template, &samples, opts)
    }
}

fn describe(template: &Constraint) -> String {
    match &template.x {
        Some(x) => format!("{} ~ {} ({:?})", template.y, x, template.kind),
        None => format!("{} ({:?})", template.y, template.kind),
    }
}

fn rejected(error: ViewSynthError, context: String) -> LearnOutcome {
    LearnOutcome {
        candidates: Vec::new(),
        diagnostic: Some(Diagnostic::new(error, context)),
    }
}

fn rational_to_f64(r: Rational) -> f64 {
    *r.numer() as f64 / *r.denom() as f64
}

/// Convert a statistical bound back into an exact rational with
/// microsecond-scale precision, ample for confidence intervals bounded by
/// `max_offset`/`max_denominator`.
fn f64_to_rational(x: f64) -> Rational {
    const SCALE: f64 = 1_000_000.0;
    Rational::new((x * SCALE).round() as i64, SCALE as i64)
}

fn extract_samples(template: &Constraint, examples: &[ViewTree]) -> Result<Vec<Sample>, String> {
    let mut samples = Vec::with_capacity(examples.len().max(2));
    for tree in examples {
        let y_anchor = viewsynth_core::anchor::materialize(tree, &template.y)
            .ok_or_else(|| format!("missing anchor `{}`", template.y))?;
        let x_val = match &template.x {
            Some(x_id) => {
                let x_anchor = viewsynth_core::anchor::materialize(tree, x_id)
                    .ok_or_else(|| format!("missing anchor `{x_id}`"))?;
                rational_to_f64(x_anchor.value)
            }
            None => 0.0,
        };
        samples.push(Sample {
            x: x_val,
            y: rational_to_f64(y_anchor.value),
        });
    }

    if samples.len() == 1 {
        let p = samples[0];
        let second = if template.kind.is_mul_only_form() {
            Sample { x: 0.0, y: 0.0 }
        } else if template.kind.is_add_only_form() {
            Sample { x: 0.0, y: p.y - p.x }
        } else {
            // Constant-form templates synthesize `(0, y)`. General-form
            // templates have no synthesis rule in spec §4.3; they are
            // never instantiated by this workspace's rule set (spec §4.2),
            // so reusing the constant-form rule here only has to be
            // plausible, not correct in the general case.
            Sample { x: 0.0, y: p.y }
        };
        samples.push(second);
    }

    // Tiny deterministic jitter (spec §4.3) to avoid zero-variance
    // regression pathologies. Alternates sign by index instead of drawing
    // from an RNG so that learning stays reproducible run to run.
    for (i, s) in samples.iter_mut().enumerate() {
        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
        s.y += sign * s.y.abs().max(1.0) * 1e-6;
    }

    Ok(samples)
}

fn reject(p_value: f64, residual_std: f64, opts: &LearnOptions) -> Option<ViewSynthError> {
    if p_value < opts.cutoff_fit {
        return Some(ViewSynthError::TemplateRejected(format!(
            "goodness-of-fit p={p_value:.4} below cutoff {:.4}",
            opts.cutoff_fit
        )));
    }
    if residual_std > opts.cutoff_spread {
        return Some(ViewSynthError::TemplateRejected(format!(
            "residual std {residual_std:.4} exceeds cutoff {:.4}",
            opts.cutoff_spread
        )));
    }
    None
}

/// Low-priority inequality fallback (`SIZE_CONSTANT_BOUND`) used when a
/// constant-form template's confidence interval contains no integer (spec
/// §4.3's candidate enumeration rule). Non-constant forms have no bound
/// kind to fall back to, so they are simply rejected.
fn bound_fallback(template: &Constraint, estimate: f64, sample_count: u32) -> LearnOutcome {
    if !template.kind.is_constant_form() {
        return rejected(
            ViewSynthError::TemplateRejected(
                "confidence interval empty after filtering".into(),
            ),
            describe(template),
        );
    }
    let bound = estimate.round().clamp(-1e9, 1e9) as i64;
    let op = if estimate >= bound as f64 { Op::Ge } else { Op::Le };
    let score = 0.3;
    let learned = template.instantiate(Rational::zero(), rational::int(bound), op, score, sample_count);
    LearnOutcome {
        candidates: vec![ConstraintCandidate::new(learned, score)],
        diagnostic: None,
    }
}

/// Sort by descending raw score, keep the top-K, normalize so the argmax
/// candidate scores exactly 1 (spec §8's "Learner score bounds" invariant),
/// and materialize each surviving `(a, b, raw_score)` triple into a
/// [`ConstraintCandidate`].
fn finalize(
    template: &Constraint,
    mut scored: Vec<(Rational, Rational, f64)>,
    sample_count: u32,
    opts: &LearnOptions,
) -> LearnOutcome {
    if scored.is_empty() {
        return rejected(
            ViewSynthError::TemplateRejected("no candidate parameters survived filtering".into()),
            describe(template),
        );
    }
    scored.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    if let Some(k) = opts.top_k {
        scored.truncate(k);
    }
    let max_raw = scored[0].2.max(1e-12);
    let candidates = scored
        .into_iter()
        .map(|(a, b, raw)| {
            let score = (raw / max_raw).clamp(0.0, 1.0);
            let learned = template.instantiate(a, b, Op::Eq, score, sample_count);
            ConstraintCandidate::new(learned, score)
        })
        .collect();
    LearnOutcome {
        candidates,
        diagnostic: None,
    }
}

/// `y = b`.
fn learn_constant(template: &Constraint, samples: &[Sample], opts: &LearnOptions) -> LearnOutcome {
    let fit = regression::fit_constant(samples);
    if let Some(err) = reject(fit.p_value, fit.residual_std, opts) {
        return rejected(err, describe(template));
    }
    let z = stats::inverse_normal_cdf(1.0 - opts.b_alpha / 2.0);
    let lo = f64_to_rational(fit.b - z * fit.se_b);
    let hi = f64_to_rational(fit.b + z * fit.se_b);
    let ints = rational::integers_between(lo, hi, opts.max_offset);
    if ints.is_empty() {
        return bound_fallback(template, fit.b, samples.len() as u32);
    }

    let sigma = fit.residual_std.max(1e-6);
    let n = ints.len() as f64;
    let scored = ints
        .into_iter()
        .map(|v| {
            let mse =
                samples.iter().map(|s| (s.y - v as f64).powi(2)).sum::<f64>() / samples.len() as f64;
            let prior = 1.0 / n;
            let likelihood = (-mse / (2.0 * sigma * sigma)).exp();
            (Rational::zero(), rational::int(v), prior * likelihood)
        })
        .collect();
    finalize(template, scored, samples.len() as u32, opts)
}

/// `y = x + b` (slope fixed at 1).
fn learn_add_only(template: &Constraint, samples: &[Sample], opts: &LearnOptions) -> LearnOutcome {
    let fit = regression::fit_add_only(samples);
    if let Some(err) = reject(fit.p_value, fit.residual_std, opts) {
        return rejected(err, describe(template));
    }
    let z = stats::inverse_normal_cdf(1.0 - opts.b_alpha / 2.0);
    let lo = f64_to_rational(fit.b - z * fit.se_b);
    let hi = f64_to_rational(fit.b + z * fit.se_b);
    let ints = rational::integers_between(lo, hi, opts.max_offset);
    if ints.is_empty() {
        return bound_fallback(template, fit.b, samples.len() as u32);
    }

    let sigma = fit.residual_std.max(1e-6);
    let n = ints.len() as f64;
    let scored = ints
        .into_iter()
        .map(|v| {
            let mse = samples
                .iter()
                .map(|s| (s.y - (s.x + v as f64)).powi(2))
                .sum::<f64>()
                / samples.len() as f64;
            let prior = 1.0 / n;
            let likelihood = (-mse / (2.0 * sigma * sigma)).exp();
            (Rational::one(), rational::int(v), prior * likelihood)
        })
        .collect();
    finalize(template, scored, samples.len() as u32, opts)
}

/// `y = a·x` (intercept fixed at 0).
fn learn_mul_only(template: &Constraint, samples: &[Sample], opts: &LearnOptions) -> LearnOutcome {
    let fit = match regression::fit_mul_only(samples) {
        Some(f) => f,
        None => {
            return rejected(
                ViewSynthError::LearnerFailure(
                    "zero-variance `x` for a mul-only template".into(),
                ),
                describe(template),
            )
        }
    };
    if let Some(err) = reject(fit.p_value, fit.residual_std, opts) {
        return rejected(err, describe(template));
    }

    let z = stats::inverse_normal_cdf(1.0 - opts.a_alpha / 2.0);
    let lo = f64_to_rational(fit.a - z * fit.se_a);
    let hi = f64_to_rational(fit.a + z * fit.se_a);
    let mut candidates_a = rational::farey_between(lo, hi, opts.max_denominator);
    for common in rational::common_values() {
        if common >= lo && common <= hi && !candidates_a.contains(&common) {
            candidates_a.push(common);
        }
    }
    if candidates_a.is_empty() {
        return rejected(
            ViewSynthError::TemplateRejected(
                "confidence interval for `a` is empty after filtering".into(),
            ),
            describe(template),
        );
    }

    let sigma = fit.residual_std.max(1e-6);
    let scored = candidates_a
        .into_iter()
        .map(|a| {
            let a_f = rational_to_f64(a);
            let mse =
                samples.iter().map(|s| (s.y - a_f * s.x).powi(2)).sum::<f64>() / samples.len() as f64;
            let depth = rational::sb_depth(a) as i64;
            let prior = (-((depth - opts.expected_depth).abs() as f64)).exp();
            let likelihood = (-mse / (2.0 * sigma * sigma)).exp();
            (a, Rational::zero(), prior * likelihood)
        })
        .collect();
    finalize(template, scored, samples.len() as u32, opts)
}

/// `y = a·x + b`, both parameters unknown. Not instantiated by this
/// workspace's current rule set (spec §4.2 never emits a general-form
/// sketch); kept for forward compatibility with alternative instantiator
/// strategies (spec §9's pluggable-strategy design note). Snaps to the
/// single candidate nearest the joint OLS estimate rather than enumerating
/// the full `a x b` grid, since it is not exercised by `viewsynth_instantiate`
/// today.
fn learn_general(template: &Constraint, samples: &[Sample], opts: &LearnOptions) -> LearnOutcome {
    let fit = match regression::fit_general(samples) {
        Some(f) => f,
        None => {
            return rejected(
                ViewSynthError::LearnerFailure(
                    "zero-variance `x` for a general-form template".into(),
                ),
                describe(template),
            )
        }
    };
    if let Some(err) = reject(fit.p_value, fit.residual_std, opts) {
        return rejected(err, describe(template));
    }

    let a_z = stats::inverse_normal_cdf(1.0 - opts.a_alpha / 2.0);
    let b_z = stats::inverse_normal_cdf(1.0 - opts.b_alpha / 2.0);
    let a_lo = f64_to_rational(fit.a - a_z * fit.se_a);
    let a_hi = f64_to_rational(fit.a + a_z * fit.se_a);
    let b_lo = f64_to_rational(fit.b - b_z * fit.se_b);
    let b_hi = f64_to_rational(fit.b + b_z * fit.se_b);
    let a_candidates = rational::farey_between(a_lo, a_hi, opts.max_denominator);
    let b_candidates = rational::integers_between(b_lo, b_hi, opts.max_offset);
    if a_candidates.is_empty() || b_candidates.is_empty() {
        return rejected(
            ViewSynthError::TemplateRejected(
                "confidence interval empty after filtering".into(),
            ),
            describe(template),
        );
    }

    let a = *a_candidates
        .iter()
        .min_by(|x, y| {
            (rational_to_f64(**x) - fit.a)
                .abs()
                .partial_cmp(&(rational_to_f64(**y) - fit.a).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .expect("non-empty");
    let b_int = *b_candidates
        .iter()
        .min_by_key(|v| (*v - fit.b.round() as i64).abs())
        .expect("non-empty");

    let sigma = fit.residual_std.max(1e-6);
    let a_f = rational_to_f64(a);
    let mse = samples
        .iter()
        .map(|s| (s.y - (a_f * s.x + b_int as f64)).powi(2))
        .sum::<f64>()
        / samples.len() as f64;
    let likelihood = (-mse / (2.0 * sigma * sigma)).exp();
    finalize(
        template,
        vec![(a, rational::int(b_int), likelihood)],
        samples.len() as u32,
        opts,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewsynth_core::rational::int;
    use viewsynth_core::{ConstraintKind, Rect, ViewSpec};

    fn rect(l: i64, t: i64, r: i64, b: i64) -> Rect {
        Rect::new(int(l), int(t), int(r), int(b)).unwrap()
    }

    fn two_examples(header_w: (i64, i64), root_w: (i64, i64)) -> Vec<ViewTree> {
        let spec_of = |w: i64| ViewSpec {
            name: "root".into(),
            rect: rect(0, 0, w, 600),
            children: vec![ViewSpec {
                name: "header".into(),
                rect: rect(0, 0, w, 80),
                children: vec![],
            }],
        };
        vec![
            ViewTree::build(spec_of(header_w.0.max(root_w.0))).unwrap(),
            ViewTree::build(spec_of(header_w.1.max(root_w.1))).unwrap(),
        ]
    }

    #[test]
    fn constant_header_height_is_learned_exactly() {
        let trees = two_examples((800, 1200), (800, 1200));
        let template = Constraint::template(
            ConstraintKind::SizeConstant,
            AnchorId::new("header", viewsynth_core::Attribute::Height),
            None,
        );
        let outcome = learn(&template, &trees, &LearnOptions::default());
        assert!(outcome.diagnostic.is_none());
        let top = outcome
            .candidates
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap())
            .unwrap();
        assert_eq!(top.constraint.b, int(80));
        assert!((top.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ratio_header_width_to_root_width_is_learned_as_one() {
        let trees = two_examples((800, 1200), (800, 1200));
        let template = Constraint::template(
            ConstraintKind::SizeRatio,
            AnchorId::new("header", viewsynth_core::Attribute::Width),
            Some(AnchorId::new("root", viewsynth_core::Attribute::Width)),
        );
        let outcome = learn(&template, &trees, &LearnOptions::default());
        let top = outcome
            .candidates
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap())
            .unwrap();
        assert_eq!(top.constraint.a, int(1));
    }

    #[test]
    fn stern_brocot_prior_prefers_one_half_over_an_awkward_fraction() {
        // y ~= 0.501 * x: top candidate should be 1/2, not a denominator-1000 fit.
        let mut candidates_a = rational::farey_between(Rational::new(490, 1000), Rational::new(510, 1000), 100);
        for common in rational::common_values() {
            if common >= Rational::new(490, 1000) && common <= Rational::new(510, 1000) {
                candidates_a.push(common);
            }
        }
        assert!(candidates_a.contains(&Rational::new(1, 2)));
        let half_depth = rational::sb_depth(Rational::new(1, 2));
        for c in &candidates_a {
            if *c != Rational::new(1, 2) {
                assert!(rational::sb_depth(*c) >= half_depth);
            }
        }
    }

    #[test]
    fn single_example_synthesizes_a_second_point() {
        let trees = vec![ViewTree::build(ViewSpec {
            name: "root".into(),
            rect: rect(0, 0, 800, 600),
            children: vec![ViewSpec {
                name: "header".into(),
                rect: rect(0, 0, 800, 80),
                children: vec![],
            }],
        })
        .unwrap()];
        let template = Constraint::template(
            ConstraintKind::SizeConstant,
            AnchorId::new("header", viewsynth_core::Attribute::Height),
            None,
        );
        let outcome = learn(&template, &trees, &LearnOptions::default());
        assert!(!outcome.candidates.is_empty());
    }

    #[test]
    fn zero_variance_x_reports_a_learner_failure() {
        // `a.height` (the x anchor) is 0 in both examples, so `Σx²` is 0 and
        // the mul-only estimator `â = Σxy / Σx²` is undefined.
        let trees = vec![
            ViewTree::build(ViewSpec {
                name: "a".into(),
                rect: rect(0, 0, 10, 0),
                children: vec![],
            })
            .unwrap(),
            ViewTree::build(ViewSpec {
                name: "a".into(),
                rect: rect(0, 0, 20, 0),
                children: vec![],
            })
            .unwrap(),
        ];
        let template = Constraint::template(
            ConstraintKind::SizeRatio,
            AnchorId::new("a", viewsynth_core::Attribute::Width),
            Some(AnchorId::new("a", viewsynth_core::Attribute::Height)),
        );
        let outcome = learn(&template, &trees, &LearnOptions::default());
        assert!(outcome.candidates.is_empty());
        assert!(matches!(
            outcome.diagnostic.unwrap().error,
            ViewSynthError::LearnerFailure(_)
        ));
    }
}
