//! End-to-end pipeline scenarios (spec §8), each exercising `synthesize`
//! over a small hand-built example set rather than probing any one crate
//! in isolation — the per-crate unit tests already cover the individual
//! stages (instantiation, learning, pruning) in depth.

use viewsynth::{CancellationToken, Options, PruningMethod};
use viewsynth_core::{AnchorId, Attribute, ConstraintCandidate, ConstraintKind, Rational};

fn has(candidates: &[ConstraintCandidate], kind: ConstraintKind, y: &AnchorId, x: Option<&AnchorId>) -> bool {
    candidates
        .iter()
        .any(|c| c.constraint.kind == kind && &c.constraint.y == y && c.constraint.x.as_ref() == x)
}

/// S1: a header with a constant height across two screen sizes should
/// survive pruning as `header.height = 80`.
#[test]
fn s1_constant_header_height_survives_the_full_pipeline() {
    let json = r#"[
        { "name": "root", "rect": [0, 0, 800, 600],
          "children": [ { "name": "header", "rect": [0, 0, 800, 80], "children": [] } ] },
        { "name": "root", "rect": [0, 0, 1200, 900],
          "children": [ { "name": "header", "rect": [0, 0, 1200, 80], "children": [] } ] }
    ]"#;
    let opts = Options::default();
    let cancel = CancellationToken::new();
    let result = viewsynth::synthesize(json, &opts, &cancel).unwrap();

    assert!(has(
        &result.constraints,
        ConstraintKind::SizeConstant,
        &AnchorId::new("header", Attribute::Height),
        None,
    ));
}

/// S2: sidebar and main are anchored to root and to each other through the
/// header; these offsets should survive pruning with both the
/// hierarchical and the baseline pruner.
#[test]
fn s2_sidebar_and_main_layout_survives_both_pruners() {
    let spec_of = |w: i64, h: i64| {
        format!(
            r#"{{ "name": "root", "rect": [0, 0, {w}, {h}],
              "children": [
                {{ "name": "header", "rect": [0, 0, {w}, 80], "children": [] }},
                {{ "name": "sidebar", "rect": [0, 80, 200, {h}], "children": [] }},
                {{ "name": "main", "rect": [200, 80, {w}, {h}], "children": [] }}
              ] }}"#
        )
    };
    let json = format!("[{}, {}]", spec_of(800, 600), spec_of(1200, 900));

    for method in [PruningMethod::Hierarchical, PruningMethod::Baseline] {
        let mut opts = Options::default();
        opts.pruning_method = method;
        let cancel = CancellationToken::new();
        let result = viewsynth::synthesize(&json, &opts, &cancel).unwrap();

        assert!(
            has(
                &result.constraints,
                ConstraintKind::PosLtrbOffset,
                &AnchorId::new("sidebar", Attribute::Left),
                Some(&AnchorId::new("root", Attribute::Left)),
            ),
            "sidebar.left = root.left should survive under {method:?}"
        );
        assert!(
            has(
                &result.constraints,
                ConstraintKind::PosLtrbOffset,
                &AnchorId::new("main", Attribute::Left),
                Some(&AnchorId::new("sidebar", Attribute::Right)),
            ),
            "main.left = sidebar.right should survive under {method:?}"
        );
    }
}

/// S3: a view whose width and height scale together across examples should
/// learn an aspect-ratio constraint, not an independent constant for each.
#[test]
fn s3_aspect_ratio_view_learns_a_ratio_not_two_constants() {
    let json = r#"[
        { "name": "tile", "rect": [0, 0, 300, 200], "children": [] },
        { "name": "tile", "rect": [0, 0, 600, 400], "children": [] },
        { "name": "tile", "rect": [0, 0, 150, 100], "children": [] }
    ]"#;
    let mut opts = Options::default();
    opts.pruning_method = PruningMethod::None;
    let cancel = CancellationToken::new();
    let result = viewsynth::synthesize(json, &opts, &cancel).unwrap();

    assert!(has(
        &result.constraints,
        ConstraintKind::SizeAspectRatio,
        &AnchorId::new("tile", Attribute::Width),
        Some(&AnchorId::new("tile", Attribute::Height)),
    ));
}

/// S4: a panel whose width tracks half its parent's width, but not exactly
/// (each of three examples is off by a point or two), should still learn
/// the simple ratio `1/2` rather than the noisy raw point estimate — the
/// Stern-Brocot simplicity prior pulling the posterior towards the nearby
/// low-depth fraction once its CI contains it.
#[test]
fn s4_noisy_half_width_ratio_resolves_to_the_simple_fraction() {
    let json = r#"[
        { "name": "root", "rect": [0, 0, 20, 100],
          "children": [ { "name": "panel", "rect": [0, 0, 11, 50], "children": [] } ] },
        { "name": "root", "rect": [0, 0, 40, 200],
          "children": [ { "name": "panel", "rect": [0, 0, 19, 100], "children": [] } ] },
        { "name": "root", "rect": [0, 0, 60, 300],
          "children": [ { "name": "panel", "rect": [0, 0, 31, 150], "children": [] } ] }
    ]"#;
    let mut opts = Options::default();
    opts.pruning_method = PruningMethod::None;
    // Center the prior on `1/2`'s own Stern-Brocot depth so the assertion
    // below exercises the preference mechanism itself, rather than
    // fighting the unrelated default center tuned for deeper fractions.
    opts.expected_depth = 2;
    let cancel = CancellationToken::new();
    let result = viewsynth::synthesize(json, &opts, &cancel).unwrap();

    // Candidates for one template are emitted score-descending, so the
    // first match is the top-scoring parameter choice.
    let top = result.constraints.iter().find(|c| {
        c.constraint.kind == ConstraintKind::SizeRatio
            && c.constraint.y == AnchorId::new("panel", Attribute::Width)
            && c.constraint.x.as_ref() == Some(&AnchorId::new("root", Attribute::Width))
    });
    let top = top.expect("no width-ratio candidate was learned for panel against root");
    assert_eq!(top.constraint.a, Rational::new(1, 2));
}

/// S5: in a three-up row `a | b | c`, `a` and `c` are not mutually visible
/// (`b` sits between them), so the instantiator must never produce a
/// sketch directly relating the two — only the genuinely adjacent pairs
/// (`a`/`b`, `b`/`c`) should ever reach the learner or survive synthesis.
#[test]
fn s5_blocked_siblings_never_produce_a_direct_constraint() {
    let spec_of = |w: i64| {
        let mid = w - 100;
        format!(
            r#"{{ "name": "root", "rect": [0, 0, {w}, 100],
              "children": [
                {{ "name": "a", "rect": [0, 0, 100, 100], "children": [] }},
                {{ "name": "b", "rect": [100, 0, {mid}, 100], "children": [] }},
                {{ "name": "c", "rect": [{mid}, 0, {w}, 100], "children": [] }}
              ] }}"#
        )
    };
    let json = format!("[{}, {}]", spec_of(300), spec_of(400));

    let mut opts = Options::default();
    opts.pruning_method = PruningMethod::None;
    let cancel = CancellationToken::new();
    let result = viewsynth::synthesize(&json, &opts, &cancel).unwrap();

    let touches_a_and_c = |c: &ConstraintCandidate| {
        let y_view = c.constraint.y.view.as_str();
        let x_view = c.constraint.x.as_ref().map(|x| x.view.as_str());
        (y_view == "a" && x_view == Some("c")) || (y_view == "c" && x_view == Some("a"))
    };
    assert!(
        !result.constraints.iter().any(touches_a_and_c),
        "a blocked sibling pair should never reach the learner, let alone survive synthesis"
    );
    assert!(has(
        &result.constraints,
        ConstraintKind::PosLtrbOffset,
        &AnchorId::new("b", Attribute::Left),
        Some(&AnchorId::new("a", Attribute::Right)),
    ));
}

/// S6: the hierarchical pruner and the monolithic baseline pruner should
/// select the same constraint set on a tree small enough for both to run
/// (spec §8's consistency property), when run through the full pipeline
/// rather than directly against `viewsynth_prune`.
#[test]
fn s6_hierarchical_and_baseline_agree_through_the_full_pipeline() {
    let spec_of = |w: i64, h: i64| {
        format!(
            r#"{{ "name": "root", "rect": [0, 0, {w}, {h}],
              "children": [
                {{ "name": "header", "rect": [0, 0, {w}, 80], "children": [] }},
                {{ "name": "main", "rect": [0, 80, {w}, {h}], "children": [] }}
              ] }}"#
        )
    };
    let json = format!("[{}, {}]", spec_of(800, 600), spec_of(1200, 900));

    let mut hier_opts = Options::default();
    hier_opts.pruning_method = PruningMethod::Hierarchical;
    let mut base_opts = Options::default();
    base_opts.pruning_method = PruningMethod::Baseline;

    let cancel = CancellationToken::new();
    let hier = viewsynth::synthesize(&json, &hier_opts, &cancel).unwrap();
    let base = viewsynth::synthesize(&json, &base_opts, &cancel).unwrap();

    let mut hier_keys: Vec<_> = hier
        .constraints
        .iter()
        .map(|c| (c.constraint.kind, c.constraint.y.clone(), c.constraint.x.clone()))
        .collect();
    let mut base_keys: Vec<_> = base
        .constraints
        .iter()
        .map(|c| (c.constraint.kind, c.constraint.y.clone(), c.constraint.x.clone()))
        .collect();
    hier_keys.sort_by_key(|(_, y, _)| y.to_string());
    base_keys.sort_by_key(|(_, y, _)| y.to_string());
    assert_eq!(hier_keys, base_keys);
}

#[test]
fn pruning_method_none_returns_every_learned_candidate_unselected() {
    let json = r#"[
        { "name": "root", "rect": [0, 0, 800, 600],
          "children": [ { "name": "header", "rect": [0, 0, 800, 80], "children": [] } ] },
        { "name": "root", "rect": [0, 0, 1200, 900],
          "children": [ { "name": "header", "rect": [0, 0, 1200, 80], "children": [] } ] }
    ]"#;
    let mut opts = Options::default();
    opts.pruning_method = PruningMethod::None;
    let cancel = CancellationToken::new();
    let with_none = viewsynth::synthesize(json, &opts, &cancel).unwrap();

    opts.pruning_method = PruningMethod::Hierarchical;
    let with_pruning = viewsynth::synthesize(json, &opts, &cancel).unwrap();

    assert!(with_none.constraints.len() >= with_pruning.constraints.len());
}
