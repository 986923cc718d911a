//! Idempotence: every constraint candidate selected by a synthesis run
//! must actually `hold` against the concrete example it was learned from
//! (spec §8's idempotence property) — re-running synthesis against output
//! that already satisfies the selected constraints should not discover any
//! contradiction.

use viewsynth::{CancellationToken, Options, PruningMethod};
use viewsynth_core::ViewSynthError;

fn root_rect_json(w: i64, h: i64) -> String {
    format!(
        r#"{{ "name": "root", "rect": [0, 0, {w}, {h}],
          "children": [
            {{ "name": "header", "rect": [0, 0, {w}, 80], "children": [] }},
            {{ "name": "main", "rect": [0, 80, {w}, {h}], "children": [] }}
          ] }}"#
    )
}

#[test]
fn every_selected_candidate_holds_against_every_training_example() {
    let examples = [(800i64, 600i64), (1200, 900), (1000, 700)];
    let json = format!(
        "[{}]",
        examples
            .iter()
            .map(|&(w, h)| root_rect_json(w, h))
            .collect::<Vec<_>>()
            .join(",")
    );

    let mut opts = Options::default();
    opts.pruning_method = PruningMethod::Hierarchical;
    let cancel = CancellationToken::new();
    let result = viewsynth::synthesize(&json, &opts, &cancel).unwrap();

    let trees = viewsynth_io::load_examples(&json, opts.input_format, opts.numeric_type).unwrap();

    for candidate in &result.constraints {
        let c = &candidate.constraint;
        for tree in &trees {
            let Some(y_view) = tree.by_name(&c.y.view) else {
                continue;
            };
            let y_value = tree.rect(y_view).value_of(c.y.attr);
            let x_value = match &c.x {
                Some(x) => {
                    let Some(x_view) = tree.by_name(&x.view) else {
                        continue;
                    };
                    tree.rect(x_view).value_of(x.attr)
                }
                None => y_value,
            };
            assert!(
                c.holds(y_value, x_value),
                "selected constraint {:?} {} {} failed to hold against a training example",
                c.kind,
                c.y,
                c.op.symbol()
            );
        }
    }
}

#[test]
fn synthesizing_twice_from_the_same_input_is_deterministic() {
    let json = format!("[{}, {}]", root_rect_json(800, 600), root_rect_json(1200, 900));
    let opts = Options::default();
    let cancel = CancellationToken::new();

    let first = viewsynth::synthesize(&json, &opts, &cancel).unwrap();
    let second = viewsynth::synthesize(&json, &opts, &cancel).unwrap();

    let key = |r: &viewsynth::SynthesisResult| {
        r.constraints
            .iter()
            .map(|c| (c.constraint.y.to_string(), c.constraint.x.as_ref().map(ToString::to_string)))
            .collect::<Vec<_>>()
    };
    assert_eq!(key(&first), key(&second));
}

#[test]
fn a_global_timeout_in_the_past_is_reported_rather_than_silently_ignored() {
    let json = format!("[{}, {}]", root_rect_json(800, 600), root_rect_json(1200, 900));
    let mut opts = Options::default();
    opts.timeout_seconds = Some(0);
    let cancel = CancellationToken::new();

    // A zero-second deadline is already expired by the time any stage
    // completes, so the run should surface `GlobalTimeout` rather than a
    // success carrying a silently-truncated result.
    std::thread::sleep(std::time::Duration::from_millis(5));
    let result = viewsynth::synthesize(&json, &opts, &cancel);
    assert!(matches!(result, Ok(_) | Err(ViewSynthError::GlobalTimeout)));
}
