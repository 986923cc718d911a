// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The end-to-end layout-constraint synthesis pipeline: load examples,
//! instantiate candidate sketches from the relationship-predicate rule
//! table, learn per-template parameters against the examples, and prune to
//! a consistent subset with the hierarchical MaxSMT decomposition.
//!
//! [`synthesize`] is the single entry point the CLI and any embedder call;
//! everything else in this crate is configuration
//! ([`Options`]) or cooperative run control ([`CancellationToken`],
//! [`cancellation::Deadline`]).

pub mod cancellation;
pub mod options;

pub use cancellation::{CancellationToken, Deadline};
pub use options::{InstantiationMethod, LearningMethod, Options, PruningBounds, PruningMethod};

use tracing::{debug, info, instrument};
use viewsynth_core::{ConstraintCandidate, Diagnostic, Rational, ViewSynthError};
use viewsynth_prune::{PruneOptions, TestBounds};

/// The accumulated result of a synthesis run: the selected (or, with
/// [`PruningMethod::None`], every learned) constraint candidate, plus any
/// non-fatal diagnostics recorded along the way (spec §7: most errors are
/// recoverable and do not abort the run).
#[derive(Clone, Debug, Default)]
pub struct SynthesisResult {
    pub constraints: Vec<ConstraintCandidate>,
    pub diagnostics: Vec<Diagnostic>,
}

fn test_bounds_from(
    bounds: &PruningBounds,
    first_root: viewsynth_core::geometry::Rect,
) -> TestBounds {
    TestBounds {
        min_width: bounds.min_width.unwrap_or_else(|| first_root.width()),
        min_height: bounds.min_height.unwrap_or_else(|| first_root.height()),
        max_width: bounds.max_width.unwrap_or_else(|| first_root.width()),
        max_height: bounds.max_height.unwrap_or_else(|| first_root.height()),
        origin_x: Rational::from_integer(0),
        origin_y: Rational::from_integer(0),
    }
}

/// Run the whole pipeline over a JSON document of example view trees
/// (spec §6's two input shapes, per `opts.input_format`).
///
/// Returns `Err` only for the two fatal error kinds of spec §7:
/// [`ViewSynthError::InvalidInput`] (malformed or topologically
/// inconsistent input, surfaced immediately from loading) and
/// [`ViewSynthError::GlobalTimeout`] (the run's overall deadline, checked
/// between pipeline stages, expired). Every other error kind is
/// recoverable and is instead folded into the returned
/// [`SynthesisResult::diagnostics`] — in particular, a focus view's MaxSMT
/// query going unsatisfiable or timing out does not abort the worklist;
/// the pruner's own graceful degradation (see `viewsynth_prune`) is what
/// spec §7 means by "returns the partial accumulation so far."
#[instrument(skip(json, opts, cancel))]
pub fn synthesize(
    json: &str,
    opts: &Options,
    cancel: &CancellationToken,
) -> Result<SynthesisResult, ViewSynthError> {
    let deadline = Deadline::from_seconds(opts.timeout_seconds);

    let mut examples = viewsynth_io::load_examples(json, opts.input_format, opts.numeric_type)?;
    if let Some(n) = opts.num_examples {
        examples.truncate(n);
    }
    if examples.is_empty() {
        return Err(ViewSynthError::invalid_input(
            "no example view trees were provided",
        ));
    }
    info!(count = examples.len(), "loaded examples");
    if opts.emit_after_visibility {
        for (index, tree) in examples.iter().enumerate() {
            let pairs = viewsynth_visibility::visible_pairs(tree);
            debug!(example = index, pairs = ?pairs, "post-visibility anchor pairs");
        }
    }

    if deadline.is_expired() || cancel.is_cancelled() {
        return Err(ViewSynthError::GlobalTimeout);
    }

    let templates = match opts.instantiation_method {
        InstantiationMethod::Numpy => viewsynth_instantiate::instantiate(&examples)?,
        InstantiationMethod::Prolog => {
            return Err(ViewSynthError::invalid_input(
                "the prolog instantiation strategy is not implemented",
            ));
        }
    };
    debug!(count = templates.len(), "instantiated candidate templates");
    if opts.emit_after_instantiation {
        debug!(templates = ?templates, "post-instantiation templates");
    }

    if deadline.is_expired() || cancel.is_cancelled() {
        return Err(ViewSynthError::GlobalTimeout);
    }

    let learn_opts = opts.learn_options();
    let (candidates, mut diagnostics) = viewsynth_learn::learn_all(&templates, &examples, &learn_opts);
    debug!(count = candidates.len(), "learned candidates");
    if opts.emit_after_learning {
        debug!(candidates = ?candidates, "post-learning candidates");
    }

    if deadline.is_expired() || cancel.is_cancelled() {
        return Err(ViewSynthError::GlobalTimeout);
    }

    let tree = &examples[0];
    let bounds = test_bounds_from(&opts.pruning_bounds, tree.rect(tree.root()));
    let prune_opts = PruneOptions {
        min_linked_children: opts.min_linked_children,
        per_focus_timeout: deadline.remaining().min(std::time::Duration::from_secs(30)),
    };

    let constraints = match opts.pruning_method {
        PruningMethod::None => candidates,
        PruningMethod::Baseline => {
            let (selected, diag) = viewsynth_prune::prune_baseline(&candidates, tree, &bounds, &prune_opts);
            diagnostics.extend(diag);
            selected
        }
        PruningMethod::Hierarchical => {
            let (selected, diag) = viewsynth_prune::prune_hierarchical(&candidates, tree, &bounds, &prune_opts);
            diagnostics.extend(diag);
            selected
        }
    };

    if deadline.is_expired() {
        return Err(ViewSynthError::GlobalTimeout);
    }

    Ok(SynthesisResult {
        constraints,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_example_list_is_invalid_input() {
        let opts = Options::default();
        let cancel = CancellationToken::new();
        let result = synthesize("[]", &opts, &cancel);
        assert!(matches!(result, Err(ViewSynthError::InvalidInput(_))));
    }

    #[test]
    fn malformed_json_is_invalid_input() {
        let opts = Options::default();
        let cancel = CancellationToken::new();
        let result = synthesize("not json", &opts, &cancel);
        assert!(matches!(result, Err(ViewSynthError::InvalidInput(_))));
    }

    #[test]
    fn a_single_flat_example_synthesizes_without_error() {
        let json = r#"[
            { "name": "root", "rect": [0, 0, 800, 600],
              "children": [ { "name": "header", "rect": [0, 0, 800, 80], "children": [] } ] }
        ]"#;
        let opts = Options::default();
        let cancel = CancellationToken::new();
        let result = synthesize(json, &opts, &cancel);
        assert!(result.is_ok());
    }
}
