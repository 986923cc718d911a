//! The synthesis run configuration of spec §6, plus the Bayesian prior
//! tuning knobs of spec §9.

use serde::{Deserialize, Serialize};
use viewsynth_core::Rational;
use viewsynth_io::{InputFormat, NumericType};

/// Which instantiation strategy produces sketches. Spec §6 names `numpy`
/// and `prolog` as two historically equivalent implementations of the same
/// rule table and requires only one; `Prolog` is kept as a named,
/// unimplemented alternative for config round-tripping (spec §9's
/// "Strategy selection" capability set), not a second implementation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstantiationMethod {
    #[default]
    Numpy,
    Prolog,
}

/// Which learning strategy fits template parameters. Only `NoiseTolerant`
/// (spec §4.3) is implemented; `Simple` and `Heuristic` are named slots for
/// the swappable-strategy capability set of spec §9 and currently fall back
/// to `NoiseTolerant`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LearningMethod {
    Simple,
    Heuristic,
    #[default]
    NoiseTolerant,
}

/// Which pruning strategy selects a consistent constraint subset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PruningMethod {
    /// Skip pruning: return every learned candidate, unselected.
    None,
    /// The monolithic single-query pruner (`viewsynth_prune::prune_baseline`).
    Baseline,
    /// The decomposed per-focus pruner (`viewsynth_prune::prune_hierarchical`).
    #[default]
    Hierarchical,
}

/// The root screen-size range the pruner samples conformances across.
/// `None` fields are filled in from the first example's root rect at
/// synthesis time (spec §6: "values may be null").
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct PruningBounds {
    pub min_width: Option<Rational>,
    pub min_height: Option<Rational>,
    pub max_width: Option<Rational>,
    pub max_height: Option<Rational>,
}

/// The full synthesis run configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Options {
    pub input_format: InputFormat,
    pub numeric_type: NumericType,
    pub instantiation_method: InstantiationMethod,
    pub learning_method: LearningMethod,
    pub pruning_method: PruningMethod,
    pub pruning_bounds: PruningBounds,
    /// Truncate the loaded example list to this many trees, if set.
    pub num_examples: Option<usize>,
    /// Global synthesis deadline, `None` for no deadline.
    pub timeout_seconds: Option<u64>,
    pub emit_after_visibility: bool,
    pub emit_after_instantiation: bool,
    pub emit_after_learning: bool,

    // Bayesian prior tuning (spec §4.3, §9).
    pub a_alpha: f64,
    pub b_alpha: f64,
    pub cutoff_fit: f64,
    pub cutoff_spread: f64,
    pub max_offset: i64,
    pub max_denominator: i64,
    pub expected_depth: i64,
    pub top_k: Option<usize>,

    /// Minimum number of a focus's children considered independently linked
    /// (spec §9's Open Question on the linking heuristic's lower bound).
    pub min_linked_children: usize,
}

impl Default for Options {
    fn default() -> Self {
        let learn_defaults = viewsynth_learn::LearnOptions::default();
        let prune_defaults = viewsynth_prune::PruneOptions::default();
        Self {
            input_format: InputFormat::default(),
            numeric_type: NumericType::default(),
            instantiation_method: InstantiationMethod::default(),
            learning_method: LearningMethod::default(),
            pruning_method: PruningMethod::default(),
            pruning_bounds: PruningBounds::default(),
            num_examples: None,
            timeout_seconds: None,
            emit_after_visibility: false,
            emit_after_instantiation: false,
            emit_after_learning: false,
            a_alpha: learn_defaults.a_alpha,
            b_alpha: learn_defaults.b_alpha,
            cutoff_fit: learn_defaults.cutoff_fit,
            cutoff_spread: learn_defaults.cutoff_spread,
            max_offset: learn_defaults.max_offset,
            max_denominator: learn_defaults.max_denominator,
            expected_depth: learn_defaults.expected_depth,
            top_k: learn_defaults.top_k,
            min_linked_children: prune_defaults.min_linked_children,
        }
    }
}

impl Options {
    pub(crate) fn learn_options(&self) -> viewsynth_learn::LearnOptions {
        viewsynth_learn::LearnOptions {
            a_alpha: self.a_alpha,
            b_alpha: self.b_alpha,
            cutoff_fit: self.cutoff_fit,
            cutoff_spread: self.cutoff_spread,
            max_offset: self.max_offset,
            max_denominator: self.max_denominator,
            expected_depth: self.expected_depth,
            top_k: self.top_k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_learner_and_pruner_defaults() {
        let opts = Options::default();
        assert_eq!(opts.cutoff_fit, viewsynth_learn::LearnOptions::default().cutoff_fit);
        assert_eq!(opts.min_linked_children, viewsynth_prune::PruneOptions::default().min_linked_children);
    }
}
