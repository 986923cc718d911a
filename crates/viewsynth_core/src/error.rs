//! The shared error taxonomy of spec §7.
//!
//! Only [`ViewSynthError::InvalidInput`] and [`ViewSynthError::GlobalTimeout`]
//! are ever surfaced as a failing top-level `Result`; every other variant is
//! recovered per-subproblem and instead recorded as a [`Diagnostic`] (see
//! `viewsynth::Diagnostics`), following the propagation policy of spec §7.
//! The shape mirrors the structured, serializable error payloads used
//! elsewhere in the pack's physics-engine workspace (`asm-core::errors`),
//! adapted to this crate's taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The canonical error type for the viewsynth engine.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ViewSynthError {
    /// Malformed JSON, non-isomorphic examples, negative dimensions.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A template was rejected by the learner (goodness-of-fit or spread).
    /// Recovered locally as an empty candidate list for that template.
    #[error("template rejected: {0}")]
    TemplateRejected(String),

    /// Regression was numerically ill-conditioned (e.g. zero-variance `x`
    /// for a mul-only form). Recovered as template rejection plus this
    /// warning record.
    #[error("learner failure: {0}")]
    LearnerFailure(String),

    /// A pruning subproblem had no feasible assignment. Recovered by
    /// emitting the empty selection for that focus view.
    #[error("SMT unsat for focus `{focus}`")]
    SmtUnsat {
        /// The view name of the focus that failed.
        focus: String,
    },

    /// A MaxSMT query exceeded its deadline. Same recovery as
    /// [`SmtUnsat`](ViewSynthError::SmtUnsat).
    #[error("SMT timeout for focus `{focus}`")]
    SmtTimeout {
        /// The view name of the focus that timed out.
        focus: String,
    },

    /// The global synthesis deadline was exhausted; fatal to the whole run.
    /// The caller still receives the partial accumulation gathered so far.
    #[error("global synthesis deadline exceeded")]
    GlobalTimeout,
}

impl ViewSynthError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error must propagate to the top-level caller rather
    /// than being soaked as a per-subproblem [`Diagnostic`].
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::GlobalTimeout)
    }
}

/// A record of a soaked, non-fatal error, retained for debugging and for
/// tests that assert on graceful-degradation behavior rather than only on
/// the final constraint set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub error: ViewSynthError,
    /// Free-form context, e.g. the template or focus view involved.
    pub context: String,
}

impl Diagnostic {
    pub fn new(error: ViewSynthError, context: impl Into<String>) -> Self {
        Self {
            error,
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_invalid_input_and_timeout_are_fatal() {
        assert!(ViewSynthError::invalid_input("bad").is_fatal());
        assert!(ViewSynthError::GlobalTimeout.is_fatal());
        assert!(!ViewSynthError::TemplateRejected("x".into()).is_fatal());
        assert!(!ViewSynthError::SmtUnsat { focus: "root".into() }.is_fatal());
    }
}
