// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON ingestion and constraint serialization (spec §6).
//!
//! This crate is a thin, swappable ambient surface: `viewsynth_core`'s view
//! tree and constraint types are the stable contract, and this crate just
//! knows how to get them in and out of the two JSON shapes spec §6
//! describes. It is not part of the synthesis core itself.

pub mod load;
pub mod write;

pub use load::{load_examples, InputFormat, NumericType};
pub use write::candidate_to_json;
