//! Deterministic synthesis over the accumulated narrative.
//!
//! Everything in this module is a pure function of its inputs: identical
//! (climate context, narrative texts, weights, horizon) always produce the
//! identical structured output.

pub mod extractor;
pub mod extrapolator;
pub mod hazards;

pub use extractor::{extract_signals, SignalExtraction};
pub use extrapolator::extrapolate;
pub use hazards::{canonicalize, collect_raw_hazards, prioritize_hazards, CanonicalHazard};
