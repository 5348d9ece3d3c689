//! Sequential narrative pipeline.
//!
//! Four dependent narrator stages followed by a deterministic synthesis
//! pass over everything they produced.

pub mod orchestrator;
pub mod stages;

pub use orchestrator::{AssessmentOutcome, NarrativeOrchestrator};
pub use stages::NARRATIVE_STAGES;
