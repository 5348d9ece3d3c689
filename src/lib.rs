//! Climate risk synthesis service.
//!
//! Converts a geographic point, a planning horizon and user priority
//! weights into a quantified climate-risk assessment:
//! - a deterministic climate classification from 90 days of history,
//! - a sequential four-stage narrative pipeline over an external narrator,
//! - regex-cascade extraction of scores and dollar figures from the text,
//! - hazard canonicalization onto a fixed six-term vocabulary,
//! - deterministic extrapolation across the requested horizon.
//!
//! The contract is internal consistency, determinism and graceful
//! degradation, not scientific ground truth.

pub mod climate;
pub mod config;
pub mod error;
pub mod narrator;
pub mod pipeline;
pub mod server;
pub mod synthesis;
pub mod types;

// Re-exports for convenience
pub use climate::{classify, ClimateContext, ClimateDataSource};
pub use error::AnalysisError;
pub use narrator::Narrator;
pub use pipeline::NarrativeOrchestrator;
pub use synthesis::CanonicalHazard;
pub use types::{AnalysisEvent, AnalyzeRequest, PriorityWeights, RiskScoreSet};
