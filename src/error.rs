//! Error taxonomy for the analysis pipeline.
//!
//! Only a failed historical-data fetch is fatal to a request. A failed
//! narrator call is recovered stage-locally by the orchestrator, and a
//! pattern that matches nothing simply leaves the documented default in
//! place and is not an error at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The historical climate archive could not be reached or returned an
    /// unusable payload. Fatal: the request produces an error event and no
    /// structured summary.
    #[error("climate data source failure: {0}")]
    DataSource(String),

    /// A single narrator call failed. The orchestrator recovers by skipping
    /// the stage's event and passing empty text forward.
    #[error("narrator stage '{stage}' failed: {message}")]
    StageNarrator { stage: String, message: String },
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::DataSource(err.to_string())
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
