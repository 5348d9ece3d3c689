//! The sequential narrative pipeline.
//!
//! Stages are strictly sequential: every prompt depends on the full raw
//! text of everything before it, so there is nothing to fan out. The only
//! suspension points are the narrator calls, and a single stage failing
//! never aborts the run.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::climate::ClimateContext;
use crate::error::{AnalysisError, AnalysisResult};
use crate::narrator::Narrator;
use crate::pipeline::stages::{self, NARRATIVE_STAGES};
use crate::synthesis::{self, CanonicalHazard};
use crate::types::{
    risk_level, AnalysisEvent, AnalyzeRequest, EconomicImpactEstimate, NarrativeMessage,
    RiskScoreSet, StageRole,
};

/// The structured result behind the terminal event.
#[derive(Debug, Clone)]
pub struct AssessmentOutcome {
    pub risk_scores: RiskScoreSet,
    pub hazards: Vec<CanonicalHazard>,
    pub economic_impact: EconomicImpactEstimate,
    pub risk_level: &'static str,
}

pub struct NarrativeOrchestrator {
    narrator: Arc<dyn Narrator>,
    stage_delay: Duration,
}

impl NarrativeOrchestrator {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self {
            narrator,
            // Client pacing only; carries no correctness weight.
            stage_delay: Duration::from_millis(300),
        }
    }

    pub fn with_stage_delay(mut self, delay: Duration) -> Self {
        self.stage_delay = delay;
        self
    }

    /// Run the full pipeline for one request, emitting one event per
    /// completed stage plus the terminal structured event. Returns `None`
    /// when the consumer disconnected before the run finished.
    pub async fn run(
        &self,
        request: &AnalyzeRequest,
        context: &ClimateContext,
        events: &mpsc::UnboundedSender<AnalysisEvent>,
    ) -> Option<AssessmentOutcome> {
        let mut transcript: Vec<NarrativeMessage> = Vec::new();

        for role in NARRATIVE_STAGES {
            // Cooperative cancellation: do not start a stage for a consumer
            // that is gone.
            if events.is_closed() {
                info!(stage = %role, "consumer disconnected, abandoning pipeline");
                return None;
            }

            // A disconnect mid-call abandons the in-flight narrator request.
            let stage_result = tokio::select! {
                result = self.run_stage(role, request, context, &transcript) => result,
                _ = events.closed() => {
                    info!(stage = %role, "consumer disconnected mid-stage, abandoning pipeline");
                    return None;
                }
            };

            match stage_result {
                Ok(content) => {
                    let _ = events.send(AnalysisEvent::narrative(role, content.clone()));
                    transcript.push(NarrativeMessage { role, content });
                }
                Err(err) => {
                    // Recovered locally: no event for this stage, empty
                    // text forward, later stages omit the section.
                    warn!(error = %err, "stage failed, continuing with empty output");
                    transcript.push(NarrativeMessage {
                        role,
                        content: String::new(),
                    });
                }
            }

            if !self.stage_delay.is_zero() {
                tokio::time::sleep(self.stage_delay).await;
            }
        }

        let outcome = synthesize(request, context, &transcript);
        let _ = events.send(AnalysisEvent::summary(
            outcome.risk_scores,
            outcome.hazards.clone(),
            outcome.economic_impact,
        ));
        Some(outcome)
    }

    async fn run_stage(
        &self,
        role: StageRole,
        request: &AnalyzeRequest,
        context: &ClimateContext,
        transcript: &[NarrativeMessage],
    ) -> AnalysisResult<String> {
        let prompt = stages::build_prompt(role, context, request, transcript);
        debug!(stage = %role, prompt_len = prompt.len(), "invoking narrator");
        self.narrator
            .invoke(&prompt)
            .await
            .map_err(|err| AnalysisError::StageNarrator {
                stage: role.to_string(),
                message: err.to_string(),
            })
    }
}

fn stage_text(transcript: &[NarrativeMessage], role: StageRole) -> &str {
    transcript
        .iter()
        .find(|message| message.role == role)
        .map(|message| message.content.as_str())
        .unwrap_or("")
}

/// The deterministic tail of the pipeline: extract, canonicalize,
/// extrapolate. Pure over the transcript and request inputs.
fn synthesize(
    request: &AnalyzeRequest,
    context: &ClimateContext,
    transcript: &[NarrativeMessage],
) -> AssessmentOutcome {
    let analyst_text = stage_text(transcript, StageRole::HazardAnalyst);
    let economist_text = stage_text(transcript, StageRole::Economist);
    let planner_text = stage_text(transcript, StageRole::Planner);

    let weights = request.priorities.as_ref();

    let extraction = synthesis::extract_signals(planner_text, economist_text, weights);

    let seeds = synthesis::collect_raw_hazards(analyst_text, planner_text, context);
    let hazards = synthesis::prioritize_hazards(&seeds, context);

    let risk_scores = synthesis::extrapolate(
        extraction.scores,
        request.horizon_years,
        context,
        weights,
    );

    let mut economic_impact = extraction.economics;
    economic_impact.reprice(risk_scores.overall);

    AssessmentOutcome {
        risk_level: risk_level(risk_scores.overall),
        risk_scores,
        hazards,
        economic_impact,
    }
}
