//! Shared request, score, and event types.

use serde::{Deserialize, Serialize};

use crate::synthesis::hazards::CanonicalHazard;

/// A geographic point selected by the consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub name: String,
}

/// Relative importance of the three scoring dimensions.
///
/// Values may arrive on any positive scale; they are normalized by their sum
/// at the point of use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriorityWeights {
    pub environmental: f64,
    pub economic: f64,
    pub social: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            environmental: 34.0,
            economic: 33.0,
            social: 33.0,
        }
    }
}

impl PriorityWeights {
    /// Weight-normalized blend of the three sub-scores, rounded to the
    /// nearest integer and clamped to the score range.
    pub fn blend(&self, environmental: u8, economic: u8, social: u8) -> u8 {
        let sum = self.environmental + self.economic + self.social;
        if !(sum > 0.0) {
            return Self::default().blend(environmental, economic, social);
        }
        let blended = (f64::from(environmental) * self.environmental
            + f64::from(economic) * self.economic
            + f64::from(social) * self.social)
            / sum;
        blended.round().clamp(0.0, 100.0) as u8
    }
}

/// The analysis request accepted by the streaming endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub location: GeoPoint,
    /// Years into the future the assessment should model.
    #[serde(default = "default_horizon")]
    pub horizon_years: u32,
    /// Optional user priority weights; defaults apply when absent.
    #[serde(default)]
    pub priorities: Option<PriorityWeights>,
    /// Free-form consumer context appended to every stage prompt.
    #[serde(default)]
    pub user_prompt: Option<String>,
}

fn default_horizon() -> u32 {
    10
}

/// The four clamped 0-100 integers that are the system's primary numeric
/// output. Starts at the documented defaults, is revised once by the
/// extractor and once more (finally) by the extrapolator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScoreSet {
    pub environmental: u8,
    pub economic: u8,
    pub social: u8,
    pub overall: u8,
}

impl Default for RiskScoreSet {
    fn default() -> Self {
        Self {
            environmental: 30,
            economic: 30,
            social: 30,
            overall: 30,
        }
    }
}

/// Estimated household-level economic exposure at the location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicImpactEstimate {
    pub annual_loss_per_capita: i64,
    pub adaptation_cost: i64,
    /// Percent change. Never extracted from text; always recomputed from the
    /// most recent overall score.
    pub property_value_change: i64,
}

impl EconomicImpactEstimate {
    /// Documented defaults, priced against the default overall score.
    pub fn defaults() -> Self {
        let mut estimate = Self {
            annual_loss_per_capita: 5000,
            adaptation_cost: 15000,
            property_value_change: 0,
        };
        estimate.reprice(RiskScoreSet::default().overall);
        estimate
    }

    /// Recompute `property_value_change` from an overall score. Must be the
    /// last mutation applied after any score revision.
    pub fn reprice(&mut self, overall: u8) {
        self.property_value_change = (-f64::from(overall) * 0.35).round() as i64;
    }
}

/// Descriptive band for an overall risk score.
pub fn risk_level(overall: u8) -> &'static str {
    match overall {
        80..=u8::MAX => "EXTREME RISK",
        60..=79 => "HIGH RISK",
        40..=59 => "MODERATE RISK",
        20..=39 => "LOW-MODERATE RISK",
        _ => "LOW RISK",
    }
}

/// Role tags carried on the consumer-facing event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageRole {
    Meteorologist,
    HazardAnalyst,
    Economist,
    Planner,
    System,
}

impl std::fmt::Display for StageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StageRole::Meteorologist => "meteorologist",
            StageRole::HazardAnalyst => "hazard-analyst",
            StageRole::Economist => "economist",
            StageRole::Planner => "planner",
            StageRole::System => "system",
        };
        write!(f, "{label}")
    }
}

/// One `{role, content}` message on the narrative stream. The orchestrator's
/// transcript is an append-only list of these, ordered by stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeMessage {
    pub role: StageRole,
    pub content: String,
}

/// Terminal structured payload emitted once per successful analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub role: StageRole,
    pub risk_scores: RiskScoreSet,
    pub hazards: Vec<CanonicalHazard>,
    pub economic_impact: EconomicImpactEstimate,
    pub risk_level: &'static str,
}

/// Error payload for the fatal path. The stream ends after this with no
/// structured summary.
#[derive(Debug, Clone, Serialize)]
pub struct FailureNotice {
    pub role: StageRole,
    pub content: String,
    pub error: bool,
}

/// Everything the consumer can observe on the event stream.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisEvent {
    Narrative(NarrativeMessage),
    Summary(AnalysisSummary),
    Failure(FailureNotice),
}

impl AnalysisEvent {
    pub fn narrative(role: StageRole, content: impl Into<String>) -> Self {
        AnalysisEvent::Narrative(NarrativeMessage {
            role,
            content: content.into(),
        })
    }

    pub fn summary(
        risk_scores: RiskScoreSet,
        hazards: Vec<CanonicalHazard>,
        economic_impact: EconomicImpactEstimate,
    ) -> Self {
        AnalysisEvent::Summary(AnalysisSummary {
            role: StageRole::System,
            risk_level: risk_level(risk_scores.overall),
            risk_scores,
            hazards,
            economic_impact,
        })
    }

    pub fn failure(message: impl Into<String>) -> Self {
        AnalysisEvent::Failure(FailureNotice {
            role: StageRole::System,
            content: message.into(),
            error: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_normalizes_by_sum() {
        let weights = PriorityWeights {
            environmental: 2.0,
            economic: 1.0,
            social: 1.0,
        };
        // (80*2 + 40*1 + 40*1) / 4 = 60
        assert_eq!(weights.blend(80, 40, 40), 60);
    }

    #[test]
    fn blend_falls_back_on_degenerate_weights() {
        let weights = PriorityWeights {
            environmental: 0.0,
            economic: 0.0,
            social: 0.0,
        };
        assert_eq!(weights.blend(30, 30, 30), 30);
    }

    #[test]
    fn reprice_tracks_overall() {
        let mut estimate = EconomicImpactEstimate::defaults();
        estimate.reprice(100);
        assert_eq!(estimate.property_value_change, -35);
        estimate.reprice(0);
        assert_eq!(estimate.property_value_change, 0);
    }

    #[test]
    fn risk_level_bands() {
        assert_eq!(risk_level(85), "EXTREME RISK");
        assert_eq!(risk_level(60), "HIGH RISK");
        assert_eq!(risk_level(45), "MODERATE RISK");
        assert_eq!(risk_level(20), "LOW-MODERATE RISK");
        assert_eq!(risk_level(5), "LOW RISK");
    }

    #[test]
    fn stage_roles_serialize_kebab_case() {
        let json = serde_json::to_string(&StageRole::HazardAnalyst).unwrap();
        assert_eq!(json, "\"hazard-analyst\"");
    }

    #[test]
    fn failure_event_carries_error_flag() {
        let event = AnalysisEvent::failure("boom");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["error"], true);
    }
}
