//! Structured signal extraction from narrative text.
//!
//! The narrator's output is untrusted free text, so every signal is an
//! ordered list of patterns of decreasing specificity. The first pattern
//! yielding a parseable value wins; a miss leaves the documented default
//! untouched and is not an error. This function never fails.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{EconomicImpactEstimate, PriorityWeights, RiskScoreSet};

lazy_static! {
    static ref ENVIRONMENTAL_PATTERNS: Vec<Regex> = score_patterns("environmental");
    static ref ECONOMIC_PATTERNS: Vec<Regex> = score_patterns("economic");
    static ref SOCIAL_PATTERNS: Vec<Regex> = score_patterns("social");
    static ref OVERALL_PATTERNS: Vec<Regex> = score_patterns("overall");

    /// Dollar-amount patterns over the economist narrative, most to least
    /// specific.
    static ref DOLLAR_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\$\s*([\d,]+)(?:\.\d+)?\s*(?:per\s+capita|per\s+person)\s+(?:annually|per\s+year|a\s+year)")
            .unwrap(),
        Regex::new(r"(?i)annual\s+(?:economic\s+)?loss(?:es)?\s+of\s+(?:about\s+|around\s+|approximately\s+)?\$\s*([\d,]+)")
            .unwrap(),
        Regex::new(r"(?i)\$\s*([\d,]+)(?:\.\d+)?\s*(?:per\s+capita|per\s+person)").unwrap(),
        Regex::new(r"\$\s*([\d,]+)").unwrap(),
    ];
}

fn score_patterns(dimension: &str) -> Vec<Regex> {
    vec![
        Regex::new(&format!(
            r"(?i){dimension}\s+risk\s+score:?\s*(\d{{1,3}})\s*/\s*100"
        ))
        .unwrap(),
        Regex::new(&format!(r"(?i){dimension}\s+risk:?\s*(\d{{1,3}})")).unwrap(),
        Regex::new(&format!(r"(?i){dimension}:?\s*(\d{{1,3}})")).unwrap(),
    ]
}

fn first_score(patterns: &[Regex], text: &str) -> Option<u8> {
    for pattern in patterns {
        if let Some(value) = pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok())
        {
            return Some(value.clamp(0, 100) as u8);
        }
    }
    None
}

fn first_dollar_amount(text: &str) -> Option<i64> {
    for pattern in &*DOLLAR_PATTERNS {
        let amount = pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<i64>().ok());
        if let Some(amount) = amount {
            if amount > 0 && amount < 1_000_000 {
                return Some(amount);
            }
        }
    }
    None
}

/// A textual overall of exactly 50 is treated as "not provided" when both
/// other extracted sub-scores moved off 50. A genuinely computed 50 is
/// indistinguishable from an unset one; the behavior is kept as-is for
/// compatibility.
fn overall_looks_set(overall: u8, environmental: u8, economic: u8) -> bool {
    !(overall == 50 && environmental != 50 && economic != 50)
}

/// Provisional scores and economic figures pulled from the narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalExtraction {
    pub scores: RiskScoreSet,
    pub economics: EconomicImpactEstimate,
}

/// Extract the provisional risk-score set and economic estimate from the
/// planner and economist narratives.
pub fn extract_signals(
    planner_text: &str,
    economist_text: &str,
    weights: Option<&PriorityWeights>,
) -> SignalExtraction {
    let mut scores = RiskScoreSet::default();

    if let Some(value) = first_score(&ENVIRONMENTAL_PATTERNS, planner_text) {
        scores.environmental = value;
    }
    if let Some(value) = first_score(&ECONOMIC_PATTERNS, planner_text) {
        scores.economic = value;
    }
    if let Some(value) = first_score(&SOCIAL_PATTERNS, planner_text) {
        scores.social = value;
    }

    let textual_overall = first_score(&OVERALL_PATTERNS, planner_text);
    scores.overall = match weights {
        // Supplied weights always win over anything the text claimed.
        Some(weights) => weights.blend(scores.environmental, scores.economic, scores.social),
        None => match textual_overall {
            Some(value) if overall_looks_set(value, scores.environmental, scores.economic) => {
                value
            }
            _ => {
                PriorityWeights::default().blend(scores.environmental, scores.economic, scores.social)
            }
        },
    };

    let mut economics = EconomicImpactEstimate::defaults();
    if let Some(amount) = first_dollar_amount(economist_text) {
        economics.annual_loss_per_capita = amount;
        economics.adaptation_cost = amount * 3;
    }
    economics.reprice(scores.overall);

    SignalExtraction { scores, economics }
}
