//! Stage definitions and prompt construction.
//!
//! Each stage prompt carries the full climate context, the user priorities
//! and horizon, and the raw text of every previously completed stage. The
//! personas ask for the textual sub-formats the extractor scans for, but
//! nothing downstream can enforce them.

use crate::climate::ClimateContext;
use crate::types::{AnalyzeRequest, NarrativeMessage, PriorityWeights, StageRole};

/// Narrative stages in execution order.
pub const NARRATIVE_STAGES: [StageRole; 4] = [
    StageRole::Meteorologist,
    StageRole::HazardAnalyst,
    StageRole::Economist,
    StageRole::Planner,
];

fn persona(role: StageRole) -> &'static str {
    match role {
        StageRole::Meteorologist => {
            "You are an expert meteorologist analyzing climate risks for residential planning. \
             In 3-5 sentences, assess the current climate characteristics, the changes expected \
             over the planning horizon, and the key environmental hazards of living at this \
             location."
        }
        StageRole::HazardAnalyst => {
            "You are a climate hazard analyst. From the meteorologist's assessment and the \
             climate context, identify the two most consequential hazards for this location \
             over the planning horizon. Briefly justify each, then end with a single line \
             formatted exactly as 'Hazards: <first>; <second>'."
        }
        StageRole::Economist => {
            "You are an economist estimating household climate exposure: adaptation costs, \
             insurance pressure and property outlook. In 3-5 sentences, quantify the expected \
             burden, and state the expected annual loss as a dollar figure phrased like \
             '$3,400 per capita annually'."
        }
        StageRole::Planner => {
            "You are a long-term residential planner synthesizing the prior analyses into a \
             livability verdict. Summarize the main risks and recommended preparations, then \
             end with lines formatted exactly as 'Environmental Risk Score: NN/100', \
             'Economic Risk Score: NN/100', 'Social Risk Score: NN/100' and \
             'Overall Risk Score: NN/100', plus one line 'Hazards: ...' listing the main \
             hazards separated by semicolons."
        }
        // The system role never gets a narrator call.
        StageRole::System => "",
    }
}

fn context_block(context: &ClimateContext, request: &AnalyzeRequest) -> String {
    let location = &request.location;
    let name = if location.name.is_empty() {
        format!("({:.2}, {:.2})", location.lat, location.lng)
    } else {
        format!("{} ({:.2}, {:.2})", location.name, location.lat, location.lng)
    };

    format!(
        "Location: {name}\n\
         Planning horizon: {horizon} years\n\
         Climate zone: {zone}\n\
         90-day average temperature: {temp:.1}C\n\
         90-day precipitation: {precip:.1}mm ({anomaly:+.1}% vs baseline)\n\
         Projected warming trend: {trend:.1}C\n\
         Heatwave risk: {heatwave}; cold extreme risk: {cold}; extreme weather risk: {extreme}\n\
         Typical hazards: {hazards}\n\
         Seasonal pattern: {season}",
        name = name,
        horizon = request.horizon_years,
        zone = context.zone,
        temp = context.metrics.temperature_avg,
        precip = context.metrics.precipitation_sum,
        anomaly = context.metrics.precipitation_anomaly,
        trend = context.temperature_trend,
        heatwave = context.heatwave_risk.label(),
        cold = context.cold_extreme_risk.label(),
        extreme = context.extreme_weather_risk.label(),
        hazards = context.typical_hazards.join(", "),
        season = context.seasonal_pattern,
    )
}

fn priorities_line(priorities: Option<&PriorityWeights>) -> String {
    let weights = priorities.copied().unwrap_or_default();
    format!(
        "User priorities (relative weights): environmental {:.0}, economic {:.0}, social {:.0}",
        weights.environmental, weights.economic, weights.social
    )
}

/// Build the full prompt for one stage from the accumulated transcript.
/// Stages that failed leave empty content behind; their sections are simply
/// omitted.
pub fn build_prompt(
    role: StageRole,
    context: &ClimateContext,
    request: &AnalyzeRequest,
    transcript: &[NarrativeMessage],
) -> String {
    let mut prompt = String::new();
    prompt.push_str(persona(role));
    prompt.push_str("\n\n");
    prompt.push_str(&context_block(context, request));
    prompt.push('\n');
    prompt.push_str(&priorities_line(request.priorities.as_ref()));
    prompt.push('\n');

    if let Some(ref user_prompt) = request.user_prompt {
        if !user_prompt.trim().is_empty() {
            prompt.push_str(&format!("User context: {}\n", user_prompt.trim()));
        }
    }

    for message in transcript {
        if message.content.trim().is_empty() {
            continue;
        }
        prompt.push_str(&format!(
            "\n--- {} analysis ---\n{}\n",
            message.role, message.content
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::{classify, DailySeries};

    fn request() -> AnalyzeRequest {
        AnalyzeRequest {
            location: crate::types::GeoPoint {
                lat: 48.0,
                lng: 2.0,
                name: "Paris".to_string(),
            },
            horizon_years: 20,
            priorities: None,
            user_prompt: Some("thinking about buying a house".to_string()),
        }
    }

    fn context() -> crate::climate::ClimateContext {
        let series = DailySeries {
            temperature: vec![12.0; 90],
            precipitation: vec![240.0 / 90.0; 90],
        };
        classify(48.0, 2.0, &series)
    }

    #[test]
    fn prompt_carries_context_and_horizon() {
        let prompt = build_prompt(StageRole::Meteorologist, &context(), &request(), &[]);
        assert!(prompt.contains("Climate zone: temperate"));
        assert!(prompt.contains("Planning horizon: 20 years"));
        assert!(prompt.contains("User context: thinking about buying a house"));
    }

    #[test]
    fn prompt_includes_prior_stage_text_verbatim() {
        let transcript = vec![NarrativeMessage {
            role: StageRole::Meteorologist,
            content: "Mild maritime climate with rising heat stress.".to_string(),
        }];
        let prompt = build_prompt(StageRole::HazardAnalyst, &context(), &request(), &transcript);
        assert!(prompt.contains("--- meteorologist analysis ---"));
        assert!(prompt.contains("Mild maritime climate with rising heat stress."));
    }

    #[test]
    fn failed_stage_sections_are_omitted() {
        let transcript = vec![
            NarrativeMessage {
                role: StageRole::Meteorologist,
                content: String::new(),
            },
            NarrativeMessage {
                role: StageRole::HazardAnalyst,
                content: "Hazards: Flooding; Storm".to_string(),
            },
        ];
        let prompt = build_prompt(StageRole::Economist, &context(), &request(), &transcript);
        assert!(!prompt.contains("--- meteorologist analysis ---"));
        assert!(prompt.contains("--- hazard-analyst analysis ---"));
    }

    #[test]
    fn planner_persona_requests_score_lines() {
        let prompt = build_prompt(StageRole::Planner, &context(), &request(), &[]);
        assert!(prompt.contains("Environmental Risk Score: NN/100"));
        assert!(prompt.contains("'Hazards: ...'"));
    }
}
