//! Hazard canonicalization and prioritization.
//!
//! Narrative text names hazards in endless variations; everything the
//! system emits is mapped onto a fixed 6-term vocabulary. Scores accumulate
//! additively in a request-scoped map from three channels: the analyst's
//! explicit picks, the classifier's typical hazards, and a battery of
//! climate-driven heuristics.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::climate::{ClimateContext, ClimateZone, ColdExtremeRisk, ExtremeWeatherRisk, HeatwaveRisk};

/// The only hazard labels the system ever outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalHazard {
    Wildfires,
    #[serde(rename = "Extreme Heat")]
    ExtremeHeat,
    Flooding,
    #[serde(rename = "Air Pollution")]
    AirPollution,
    Storm,
    Drought,
}

impl CanonicalHazard {
    pub fn label(self) -> &'static str {
        match self {
            CanonicalHazard::Wildfires => "Wildfires",
            CanonicalHazard::ExtremeHeat => "Extreme Heat",
            CanonicalHazard::Flooding => "Flooding",
            CanonicalHazard::AirPollution => "Air Pollution",
            CanonicalHazard::Storm => "Storm",
            CanonicalHazard::Drought => "Drought",
        }
    }
}

impl std::fmt::Display for CanonicalHazard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

lazy_static! {
    /// Ordered synonym groups; first match wins. Order matters: a "storm
    /// surge" is a flooding phrase, not a storm phrase.
    static ref SYNONYM_GROUPS: Vec<(CanonicalHazard, Regex)> = vec![
        (
            CanonicalHazard::Wildfires,
            Regex::new(r"(?i)wild\s*fire|bush\s*fire|forest\s*fire").unwrap(),
        ),
        (
            CanonicalHazard::ExtremeHeat,
            Regex::new(r"(?i)heat\s*wave|extreme\s+heat|heat\s+stress|dangerous\s+heat").unwrap(),
        ),
        (
            CanonicalHazard::Flooding,
            Regex::new(r"(?i)flood|storm\s*surge|heavy\s+rain|extreme\s+precipitation|sea\s+level")
                .unwrap(),
        ),
        (
            CanonicalHazard::AirPollution,
            Regex::new(r"(?i)air\s+quality|air\s+pollution|smoke|particulate|smog").unwrap(),
        ),
        (
            CanonicalHazard::Storm,
            Regex::new(r"(?i)storm|hurricane|cyclone|typhoon|wind\s+event|blizzard|tornado")
                .unwrap(),
        ),
        (
            CanonicalHazard::Drought,
            Regex::new(r"(?i)drought|water\s+scarcity|arid|dry\s+spell").unwrap(),
        ),
    ];

    /// Lines like "Hazards: Flooding; Storm surge" in analyst/planner text.
    static ref HAZARD_LINE: Regex =
        Regex::new(r"(?im)^.{0,40}?hazards?\s*:\s*(.+)$").unwrap();

    /// Leading bullet/numbering clutter on split pieces.
    static ref LEADING_MARKS: Regex = Regex::new(r"^[\s\-\*\u{2022}\d\.\)\(]+").unwrap();
}

/// Non-hazard terms that regularly show up in planner hazard lists.
const DISALLOWED_TERMS: [&str; 9] = [
    "infrastructure",
    "economic",
    "employment",
    "insurance",
    "property",
    "migration",
    "livability",
    "population",
    "social strain",
];

/// Common hazard phrases scanned for when the planner's own list is thin.
const HAZARD_CATALOGUE: [&str; 14] = [
    "wildfires",
    "wildfire smoke",
    "extreme heat",
    "heatwaves",
    "flooding",
    "flash flooding",
    "coastal flooding",
    "storm surge",
    "air pollution",
    "hurricanes",
    "severe storms",
    "drought",
    "water scarcity",
    "heavy rainfall",
];

/// Map a noisy phrase onto the canonical vocabulary. No match discards the
/// phrase.
pub fn canonicalize(phrase: &str) -> Option<CanonicalHazard> {
    SYNONYM_GROUPS
        .iter()
        .find(|(_, pattern)| pattern.is_match(phrase))
        .map(|(hazard, _)| *hazard)
}

fn is_relevant(phrase: &str) -> bool {
    if !(3..=70).contains(&phrase.len()) {
        return false;
    }
    let lower = phrase.to_lowercase();
    !DISALLOWED_TERMS.iter().any(|term| lower.contains(term))
}

fn split_hazard_line(line: &str) -> Vec<String> {
    line.split([',', ';'])
        .map(|piece| {
            LEADING_MARKS
                .replace(piece, "")
                .trim()
                .trim_end_matches('.')
                .to_string()
        })
        .filter(|piece| is_relevant(piece))
        .collect()
}

fn mine_hazard_sections(text: &str) -> Vec<String> {
    HAZARD_LINE
        .captures_iter(text)
        .flat_map(|caps| split_hazard_line(&caps[1]))
        .collect()
}

fn catalogue_scan(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    HAZARD_CATALOGUE
        .iter()
        .filter(|phrase| lower.contains(*phrase))
        .map(|phrase| phrase.to_string())
        .filter(|phrase| is_relevant(phrase))
        .collect()
}

/// Collect the raw hazard seed strings for a request: the hazard analyst's
/// explicit list first, then phrases mined from the planner narrative, with
/// the common-phrase catalogue as a backstop when the planner list is thin.
/// With a low heatwave tier, heat phrases are dropped before
/// canonicalization ever sees them.
pub fn collect_raw_hazards(
    analyst_text: &str,
    planner_text: &str,
    context: &ClimateContext,
) -> Vec<String> {
    let mut raw = mine_hazard_sections(analyst_text);

    let mined = mine_hazard_sections(planner_text);
    let thin = mined.len() < 3;
    raw.extend(mined);
    if thin {
        raw.extend(catalogue_scan(planner_text));
    }

    if matches!(
        context.heatwave_risk,
        HeatwaveRisk::Low | HeatwaveRisk::VeryLow
    ) {
        raw.retain(|phrase| !phrase.to_lowercase().contains("heat"));
    }

    let mut seen = std::collections::HashSet::new();
    raw.retain(|phrase| seen.insert(phrase.to_lowercase()));
    raw
}

fn bump(scores: &mut BTreeMap<CanonicalHazard, f64>, hazard: CanonicalHazard, amount: f64) {
    *scores.entry(hazard).or_insert(0.0) += amount;
}

fn climate_bumps(scores: &mut BTreeMap<CanonicalHazard, f64>, context: &ClimateContext) {
    let temp_avg = context.metrics.temperature_avg;
    let anomaly = context.metrics.precipitation_anomaly;
    let trend = context.temperature_trend;

    match context.heatwave_risk {
        HeatwaveRisk::High => {
            bump(scores, CanonicalHazard::ExtremeHeat, 2.0);
            bump(scores, CanonicalHazard::AirPollution, 0.7);
        }
        HeatwaveRisk::Moderate => {
            bump(scores, CanonicalHazard::ExtremeHeat, 1.2);
            bump(scores, CanonicalHazard::AirPollution, 0.3);
        }
        HeatwaveRisk::Low => bump(scores, CanonicalHazard::ExtremeHeat, 0.5),
        HeatwaveRisk::VeryLow => bump(scores, CanonicalHazard::ExtremeHeat, 0.2),
    }

    if temp_avg >= 26.0 || trend >= 1.3 {
        bump(scores, CanonicalHazard::ExtremeHeat, 1.0);
    }

    if anomaly >= 20.0 {
        bump(scores, CanonicalHazard::Flooding, 1.8);
        bump(scores, CanonicalHazard::Storm, 0.6);
    } else if anomaly >= 10.0 {
        bump(scores, CanonicalHazard::Flooding, 1.0);
    }

    if anomaly <= -15.0 {
        bump(scores, CanonicalHazard::Drought, 1.8);
        bump(scores, CanonicalHazard::Wildfires, 0.9);
        bump(scores, CanonicalHazard::AirPollution, 0.4);
    } else if anomaly <= -5.0 {
        bump(scores, CanonicalHazard::Drought, 0.9);
    }

    if matches!(context.zone, ClimateZone::Arid | ClimateZone::Temperate)
        && (temp_avg >= 20.0 || anomaly <= -10.0)
    {
        bump(scores, CanonicalHazard::Wildfires, 1.4);
    }

    if context.zone == ClimateZone::Subpolar && trend >= 1.2 {
        bump(scores, CanonicalHazard::Storm, 1.0);
        bump(scores, CanonicalHazard::Flooding, 0.6);
    }

    match context.extreme_weather_risk {
        ExtremeWeatherRisk::High => {
            bump(scores, CanonicalHazard::Storm, 2.0);
            bump(scores, CanonicalHazard::Flooding, 1.0);
        }
        ExtremeWeatherRisk::Medium => bump(scores, CanonicalHazard::Storm, 1.0),
        ExtremeWeatherRisk::Low => {}
    }

    if context.cold_extreme_risk == ColdExtremeRisk::VeryHigh {
        bump(scores, CanonicalHazard::Storm, 0.5);
    }
}

/// Score the accumulated evidence and pick the top 1-2 canonical hazards.
pub fn prioritize_hazards(
    raw_phrases: &[String],
    context: &ClimateContext,
) -> Vec<CanonicalHazard> {
    let mut scores: BTreeMap<CanonicalHazard, f64> = BTreeMap::new();

    // The analyst's explicit top-2 picks: the first two distinct canonical
    // hazards in the raw pool.
    let mut picks: Vec<CanonicalHazard> = Vec::new();
    for phrase in raw_phrases {
        if let Some(hazard) = canonicalize(phrase) {
            if !picks.contains(&hazard) {
                picks.push(hazard);
                if picks.len() == 2 {
                    break;
                }
            }
        }
    }
    for &pick in &picks {
        bump(&mut scores, pick, 1.4);
        if pick == CanonicalHazard::AirPollution {
            // Pollution picks usually trace back to fire smoke.
            bump(&mut scores, CanonicalHazard::Wildfires, 0.4);
        }
    }

    for hazard in &context.typical_hazards {
        if let Some(canonical) = canonicalize(hazard) {
            bump(&mut scores, canonical, 1.2);
        }
    }

    climate_bumps(&mut scores, context);

    if scores
        .get(&CanonicalHazard::Wildfires)
        .copied()
        .unwrap_or(0.0)
        > 2.2
    {
        bump(&mut scores, CanonicalHazard::AirPollution, 0.5);
    }

    let mut ranked: Vec<(CanonicalHazard, f64)> = scores
        .into_iter()
        .filter(|(_, score)| *score > 0.3)
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let selected: Vec<CanonicalHazard> = ranked.into_iter().take(2).map(|(h, _)| h).collect();
    if selected.is_empty() {
        vec![CanonicalHazard::Storm]
    } else {
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::{classify, DailySeries};

    fn series(temp: f64, precip_total: f64) -> DailySeries {
        DailySeries {
            temperature: vec![temp; 90],
            precipitation: vec![precip_total / 90.0; 90],
        }
    }

    #[test]
    fn canonicalize_maps_synonyms() {
        assert_eq!(canonicalize("bushfire season"), Some(CanonicalHazard::Wildfires));
        assert_eq!(canonicalize("heatwave"), Some(CanonicalHazard::ExtremeHeat));
        assert_eq!(canonicalize("storm surge"), Some(CanonicalHazard::Flooding));
        assert_eq!(canonicalize("poor air quality"), Some(CanonicalHazard::AirPollution));
        assert_eq!(canonicalize("typhoon landfall"), Some(CanonicalHazard::Storm));
        assert_eq!(canonicalize("water scarcity"), Some(CanonicalHazard::Drought));
        assert_eq!(canonicalize("locust swarm"), None);
    }

    #[test]
    fn hazard_lines_are_split_and_cleaned() {
        let mined = mine_hazard_sections(
            "Summary...\nHazards: 1. Flash flooding; 2) storm surge, - wildfire smoke.\n",
        );
        assert_eq!(
            mined,
            vec!["Flash flooding", "storm surge", "wildfire smoke"]
        );
    }

    #[test]
    fn disallowed_terms_are_filtered() {
        let mined = mine_hazard_sections("Hazards: flooding, insurance costs, property damage");
        assert_eq!(mined, vec!["flooding"]);
    }

    #[test]
    fn catalogue_backstop_kicks_in_for_thin_lists() {
        let context = classify(5.0, 100.0, &series(27.0, 300.0));
        let raw = collect_raw_hazards(
            "",
            "Expect recurring flash flooding and severe storms near the coast.",
            &context,
        );
        assert!(raw.iter().any(|p| p == "flash flooding"));
        assert!(raw.iter().any(|p| p == "severe storms"));
    }

    #[test]
    fn low_heatwave_tier_strips_heat_phrases() {
        // Subpolar point: heatwave tier is low.
        let context = classify(60.0, 25.0, &series(5.0, 240.0));
        let raw = collect_raw_hazards(
            "Hazards: Extreme heat; Flooding",
            "Hazards: heat stress, river flooding, storms",
            &context,
        );
        assert!(raw.iter().all(|p| !p.to_lowercase().contains("heat")));
        assert!(raw.iter().any(|p| p == "Flooding"));
    }

    #[test]
    fn drought_dominates_dry_low_heat_points() {
        // Temperate, heatwave low, strong dry anomaly (-25%).
        let context = classify(45.0, 0.0, &series(10.0, 180.0));
        assert_eq!(context.heatwave_risk, HeatwaveRisk::Low);
        let raw = collect_raw_hazards("Hazards: heatwaves; drought", "", &context);
        let hazards = prioritize_hazards(&raw, &context);
        assert!(hazards.contains(&CanonicalHazard::Drought));
        assert!(!hazards.contains(&CanonicalHazard::ExtremeHeat));
    }

    #[test]
    fn selection_returns_one_or_two_labels() {
        let context = classify(5.0, 100.0, &series(27.0, 300.0));
        let hazards = prioritize_hazards(&[], &context);
        assert!(!hazards.is_empty() && hazards.len() <= 2);
    }

    #[test]
    fn empty_accumulator_defaults_to_storm() {
        let phrases: Vec<String> = Vec::new();
        let mut context = classify(5.0, 100.0, &series(27.0, 300.0));
        // Strip every scoring input so nothing clears the floor.
        context.typical_hazards.clear();
        context.heatwave_risk = HeatwaveRisk::VeryLow;
        context.cold_extreme_risk = ColdExtremeRisk::Low;
        context.extreme_weather_risk = ExtremeWeatherRisk::Low;
        context.metrics.temperature_avg = 10.0;
        context.metrics.precipitation_anomaly = 0.0;
        context.temperature_trend = 0.9;
        let hazards = prioritize_hazards(&phrases, &context);
        assert_eq!(hazards, vec![CanonicalHazard::Storm]);
    }

    #[test]
    fn air_pollution_pick_bumps_wildfires() {
        let mut context = classify(40.0, 0.0, &series(24.0, 240.0));
        context.typical_hazards.clear();
        let raw = vec!["smoke and haze".to_string(), "drought".to_string()];
        let hazards = prioritize_hazards(&raw, &context);
        // The pollution pick's 0.4 knock-on lifts Wildfires over the
        // pollution score itself at this warm temperate point.
        assert_eq!(
            hazards,
            vec![CanonicalHazard::Wildfires, CanonicalHazard::AirPollution]
        );
    }

    #[test]
    fn wet_anomaly_prioritizes_flooding() {
        let context = classify(5.0, 100.0, &series(27.0, 330.0));
        let hazards = prioritize_hazards(&[], &context);
        assert!(hazards.contains(&CanonicalHazard::Flooding));
    }
}
