//! Climate context classification.
//!
//! Pure derivation of a climate zone, hazard set, warming trend and risk
//! tiers from a 90-day historical series and the request latitude. Given
//! numeric input the classifier is total; if the upstream fetch fails this
//! code is never reached.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::source::DailySeries;

/// Expected 90-day precipitation used as the anomaly baseline, in mm.
pub const EXPECTED_90DAY_PRECIP_MM: f64 = 240.0;

/// Deterministic geographic climate class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateZone {
    Polar,
    Subpolar,
    Arid,
    Tropical,
    Temperate,
}

impl ClimateZone {
    /// Zone base constant for the warming trend.
    fn trend_base(self) -> f64 {
        match self {
            ClimateZone::Polar => 1.8,
            ClimateZone::Subpolar => 1.3,
            ClimateZone::Arid => 1.1,
            ClimateZone::Tropical => 0.9,
            ClimateZone::Temperate => 1.0,
        }
    }
}

impl std::fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ClimateZone::Polar => "polar",
            ClimateZone::Subpolar => "subpolar",
            ClimateZone::Arid => "arid",
            ClimateZone::Tropical => "tropical",
            ClimateZone::Temperate => "temperate",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeatwaveRisk {
    #[serde(rename = "very low")]
    VeryLow,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "high")]
    High,
}

impl HeatwaveRisk {
    pub fn severity(self) -> u8 {
        match self {
            HeatwaveRisk::VeryLow => 0,
            HeatwaveRisk::Low => 1,
            HeatwaveRisk::Moderate => 2,
            HeatwaveRisk::High => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HeatwaveRisk::VeryLow => "very low",
            HeatwaveRisk::Low => "low",
            HeatwaveRisk::Moderate => "moderate",
            HeatwaveRisk::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColdExtremeRisk {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "very high")]
    VeryHigh,
}

impl ColdExtremeRisk {
    pub fn severity(self) -> u8 {
        match self {
            ColdExtremeRisk::Low => 0,
            ColdExtremeRisk::Moderate => 1,
            ColdExtremeRisk::High => 2,
            ColdExtremeRisk::VeryHigh => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColdExtremeRisk::Low => "low",
            ColdExtremeRisk::Moderate => "moderate",
            ColdExtremeRisk::High => "high",
            ColdExtremeRisk::VeryHigh => "very high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremeWeatherRisk {
    Low,
    Medium,
    High,
}

impl ExtremeWeatherRisk {
    pub fn label(self) -> &'static str {
        match self {
            ExtremeWeatherRisk::Low => "low",
            ExtremeWeatherRisk::Medium => "medium",
            ExtremeWeatherRisk::High => "high",
        }
    }
}

/// Aggregates derived once per request from the raw series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalMetrics {
    /// Mean daily temperature over the window, in deg C.
    pub temperature_avg: f64,
    /// Total precipitation over the window, in mm.
    pub precipitation_sum: f64,
    /// Percent deviation from the fixed 90-day baseline, one decimal.
    pub precipitation_anomaly: f64,
}

impl HistoricalMetrics {
    pub fn from_series(series: &DailySeries) -> Self {
        let temperature_avg = if series.temperature.is_empty() {
            0.0
        } else {
            series.temperature.iter().sum::<f64>() / series.temperature.len() as f64
        };
        let precipitation_sum: f64 = series.precipitation.iter().sum();
        let precipitation_anomaly = round1(
            (precipitation_sum - EXPECTED_90DAY_PRECIP_MM) / EXPECTED_90DAY_PRECIP_MM * 100.0,
        );
        Self {
            temperature_avg,
            precipitation_sum,
            precipitation_anomaly,
        }
    }
}

/// Immutable per-request climate classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateContext {
    pub zone: ClimateZone,
    pub seasonal_pattern: String,
    pub typical_hazards: Vec<String>,
    pub heatwave_risk: HeatwaveRisk,
    pub cold_extreme_risk: ColdExtremeRisk,
    /// Projected warming in deg C, one decimal.
    pub temperature_trend: f64,
    pub extreme_weather_risk: ExtremeWeatherRisk,
    pub metrics: HistoricalMetrics,
}

/// Classify a point from its latitude and 90-day series.
pub fn classify(lat: f64, _lon: f64, series: &DailySeries) -> ClimateContext {
    let metrics = HistoricalMetrics::from_series(series);
    let zone = classify_zone(lat, &metrics);
    let temperature_trend = round1(
        zone.trend_base() + (metrics.precipitation_anomaly / 100.0).clamp(-0.3, 0.3),
    );
    let heatwave_risk = heatwave_risk(zone, temperature_trend, metrics.temperature_avg);
    let cold_extreme_risk = cold_extreme_risk(zone);
    let extreme_weather_risk =
        extreme_weather_risk(metrics.precipitation_anomaly, heatwave_risk, cold_extreme_risk);

    ClimateContext {
        seasonal_pattern: seasonal_pattern(zone, lat),
        typical_hazards: typical_hazards(zone, metrics.precipitation_anomaly),
        zone,
        heatwave_risk,
        cold_extreme_risk,
        temperature_trend,
        extreme_weather_risk,
        metrics,
    }
}

/// Ordered cascade, first match wins.
fn classify_zone(lat: f64, metrics: &HistoricalMetrics) -> ClimateZone {
    let abs_lat = lat.abs();
    if abs_lat >= 66.0 || metrics.temperature_avg <= -5.0 {
        ClimateZone::Polar
    } else if abs_lat >= 55.0 {
        ClimateZone::Subpolar
    } else if metrics.precipitation_sum / 3.0 < 15.0 && metrics.temperature_avg > 18.0 {
        ClimateZone::Arid
    } else if abs_lat < 23.5 {
        ClimateZone::Tropical
    } else {
        ClimateZone::Temperate
    }
}

fn seasonal_pattern(zone: ClimateZone, lat: f64) -> String {
    match zone {
        ClimateZone::Polar => {
            "Long severe winters and brief cool summers, with months of polar darkness and midnight sun".to_string()
        }
        ClimateZone::Subpolar => {
            "Short mild summers and long cold winters with a deep seasonal snowpack".to_string()
        }
        ClimateZone::Arid => {
            "Hot and dry year-round, with large day-night temperature swings and rare, intense rain".to_string()
        }
        ClimateZone::Tropical => {
            "Warm year-round, with alternating wet and dry seasons".to_string()
        }
        ClimateZone::Temperate => {
            // Hemisphere-aware wording for the only zone where it matters.
            if lat >= 0.0 {
                "Four distinct seasons, with warm summers around July and cold winters around January".to_string()
            } else {
                "Four distinct seasons, with warm summers around January and cold winters around July".to_string()
            }
        }
    }
}

fn typical_hazards(zone: ClimateZone, anomaly: f64) -> Vec<String> {
    let base: &[&str] = match zone {
        ClimateZone::Polar => &["Extreme cold", "Blizzards", "Permafrost thaw"],
        ClimateZone::Subpolar => &[
            "Severe winter storms",
            "Extreme cold",
            "Spring snowmelt flooding",
        ],
        ClimateZone::Arid => &["Drought", "Extreme heat", "Dust storms", "Wildfires"],
        ClimateZone::Tropical => &["Tropical storms", "Flooding", "Extreme heat"],
        ClimateZone::Temperate => &["Storms", "Heatwaves", "River flooding"],
    };

    let mut raw: Vec<String> = base.iter().map(|h| h.to_string()).collect();
    if anomaly >= 20.0 {
        raw.push("Extreme precipitation".to_string());
    }
    if anomaly <= -20.0 {
        raw.push("Drought conditions".to_string());
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut hazards = Vec::new();
    for entry in raw {
        if let Some(normalized) = normalize_hazard(&entry) {
            if seen.insert(normalized.to_lowercase()) {
                hazards.push(normalized);
            }
        }
    }
    hazards
}

/// Trim, strip a trailing period, collapse whitespace and length-filter a
/// hazard phrase. Returns `None` when the phrase falls outside [3, 70].
pub fn normalize_hazard(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('.').trim();
    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    if (3..=70).contains(&collapsed.len()) {
        Some(collapsed)
    } else {
        None
    }
}

fn heatwave_risk(zone: ClimateZone, trend: f64, temp_avg: f64) -> HeatwaveRisk {
    match zone {
        ClimateZone::Polar => HeatwaveRisk::VeryLow,
        ClimateZone::Subpolar => HeatwaveRisk::Low,
        ClimateZone::Arid => {
            if trend >= 1.2 || temp_avg > 28.0 {
                HeatwaveRisk::High
            } else {
                HeatwaveRisk::Moderate
            }
        }
        ClimateZone::Tropical => {
            if temp_avg >= 27.0 {
                HeatwaveRisk::High
            } else {
                HeatwaveRisk::Moderate
            }
        }
        ClimateZone::Temperate => {
            if temp_avg >= 22.0 || trend >= 1.2 {
                HeatwaveRisk::Moderate
            } else {
                HeatwaveRisk::Low
            }
        }
    }
}

fn cold_extreme_risk(zone: ClimateZone) -> ColdExtremeRisk {
    match zone {
        ClimateZone::Polar => ColdExtremeRisk::VeryHigh,
        ClimateZone::Subpolar => ColdExtremeRisk::High,
        ClimateZone::Temperate => ColdExtremeRisk::Moderate,
        ClimateZone::Arid | ClimateZone::Tropical => ColdExtremeRisk::Low,
    }
}

/// Max severity across three independently bucketed signals.
fn extreme_weather_risk(
    anomaly: f64,
    heatwave: HeatwaveRisk,
    cold: ColdExtremeRisk,
) -> ExtremeWeatherRisk {
    let anomaly_severity: u8 = if anomaly.abs() > 30.0 {
        2
    } else if anomaly.abs() > 15.0 {
        1
    } else {
        0
    };
    let combined = anomaly_severity
        .max(heatwave.severity())
        .max(cold.severity());
    if combined >= 3 {
        ExtremeWeatherRisk::High
    } else if combined >= 1 {
        ExtremeWeatherRisk::Medium
    } else {
        ExtremeWeatherRisk::Low
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(temp: f64, precip_total: f64) -> DailySeries {
        DailySeries {
            temperature: vec![temp; 90],
            precipitation: vec![precip_total / 90.0; 90],
        }
    }

    #[test]
    fn polar_point_has_very_high_cold_risk() {
        let context = classify(70.0, 25.0, &series(-10.0, 200.0));
        assert_eq!(context.zone, ClimateZone::Polar);
        assert_eq!(context.cold_extreme_risk, ColdExtremeRisk::VeryHigh);
        assert_eq!(context.heatwave_risk, HeatwaveRisk::VeryLow);
    }

    #[test]
    fn cold_average_forces_polar_at_any_latitude() {
        let context = classify(40.0, 0.0, &series(-6.0, 200.0));
        assert_eq!(context.zone, ClimateZone::Polar);
    }

    #[test]
    fn dry_hot_point_is_arid() {
        // 30mm over the window => 10mm per month, below the arid gate.
        let context = classify(30.0, 10.0, &series(25.0, 30.0));
        assert_eq!(context.zone, ClimateZone::Arid);
        assert!(context
            .typical_hazards
            .iter()
            .any(|h| h == "Drought conditions"));
    }

    #[test]
    fn low_latitude_wet_point_is_tropical() {
        let context = classify(5.0, 100.0, &series(27.0, 300.0));
        assert_eq!(context.zone, ClimateZone::Tropical);
        assert_eq!(context.heatwave_risk, HeatwaveRisk::High);
    }

    #[test]
    fn mid_latitude_point_is_temperate() {
        let context = classify(48.0, 2.0, &series(12.0, 240.0));
        assert_eq!(context.zone, ClimateZone::Temperate);
        assert_eq!(context.metrics.precipitation_anomaly, 0.0);
        assert_eq!(context.temperature_trend, 1.0);
    }

    #[test]
    fn southern_temperate_seasons_are_reversed() {
        let north = classify(48.0, 2.0, &series(12.0, 240.0));
        let south = classify(-38.0, 145.0, &series(12.0, 240.0));
        assert!(north.seasonal_pattern.contains("summers around July"));
        assert!(south.seasonal_pattern.contains("summers around January"));
    }

    #[test]
    fn wet_anomaly_adds_extreme_precipitation_hazard() {
        // 320mm vs the 240mm baseline => +33.3%.
        let context = classify(48.0, 2.0, &series(12.0, 320.0));
        assert_eq!(context.metrics.precipitation_anomaly, 33.3);
        assert!(context
            .typical_hazards
            .iter()
            .any(|h| h == "Extreme precipitation"));
        assert_eq!(context.extreme_weather_risk, ExtremeWeatherRisk::Medium);
    }

    #[test]
    fn trend_clamps_large_anomalies() {
        // +100% anomaly clamps to +0.3 over the temperate base.
        let context = classify(48.0, 2.0, &series(12.0, 480.0));
        assert_eq!(context.temperature_trend, 1.3);
    }

    #[test]
    fn hazard_normalization_filters_and_dedupes() {
        assert_eq!(
            normalize_hazard("  Severe   storms.  "),
            Some("Severe storms".to_string())
        );
        assert_eq!(normalize_hazard("ab"), None);
        assert_eq!(normalize_hazard(&"x".repeat(80)), None);
    }

    #[test]
    fn calm_temperate_series_stays_medium() {
        // Flat anomaly, low heatwave tier; the moderate cold tier keeps the
        // combined bucket at medium.
        let context = classify(40.0, 0.0, &series(10.0, 240.0));
        assert_eq!(context.zone, ClimateZone::Temperate);
        assert_eq!(context.heatwave_risk, HeatwaveRisk::Low);
        assert_eq!(context.extreme_weather_risk, ExtremeWeatherRisk::Medium);
    }
}
