//! Temporal risk extrapolation.
//!
//! Separating raw extraction from this deterministic pass makes horizon
//! changes reproducible without re-invoking the narrative pipeline: the
//! provisional scores stay fixed and only this function re-runs.

use crate::climate::{ClimateContext, ColdExtremeRisk, ExtremeWeatherRisk, HeatwaveRisk};
use crate::types::{PriorityWeights, RiskScoreSet};

/// Horizons are measured against a fixed 10-year baseline.
const BASELINE_YEARS: f64 = 10.0;

#[derive(Debug, Default, Clone, Copy)]
struct Increments {
    environmental: f64,
    economic: f64,
    social: f64,
}

/// Climate-driven additive increments, applied regardless of horizon.
fn climate_increments(context: &ClimateContext) -> Increments {
    let mut inc = Increments::default();

    if context.temperature_trend >= 1.6 {
        inc.environmental += 4.0;
        inc.social += 2.0;
    } else if context.temperature_trend >= 1.1 {
        inc.environmental += 2.5;
        inc.social += 1.2;
    }

    match context.extreme_weather_risk {
        ExtremeWeatherRisk::High => {
            inc.environmental += 4.0;
            inc.economic += 3.0;
            inc.social += 2.0;
        }
        ExtremeWeatherRisk::Medium => {
            inc.environmental += 2.0;
            inc.economic += 1.5;
        }
        ExtremeWeatherRisk::Low => {}
    }

    let anomaly = context.metrics.precipitation_anomaly;
    if anomaly >= 20.0 {
        inc.environmental += 3.0;
        inc.economic += 2.0;
    } else if anomaly <= -15.0 {
        inc.environmental += 2.5;
        inc.economic += 1.5;
        inc.social += 1.0;
    }

    match context.heatwave_risk {
        HeatwaveRisk::High => {
            inc.environmental += 2.5;
            inc.social += 1.2;
        }
        HeatwaveRisk::Moderate => inc.environmental += 1.5,
        _ => {}
    }

    if context.cold_extreme_risk == ColdExtremeRisk::VeryHigh {
        inc.environmental += 1.5;
        inc.social += 1.0;
    }

    inc
}

fn growth(diff: f64, rate_up: f64, cap: f64, rate_down: f64) -> f64 {
    if diff > 0.0 {
        (diff * rate_up).min(cap)
    } else {
        diff * rate_down
    }
}

fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Produce the final, priority-weighted score set from the provisional one.
pub fn extrapolate(
    provisional: RiskScoreSet,
    horizon_years: u32,
    context: &ClimateContext,
    weights: Option<&PriorityWeights>,
) -> RiskScoreSet {
    let diff = f64::from(horizon_years) - BASELINE_YEARS;

    let env_growth = growth(diff, 0.35, 12.0, 0.25);
    let econ_growth = growth(diff, 0.30, 10.0, 0.20);
    let soc_growth = growth(diff, 0.25, 9.0, 0.20);

    let inc = climate_increments(context);

    // Baseline normalization: shed the per-dimension offset, floor at zero.
    let env_base = (f64::from(provisional.environmental) - 10.0).max(0.0);
    let econ_base = (f64::from(provisional.economic) - 12.0).max(0.0);
    let soc_base = if provisional.social == 50 {
        // 50 is the sentinel for "the narrative never moved this"; anchor
        // on the other two dimensions instead.
        ((env_base + econ_base) / 2.0).round()
    } else {
        f64::from(provisional.social)
    };

    let environmental = clamp_score(env_base + env_growth + inc.environmental);
    let economic = clamp_score(econ_base + econ_growth + inc.economic);
    let social = clamp_score(soc_base + soc_growth + inc.social);

    let overall = weights
        .copied()
        .unwrap_or_default()
        .blend(environmental, economic, social);

    RiskScoreSet {
        environmental,
        economic,
        social,
        overall,
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

    fn calm_context() -> ClimateContext {
        // Temperate, flat anomaly, trend 1.0: only the medium
        // extreme-weather increment (+2 env, +1.5 econ) applies.
        classify(40.0, 0.0, &series(10.0, 240.0))
    }

    #[test]
    fn baseline_horizon_has_no_growth() {
        let context = calm_context();
        let scores = extrapolate(RiskScoreSet::default(), 10, &context, None);
        // env: 30-10+2 = 22; econ: 30-12+1.5 = 19.5 -> 20; soc: 30.
        assert_eq!(scores.environmental, 22);
        assert_eq!(scores.economic, 20);
        assert_eq!(scores.social, 30);
    }

    #[test]
    fn long_horizons_grow_and_cap() {
        let context = calm_context();
        let near = extrapolate(RiskScoreSet::default(), 20, &context, None);
        let far = extrapolate(RiskScoreSet::default(), 60, &context, None);
        // diff 10: env growth 3.5; diff 50: env growth capped at 12.
        assert_eq!(near.environmental, 26);
        assert_eq!(far.environmental, 34);
        // Economic cap is 10, social cap is 9.
        assert_eq!(far.economic, 30);
        assert_eq!(far.social, 39);
    }

    #[test]
    fn short_horizons_shrink_uncapped() {
        let context = calm_context();
        let scores = extrapolate(RiskScoreSet::default(), 2, &context, None);
        // diff -8: env 20 - 2.0 = 20.0; econ 19.5 - 1.6 = 17.9 -> 18;
        // soc 30 - 1.6 = 28.4 -> 28.
        assert_eq!(scores.environmental, 20);
        assert_eq!(scores.economic, 18);
        assert_eq!(scores.social, 28);
    }

    #[test]
    fn social_sentinel_anchors_on_other_dimensions() {
        let context = calm_context();
        let provisional = RiskScoreSet {
            environmental: 80,
            economic: 72,
            social: 50,
            overall: 70,
        };
        let scores = extrapolate(provisional, 10, &context, None);
        // soc base = round((70 + 60) / 2) = 65.
        assert_eq!(scores.social, 65);
    }

    #[test]
    fn explicit_social_score_is_kept() {
        let context = calm_context();
        let provisional = RiskScoreSet {
            environmental: 80,
            economic: 72,
            social: 49,
            overall: 70,
        };
        let scores = extrapolate(provisional, 10, &context, None);
        assert_eq!(scores.social, 49);
    }

    #[test]
    fn overall_is_the_weighted_blend() {
        let context = calm_context();
        let weights = PriorityWeights {
            environmental: 60.0,
            economic: 20.0,
            social: 20.0,
        };
        let scores = extrapolate(RiskScoreSet::default(), 30, &context, Some(&weights));
        assert_eq!(
            scores.overall,
            weights.blend(scores.environmental, scores.economic, scores.social)
        );
    }

    #[test]
    fn scores_never_leave_the_range() {
        let context = classify(5.0, 100.0, &series(29.0, 400.0));
        let provisional = RiskScoreSet {
            environmental: 100,
            economic: 100,
            social: 100,
            overall: 100,
        };
        let scores = extrapolate(provisional, 80, &context, None);
        assert!(scores.environmental <= 100);
        assert!(scores.economic <= 100);
        assert!(scores.social <= 100);
        assert!(scores.overall <= 100);

        let floor = extrapolate(
            RiskScoreSet {
                environmental: 0,
                economic: 0,
                social: 0,
                overall: 0,
            },
            1,
            &context,
            None,
        );
        assert!(floor.environmental <= 100);
    }
}
