//! Climate data access and classification.

pub mod context;
pub mod source;

pub use context::{
    classify, ClimateContext, ClimateZone, ColdExtremeRisk, ExtremeWeatherRisk, HeatwaveRisk,
    HistoricalMetrics,
};
pub use source::{ClimateDataSource, DailySeries, OpenMeteoSource};
