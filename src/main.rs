//! Climate Agency
//!
//! A streaming climate-risk assessment backend:
//! - deterministic climate classification from historical data
//! - sequential multi-stage narrative pipeline over an LLM narrator
//! - structured score/hazard synthesis with graceful degradation

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use climate_agency::climate::{ClimateDataSource, OpenMeteoSource};
use climate_agency::config::{AppConfig, NarratorBackend};
use climate_agency::narrator::{Narrator, OllamaNarrator, OpenAiCompatibleNarrator};
use climate_agency::server::{run_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    println!("\n{}", "═".repeat(60));
    println!("🌍 Climate Agency v0.1.0");
    println!("{}", "═".repeat(60));
    println!("Pipeline: Meteorologist | Hazard Analyst | Economist | Planner");
    println!("{}\n", "═".repeat(60));

    let narrator: Arc<dyn Narrator> = match &config.narrator {
        NarratorBackend::Ollama { model } => {
            println!("🧠 Narrator: ollama ({model})");
            Arc::new(OllamaNarrator::new(model.clone()))
        }
        NarratorBackend::OpenAiCompatible {
            base_url,
            api_key,
            model,
        } => {
            println!("🧠 Narrator: {base_url} ({model})");
            Arc::new(OpenAiCompatibleNarrator::new(
                base_url.clone(),
                api_key.clone(),
                model.clone(),
            ))
        }
    };

    let data_source: Arc<dyn ClimateDataSource> = Arc::new(OpenMeteoSource::new());

    let state = AppState {
        data_source,
        narrator,
        stage_delay: Duration::from_millis(config.stage_delay_ms),
    };

    run_server(state, &config.bind_addr).await
}
