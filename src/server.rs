//! HTTP surface.
//!
//! One streaming endpoint: `POST /analyze` returns the analysis as
//! Server-Sent Events, one event per completed stage and one terminal
//! structured event. A failed historical-data fetch ends the stream early
//! with an error payload instead.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::{Json, State},
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Router,
};
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::climate::{classify, ClimateDataSource};
use crate::narrator::Narrator;
use crate::pipeline::NarrativeOrchestrator;
use crate::types::{AnalysisEvent, AnalyzeRequest, StageRole};

#[derive(Clone)]
pub struct AppState {
    pub data_source: Arc<dyn ClimateDataSource>,
    pub narrator: Arc<dyn Narrator>,
    pub stage_delay: Duration,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/analyze", post(analyze))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(state: AppState, addr: &str) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("analysis server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy", "service": "climate-agency" }))
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel::<AnalysisEvent>();

    tokio::spawn(async move {
        run_analysis(state, request, tx).await;
    });

    let stream = UnboundedReceiverStream::new(rx).map(|event| {
        Ok(Event::default().data(serde_json::to_string(&event).unwrap_or_default()))
    });
    Sse::new(stream)
}

/// Drive one request end to end, emitting events on the channel. Factored
/// out of the handler so the fatal path is testable without a socket.
pub async fn run_analysis(
    state: AppState,
    request: AnalyzeRequest,
    events: mpsc::UnboundedSender<AnalysisEvent>,
) {
    let request_id = uuid::Uuid::new_v4();
    info!(%request_id, lat = request.location.lat, lng = request.location.lng,
        horizon = request.horizon_years, "starting analysis");

    let _ = events.send(AnalysisEvent::narrative(
        StageRole::System,
        "Starting climate analysis...",
    ));

    let series = match state
        .data_source
        .fetch(request.location.lat, request.location.lng)
        .await
    {
        Ok(series) => series,
        Err(err) => {
            // Fatal: error payload, no terminal structured event.
            warn!(%request_id, error = %err, "analysis aborted");
            let _ = events.send(AnalysisEvent::failure(format!(
                "Error during analysis: {err}"
            )));
            return;
        }
    };

    let context = classify(request.location.lat, request.location.lng, &series);
    info!(%request_id, zone = %context.zone,
        anomaly = context.metrics.precipitation_anomaly, "climate context classified");

    let orchestrator =
        NarrativeOrchestrator::new(state.narrator.clone()).with_stage_delay(state.stage_delay);
    if orchestrator.run(&request, &context, &events).await.is_some() {
        info!(%request_id, "analysis complete");
    }
}
