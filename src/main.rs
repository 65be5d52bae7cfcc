use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use results_compare::compare::compare_race;
use results_compare::ingest::{
    self, load_predictions, load_results, sample_results, LoadedResults, RawPredictionRow,
    RawResultRow,
};
use results_compare::types::{ComparisonReport, NamedModels, ResultsProvenance};

// ---------- Request types ----------

// POST body: exporter-shaped rows plus named prediction lists; validation
// happens here in the adapter, never inside the engine.
#[derive(Deserialize)]
struct CompareRequest {
    #[serde(default)]
    race: Option<String>,
    #[serde(default)]
    provenance: Option<ResultsProvenance>,
    results: Vec<RawResultRow>,
    models: BTreeMap<String, Vec<RawPredictionRow>>,
}

// ---------- Server state ----------

#[derive(Clone)]
struct AppState {
    results: Arc<LoadedResults>,
    models: Arc<NamedModels>,
}

// ---------- Handlers ----------

async fn comparison(State(state): State<AppState>) -> Json<ComparisonReport> {
    let report = compare_race(
        &state.results.race,
        &state.results.results,
        &state.models,
        state.results.provenance,
    );
    Json(report)
}

async fn compare(
    Json(payload): Json<CompareRequest>,
) -> Result<Json<ComparisonReport>, (StatusCode, Json<serde_json::Value>)> {
    let results = ingest::normalize(payload.results).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    let mut models = NamedModels::new();
    for (name, rows) in payload.models {
        let predictions = ingest::normalize_predictions(rows).map_err(|e| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": format!("model {name}: {e}") })),
            )
        })?;
        models.insert(name, predictions);
    }

    let race = payload.race.unwrap_or_else(|| "Grand Prix".to_string());
    let provenance = payload.provenance.unwrap_or(ResultsProvenance::Official);
    Ok(Json(compare_race(&race, &results, &models, provenance)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let results = match std::env::var("RESULTS_PATH") {
        Ok(path) => load_results(Path::new(&path))?,
        Err(_) => {
            tracing::warn!("RESULTS_PATH not set; serving the embedded sample grid");
            sample_results()
        }
    };
    tracing::info!(
        "loaded {} results for {} ({:?})",
        results.results.len(),
        results.race,
        results.provenance
    );

    let models = match std::env::var("PREDICTIONS_PATH") {
        Ok(path) => load_predictions(Path::new(&path))?,
        Err(_) => {
            tracing::warn!("PREDICTIONS_PATH not set; no named models loaded");
            NamedModels::new()
        }
    };
    for (name, predictions) in &models {
        tracing::info!("model {} with {} predictions", name, predictions.len());
    }

    let state = AppState {
        results: Arc::new(results),
        models: Arc::new(models),
    };

    let app = axum::Router::new()
        .route("/comparison", get(comparison))
        .route("/compare", post(compare))
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
