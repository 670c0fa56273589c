use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    api::models::*, llm::Generator, prompt, store::VectorStore, utils::validation, Error, Result,
};

/// Number of recipes retrieved to ground each recommendation
pub const TOP_K: usize = 3;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VectorStore>,
    pub generator: Arc<dyn Generator>,
}

impl AppState {
    pub fn new(store: Arc<dyn VectorStore>, generator: Arc<dyn Generator>) -> Self {
        Self { store, generator }
    }
}

/// GET / - Health check
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let database_count = state.store.count().await?;

    Ok(Json(HealthResponse {
        status: "online".to_string(),
        database_count,
        model: state.generator.model_name().to_string(),
    }))
}

/// POST /recommend - Retrieve matching recipes and generate a grounded recommendation
pub async fn recommend(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<RecommendOutcome>> {
    let Json(request) = payload.map_err(reject_body)?;
    validation::validate_ingredients(&request.ingredients)?;

    debug!("Recommend request: {:?}", request);

    let query = request.query_text();
    let results = state.store.query(&query, TOP_K).await?;

    if results.is_empty() {
        info!("No recipes matched '{}'", query);
        return Ok(Json(RecommendOutcome::NoMatch(NoMatchResponse::default())));
    }

    let constraints = request.constraints().to_string();
    let prompt = prompt::build_prompt(&request.ingredients, &results.records, &constraints);
    debug!(
        "Generating recommendation from {} recipes ({} prompt bytes)",
        results.len(),
        prompt.len()
    );

    let recommendation = state.generator.generate(&prompt).await;

    Ok(Json(RecommendOutcome::Success(RecommendationResponse {
        status: "success".to_string(),
        ingredients_received: request.ingredients,
        constraints_applied: constraints,
        recommendation,
    })))
}

/// Map a body extraction failure onto the crate error, keeping 413 for oversized bodies
fn reject_body(rejection: JsonRejection) -> Error {
    match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => Error::PayloadTooLarge(rejection.body_text()),
        _ => Error::Validation(rejection.body_text()),
    }
}
