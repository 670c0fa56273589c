use serde::{Deserialize, Serialize};

/// Constraints applied when the request omits them
pub const NO_CONSTRAINTS: &str = "None";

/// Returned instead of a recommendation when retrieval finds nothing
pub const NO_MATCH_MESSAGE: &str =
    "I'm sorry, I couldn't find any recipes that match those ingredients in my current database.";

/// POST /recommend body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendationRequest {
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub constraints: Option<String>,
}

impl RecommendationRequest {
    /// Constraints text, defaulting to "None" when omitted or null
    pub fn constraints(&self) -> &str {
        self.constraints.as_deref().unwrap_or(NO_CONSTRAINTS)
    }

    /// Query text sent to the vector store
    pub fn query_text(&self) -> String {
        self.ingredients.join(", ")
    }
}

/// Successful recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub status: String,
    pub ingredients_received: Vec<String>,
    pub constraints_applied: String,
    pub recommendation: String,
}

/// Degraded answer when no recipe matched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoMatchResponse {
    pub recommendation: String,
}

impl Default for NoMatchResponse {
    fn default() -> Self {
        Self {
            recommendation: NO_MATCH_MESSAGE.to_string(),
        }
    }
}

/// Either shape of a 200 from POST /recommend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RecommendOutcome {
    Success(RecommendationResponse),
    NoMatch(NoMatchResponse),
}

/// GET / response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub database_count: i64,
    pub model: String,
}

/// Error body for 4xx/5xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
