use crate::api::models::{
    ErrorResponse, HealthResponse, RecommendOutcome, RecommendationRequest,
};
use crate::store::{Metadata, RecipeRecord, SqliteCollection, VectorStore};
use crate::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// One entry of an ingest file
#[derive(Debug, Deserialize)]
struct IngestItem {
    #[serde(default)]
    id: Option<Value>,
    document: String,
    #[serde(default)]
    metadata: Metadata,
}

/// Parse an ingest file into `(external id, record)` pairs.
/// Entries without an id are keyed by their position in the file.
pub async fn load_ingest_file(path: &Path) -> Result<Vec<(String, RecipeRecord)>> {
    let content = tokio::fs::read_to_string(path).await?;
    let items: Vec<IngestItem> = serde_json::from_str(&content)?;

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if item.document.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "Entry {index} has an empty document"
                )));
            }

            let id = match item.id {
                None | Some(Value::Null) => index.to_string(),
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
            };

            Ok((id, RecipeRecord::new(item.document, item.metadata)))
        })
        .collect()
}

/// Embed and upsert every entry of `path` into `collection`
pub async fn ingest(collection: &SqliteCollection, path: &Path) -> Result<usize> {
    let items = load_ingest_file(path).await?;
    info!(
        "Ingesting {} records from {} into '{}'",
        items.len(),
        path.display(),
        collection.name()
    );

    let written = collection.add(&items).await?;
    let total = collection.count().await?;

    println!("✓ Ingested {written} records");
    println!("  Collection '{}' now holds {total} records", collection.name());

    Ok(written)
}

/// Print the record count of a collection
pub async fn count(store: &dyn VectorStore) -> Result<i64> {
    let total = store.count().await?;
    println!("{total}");
    Ok(total)
}

/// Ask a running server for a recommendation
pub async fn recommend(
    server_url: &str,
    ingredients: Vec<String>,
    constraints: Option<String>,
) -> Result<RecommendOutcome> {
    let client = Client::new();
    let url = format!("{}/recommend", server_url.trim_end_matches('/'));

    let request = RecommendationRequest {
        ingredients,
        constraints,
    };

    let response = client.post(&url).json(&request).send().await?;

    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.detail)
            .unwrap_or_else(|_| "no details".to_string());
        return Err(Error::Internal(format!("Server returned {status}: {detail}")));
    }

    let outcome: RecommendOutcome = response.json().await?;
    print_outcome(&outcome);

    Ok(outcome)
}

/// Query a running server's health endpoint
pub async fn status(server_url: &str) -> Result<HealthResponse> {
    let client = Client::new();
    let url = format!("{}/", server_url.trim_end_matches('/'));

    let response = client.get(&url).send().await?.error_for_status()?;
    let health: HealthResponse = response.json().await?;

    println!("Status:  {}", health.status);
    println!("Recipes: {}", health.database_count);
    println!("Model:   {}", health.model);

    Ok(health)
}

fn print_outcome(outcome: &RecommendOutcome) {
    match outcome {
        RecommendOutcome::Success(response) => {
            println!(
                "Ingredients: {}",
                response.ingredients_received.join(", ")
            );
            println!("Constraints: {}", response.constraints_applied);
            println!("{}", "-".repeat(60));
            println!("{}", response.recommendation);
        }
        RecommendOutcome::NoMatch(response) => {
            println!("{}", response.recommendation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_ingest_file_assigns_ids() {
        let file = write_temp(
            r#"[
                {"id": "omelette", "document": "Beat eggs.", "metadata": {"RecipeName": "Omelette"}},
                {"id": 42, "document": "Boil pasta."},
                {"document": "Toast bread."}
            ]"#,
        );

        let items = load_ingest_file(file.path()).await.unwrap();
        let ids: Vec<&str> = items.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["omelette", "42", "2"]);
        assert_eq!(
            items[0].1.metadata_text("RecipeName").as_deref(),
            Some("Omelette")
        );
        assert!(items[1].1.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_load_ingest_file_rejects_empty_documents() {
        let file = write_temp(r#"[{"document": "   "}]"#);
        assert!(matches!(
            load_ingest_file(file.path()).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_load_ingest_file_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_ingest_file(&dir.path().join("absent.json")).await,
            Err(Error::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_load_ingest_file_rejects_malformed_json() {
        let file = write_temp(r#"{"document": "not an array"}"#);
        assert!(matches!(
            load_ingest_file(file.path()).await,
            Err(Error::Json(_))
        ));
    }
}
