//! Persisted vector collection of recipe records.
//!
//! Records are embedded on write and ranked by cosine similarity on query.
//! The HTTP layer only sees the [`VectorStore`] trait, so the backing
//! collection can be swapped for a fake in tests.

pub mod collection;
pub mod embedder;

pub use collection::SqliteCollection;
pub use embedder::{build_embedder, Embedder, GeminiEmbedder, LocalEmbedder};

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the collection the service reads from
pub const COLLECTION_NAME: &str = "recipes";

/// Free-form record metadata (`RecipeName`, `TotalTimeInMins`, `Servings`, ...)
pub type Metadata = serde_json::Map<String, Value>;

/// A recipe document with its metadata, as held by the vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub document: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl RecipeRecord {
    pub fn new(document: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            document: document.into(),
            metadata,
        }
    }

    /// Render a metadata value as display text. Strings are returned without
    /// quotes; a missing key or JSON null yields `None`.
    pub fn metadata_text(&self, key: &str) -> Option<String> {
        match self.metadata.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Query hits ordered by descending similarity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub records: Vec<RecipeRecord>,
    /// Cosine distance of each record to the query, parallel to `records`
    pub distances: Vec<f32>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Read interface the request handlers depend on
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Total number of records in the collection
    async fn count(&self) -> Result<i64>;

    /// Up to `k` records most similar to `text`, best match first
    async fn query(&self, text: &str, k: usize) -> Result<QueryResult>;
}
