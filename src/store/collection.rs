use crate::db::{collections, models::NewRecord, records, DbPool};
use crate::store::embedder::{cosine_similarity, decode_embedding, encode_embedding, Embedder};
use crate::store::{Metadata, QueryResult, RecipeRecord, VectorStore};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Gemini's batchEmbedContents accepts at most 100 requests per call
const EMBED_BATCH_SIZE: usize = 100;

/// A named collection persisted in SQLite, ranked by brute-force cosine similarity
#[derive(Clone)]
pub struct SqliteCollection {
    pool: DbPool,
    collection_id: i64,
    name: String,
    embedder: Arc<dyn Embedder>,
}

impl SqliteCollection {
    /// Open (or create) the collection `name`.
    ///
    /// Fails if the collection was populated with a different embedding model.
    pub async fn open(pool: DbPool, name: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let collection =
            collections::get_or_create_collection(&pool, name, embedder.model_name()).await?;

        if collection.embedding_model != embedder.model_name() {
            return Err(Error::Config(format!(
                "Collection '{}' was built with embedding model '{}' but '{}' is configured",
                name,
                collection.embedding_model,
                embedder.model_name()
            )));
        }

        info!(
            "Opened collection '{}' (embedding model: {})",
            name, collection.embedding_model
        );

        Ok(Self {
            pool,
            collection_id: collection.id,
            name: name.to_string(),
            embedder,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Embed and upsert records keyed by their external id. Returns the number written.
    pub async fn add(&self, items: &[(String, RecipeRecord)]) -> Result<usize> {
        let mut written = 0;

        for batch in items.chunks(EMBED_BATCH_SIZE) {
            let documents: Vec<String> = batch.iter().map(|(_, r)| r.document.clone()).collect();
            let vectors = self.embedder.embed(&documents).await?;

            if vectors.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            let new_records = batch
                .iter()
                .zip(vectors)
                .map(|((id, record), vector)| -> Result<NewRecord> {
                    Ok(NewRecord {
                        external_id: id.clone(),
                        document: record.document.clone(),
                        metadata: serde_json::to_string(&record.metadata)?,
                        embedding: encode_embedding(&vector),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let batch_written =
                records::upsert_records(&self.pool, self.collection_id, &new_records).await?;
            debug!("Upserted batch of {} records into '{}'", batch_written, self.name);
            written += batch_written;
        }

        Ok(written)
    }
}

struct Scored {
    record: RecipeRecord,
    similarity: f32,
}

#[async_trait]
impl VectorStore for SqliteCollection {
    async fn count(&self) -> Result<i64> {
        records::count_records(&self.pool, self.collection_id).await
    }

    async fn query(&self, text: &str, k: usize) -> Result<QueryResult> {
        if k == 0 {
            return Ok(QueryResult::default());
        }

        let stored = records::list_records(&self.pool, self.collection_id).await?;
        if stored.is_empty() {
            return Ok(QueryResult::default());
        }

        let query_vector = self
            .embedder
            .embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embedding returned for query".to_string()))?;

        let mut scored = Vec::with_capacity(stored.len());
        for row in stored {
            let vector = decode_embedding(&row.embedding)?;
            if vector.len() != query_vector.len() {
                return Err(Error::Store(format!(
                    "Embedding dimension mismatch for record '{}': stored {}, query {}",
                    row.external_id,
                    vector.len(),
                    query_vector.len()
                )));
            }

            let metadata: Metadata = serde_json::from_str(&row.metadata)?;
            scored.push(Scored {
                similarity: cosine_similarity(&query_vector, &vector),
                record: RecipeRecord::new(row.document, metadata),
            });
        }

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(k);

        debug!(
            "Query '{}' matched {} records in '{}'",
            text,
            scored.len(),
            self.name
        );

        let (hits, distances): (Vec<RecipeRecord>, Vec<f32>) = scored
            .into_iter()
            .map(|s| (s.record, 1.0 - s.similarity))
            .unzip();

        Ok(QueryResult {
            records: hits,
            distances,
        })
    }
}
