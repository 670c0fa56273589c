use crate::config::{EmbeddingProvider, Settings};
use crate::llm::gemini::GeminiClient;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Turns text into fixed-width vectors for similarity search
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier persisted with a collection; vectors from different models never mix
    fn model_name(&self) -> &str;

    /// One vector per input text, in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Build the embedder selected by configuration
pub fn build_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    match settings.embedding.provider {
        EmbeddingProvider::Gemini => {
            let client = GeminiClient::new(settings.gemini.clone())?;
            Ok(Arc::new(GeminiEmbedder::new(
                client,
                settings.embedding.model.clone(),
            )))
        }
        EmbeddingProvider::Local => Ok(Arc::new(LocalEmbedder::new(settings.embedding.dimensions))),
    }
}

/// Embeddings from the hosted Gemini embedding model
pub struct GeminiEmbedder {
    client: GeminiClient,
    model: String,
}

impl GeminiEmbedder {
    pub fn new(client: GeminiClient, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client.embed_batch(&self.model, texts).await
    }
}

/// Deterministic, offline embeddings built from hashed character trigrams.
///
/// Not semantic in the neural sense, but recipes sharing ingredient words
/// land close together, which is enough for development and tests.
#[derive(Debug)]
pub struct LocalEmbedder {
    dimensions: usize,
    model_name: String,
}

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "this", "that", "are", "was", "were", "then",
    "add", "until", "over", "each",
];

impl LocalEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            model_name: format!("local-trigram-{dimensions}"),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let lower = text.to_lowercase();
        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let padded: Vec<char> = format!(" {word} ").chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                let idx = (fold_hash(&trigram, 37) as usize) % self.dimensions;
                embedding[idx] += (*freq as f32).sqrt();
            }

            // Whole-word bucket so exact ingredient matches dominate
            let idx = (fold_hash(word, 31) as usize) % self.dimensions;
            embedding[idx] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

fn fold_hash(s: &str, multiplier: u64) -> u64 {
    s.bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64))
}

#[async_trait]
impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Serialize a vector as little-endian f32 bytes
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Inverse of [`encode_embedding`]
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(Error::Store(format!(
            "Corrupt embedding blob of {} bytes",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Cosine similarity; zero vectors are dissimilar to everything
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
