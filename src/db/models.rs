use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub embedding_model: String,
    pub created_at: DateTime<Utc>,
}

/// A stored record with its raw embedding blob
#[derive(Debug, Clone, FromRow)]
pub struct StoredRecord {
    pub id: i64,
    pub collection_id: i64,
    pub external_id: String,
    pub document: String,
    pub metadata: String,
    pub embedding: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NewRecord {
    pub external_id: String,
    pub document: String,
    /// Metadata serialized as a JSON object
    pub metadata: String,
    pub embedding: Vec<u8>,
}
