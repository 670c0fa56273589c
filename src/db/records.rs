use crate::db::{
    models::{NewRecord, StoredRecord},
    DbPool,
};
use crate::error::Result;
use chrono::Utc;

/// Insert or replace records in a collection, keyed by external id.
/// Returns the number of records written.
pub async fn upsert_records(
    pool: &DbPool,
    collection_id: i64,
    records: &[NewRecord],
) -> Result<usize> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for record in records {
        sqlx::query(
            r#"
            INSERT INTO records (
                collection_id, external_id, document, metadata, embedding,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(collection_id, external_id) DO UPDATE SET
                document = excluded.document,
                metadata = excluded.metadata,
                embedding = excluded.embedding,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(collection_id)
        .bind(&record.external_id)
        .bind(&record.document)
        .bind(&record.metadata)
        .bind(&record.embedding)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(records.len())
}

/// Count records in a collection
pub async fn count_records(pool: &DbPool, collection_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records WHERE collection_id = ?")
        .bind(collection_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Load every record of a collection in insertion order
pub async fn list_records(pool: &DbPool, collection_id: i64) -> Result<Vec<StoredRecord>> {
    let records = sqlx::query_as::<_, StoredRecord>(
        r#"
        SELECT id, collection_id, external_id, document, metadata, embedding
        FROM records
        WHERE collection_id = ?
        ORDER BY id
        "#,
    )
    .bind(collection_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}
