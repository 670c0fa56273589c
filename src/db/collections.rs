use crate::db::{models::Collection, DbPool};
use crate::error::Result;
use chrono::Utc;

/// Get collection by name
pub async fn get_collection_by_name(pool: &DbPool, name: &str) -> Result<Option<Collection>> {
    let collection = sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(collection)
}

/// Get a collection by name, creating it for `embedding_model` if it does not exist yet
pub async fn get_or_create_collection(
    pool: &DbPool,
    name: &str,
    embedding_model: &str,
) -> Result<Collection> {
    if let Some(existing) = get_collection_by_name(pool, name).await? {
        return Ok(existing);
    }

    // Another writer may have created it between the lookup and the insert
    sqlx::query(
        r#"
        INSERT INTO collections (name, embedding_model, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(name)
    .bind(embedding_model)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    let collection = sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok(collection)
}
