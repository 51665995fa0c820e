use sqlx::PgPool;

use crate::{
    db::establishment::{lock_establishment, recompute_aggregate},
    errors::AppError,
    models::{AggregateSummary, Review},
};

pub async fn insert_review(
    review: &Review,
    postgres: &PgPool,
) -> Result<AggregateSummary, AppError> {
    let mut tx = postgres
        .begin()
        .await
        .map_err(|e| AppError::StoreUnavailable(format!("Failed to begin transaction: {}", e)))?;

    lock_establishment(review.establishment_id, &mut tx).await?;

    // The partial unique index on (author_id, establishment_id) WHERE active
    // turns a concurrent duplicate into a unique violation.
    sqlx::query(
        "INSERT INTO reviews
            (id, author_id, establishment_id, rating, content,
             created_at, updated_at, edited, active, deleted_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(review.id)
    .bind(review.author_id)
    .bind(review.establishment_id)
    .bind(review.rating)
    .bind(&review.content)
    .bind(review.created_at)
    .bind(review.updated_at)
    .bind(review.edited)
    .bind(review.active)
    .bind(review.deleted_at)
    .execute(&mut *tx)
    .await
    .map_err(AppError::from)?;

    let summary = recompute_aggregate(review.establishment_id, &mut tx).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::StoreUnavailable(format!("Failed to commit review: {}", e)))?;

    tracing::info!(
        "Inserted review {} by {} for {}",
        review.id,
        review.author_id,
        review.establishment_id
    );

    Ok(summary)
}
