use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{
        establishment::{lock_establishment, recompute_aggregate},
        review::get::REVIEW_COLUMNS,
    },
    errors::AppError,
    models::{AggregateSummary, Review, ReviewEdit},
};

/// Edits take the establishment lock before reading the stored rating, the same
/// order insert and delete use, so the change check sees the committed value.
pub async fn update_review(
    review_id: Uuid,
    edit: &ReviewEdit,
    postgres: &PgPool,
) -> Result<(Review, Option<AggregateSummary>), AppError> {
    let mut tx = postgres
        .begin()
        .await
        .map_err(|e| AppError::StoreUnavailable(format!("Failed to begin transaction: {}", e)))?;

    let establishment_id = sqlx::query_scalar::<_, Uuid>(
        "SELECT establishment_id FROM reviews WHERE id = $1 AND active",
    )
    .bind(review_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::StoreUnavailable(format!("Failed to fetch review: {}", e)))?
    .ok_or_else(|| AppError::NotFound("Review not found".into()))?;

    lock_establishment(establishment_id, &mut tx).await?;

    let previous_rating = sqlx::query_scalar::<_, i16>(
        "SELECT rating FROM reviews WHERE id = $1 AND active FOR UPDATE",
    )
    .bind(review_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::StoreUnavailable(format!("Failed to lock review: {}", e)))?
    // Deleted while waiting for the lock.
    .ok_or_else(|| AppError::NotFound("Review not found".into()))?;

    let review = sqlx::query_as::<_, Review>(&format!(
        "UPDATE reviews
        SET rating = COALESCE($2, rating),
            content = COALESCE($3, content),
            edited = TRUE,
            updated_at = GREATEST($4, updated_at + INTERVAL '1 microsecond')
        WHERE id = $1 AND active
        RETURNING {REVIEW_COLUMNS}"
    ))
    .bind(review_id)
    .bind(edit.rating)
    .bind(edit.content.as_deref())
    .bind(edit.edited_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::StoreUnavailable(format!("Failed to update review: {}", e)))?;

    let summary = if review.rating != previous_rating {
        Some(recompute_aggregate(establishment_id, &mut tx).await?)
    } else {
        None
    };

    tx.commit()
        .await
        .map_err(|e| AppError::StoreUnavailable(format!("Failed to commit review: {}", e)))?;

    Ok((review, summary))
}
