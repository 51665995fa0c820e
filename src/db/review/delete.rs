use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::establishment::{lock_establishment, recompute_aggregate},
    errors::AppError,
    models::AggregateSummary,
};

/// Soft delete: the row stays for audit, `active` flips to false.
pub async fn soft_delete_review(
    review_id: Uuid,
    deleted_at: DateTime<Utc>,
    postgres: &PgPool,
) -> Result<AggregateSummary, AppError> {
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

    let updated = sqlx::query(
        "UPDATE reviews SET active = FALSE, deleted_at = $2 WHERE id = $1 AND active",
    )
    .bind(review_id)
    .bind(deleted_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::StoreUnavailable(format!("Failed to delete review: {}", e)))?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("Review not found".into()));
    }

    let summary = recompute_aggregate(establishment_id, &mut tx).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::StoreUnavailable(format!("Failed to commit review: {}", e)))?;

    tracing::info!("Soft-deleted review {}", review_id);

    Ok(summary)
}
