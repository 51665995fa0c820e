use sqlx::PgConnection;
use uuid::Uuid;

use crate::{errors::AppError, models::AggregateSummary, reviews::aggregate::summarize};

/// Take the row lock that serialises aggregate writes for one establishment.
pub async fn lock_establishment(
    establishment_id: Uuid,
    conn: &mut PgConnection,
) -> Result<(), AppError> {
    let locked = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM establishments WHERE id = $1 FOR UPDATE",
    )
    .bind(establishment_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::StoreUnavailable(format!("Failed to lock establishment: {}", e)))?;

    if locked.is_none() {
        return Err(AppError::NotFound("Establishment not found".into()));
    }

    Ok(())
}

/// Recompute count and mean from the active reviews and write them back.
/// Expects the caller to hold the establishment lock.
pub async fn recompute_aggregate(
    establishment_id: Uuid,
    conn: &mut PgConnection,
) -> Result<AggregateSummary, AppError> {
    let (review_count, rating_sum) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*)::BIGINT, COALESCE(SUM(rating), 0)::BIGINT
        FROM reviews
        WHERE establishment_id = $1 AND active",
    )
    .bind(establishment_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::StoreUnavailable(format!("Failed to aggregate ratings: {}", e)))?;

    let summary = summarize(establishment_id, review_count, rating_sum);

    sqlx::query(
        "UPDATE establishments
        SET rating_count = $2, rating_avg = $3, updated_at = NOW()
        WHERE id = $1",
    )
    .bind(establishment_id)
    .bind(summary.review_count)
    .bind(summary.average_rating)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::StoreUnavailable(format!("Failed to store rating summary: {}", e)))?;

    tracing::debug!(
        "Recomputed rating for {}: count={}, avg={}",
        establishment_id,
        summary.review_count,
        summary.average_rating
    );

    Ok(summary)
}
