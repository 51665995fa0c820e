use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{Review, ReviewSort},
};

pub(crate) const REVIEW_COLUMNS: &str = "id, author_id, establishment_id, rating, content, \
     created_at, updated_at, edited, active, deleted_at";

pub async fn get_review_by_id(
    review_id: Uuid,
    postgres: &PgPool,
) -> Result<Option<Review>, AppError> {
    sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
    ))
    .bind(review_id)
    .fetch_optional(postgres)
    .await
    .map_err(|e| AppError::StoreUnavailable(format!("Failed to fetch review: {}", e)))
}

pub async fn get_active_review(
    author_id: Uuid,
    establishment_id: Uuid,
    postgres: &PgPool,
) -> Result<Option<Review>, AppError> {
    sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews
        WHERE author_id = $1 AND establishment_id = $2 AND active"
    ))
    .bind(author_id)
    .bind(establishment_id)
    .fetch_optional(postgres)
    .await
    .map_err(|e| AppError::StoreUnavailable(format!("Failed to fetch active review: {}", e)))
}

pub async fn list_active_reviews(
    establishment_id: Uuid,
    sort: ReviewSort,
    limit: i64,
    offset: i64,
    postgres: &PgPool,
) -> Result<Vec<Review>, AppError> {
    let query = format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews
        WHERE establishment_id = $1 AND active
        ORDER BY {}
        LIMIT $2 OFFSET $3",
        sort.order_clause()
    );

    sqlx::query_as::<_, Review>(&query)
        .bind(establishment_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(postgres)
        .await
        .map_err(|e| AppError::StoreUnavailable(format!("Failed to list reviews: {}", e)))
}

pub async fn count_active_reviews(
    establishment_id: Uuid,
    postgres: &PgPool,
) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)::BIGINT FROM reviews WHERE establishment_id = $1 AND active",
    )
    .bind(establishment_id)
    .fetch_one(postgres)
    .await
    .map_err(|e| AppError::StoreUnavailable(format!("Failed to count reviews: {}", e)))
}
