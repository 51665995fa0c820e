use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{AggregateSummary, EstablishmentStatus},
};

pub async fn get_establishment_status(
    establishment_id: Uuid,
    postgres: &PgPool,
) -> Result<Option<EstablishmentStatus>, AppError> {
    let status = sqlx::query_scalar::<_, String>("SELECT status FROM establishments WHERE id = $1")
        .bind(establishment_id)
        .fetch_optional(postgres)
        .await
        .map_err(|e| {
            AppError::StoreUnavailable(format!("Failed to fetch establishment status: {}", e))
        })?;

    status.map(|s| s.parse()).transpose()
}

pub async fn get_rating_summary(
    establishment_id: Uuid,
    postgres: &PgPool,
) -> Result<Option<AggregateSummary>, AppError> {
    sqlx::query_as::<_, AggregateSummary>(
        "SELECT id AS establishment_id,
                rating_count AS review_count,
                rating_avg AS average_rating
        FROM establishments
        WHERE id = $1",
    )
    .bind(establishment_id)
    .fetch_optional(postgres)
    .await
    .map_err(|e| AppError::StoreUnavailable(format!("Failed to fetch rating summary: {}", e)))
}
