//! Storage abstractions used by the review lifecycle.
//!
//! Every review-mutating method recomputes the establishment's aggregate in the
//! same unit of work as the mutation, so callers cannot forget it.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{AggregateSummary, EstablishmentStatus, Review, ReviewEdit, ReviewSort},
};

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fetch a review by id, including soft-deleted ones.
    async fn find_review(&self, review_id: Uuid) -> Result<Option<Review>, AppError>;

    async fn find_active_review(
        &self,
        author_id: Uuid,
        establishment_id: Uuid,
    ) -> Result<Option<Review>, AppError>;

    /// Persist a new active review and recompute the establishment aggregate.
    ///
    /// Fails with `DuplicateActiveReview` if the author already has an active
    /// review for the establishment, and `NotFound` if the establishment is gone.
    async fn insert_review(&self, review: &Review) -> Result<AggregateSummary, AppError>;

    /// Apply an edit to an active review and return the stored result.
    ///
    /// The previous rating is read inside the same unit of work as the write,
    /// and the aggregate is recomputed whenever it differs from the new one.
    /// `updated_at` becomes `edited_at`, or one microsecond past the stored
    /// value if that is not earlier.
    async fn update_review(
        &self,
        review_id: Uuid,
        edit: &ReviewEdit,
    ) -> Result<(Review, Option<AggregateSummary>), AppError>;

    /// Mark an active review inactive and recompute the aggregate.
    async fn soft_delete_review(
        &self,
        review_id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<AggregateSummary, AppError>;

    async fn list_active_reviews(
        &self,
        establishment_id: Uuid,
        sort: ReviewSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, AppError>;

    async fn count_active_reviews(&self, establishment_id: Uuid) -> Result<i64, AppError>;

    /// Re-derive the aggregate from the active review set and store it.
    async fn recompute_aggregate(
        &self,
        establishment_id: Uuid,
    ) -> Result<AggregateSummary, AppError>;
}

#[async_trait]
pub trait EstablishmentRegistry: Send + Sync {
    /// `None` when the establishment does not exist.
    async fn establishment_status(
        &self,
        establishment_id: Uuid,
    ) -> Result<Option<EstablishmentStatus>, AppError>;

    async fn rating_summary(
        &self,
        establishment_id: Uuid,
    ) -> Result<Option<AggregateSummary>, AppError>;
}

#[async_trait]
pub trait QuotaCounter: Send + Sync {
    /// Atomically increment the `(user, day)` bucket unless it already holds
    /// `limit`. Returns the new count, or `None` when the bucket is full.
    async fn try_consume(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        limit: u32,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<u32>, AppError>;

    async fn consumed(&self, user_id: Uuid, day: NaiveDate) -> Result<u32, AppError>;

    /// Give back one unit, never going below zero.
    async fn refund(&self, user_id: Uuid, day: NaiveDate) -> Result<(), AppError>;
}
