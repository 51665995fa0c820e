use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{
        establishment::{self, lock_establishment, recompute_aggregate},
        repository::{EstablishmentRegistry, ReviewRepository},
        review,
    },
    errors::AppError,
    models::{AggregateSummary, EstablishmentStatus, Review, ReviewEdit, ReviewSort},
};

/// Postgres-backed review store and establishment registry.
#[derive(Clone)]
pub struct PgStore {
    postgres: PgPool,
}

impl PgStore {
    pub fn new(postgres: PgPool) -> Self {
        Self { postgres }
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.postgres).await
    }
}

#[async_trait]
impl ReviewRepository for PgStore {
    async fn find_review(&self, review_id: Uuid) -> Result<Option<Review>, AppError> {
        review::get_review_by_id(review_id, &self.postgres).await
    }

    async fn find_active_review(
        &self,
        author_id: Uuid,
        establishment_id: Uuid,
    ) -> Result<Option<Review>, AppError> {
        review::get_active_review(author_id, establishment_id, &self.postgres).await
    }

    async fn insert_review(&self, review: &Review) -> Result<AggregateSummary, AppError> {
        review::insert_review(review, &self.postgres).await
    }

    async fn update_review(
        &self,
        review_id: Uuid,
        edit: &ReviewEdit,
    ) -> Result<(Review, Option<AggregateSummary>), AppError> {
        review::update_review(review_id, edit, &self.postgres).await
    }

    async fn soft_delete_review(
        &self,
        review_id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<AggregateSummary, AppError> {
        review::soft_delete_review(review_id, deleted_at, &self.postgres).await
    }

    async fn list_active_reviews(
        &self,
        establishment_id: Uuid,
        sort: ReviewSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, AppError> {
        review::list_active_reviews(establishment_id, sort, limit, offset, &self.postgres).await
    }

    async fn count_active_reviews(&self, establishment_id: Uuid) -> Result<i64, AppError> {
        review::count_active_reviews(establishment_id, &self.postgres).await
    }

    async fn recompute_aggregate(
        &self,
        establishment_id: Uuid,
    ) -> Result<AggregateSummary, AppError> {
        let mut tx = self.postgres.begin().await?;
        lock_establishment(establishment_id, &mut tx).await?;
        let summary = recompute_aggregate(establishment_id, &mut tx).await?;
        tx.commit().await?;
        Ok(summary)
    }
}

#[async_trait]
impl EstablishmentRegistry for PgStore {
    async fn establishment_status(
        &self,
        establishment_id: Uuid,
    ) -> Result<Option<EstablishmentStatus>, AppError> {
        establishment::get_establishment_status(establishment_id, &self.postgres).await
    }

    async fn rating_summary(
        &self,
        establishment_id: Uuid,
    ) -> Result<Option<AggregateSummary>, AppError> {
        establishment::get_rating_summary(establishment_id, &self.postgres).await
    }
}
