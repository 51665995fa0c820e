//! In-memory backends.
//!
//! State is held behind tokio locks and lost on restart. Each mutation takes
//! the write lock once, so the review change and the aggregate recompute are
//! applied together, mirroring the Postgres transaction.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    db::repository::{EstablishmentRegistry, QuotaCounter, ReviewRepository},
    errors::AppError,
    models::{AggregateSummary, EstablishmentStatus, Review, ReviewEdit, ReviewSort},
    reviews::aggregate::summarize_ratings,
};

#[derive(Debug, Clone)]
struct EstablishmentRecord {
    status: EstablishmentStatus,
    summary: AggregateSummary,
}

#[derive(Debug, Default)]
struct MemoryState {
    establishments: HashMap<Uuid, EstablishmentRecord>,
    reviews: HashMap<Uuid, Review>,
}

impl MemoryState {
    fn recompute(&mut self, establishment_id: Uuid) -> Result<AggregateSummary, AppError> {
        let summary = summarize_ratings(
            establishment_id,
            self.reviews
                .values()
                .filter(|r| r.active && r.establishment_id == establishment_id)
                .map(|r| r.rating),
        );

        let record = self
            .establishments
            .get_mut(&establishment_id)
            .ok_or_else(|| AppError::NotFound("Establishment not found".into()))?;
        record.summary = summary.clone();

        Ok(summary)
    }
}

/// Review store and establishment registry sharing one lock.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an establishment with an empty rating summary.
    pub async fn upsert_establishment(&self, establishment_id: Uuid, status: EstablishmentStatus) {
        let mut state = self.state.write().await;
        let summary = state
            .establishments
            .get(&establishment_id)
            .map(|e| e.summary.clone())
            .unwrap_or_else(|| AggregateSummary::empty(establishment_id));
        state
            .establishments
            .insert(establishment_id, EstablishmentRecord { status, summary });
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn find_review(&self, review_id: Uuid) -> Result<Option<Review>, AppError> {
        let state = self.state.read().await;
        Ok(state.reviews.get(&review_id).cloned())
    }

    async fn find_active_review(
        &self,
        author_id: Uuid,
        establishment_id: Uuid,
    ) -> Result<Option<Review>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .reviews
            .values()
            .find(|r| r.active && r.author_id == author_id && r.establishment_id == establishment_id)
            .cloned())
    }

    async fn insert_review(&self, review: &Review) -> Result<AggregateSummary, AppError> {
        let mut state = self.state.write().await;

        if !state.establishments.contains_key(&review.establishment_id) {
            return Err(AppError::NotFound("Establishment not found".into()));
        }

        let duplicate = state.reviews.values().any(|r| {
            r.active
                && r.author_id == review.author_id
                && r.establishment_id == review.establishment_id
        });
        if duplicate {
            return Err(AppError::DuplicateActiveReview);
        }

        state.reviews.insert(review.id, review.clone());
        state.recompute(review.establishment_id)
    }

    async fn update_review(
        &self,
        review_id: Uuid,
        edit: &ReviewEdit,
    ) -> Result<(Review, Option<AggregateSummary>), AppError> {
        let mut state = self.state.write().await;

        let stored = state
            .reviews
            .get_mut(&review_id)
            .filter(|r| r.active)
            .ok_or_else(|| AppError::NotFound("Review not found".into()))?;

        let rating_changed = edit.rating.is_some_and(|r| r != stored.rating);
        if let Some(rating) = edit.rating {
            stored.rating = rating;
        }
        if let Some(content) = &edit.content {
            stored.content = content.clone();
        }
        stored.edited = true;
        stored.updated_at = edit
            .edited_at
            .max(stored.updated_at + Duration::microseconds(1));
        let review = stored.clone();

        let summary = if rating_changed {
            Some(state.recompute(review.establishment_id)?)
        } else {
            None
        };

        Ok((review, summary))
    }

    async fn soft_delete_review(
        &self,
        review_id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<AggregateSummary, AppError> {
        let mut state = self.state.write().await;

        let stored = state
            .reviews
            .get_mut(&review_id)
            .filter(|r| r.active)
            .ok_or_else(|| AppError::NotFound("Review not found".into()))?;

        stored.active = false;
        stored.deleted_at = Some(deleted_at);
        let establishment_id = stored.establishment_id;

        state.recompute(establishment_id)
    }

    async fn list_active_reviews(
        &self,
        establishment_id: Uuid,
        sort: ReviewSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, AppError> {
        let state = self.state.read().await;

        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|r| r.active && r.establishment_id == establishment_id)
            .cloned()
            .collect();

        let newest_first = |a: &Review, b: &Review| {
            b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
        };
        match sort {
            ReviewSort::Newest => reviews.sort_by(newest_first),
            ReviewSort::Highest => {
                reviews.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| newest_first(a, b)))
            }
            ReviewSort::Lowest => {
                reviews.sort_by(|a, b| a.rating.cmp(&b.rating).then_with(|| newest_first(a, b)))
            }
        }

        Ok(reviews
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_active_reviews(&self, establishment_id: Uuid) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state
            .reviews
            .values()
            .filter(|r| r.active && r.establishment_id == establishment_id)
            .count() as i64)
    }

    async fn recompute_aggregate(
        &self,
        establishment_id: Uuid,
    ) -> Result<AggregateSummary, AppError> {
        let mut state = self.state.write().await;
        state.recompute(establishment_id)
    }
}

#[async_trait]
impl EstablishmentRegistry for InMemoryStore {
    async fn establishment_status(
        &self,
        establishment_id: Uuid,
    ) -> Result<Option<EstablishmentStatus>, AppError> {
        let state = self.state.read().await;
        Ok(state.establishments.get(&establishment_id).map(|e| e.status))
    }

    async fn rating_summary(
        &self,
        establishment_id: Uuid,
    ) -> Result<Option<AggregateSummary>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .establishments
            .get(&establishment_id)
            .map(|e| e.summary.clone()))
    }
}

/// Quota buckets in a mutex-guarded map. `set_available(false)` simulates a
/// counter outage.
pub struct InMemoryQuotaCounter {
    buckets: Mutex<HashMap<(Uuid, NaiveDate), u32>>,
    available: AtomicBool,
}

impl InMemoryQuotaCounter {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), AppError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::CounterUnavailable("in-memory counter disabled".into()))
        }
    }
}

impl Default for InMemoryQuotaCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuotaCounter for InMemoryQuotaCounter {
    async fn try_consume(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        limit: u32,
        _expires_at: DateTime<Utc>,
    ) -> Result<Option<u32>, AppError> {
        self.ensure_available()?;
        let mut buckets = self.buckets.lock().await;

        // Past buckets are never read again.
        buckets.retain(|(_, bucket_day), _| *bucket_day >= day);

        let count = buckets.entry((user_id, day)).or_insert(0);
        if *count >= limit {
            return Ok(None);
        }
        *count += 1;
        Ok(Some(*count))
    }

    async fn consumed(&self, user_id: Uuid, day: NaiveDate) -> Result<u32, AppError> {
        self.ensure_available()?;
        let buckets = self.buckets.lock().await;
        Ok(buckets.get(&(user_id, day)).copied().unwrap_or(0))
    }

    async fn refund(&self, user_id: Uuid, day: NaiveDate) -> Result<(), AppError> {
        self.ensure_available()?;
        let mut buckets = self.buckets.lock().await;
        if let Some(count) = buckets.get_mut(&(user_id, day)) {
            *count = count.saturating_sub(1);
        }
        Ok(())
    }
}
