//! Review lifecycle orchestration.
//!
//! Create: validate, check eligibility, reject duplicates, consume quota, then
//! persist. The store applies the aggregate recompute in the same transaction
//! as every mutation; a store rejection after quota consumption refunds it.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{EstablishmentRegistry, ReviewRepository},
    errors::AppError,
    models::{
        AggregateSummary, NewReview, PageInfo, PageRequest, QuotaStatus, Review, ReviewChanges,
        ReviewEdit, ReviewPage, ReviewSort,
    },
    reviews::{
        quota::QuotaTracker,
        validation::{validate_content, validate_rating},
    },
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReview {
    pub review: Review,
    pub summary: AggregateSummary,
    pub quota_remaining: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedReview {
    pub review: Review,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AggregateSummary>,
}

#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    establishments: Arc<dyn EstablishmentRegistry>,
    quota: QuotaTracker,
}

/// Postgres stores timestamps with microsecond precision.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        establishments: Arc<dyn EstablishmentRegistry>,
        quota: QuotaTracker,
    ) -> Self {
        Self {
            reviews,
            establishments,
            quota,
        }
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    pub async fn create_review(
        &self,
        author_id: Uuid,
        input: NewReview,
    ) -> Result<CreatedReview, AppError> {
        let rating = validate_rating(input.rating)?;
        let content = validate_content(&input.content)?;

        match self
            .establishments
            .establishment_status(input.establishment_id)
            .await?
        {
            None => return Err(AppError::NotFound("Establishment not found".into())),
            Some(status) if !status.is_eligible_for_review() => {
                tracing::info!(
                    "Rejected review for {} in status {}",
                    input.establishment_id,
                    status.as_str()
                );
                return Err(AppError::EstablishmentNotEligible);
            }
            Some(_) => {}
        }

        // Checked before consuming quota so a duplicate is never charged.
        if self
            .reviews
            .find_active_review(author_id, input.establishment_id)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateActiveReview);
        }

        let daily_limit = self.quota.daily_limit();
        let decision = self.quota.check_and_consume(author_id, daily_limit).await?;
        if !decision.allowed {
            return Err(AppError::QuotaExceeded {
                daily_limit,
                resets_at: self.quota.next_reset(Utc::now()),
            });
        }

        let review = Review::new(author_id, input.establishment_id, rating, content, now());

        let summary = match self.reviews.insert_review(&review).await {
            Ok(summary) => summary,
            Err(e) => {
                self.quota.refund(author_id, &decision).await;
                return Err(e);
            }
        };

        tracing::info!(
            "User {} reviewed {} with rating {}, {} reviews left today",
            author_id,
            review.establishment_id,
            review.rating,
            decision.remaining
        );

        Ok(CreatedReview {
            review,
            summary,
            quota_remaining: decision.remaining,
        })
    }

    /// Public read; soft-deleted reviews are reported as missing.
    pub async fn get_review(&self, review_id: Uuid) -> Result<Review, AppError> {
        self.reviews
            .find_review(review_id)
            .await?
            .filter(|r| r.active)
            .ok_or_else(|| AppError::NotFound("Review not found".into()))
    }

    async fn get_owned_review(&self, review_id: Uuid, requester_id: Uuid) -> Result<Review, AppError> {
        let review = self.get_review(review_id).await?;
        if review.author_id != requester_id {
            tracing::warn!(
                "User {} attempted to modify review {} owned by {}",
                requester_id,
                review_id,
                review.author_id
            );
            return Err(AppError::Forbidden(
                "Only the author can modify this review".into(),
            ));
        }
        Ok(review)
    }

    pub async fn update_review(
        &self,
        review_id: Uuid,
        requester_id: Uuid,
        changes: ReviewChanges,
    ) -> Result<UpdatedReview, AppError> {
        self.get_owned_review(review_id, requester_id).await?;

        if changes.rating.is_none() && changes.content.is_none() {
            return Err(AppError::BadRequest(
                "At least one of rating or content must be provided".into(),
            ));
        }

        let edit = ReviewEdit {
            rating: changes.rating.map(validate_rating).transpose()?,
            content: changes
                .content
                .as_deref()
                .map(validate_content)
                .transpose()?,
            edited_at: now(),
        };

        // The store compares against the rating it holds at write time.
        let (review, summary) = self.reviews.update_review(review_id, &edit).await?;

        tracing::info!(
            "Review {} updated by {} (rating changed: {})",
            review.id,
            requester_id,
            summary.is_some()
        );

        Ok(UpdatedReview { review, summary })
    }

    pub async fn delete_review(
        &self,
        review_id: Uuid,
        requester_id: Uuid,
    ) -> Result<AggregateSummary, AppError> {
        self.get_owned_review(review_id, requester_id).await?;
        let summary = self.reviews.soft_delete_review(review_id, now()).await?;

        tracing::info!("Review {} deleted by {}", review_id, requester_id);

        Ok(summary)
    }

    pub async fn list_for_establishment(
        &self,
        establishment_id: Uuid,
        page: PageRequest,
        sort: ReviewSort,
    ) -> Result<ReviewPage, AppError> {
        if self
            .establishments
            .establishment_status(establishment_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Establishment not found".into()));
        }

        let total = self.reviews.count_active_reviews(establishment_id).await?;
        let items = self
            .reviews
            .list_active_reviews(establishment_id, sort, page.limit as i64, page.offset())
            .await?;

        Ok(ReviewPage {
            items,
            page_info: PageInfo::new(page, total.max(0) as u64),
        })
    }

    pub async fn rating_summary(&self, establishment_id: Uuid) -> Result<AggregateSummary, AppError> {
        self.establishments
            .rating_summary(establishment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Establishment not found".into()))
    }

    pub async fn quota_status(&self, user_id: Uuid) -> Result<QuotaStatus, AppError> {
        self.quota.status(user_id).await
    }
}
