#![allow(dead_code)]

use std::sync::Arc;

use eatery_reviews::{
    db::{InMemoryQuotaCounter, InMemoryStore},
    models::{EstablishmentStatus, NewReview},
    reviews::{QuotaPolicy, QuotaTracker, ReviewService},
};
use uuid::Uuid;

pub const GOOD_CONTENT: &str = "Great food and service, highly recommend!";

pub struct TestHarness {
    pub store: Arc<InMemoryStore>,
    pub counter: Arc<InMemoryQuotaCounter>,
    pub service: ReviewService,
}

pub fn create_test_harness(policy: QuotaPolicy) -> TestHarness {
    let store = Arc::new(InMemoryStore::new());
    let counter = Arc::new(InMemoryQuotaCounter::new());
    let quota = QuotaTracker::new(counter.clone(), policy);
    let service = ReviewService::new(store.clone(), store.clone(), quota);

    TestHarness {
        store,
        counter,
        service,
    }
}

impl TestHarness {
    pub async fn establishment(&self, status: EstablishmentStatus) -> Uuid {
        let id = Uuid::new_v4();
        self.store.upsert_establishment(id, status).await;
        id
    }

    pub async fn active_establishment(&self) -> Uuid {
        self.establishment(EstablishmentStatus::Active).await
    }
}

pub fn new_review(establishment_id: Uuid, rating: i64) -> NewReview {
    NewReview {
        establishment_id,
        rating,
        content: GOOD_CONTENT.to_string(),
    }
}
