mod common;

use common::{GOOD_CONTENT, create_test_harness, new_review};
use eatery_reviews::{
    db::{EstablishmentRegistry, ReviewRepository},
    errors::AppError,
    models::{EstablishmentStatus, NewReview, PageRequest, ReviewChanges, ReviewSort},
    reviews::QuotaPolicy,
};
use uuid::Uuid;

#[tokio::test]
async fn test_create_update_delete_scenario() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;
    let author = Uuid::new_v4();

    let created = h
        .service
        .create_review(author, new_review(establishment, 5))
        .await
        .unwrap();
    assert!(created.review.active);
    assert!(!created.review.edited);
    assert_eq!(created.review.content, GOOD_CONTENT);
    assert_eq!(created.review.created_at, created.review.updated_at);
    assert_eq!(created.summary.review_count, 1);
    assert_eq!(created.summary.average_rating, 5.0);

    let updated = h
        .service
        .update_review(
            created.review.id,
            author,
            ReviewChanges {
                rating: Some(4),
                content: None,
            },
        )
        .await
        .unwrap();
    assert!(updated.review.edited);
    assert_eq!(updated.review.rating, 4);
    assert_eq!(updated.review.created_at, created.review.created_at);
    assert!(updated.review.updated_at > created.review.updated_at);
    assert_eq!(updated.summary.unwrap().average_rating, 4.0);

    let summary = h
        .service
        .delete_review(created.review.id, author)
        .await
        .unwrap();
    assert_eq!(summary.review_count, 0);
    assert_eq!(summary.average_rating, 0.0);

    let err = h.service.get_review(created.review.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // A fresh review for the same pair is a new record
    let again = h
        .service
        .create_review(author, new_review(establishment, 3))
        .await
        .unwrap();
    assert_ne!(again.review.id, created.review.id);
    assert_eq!(again.summary.review_count, 1);
}

#[tokio::test]
async fn test_duplicate_active_review_rejected_until_deleted() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;
    let author = Uuid::new_v4();

    let first = h
        .service
        .create_review(author, new_review(establishment, 4))
        .await
        .unwrap();

    let err = h
        .service
        .create_review(author, new_review(establishment, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateActiveReview));

    // Another author is unaffected
    h.service
        .create_review(Uuid::new_v4(), new_review(establishment, 2))
        .await
        .unwrap();

    h.service.delete_review(first.review.id, author).await.unwrap();
    h.service
        .create_review(author, new_review(establishment, 2))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_duplicate_does_not_consume_quota() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;
    let author = Uuid::new_v4();

    let created = h
        .service
        .create_review(author, new_review(establishment, 4))
        .await
        .unwrap();
    assert_eq!(created.quota_remaining, 9);

    for _ in 0..3 {
        let _ = h
            .service
            .create_review(author, new_review(establishment, 4))
            .await;
    }

    let remaining = h.service.quota().remaining(author, 10).await.unwrap();
    assert_eq!(remaining, 9);
}

#[tokio::test]
async fn test_concurrent_creates_yield_one_active_review() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;
    let author = Uuid::new_v4();

    let mut handles = Vec::new();
    for rating in 1..=5 {
        let service = h.service.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_review(author, new_review(establishment, rating))
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::DuplicateActiveReview) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);

    assert_eq!(h.store.count_active_reviews(establishment).await.unwrap(), 1);
    // Losers were refunded
    assert_eq!(h.service.quota().remaining(author, 10).await.unwrap(), 9);
}

#[tokio::test]
async fn test_validation_errors() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;
    let author = Uuid::new_v4();

    for rating in [0, 6, -1, 1000] {
        let err = h
            .service
            .create_review(author, new_review(establishment, rating))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRating { .. }), "rating {rating}");
    }

    let err = h
        .service
        .create_review(
            author,
            NewReview {
                establishment_id: establishment,
                rating: 4,
                content: "Too short".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::ContentTooShort {
            min: 10,
            actual: 9
        }
    ));

    // Nothing was charged for rejected input
    assert_eq!(h.service.quota().remaining(author, 10).await.unwrap(), 10);
}

#[tokio::test]
async fn test_establishment_eligibility() {
    let h = create_test_harness(QuotaPolicy::default());
    let author = Uuid::new_v4();

    for status in [
        EstablishmentStatus::Draft,
        EstablishmentStatus::Pending,
        EstablishmentStatus::Suspended,
    ] {
        let establishment = h.establishment(status).await;
        let err = h
            .service
            .create_review(author, new_review(establishment, 4))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EstablishmentNotEligible));
    }

    let err = h
        .service
        .create_review(author, new_review(Uuid::new_v4(), 4))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_only_author_can_modify() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;
    let author = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let created = h
        .service
        .create_review(author, new_review(establishment, 5))
        .await
        .unwrap();

    let err = h
        .service
        .update_review(
            created.review.id,
            stranger,
            ReviewChanges {
                rating: Some(1),
                content: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = h
        .service
        .delete_review(created.review.id, stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let review = h.service.get_review(created.review.id).await.unwrap();
    assert_eq!(review.rating, 5);
    assert!(!review.edited);
}

#[tokio::test]
async fn test_missing_and_deleted_reviews_are_not_found() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;
    let author = Uuid::new_v4();

    let err = h
        .service
        .update_review(
            Uuid::new_v4(),
            author,
            ReviewChanges {
                rating: Some(3),
                content: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let created = h
        .service
        .create_review(author, new_review(establishment, 5))
        .await
        .unwrap();
    h.service.delete_review(created.review.id, author).await.unwrap();

    // Deleted reviews cannot be edited or deleted again
    let err = h
        .service
        .update_review(
            created.review.id,
            author,
            ReviewChanges {
                rating: Some(3),
                content: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = h
        .service
        .delete_review(created.review.id, author)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // The record is kept for audit
    let stored = h.store.find_review(created.review.id).await.unwrap().unwrap();
    assert!(!stored.active);
    assert!(stored.deleted_at.is_some());
    assert_eq!(stored.content, GOOD_CONTENT);
}

#[tokio::test]
async fn test_update_requires_a_change_and_validates_fields() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_review(author, new_review(establishment, 5))
        .await
        .unwrap();

    let err = h
        .service
        .update_review(created.review.id, author, ReviewChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = h
        .service
        .update_review(
            created.review.id,
            author,
            ReviewChanges {
                rating: Some(9),
                content: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRating { .. }));

    let err = h
        .service
        .update_review(
            created.review.id,
            author,
            ReviewChanges {
                rating: None,
                content: Some("meh".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ContentTooShort { .. }));
}

#[tokio::test]
async fn test_content_only_update_keeps_aggregate() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;
    let author = Uuid::new_v4();
    let created = h
        .service
        .create_review(author, new_review(establishment, 3))
        .await
        .unwrap();

    let first = h
        .service
        .update_review(
            created.review.id,
            author,
            ReviewChanges {
                rating: Some(3),
                content: Some("Still decent, but the portions got smaller.".into()),
            },
        )
        .await
        .unwrap();
    assert!(first.summary.is_none());
    assert!(first.review.edited);

    let second = h
        .service
        .update_review(
            created.review.id,
            author,
            ReviewChanges {
                rating: None,
                content: Some("Back to form, lovely evening.".into()),
            },
        )
        .await
        .unwrap();
    assert!(second.review.updated_at > first.review.updated_at);
    assert_eq!(second.review.created_at, created.review.created_at);

    let stored = h.service.get_review(created.review.id).await.unwrap();
    assert_eq!(stored.content, "Back to form, lovely evening.");
}

#[tokio::test]
async fn test_aggregate_tracks_active_reviews() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;
    let authors: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

    let mut ids = Vec::new();
    for (author, rating) in authors.iter().zip([5, 4, 4, 1]) {
        let created = h
            .service
            .create_review(*author, new_review(establishment, rating))
            .await
            .unwrap();
        ids.push(created.review.id);
    }

    let summary = h.service.rating_summary(establishment).await.unwrap();
    assert_eq!(summary.review_count, 4);
    assert_eq!(summary.average_rating, 3.5);

    h.service
        .update_review(
            ids[3],
            authors[3],
            ReviewChanges {
                rating: Some(2),
                content: None,
            },
        )
        .await
        .unwrap();
    let summary = h.service.rating_summary(establishment).await.unwrap();
    assert_eq!(summary.average_rating, 3.8);

    h.service.delete_review(ids[0], authors[0]).await.unwrap();
    let summary = h.service.rating_summary(establishment).await.unwrap();
    assert_eq!(summary.review_count, 3);
    assert_eq!(summary.average_rating, 3.3);

    // A full recompute agrees with what the mutations left behind
    let recomputed = h.store.recompute_aggregate(establishment).await.unwrap();
    assert_eq!(recomputed, summary);
    assert_eq!(
        h.store.rating_summary(establishment).await.unwrap(),
        Some(summary)
    );
}

#[tokio::test]
async fn test_listing_pagination() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;

    for rating in [3, 5, 1] {
        h.service
            .create_review(Uuid::new_v4(), new_review(establishment, rating))
            .await
            .unwrap();
    }

    let page = h
        .service
        .list_for_establishment(
            establishment,
            PageRequest::new(Some(1), Some(5)),
            ReviewSort::Newest,
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.page_info.total, 3);
    assert_eq!(page.page_info.total_pages, 1);
    assert!(!page.page_info.has_next);
    assert!(!page.page_info.has_previous);

    let page = h
        .service
        .list_for_establishment(
            establishment,
            PageRequest::new(Some(2), Some(2)),
            ReviewSort::Newest,
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.page_info.total_pages, 2);
    assert!(!page.page_info.has_next);
    assert!(page.page_info.has_previous);

    let err = h
        .service
        .list_for_establishment(Uuid::new_v4(), PageRequest::default(), ReviewSort::Newest)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_listing_sort_orders_and_hides_deleted() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;

    let mut created = Vec::new();
    for rating in [3, 5, 1, 5] {
        let author = Uuid::new_v4();
        let review = h
            .service
            .create_review(author, new_review(establishment, rating))
            .await
            .unwrap()
            .review;
        created.push((author, review));
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let list = |sort| {
        let service = h.service.clone();
        async move {
            service
                .list_for_establishment(establishment, PageRequest::default(), sort)
                .await
                .unwrap()
                .items
        }
    };

    let newest = list(ReviewSort::Newest).await;
    let newest_ids: Vec<Uuid> = newest.iter().map(|r| r.id).collect();
    let expected: Vec<Uuid> = created.iter().rev().map(|(_, r)| r.id).collect();
    assert_eq!(newest_ids, expected);

    let highest = list(ReviewSort::Highest).await;
    let ratings: Vec<i16> = highest.iter().map(|r| r.rating).collect();
    assert_eq!(ratings, vec![5, 5, 3, 1]);
    // Equal ratings fall back to newest first
    assert_eq!(highest[0].id, created[3].1.id);
    assert_eq!(highest[1].id, created[1].1.id);

    let lowest = list(ReviewSort::Lowest).await;
    let ratings: Vec<i16> = lowest.iter().map(|r| r.rating).collect();
    assert_eq!(ratings, vec![1, 3, 5, 5]);

    let (author, review) = &created[1];
    h.service.delete_review(review.id, *author).await.unwrap();

    let remaining = list(ReviewSort::Newest).await;
    assert_eq!(remaining.len(), 3);
    assert!(remaining.iter().all(|r| r.id != review.id));
}
