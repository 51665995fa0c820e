mod common;

use chrono::FixedOffset;
use common::{create_test_harness, new_review};
use eatery_reviews::{errors::AppError, reviews::QuotaPolicy};
use uuid::Uuid;

fn policy_with_limit(daily_limit: u32) -> QuotaPolicy {
    QuotaPolicy {
        daily_limit,
        ..QuotaPolicy::default()
    }
}

#[tokio::test]
async fn test_tenth_review_succeeds_eleventh_is_rejected() {
    let h = create_test_harness(policy_with_limit(10));
    let author = Uuid::new_v4();

    for expected_remaining in (0..10).rev() {
        let establishment = h.active_establishment().await;
        let created = h
            .service
            .create_review(author, new_review(establishment, 4))
            .await
            .unwrap();
        assert_eq!(created.quota_remaining, expected_remaining);
    }

    let establishment = h.active_establishment().await;
    let err = h
        .service
        .create_review(author, new_review(establishment, 4))
        .await
        .unwrap_err();
    match err {
        AppError::QuotaExceeded { daily_limit, .. } => assert_eq!(daily_limit, 10),
        other => panic!("expected QuotaExceeded, got {other}"),
    }

    // The rejected attempt left no review behind
    let page = h
        .service
        .list_for_establishment(establishment, Default::default(), Default::default())
        .await
        .unwrap();
    assert_eq!(page.page_info.total, 0);

    let status = h.service.quota_status(author).await.unwrap();
    assert_eq!(status.used, 10);
    assert_eq!(status.remaining, 0);
}

#[tokio::test]
async fn test_quota_is_per_user() {
    let h = create_test_harness(policy_with_limit(1));
    let establishment = h.active_establishment().await;

    h.service
        .create_review(Uuid::new_v4(), new_review(establishment, 4))
        .await
        .unwrap();
    h.service
        .create_review(Uuid::new_v4(), new_review(establishment, 4))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_check_and_consume_never_exceeds_limit() {
    let h = create_test_harness(policy_with_limit(3));
    let tracker = h.service.quota();
    let user = Uuid::new_v4();

    let mut allowed = 0;
    for _ in 0..5 {
        let decision = tracker.check_and_consume(user, 3).await.unwrap();
        if decision.allowed {
            allowed += 1;
        } else {
            assert_eq!(decision.remaining, 0);
        }
    }
    assert_eq!(allowed, 3);
    assert_eq!(tracker.remaining(user, 3).await.unwrap(), 0);

    // Reading does not consume
    assert_eq!(tracker.remaining(Uuid::new_v4(), 3).await.unwrap(), 3);
}

#[tokio::test]
async fn test_counter_outage_fails_closed_by_default() {
    let h = create_test_harness(QuotaPolicy::default());
    let establishment = h.active_establishment().await;
    let author = Uuid::new_v4();

    h.counter.set_available(false);
    let err = h
        .service
        .create_review(author, new_review(establishment, 4))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CounterUnavailable(_)));

    h.counter.set_available(true);
    let page = h
        .service
        .list_for_establishment(establishment, Default::default(), Default::default())
        .await
        .unwrap();
    assert_eq!(page.page_info.total, 0);
}

#[tokio::test]
async fn test_counter_outage_fail_open_policy() {
    let h = create_test_harness(QuotaPolicy {
        fail_open: true,
        ..QuotaPolicy::default()
    });
    let establishment = h.active_establishment().await;
    let author = Uuid::new_v4();

    h.counter.set_available(false);
    h.service
        .create_review(author, new_review(establishment, 4))
        .await
        .unwrap();

    // Nothing was counted while the counter was down
    h.counter.set_available(true);
    assert_eq!(h.service.quota().remaining(author, 10).await.unwrap(), 10);
}

#[tokio::test]
async fn test_quota_status_reports_next_reset() {
    let h = create_test_harness(QuotaPolicy {
        daily_limit: 5,
        utc_offset: FixedOffset::east_opt(2 * 3600).unwrap(),
        fail_open: false,
    });
    let author = Uuid::new_v4();

    let status = h.service.quota_status(author).await.unwrap();
    assert_eq!(status.daily_limit, 5);
    assert_eq!(status.used, 0);
    assert_eq!(status.remaining, 5);

    let now = chrono::Utc::now();
    assert!(status.resets_at > now);
    assert!(status.resets_at - now <= chrono::Duration::hours(24));
}
