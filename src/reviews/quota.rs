//! Per-user daily review quota.
//!
//! Buckets are keyed by the calendar day in the configured UTC offset; a new
//! day means a new bucket, so nothing is ever reset explicitly.

use std::sync::Arc;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    db::QuotaCounter,
    errors::AppError,
    models::{QuotaDecision, QuotaStatus},
};

#[derive(Debug, Clone, Copy)]
pub struct QuotaPolicy {
    pub daily_limit: u32,
    pub utc_offset: FixedOffset,
    /// Let creations through when the counter store is down.
    pub fail_open: bool,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            daily_limit: 10,
            utc_offset: Utc.fix(),
            fail_open: false,
        }
    }
}

#[derive(Clone)]
pub struct QuotaTracker {
    counter: Arc<dyn QuotaCounter>,
    policy: QuotaPolicy,
}

impl QuotaTracker {
    pub fn new(counter: Arc<dyn QuotaCounter>, policy: QuotaPolicy) -> Self {
        Self { counter, policy }
    }

    pub fn daily_limit(&self) -> u32 {
        self.policy.daily_limit
    }

    pub fn day_bucket(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.policy.utc_offset).date_naive()
    }

    /// Start of the next local day, in UTC.
    pub fn next_reset(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let tomorrow = self
            .day_bucket(now)
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX);
        self.policy
            .utc_offset
            .from_local_datetime(&tomorrow.and_time(NaiveTime::MIN))
            .single()
            .map(|midnight| midnight.with_timezone(&Utc))
            .unwrap_or(now)
    }

    pub async fn check_and_consume(
        &self,
        user_id: Uuid,
        daily_limit: u32,
    ) -> Result<QuotaDecision, AppError> {
        let now = Utc::now();
        let day = self.day_bucket(now);

        match self
            .counter
            .try_consume(user_id, day, daily_limit, self.next_reset(now))
            .await
        {
            Ok(Some(consumed)) => Ok(QuotaDecision {
                allowed: true,
                remaining: daily_limit.saturating_sub(consumed),
                day,
                charged: true,
            }),
            Ok(None) => {
                tracing::warn!("Review quota exhausted for user {} on {}", user_id, day);
                Ok(QuotaDecision {
                    allowed: false,
                    remaining: 0,
                    day,
                    charged: false,
                })
            }
            Err(e) if self.policy.fail_open => {
                tracing::warn!("Quota counter unavailable, failing open for {}: {}", user_id, e);
                Ok(QuotaDecision {
                    allowed: true,
                    remaining: daily_limit.saturating_sub(1),
                    day,
                    charged: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Read-only view of today's bucket.
    pub async fn remaining(&self, user_id: Uuid, daily_limit: u32) -> Result<u32, AppError> {
        let day = self.day_bucket(Utc::now());
        let used = self.counter.consumed(user_id, day).await?;
        Ok(daily_limit.saturating_sub(used))
    }

    pub async fn status(&self, user_id: Uuid) -> Result<QuotaStatus, AppError> {
        let now = Utc::now();
        let used = self
            .counter
            .consumed(user_id, self.day_bucket(now))
            .await?
            .min(self.policy.daily_limit);

        Ok(QuotaStatus {
            daily_limit: self.policy.daily_limit,
            used,
            remaining: self.policy.daily_limit - used,
            resets_at: self.next_reset(now),
        })
    }

    /// Undo a charged decision after the review was rejected downstream.
    pub async fn refund(&self, user_id: Uuid, decision: &QuotaDecision) {
        if !decision.charged {
            return;
        }
        if let Err(e) = self.counter.refund(user_id, decision.day).await {
            tracing::error!("Failed to refund review quota for {}: {}", user_id, e);
        }
    }
}
