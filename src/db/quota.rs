use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use redis::{AsyncCommands, Script};
use uuid::Uuid;

use crate::{
    db::repository::QuotaCounter,
    errors::AppError,
    models::redis::RedisKey,
    state::RedisClient,
};

// KEYS[1] bucket, ARGV[1] limit, ARGV[2] unix expiry.
// Returns {1, count} when consumed, {0, count} when the bucket is full.
static CONSUME_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
local current = tonumber(redis.call('GET', KEYS[1]) or '0')
local limit = tonumber(ARGV[1])
if current >= limit then
    return {0, current}
end
current = redis.call('INCR', KEYS[1])
if redis.call('TTL', KEYS[1]) < 0 then
    redis.call('EXPIREAT', KEYS[1], ARGV[2])
end
return {1, current}
",
    )
});

static REFUND_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
local current = tonumber(redis.call('GET', KEYS[1]) or '0')
if current > 0 then
    return redis.call('DECR', KEYS[1])
end
return 0
",
    )
});

/// Daily review counters kept in Redis.
#[derive(Clone)]
pub struct RedisQuotaCounter {
    redis: RedisClient,
}

impl RedisQuotaCounter {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl QuotaCounter for RedisQuotaCounter {
    async fn try_consume(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        limit: u32,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<u32>, AppError> {
        let mut conn = self.redis.get().await?;
        let key = RedisKey::review_quota(user_id, day);

        let (consumed, count): (i64, i64) = CONSUME_SCRIPT
            .key(&key)
            .arg(limit)
            .arg(expires_at.timestamp())
            .invoke_async(&mut *conn)
            .await?;

        if consumed == 1 {
            Ok(Some(count.max(0) as u32))
        } else {
            Ok(None)
        }
    }

    async fn consumed(&self, user_id: Uuid, day: NaiveDate) -> Result<u32, AppError> {
        let mut conn = self.redis.get().await?;
        let key = RedisKey::review_quota(user_id, day);

        let count: Option<u32> = conn.get(&key).await?;
        Ok(count.unwrap_or(0))
    }

    async fn refund(&self, user_id: Uuid, day: NaiveDate) -> Result<(), AppError> {
        let mut conn = self.redis.get().await?;
        let key = RedisKey::review_quota(user_id, day);

        let _: i64 = REFUND_SCRIPT.key(&key).invoke_async(&mut *conn).await?;
        Ok(())
    }
}
