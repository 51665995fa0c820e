use chrono::NaiveDate;
use uuid::Uuid;

pub struct RedisKey;

impl RedisKey {
    pub fn review_quota(user_id: Uuid, day: NaiveDate) -> String {
        format!("review_quota:{user_id}:{}", day.format("%Y-%m-%d"))
    }
}
