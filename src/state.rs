use std::sync::Arc;

use bb8::Pool;
use bb8_redis::RedisConnectionManager;

use crate::reviews::ReviewService;

#[derive(Clone)]
pub struct AppState {
    pub reviews: Arc<ReviewService>,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(reviews: ReviewService, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            reviews: Arc::new(reviews),
            jwt_secret: jwt_secret.into(),
        }
    }
}

pub type RedisClient = Pool<RedisConnectionManager>;
