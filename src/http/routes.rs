use axum::{
    Json, Router,
    routing::{get, post},
};

use crate::{
    http::handlers::{
        create_review_handler, delete_review_handler, get_quota_handler,
        get_rating_summary_handler, get_review_handler, list_establishment_reviews_handler,
        update_review_handler,
    },
    models::response::ApiResponse,
    state::AppState,
};

pub fn create_http_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(ApiResponse::ok("ok")) }))
        .route("/reviews", post(create_review_handler))
        .route("/reviews/quota", get(get_quota_handler))
        .route(
            "/reviews/{review_id}",
            get(get_review_handler)
                .put(update_review_handler)
                .delete(delete_review_handler),
        )
        .route(
            "/establishments/{establishment_id}/reviews",
            get(list_establishment_reviews_handler),
        )
        .route(
            "/establishments/{establishment_id}/rating",
            get(get_rating_summary_handler),
        )
        .with_state(state)
}
