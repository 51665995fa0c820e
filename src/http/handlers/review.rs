use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AuthClaims,
    errors::ErrorResponse,
    http::extract::{ApiJson, ApiPath},
    models::{
        AggregateSummary, NewReview, QuotaStatus, Review, ReviewChanges,
        response::ApiResponse,
    },
    reviews::{CreatedReview, UpdatedReview, validation::rating_from_json},
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewPayload {
    pub establishment_id: Uuid,
    pub rating: serde_json::Value,
    pub content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewPayload {
    pub rating: Option<serde_json::Value>,
    pub content: Option<String>,
}

pub async fn create_review_handler(
    State(state): State<AppState>,
    auth: AuthClaims,
    ApiJson(payload): ApiJson<CreateReviewPayload>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedReview>>), ErrorResponse> {
    let user_id = auth.user_id().map_err(|e| e.to_response())?;
    let rating = rating_from_json(&payload.rating).map_err(|e| e.to_response())?;

    let created = state
        .reviews
        .create_review(
            user_id,
            NewReview {
                establishment_id: payload.establishment_id,
                rating,
                content: payload.content,
            },
        )
        .await
        .map_err(|e| e.to_response())?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(created, "Review created")),
    ))
}

pub async fn get_review_handler(
    ApiPath(review_id): ApiPath<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Review>>, ErrorResponse> {
    let review = state
        .reviews
        .get_review(review_id)
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(ApiResponse::ok(review)))
}

pub async fn update_review_handler(
    ApiPath(review_id): ApiPath<Uuid>,
    State(state): State<AppState>,
    auth: AuthClaims,
    ApiJson(payload): ApiJson<UpdateReviewPayload>,
) -> Result<Json<ApiResponse<UpdatedReview>>, ErrorResponse> {
    let user_id = auth.user_id().map_err(|e| e.to_response())?;
    let rating = payload
        .rating
        .as_ref()
        .map(rating_from_json)
        .transpose()
        .map_err(|e| e.to_response())?;

    let updated = state
        .reviews
        .update_review(
            review_id,
            user_id,
            ReviewChanges {
                rating,
                content: payload.content,
            },
        )
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(ApiResponse::with_message(updated, "Review updated")))
}

pub async fn delete_review_handler(
    ApiPath(review_id): ApiPath<Uuid>,
    State(state): State<AppState>,
    auth: AuthClaims,
) -> Result<Json<ApiResponse<AggregateSummary>>, ErrorResponse> {
    let user_id = auth.user_id().map_err(|e| e.to_response())?;

    let summary = state
        .reviews
        .delete_review(review_id, user_id)
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(ApiResponse::with_message(summary, "Review deleted")))
}

pub async fn get_quota_handler(
    State(state): State<AppState>,
    auth: AuthClaims,
) -> Result<Json<ApiResponse<QuotaStatus>>, ErrorResponse> {
    let user_id = auth.user_id().map_err(|e| e.to_response())?;

    let status = state
        .reviews
        .quota_status(user_id)
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(ApiResponse::ok(status)))
}
