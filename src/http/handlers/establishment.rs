use axum::{Json, extract::State};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    errors::ErrorResponse,
    http::extract::{ApiPath, ApiQuery},
    models::{AggregateSummary, PageRequest, ReviewPage, ReviewSort, response::ApiResponse},
    state::AppState,
};

#[derive(Deserialize)]
pub struct ReviewListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
}

pub async fn list_establishment_reviews_handler(
    ApiPath(establishment_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ReviewListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReviewPage>>, ErrorResponse> {
    let sort = query
        .sort
        .as_deref()
        .map(str::parse::<ReviewSort>)
        .transpose()
        .map_err(|e| e.to_response())?
        .unwrap_or_default();

    let page = state
        .reviews
        .list_for_establishment(
            establishment_id,
            PageRequest::new(query.page, query.limit),
            sort,
        )
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(ApiResponse::ok(page)))
}

pub async fn get_rating_summary_handler(
    ApiPath(establishment_id): ApiPath<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AggregateSummary>>, ErrorResponse> {
    let summary = state
        .reviews
        .rating_summary(establishment_id)
        .await
        .map_err(|e| e.to_response())?;

    Ok(Json(ApiResponse::ok(summary)))
}
