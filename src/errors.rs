use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

use crate::models::response::{ErrorBody, ErrorEnvelope};

pub type ErrorResponse = (StatusCode, Json<ErrorEnvelope>);

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Rating must be between {min} and {max}, got {actual}")]
    InvalidRating {
        min: i16,
        max: i16,
        actual: serde_json::Value,
    },

    #[error("Review content must be at least {min} characters, got {actual}")]
    ContentTooShort { min: usize, actual: usize },

    #[error("Establishment is not accepting reviews")]
    EstablishmentNotEligible,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("You already have an active review for this establishment")]
    DuplicateActiveReview,

    #[error("Daily review limit of {daily_limit} reached")]
    QuotaExceeded {
        daily_limit: u32,
        resets_at: DateTime<Utc>,
    },

    #[error("Too many requests")]
    RateLimited,

    #[error("Request took too long")]
    RequestTimeout,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Quota counter unavailable: {0}")]
    CounterUnavailable(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Internal server error")]
    InternalError,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRating { .. }
            | AppError::ContentTooShort { .. }
            | AppError::EstablishmentNotEligible
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateActiveReview => StatusCode::CONFLICT,
            AppError::QuotaExceeded { .. } | AppError::RateLimited => {
                StatusCode::TOO_MANY_REQUESTS
            }
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::StoreUnavailable(_) | AppError::CounterUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code clients branch on.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRating { .. } => "INVALID_RATING",
            AppError::ContentTooShort { .. } => "CONTENT_TOO_SHORT",
            AppError::EstablishmentNotEligible => "ESTABLISHMENT_NOT_ELIGIBLE",
            AppError::BadRequest(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) | AppError::JwtError(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DuplicateActiveReview => "DUPLICATE_REVIEW",
            AppError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            AppError::RateLimited => "RATE_LIMITED",
            AppError::RequestTimeout => "REQUEST_TIMEOUT",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::CounterUnavailable(_) => "COUNTER_UNAVAILABLE",
            AppError::InternalError => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::InvalidRating { min, max, actual } => {
                Some(json!({ "min": min, "max": max, "actual": actual }))
            }
            AppError::ContentTooShort { min, actual } => {
                Some(json!({ "minLength": min, "actual": actual }))
            }
            AppError::QuotaExceeded {
                daily_limit,
                resets_at,
            } => Some(json!({
                "dailyLimit": daily_limit,
                "remaining": 0,
                "resetsAt": resets_at,
            })),
            _ => None,
        }
    }

    fn public_message(&self) -> String {
        match self {
            // Infrastructure detail stays in the logs.
            AppError::StoreUnavailable(_) => "Service temporarily unavailable".into(),
            AppError::CounterUnavailable(_) => {
                "Review creation is temporarily unavailable".into()
            }
            AppError::JwtError(_) => "Invalid or expired token".into(),
            AppError::InternalError => "Unexpected server error".into(),
            other => other.to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{} ({})", self, self.code());
        }

        (
            status,
            Json(ErrorEnvelope {
                success: false,
                message: self.public_message(),
                error: ErrorBody {
                    code: self.code().to_string(),
                    details: self.details(),
                },
            }),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_response().into_response()
    }
}

// Extractor rejections carry axum's plain-text explanation; keep it as the
// message and answer with the envelope.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateActiveReview
            }
            other => AppError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CounterUnavailable(err.to_string())
    }
}

impl From<bb8::RunError<redis::RedisError>> for AppError {
    fn from(err: bb8::RunError<redis::RedisError>) -> Self {
        match err {
            bb8::RunError::User(err) => AppError::CounterUnavailable(err.to_string()),
            bb8::RunError::TimedOut => {
                AppError::CounterUnavailable("Redis connection timed out".into())
            }
        }
    }
}
