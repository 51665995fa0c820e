use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;
pub const MIN_CONTENT_LENGTH: usize = 10;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub author_id: Uuid,
    pub establishment_id: Uuid,
    pub rating: i16,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub edited: bool,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Review {
    pub fn new(
        author_id: Uuid,
        establishment_id: Uuid,
        rating: i16,
        content: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            establishment_id,
            rating,
            content,
            created_at: now,
            updated_at: now,
            edited: false,
            active: true,
            deleted_at: None,
        }
    }
}

/// Validated input for a new review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub establishment_id: Uuid,
    pub rating: i64,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    pub rating: Option<i64>,
    pub content: Option<String>,
}

/// Validated changes for a stored review. Fields left `None` keep whatever is
/// stored at the time the edit is applied.
#[derive(Debug, Clone)]
pub struct ReviewEdit {
    pub rating: Option<i16>,
    pub content: Option<String>,
    pub edited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSort {
    #[default]
    Newest,
    Highest,
    Lowest,
}

impl ReviewSort {
    /// ORDER BY clause for the reviews table. Ties fall back to newest first.
    pub fn order_clause(&self) -> &'static str {
        match self {
            ReviewSort::Newest => "created_at DESC, id DESC",
            ReviewSort::Highest => "rating DESC, created_at DESC, id DESC",
            ReviewSort::Lowest => "rating ASC, created_at DESC, id DESC",
        }
    }
}

impl FromStr for ReviewSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(ReviewSort::Newest),
            "highest" => Ok(ReviewSort::Highest),
            "lowest" => Ok(ReviewSort::Lowest),
            other => Err(AppError::BadRequest(format!(
                "Invalid sort '{}'. Expected one of: newest, highest, lowest",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageInfo {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = request.limit as u64;
        let total_pages = total.div_ceil(limit);
        let page = request.page as u64;

        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    pub items: Vec<Review>,
    pub page_info: PageInfo,
}
