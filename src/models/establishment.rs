use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstablishmentStatus {
    Draft,
    Pending,
    Active,
    Suspended,
}

impl EstablishmentStatus {
    /// Only publicly listed establishments accept new reviews.
    pub fn is_eligible_for_review(&self) -> bool {
        matches!(self, EstablishmentStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EstablishmentStatus::Draft => "draft",
            EstablishmentStatus::Pending => "pending",
            EstablishmentStatus::Active => "active",
            EstablishmentStatus::Suspended => "suspended",
        }
    }
}

impl FromStr for EstablishmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(EstablishmentStatus::Draft),
            "pending" => Ok(EstablishmentStatus::Pending),
            "active" => Ok(EstablishmentStatus::Active),
            "suspended" => Ok(EstablishmentStatus::Suspended),
            other => Err(AppError::StoreUnavailable(format!(
                "Unknown establishment status: {}",
                other
            ))),
        }
    }
}

/// Rating statistics stored on the establishment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSummary {
    pub establishment_id: Uuid,
    pub review_count: i64,
    pub average_rating: f64,
}

impl AggregateSummary {
    pub fn empty(establishment_id: Uuid) -> Self {
        Self {
            establishment_id,
            review_count: 0,
            average_rating: 0.0,
        }
    }
}
