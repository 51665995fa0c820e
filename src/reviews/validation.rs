use crate::{
    errors::AppError,
    models::review::{MAX_RATING, MIN_CONTENT_LENGTH, MIN_RATING},
};

pub fn validate_rating(rating: i64) -> Result<i16, AppError> {
    if (MIN_RATING as i64..=MAX_RATING as i64).contains(&rating) {
        Ok(rating as i16)
    } else {
        Err(AppError::InvalidRating {
            min: MIN_RATING,
            max: MAX_RATING,
            actual: rating.into(),
        })
    }
}

/// Ratings arrive as arbitrary JSON numbers; anything that is not a whole
/// number is reported the same way as an out-of-range one.
pub fn rating_from_json(value: &serde_json::Value) -> Result<i64, AppError> {
    value.as_i64().ok_or_else(|| AppError::InvalidRating {
        min: MIN_RATING,
        max: MAX_RATING,
        actual: value.clone(),
    })
}

/// Trims the content and checks its length in characters.
pub fn validate_content(content: &str) -> Result<String, AppError> {
    let trimmed = content.trim();
    let length = trimmed.chars().count();

    if length < MIN_CONTENT_LENGTH {
        return Err(AppError::ContentTooShort {
            min: MIN_CONTENT_LENGTH,
            actual: length,
        });
    }

    Ok(trimmed.to_string())
}
