//! Rating aggregate maths shared by every storage backend.
//!
//! The summary is always derived from the full active-review totals, never
//! adjusted incrementally.

use uuid::Uuid;

use crate::models::AggregateSummary;

/// Mean rating rounded to one decimal place; 0 for an empty set.
pub fn mean_rating(review_count: i64, rating_sum: i64) -> f64 {
    if review_count <= 0 {
        return 0.0;
    }
    let mean = rating_sum as f64 / review_count as f64;
    (mean * 10.0).round() / 10.0
}

pub fn summarize(establishment_id: Uuid, review_count: i64, rating_sum: i64) -> AggregateSummary {
    AggregateSummary {
        establishment_id,
        review_count,
        average_rating: mean_rating(review_count, rating_sum),
    }
}

/// Summary over an iterator of active ratings.
pub fn summarize_ratings<I>(establishment_id: Uuid, ratings: I) -> AggregateSummary
where
    I: IntoIterator<Item = i16>,
{
    let (count, sum) = ratings
        .into_iter()
        .fold((0i64, 0i64), |(count, sum), rating| {
            (count + 1, sum + rating as i64)
        });
    summarize(establishment_id, count, sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_has_zero_mean() {
        let summary = summarize_ratings(Uuid::nil(), []);
        assert_eq!(summary.review_count, 0);
        assert_eq!(summary.average_rating, 0.0);
    }

    #[test]
    fn mean_is_rounded_to_one_decimal() {
        assert_eq!(mean_rating(3, 13), 4.3);
        assert_eq!(mean_rating(3, 14), 4.7);
        assert_eq!(mean_rating(2, 9), 4.5);
        assert_eq!(mean_rating(1, 5), 5.0);
    }

    #[test]
    fn summarize_ratings_counts_each_rating() {
        let summary = summarize_ratings(Uuid::nil(), [5, 4, 1, 2]);
        assert_eq!(summary.review_count, 4);
        assert_eq!(summary.average_rating, 3.0);
    }
}
