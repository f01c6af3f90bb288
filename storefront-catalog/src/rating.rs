use serde::{Deserialize, Serialize};
use storefront_core::models::{Rating, Review};

const MIN_AVERAGE: f64 = Rating::MIN as f64;
const MAX_AVERAGE: f64 = Rating::MAX as f64;

/// Aggregate rating figures written back to the CMS
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingUpdate {
    pub average_rating: f64,
    pub total_reviews: u32,
}

/// Fold one new rating into a running average.
///
/// The result is rounded to one decimal and clamped into the star range, so a
/// corrupted CMS average can never be written back out of bounds.
pub fn next_average(current_average: f64, current_count: u32, new_rating: Rating) -> RatingUpdate {
    let total_reviews = current_count.saturating_add(1);
    let sum = current_average * f64::from(current_count) + f64::from(new_rating.value());
    let average = round_to_tenth(sum / f64::from(total_reviews));

    RatingUpdate {
        average_rating: average.clamp(MIN_AVERAGE, MAX_AVERAGE),
        total_reviews,
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Plain arithmetic mean of stored ratings, 0 when there are none
pub fn mean_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: f64 = reviews.iter().map(|r| f64::from(r.rating.value())).sum();
    sum / reviews.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::models::CurrentUser;

    fn rating(value: i64) -> Rating {
        Rating::try_from(value).unwrap()
    }

    #[test]
    fn test_tenth_review_moves_average() {
        let update = next_average(4.0, 9, rating(5));
        assert!((update.average_rating - 4.1).abs() < 1e-9);
        assert_eq!(update.total_reviews, 10);
    }

    #[test]
    fn test_first_review_sets_average() {
        let update = next_average(0.0, 0, rating(3));
        assert_eq!(update.average_rating, 3.0);
        assert_eq!(update.total_reviews, 1);
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        // (4.5 * 2 + 5) / 3 = 4.666..
        let update = next_average(4.5, 2, rating(5));
        assert!((update.average_rating - 4.7).abs() < 1e-9);
    }

    #[test]
    fn test_corrupted_average_is_clamped() {
        assert_eq!(next_average(40.0, 3, rating(5)).average_rating, 5.0);
        assert_eq!(next_average(-3.0, 4, rating(1)).average_rating, 1.0);
    }

    #[test]
    fn test_mean_rating() {
        assert_eq!(mean_rating(&[]), 0.0);

        let user = CurrentUser {
            id: "u-1".to_string(),
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
        };
        let reviews: Vec<Review> = [5, 4, 4]
            .iter()
            .map(|r| Review::new("blt1".to_string(), &user, rating(*r), String::new()))
            .collect();
        assert!((mean_rating(&reviews) - 13.0 / 3.0).abs() < 1e-9);
    }
}
