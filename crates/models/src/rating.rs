use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, round_money};

pub const POPULAR_MIN_AVERAGE: f64 = 4.5;
pub const POPULAR_MIN_BOOKINGS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub count: u32,
}

impl Rating {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(0.0..=5.0).contains(&self.average) {
            return Err(ModelError::validation("rating.average must be within 0..=5"));
        }
        Ok(())
    }

    /// Aggregate from individual review scores.
    pub fn from_scores<I: IntoIterator<Item = u8>>(scores: I) -> Rating {
        let (sum, count) = scores
            .into_iter()
            .fold((0u32, 0u32), |(s, c), r| (s + u32::from(r), c + 1));
        if count == 0 {
            return Rating::default();
        }
        Rating { average: round_money(f64::from(sum) / f64::from(count)), count }
    }
}

pub fn is_popular(rating: &Rating, booking_count: u32) -> bool {
    rating.average >= POPULAR_MIN_AVERAGE && booking_count >= POPULAR_MIN_BOOKINGS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popularity_needs_both_thresholds() {
        let high = Rating { average: 4.5, count: 3 };
        assert!(is_popular(&high, 10));
        assert!(!is_popular(&high, 9));
        assert!(!is_popular(&Rating { average: 4.49, count: 30 }, 50));
    }

    #[test]
    fn aggregates_scores() {
        let r = Rating::from_scores([5, 4, 4]);
        assert_eq!(r.count, 3);
        assert_eq!(r.average, 4.33);
        assert_eq!(Rating::from_scores([]), Rating::default());
    }

    #[test]
    fn average_out_of_range_is_rejected() {
        assert!(Rating { average: 5.1, count: 1 }.validate().is_err());
    }
}
