//! ELO rating math.

use serde::{Deserialize, Serialize};

/// Rating assumed for players without history
pub const DEFAULT_RATING: f64 = 1500.0;

/// K-factor used by [`record_result`]
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Probability that a player rated `rating_a` beats one rated `rating_b`
///
/// Computed from the rating difference, so it saturates at 0 or 1 instead of
/// overflowing for very large ratings.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
}

/// New ratings after a match
///
/// `score_a` is A's actual score (1.0 win, 0.5 draw, 0.0 loss); B scores
/// `1 - score_a`. Both ratings are rounded to two decimals.
pub fn update_elo(rating_a: f64, rating_b: f64, score_a: f64, k: f64) -> (f64, f64) {
    let ea = expected_score(rating_a, rating_b);
    let eb = expected_score(rating_b, rating_a);

    let new_a = rating_a + k * (score_a - ea);
    let new_b = rating_b + k * ((1.0 - score_a) - eb);

    (round_to(new_a, 2), round_to(new_b, 2))
}

/// Who won a rated match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    #[serde(rename = "a")]
    PlayerA,
    #[serde(rename = "b")]
    PlayerB,
    #[serde(rename = "draw")]
    Draw,
}

impl MatchOutcome {
    /// Actual score for player A
    pub fn score_a(&self) -> f64 {
        match self {
            MatchOutcome::PlayerA => 1.0,
            MatchOutcome::PlayerB => 0.0,
            MatchOutcome::Draw => 0.5,
        }
    }
}

/// Ratings before and after a recorded match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub player_a_id: String,
    pub player_b_id: String,
    pub old_rating_a: f64,
    pub old_rating_b: f64,
    pub new_rating_a: f64,
    pub new_rating_b: f64,
    pub result: MatchOutcome,
}

/// Apply a match outcome with the default K-factor
pub fn record_result(
    player_a_id: impl Into<String>,
    player_b_id: impl Into<String>,
    rating_a: f64,
    rating_b: f64,
    outcome: MatchOutcome,
) -> RatingChange {
    let (new_rating_a, new_rating_b) =
        update_elo(rating_a, rating_b, outcome.score_a(), DEFAULT_K_FACTOR);

    RatingChange {
        player_a_id: player_a_id.into(),
        player_b_id: player_b_id.into(),
        old_rating_a: rating_a,
        old_rating_b: rating_b,
        new_rating_a,
        new_rating_b,
        result: outcome,
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_ratings_are_even() {
        assert!((expected_score(1500.0, 1500.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_hundred_point_edge() {
        assert!((expected_score(1600.0, 1500.0) - 0.64).abs() < 0.001);
    }

    #[test]
    fn test_large_ratings_stay_finite() {
        let ea = expected_score(200_000.0, 199_900.0);
        assert!((ea - 0.64).abs() < 0.001);

        let (a, b) = update_elo(200_000.0, 199_900.0, 1.0, DEFAULT_K_FACTOR);
        assert!(a.is_finite() && b.is_finite());
        assert_eq!(a, 200_011.52);
        assert_eq!(b, 199_888.48);
    }

    #[test]
    fn test_far_apart_ratings_saturate() {
        assert_eq!(expected_score(1_000_000.0, 0.0), 1.0);
        assert_eq!(expected_score(0.0, 1_000_000.0), 0.0);

        let (a, b) = update_elo(0.0, 1_000_000.0, 1.0, DEFAULT_K_FACTOR);
        assert_eq!(a, 32.0);
        assert_eq!(b, 999_968.0);
    }

    #[test]
    fn test_expected_scores_are_complementary() {
        let ea = expected_score(1600.0, 1450.0);
        let eb = expected_score(1450.0, 1600.0);
        assert!((ea + eb - 1.0).abs() < 1e-12);
        assert!(ea > 0.5);
    }

    #[test]
    fn test_update_after_favourite_wins() {
        let (a, b) = update_elo(1600.0, 1500.0, 1.0, DEFAULT_K_FACTOR);
        assert_eq!(a, 1611.52);
        assert_eq!(b, 1488.48);
    }

    #[test]
    fn test_draw_between_equals_changes_nothing() {
        let change = record_result("p1", "p2", 1500.0, 1500.0, MatchOutcome::Draw);
        assert_eq!(change.new_rating_a, 1500.0);
        assert_eq!(change.new_rating_b, 1500.0);
        assert_eq!(change.result, MatchOutcome::Draw);
    }

    #[test]
    fn test_upset_moves_ratings_more() {
        let favourite_wins = record_result("p1", "p2", 1600.0, 1500.0, MatchOutcome::PlayerA);
        let underdog_wins = record_result("p1", "p2", 1600.0, 1500.0, MatchOutcome::PlayerB);
        let gain = favourite_wins.new_rating_a - 1600.0;
        let loss = 1600.0 - underdog_wins.new_rating_a;
        assert!(loss > gain);
    }

    #[test]
    fn test_outcome_wire_names() {
        assert_eq!(serde_json::to_string(&MatchOutcome::PlayerA).unwrap(), "\"a\"");
        let outcome: MatchOutcome = serde_json::from_str("\"draw\"").unwrap();
        assert_eq!(outcome, MatchOutcome::Draw);
    }
}
