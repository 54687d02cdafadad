//! Match predictions derived from ELO expected scores.

use super::elo::{DEFAULT_RATING, expected_score, round_to};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form metadata passed through a prediction untouched
pub type PredictionContext = BTreeMap<String, serde_json::Value>;

/// Number of favourites returned when the caller does not choose
pub const DEFAULT_TOP_K: usize = 3;

/// A value for each side of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sides<T> {
    pub a: T,
    pub b: T,
}

/// Predicted outcome of a single match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub timestamp: DateTime<Utc>,
    pub players: Sides<String>,
    pub ratings: Sides<f64>,
    /// Win probabilities, three decimals
    pub probabilities: Sides<f64>,
    pub predicted_winner: String,
    /// Distance of A's win probability from a coin flip, scaled to 0..=1
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PredictionContext>,
}

/// One entry of a batch prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDescriptor {
    #[serde(alias = "a")]
    pub player_a: String,
    #[serde(alias = "b")]
    pub player_b: String,
    #[serde(default = "default_rating", alias = "a_rating")]
    pub rating_a: f64,
    #[serde(default = "default_rating", alias = "b_rating")]
    pub rating_b: f64,
    #[serde(default)]
    pub context: Option<PredictionContext>,
}

fn default_rating() -> f64 {
    DEFAULT_RATING
}

/// Predict a match between two players
///
/// Player A is favoured when the probabilities are equal. An empty context is
/// dropped.
pub fn predict_match(
    player_a: &str,
    player_b: &str,
    rating_a: f64,
    rating_b: f64,
    context: Option<PredictionContext>,
) -> Prediction {
    let prob_a = expected_score(rating_a, rating_b);
    let prob_b = 1.0 - prob_a;
    let confidence = (prob_a - 0.5).abs() * 2.0;

    let predicted_winner = if prob_a >= prob_b { player_a } else { player_b };

    Prediction {
        timestamp: Utc::now(),
        players: Sides {
            a: player_a.to_string(),
            b: player_b.to_string(),
        },
        ratings: Sides {
            a: rating_a,
            b: rating_b,
        },
        probabilities: Sides {
            a: round_to(prob_a, 3),
            b: round_to(prob_b, 3),
        },
        predicted_winner: predicted_winner.to_string(),
        confidence: round_to(confidence, 3),
        context: context.filter(|c| !c.is_empty()),
    }
}

/// Predict every described match, preserving order
pub fn batch_predict(matches: Vec<MatchDescriptor>) -> Vec<Prediction> {
    matches
        .into_iter()
        .map(|m| predict_match(&m.player_a, &m.player_b, m.rating_a, m.rating_b, m.context))
        .collect()
}

/// The `k` most confident predictions, most confident first
pub fn top_k_favorites(mut predictions: Vec<Prediction>, k: usize) -> Vec<Prediction> {
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    predictions.truncate(k);
    predictions
}
