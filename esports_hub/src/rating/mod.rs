//! Stateless rating utilities.
//!
//! Nothing here touches the store: callers pass ratings in and get new ratings
//! or predictions back.

pub mod elo;
pub mod prediction;

pub use elo::{
    DEFAULT_K_FACTOR, DEFAULT_RATING, MatchOutcome, RatingChange, expected_score, record_result,
    update_elo,
};
pub use prediction::{
    DEFAULT_TOP_K, MatchDescriptor, Prediction, PredictionContext, Sides, batch_predict,
    predict_match, top_k_favorites,
};
