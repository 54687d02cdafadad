//! Rating and prediction endpoints.
//!
//! Stateless: ratings come in with the request and nothing is stored.

use axum::Json;
use esports_hub::rating::{
    self, DEFAULT_RATING, DEFAULT_TOP_K, MatchDescriptor, MatchOutcome, Prediction,
    PredictionContext, RatingChange,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiJson};

fn default_rating() -> f64 {
    DEFAULT_RATING
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub player_a: String,
    pub player_b: String,
    #[serde(default = "default_rating")]
    pub rating_a: f64,
    #[serde(default = "default_rating")]
    pub rating_b: f64,
    #[serde(default)]
    pub context: Option<PredictionContext>,
}

#[derive(Debug, Deserialize)]
pub struct BatchPredictRequest {
    pub matches: Vec<MatchDescriptor>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchPredictResponse {
    pub predictions: Vec<Prediction>,
    pub favorites: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
pub struct RatingUpdateRequest {
    pub player_a_id: String,
    pub player_b_id: String,
    #[serde(default = "default_rating")]
    pub rating_a: f64,
    #[serde(default = "default_rating")]
    pub rating_b: f64,
    pub result: MatchOutcome,
}

fn check_ratings(rating_a: f64, rating_b: f64) -> Result<(), ApiError> {
    if rating_a.is_finite() && rating_b.is_finite() {
        Ok(())
    } else {
        Err(ApiError::bad_request("Ratings must be finite numbers"))
    }
}

/// `POST /predictions`
pub async fn predict(
    ApiJson(request): ApiJson<PredictRequest>,
) -> Result<Json<Prediction>, ApiError> {
    check_ratings(request.rating_a, request.rating_b)?;
    Ok(Json(rating::predict_match(
        &request.player_a,
        &request.player_b,
        request.rating_a,
        request.rating_b,
        request.context,
    )))
}

/// `POST /predictions/batch`
///
/// Predictions keep request order; `favorites` holds the `top_k` most
/// confident ones (3 by default).
pub async fn predict_batch(
    ApiJson(request): ApiJson<BatchPredictRequest>,
) -> Result<Json<BatchPredictResponse>, ApiError> {
    for m in &request.matches {
        check_ratings(m.rating_a, m.rating_b)?;
    }

    let predictions = rating::batch_predict(request.matches);
    let favorites =
        rating::top_k_favorites(predictions.clone(), request.top_k.unwrap_or(DEFAULT_TOP_K));

    Ok(Json(BatchPredictResponse {
        predictions,
        favorites,
    }))
}

/// `POST /ratings/update`
pub async fn update_ratings(
    ApiJson(request): ApiJson<RatingUpdateRequest>,
) -> Result<Json<RatingChange>, ApiError> {
    check_ratings(request.rating_a, request.rating_b)?;
    Ok(Json(rating::record_result(
        request.player_a_id,
        request.player_b_id,
        request.rating_a,
        request.rating_b,
        request.result,
    )))
}
