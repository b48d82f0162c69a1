// Write handlers.
//
// POST /api/ratings  {user_id, movie_id, score}
// POST /api/feedback {user_id, movie_id, liked}
//
// Fields are optional at the serde level so a missing one comes back as an
// InvalidRequest naming the field, not as axum's generic rejection.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::catalog::ItemId;
use crate::error::{EngineError, EngineResult};
use crate::web::AppState;

#[derive(Deserialize, Default)]
pub struct RatingRequest {
    pub user_id: Option<String>,
    pub movie_id: Option<ItemId>,
    pub score: Option<i64>,
}

#[derive(Deserialize, Default)]
pub struct FeedbackRequest {
    pub user_id: Option<String>,
    pub movie_id: Option<ItemId>,
    pub liked: Option<bool>,
}

/// POST /api/ratings: store or overwrite a rating.
pub async fn post_rating(
    State(state): State<AppState>,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> Response {
    match record_rating(&state, payload).await {
        Ok(body) => (StatusCode::CREATED, Json(body)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/feedback: store or overwrite a like/dislike.
pub async fn post_feedback(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Response {
    match record_feedback(&state, payload).await {
        Ok(body) => (StatusCode::CREATED, Json(body)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn record_rating(
    state: &AppState,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> EngineResult<serde_json::Value> {
    let Json(req) = payload.map_err(rejection)?;
    let user_id = required(req.user_id, "user_id")?;
    let movie_id = required(req.movie_id, "movie_id")?;
    let score = required(req.score, "score")?;
    state
        .recommender
        .record_rating(state.store.as_ref(), &user_id, movie_id, score)
        .await?;
    Ok(serde_json::json!({
        "user_id": user_id.trim(),
        "movie_id": movie_id,
        "score": score,
    }))
}

async fn record_feedback(
    state: &AppState,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> EngineResult<serde_json::Value> {
    let Json(req) = payload.map_err(rejection)?;
    let user_id = required(req.user_id, "user_id")?;
    let movie_id = required(req.movie_id, "movie_id")?;
    let liked = required(req.liked, "liked")?;
    state
        .recommender
        .record_feedback(state.store.as_ref(), &user_id, movie_id, liked)
        .await?;
    Ok(serde_json::json!({
        "user_id": user_id.trim(),
        "movie_id": movie_id,
        "liked": liked,
    }))
}

// --- Helpers ---

fn required<T>(value: Option<T>, field: &str) -> EngineResult<T> {
    value.ok_or_else(|| EngineError::InvalidRequest(format!("{field} is required")))
}

fn rejection(err: JsonRejection) -> EngineError {
    EngineError::InvalidRequest(err.body_text())
}
