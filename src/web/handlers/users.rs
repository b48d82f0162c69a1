// Per-user read handlers.
//
// GET /api/users/{user_id}/similar: users with the closest genre taste
// GET /api/feedback/{user_id}: like/dislike counts and hit rate

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::web::AppState;

pub async fn get_similar_users(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    match state
        .recommender
        .similar_users(state.store.as_ref(), &user_id)
        .await
    {
        Ok(report) => Json(report).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_feedback_summary(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    match state
        .recommender
        .feedback_summary(state.store.as_ref(), &user_id)
        .await
    {
        Ok(summary) => Json(serde_json::json!({
            "user_id": user_id,
            "recommended": summary.recommended,
            "liked": summary.liked,
            "disliked": summary.disliked,
            "liked_recommended": summary.liked_recommended,
            "hit_rate": summary.hit_rate,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
