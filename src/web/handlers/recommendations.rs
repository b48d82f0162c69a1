// GET /api/recommendations/{user_id}?limit=&record=
//
// `record=true` appends the served ids to the user's history so later
// feedback counts toward the hit rate. Plain reads leave the store alone.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::web::AppState;

#[derive(Deserialize, Default)]
pub struct RecommendationsQuery {
    /// Number of movies (default from REELMATCH_TOP_N)
    pub limit: Option<usize>,
    /// Record the served movies in the user's history
    pub record: Option<bool>,
}

pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendationsQuery>,
) -> Response {
    let top_n = params.limit.unwrap_or(state.config.top_n);
    let record = params.record.unwrap_or(false);

    match state
        .recommender
        .recommend_for(state.store.as_ref(), &user_id, top_n, record)
        .await
    {
        Ok(recs) => Json(serde_json::json!({
            "user_id": user_id,
            "recommendations": recs.items,
            "skipped": recs.skipped,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
