// GET /api/status: catalog and store sizes.
//
// Lets a client check the deployment without a separate round-trip per
// count.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::EngineError;
use crate::web::AppState;

pub async fn get_status(State(state): State<AppState>) -> Response {
    let stats = match state.store.stats().await {
        Ok(stats) => stats,
        Err(e) => return EngineError::from(e).into_response(),
    };
    let engine = &state.recommender;

    Json(serde_json::json!({
        "catalog": {
            "movies": engine.catalog().len(),
            "genres": engine.index().vocabulary().len(),
        },
        "store": {
            "location": state.store.location(),
            "users": stats.users,
            "ratings": stats.ratings,
            "feedback": stats.feedback,
        }
    }))
    .into_response()
}
