// GET /api/movies: catalog listing with optional ?q= title search.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::catalog::Item;
use crate::web::AppState;

#[derive(Deserialize, Default)]
pub struct MoviesQuery {
    /// Case-insensitive title search
    pub q: Option<String>,
    /// Results returned (default 50, max 500)
    pub limit: Option<usize>,
}

/// GET /api/movies: matching movies in catalog order.
pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<MoviesQuery>,
) -> impl IntoResponse {
    let matches = state.recommender.search(params.q.as_deref().unwrap_or(""));
    let total = matches.len();
    let limit = params.limit.unwrap_or(50).min(500);

    let movies: Vec<serde_json::Value> = matches.into_iter().take(limit).map(movie_json).collect();

    Json(serde_json::json!({
        "movies": movies,
        "total": total,
    }))
}

fn movie_json(item: &Item) -> serde_json::Value {
    serde_json::json!({
        "id": item.id,
        "title": item.title,
        "genres": item.genre_label(),
    })
}
