// Web API tests: routes driven in-process with tower's oneshot.
//
// Each test builds the router over a small catalog and a temp-file JSON
// store, sends one or more requests, and checks status codes and bodies,
// including the EngineError -> HTTP status mapping.

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use reelmatch::catalog::{Catalog, Item};
use reelmatch::config::Config;
use reelmatch::db::{JsonFileStore, RatingStore};
use reelmatch::pipeline::Recommender;
use reelmatch::web::{build_router, AppState};

fn app(name: &str) -> Router {
    let path = std::env::temp_dir().join(format!(
        "reelmatch-web-{}-{}.json",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    let store: Arc<dyn RatingStore> = Arc::new(JsonFileStore::new(path));

    let catalog = Catalog::new(vec![
        Item::new(1, "Heat (1995)", "Action|Crime|Thriller"),
        Item::new(2, "Ronin (1998)", "Action|Crime|Thriller"),
        Item::new(3, "Fargo (1996)", "Comedy|Crime|Drama|Thriller"),
        Item::new(4, "Clueless (1995)", "Comedy|Romance"),
    ])
    .unwrap();

    build_router(AppState {
        recommender: Arc::new(Recommender::new(catalog)),
        store,
        config: Arc::new(Config::default()),
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn rate(app: &Router, user: &str, movie: i64, score: i64) {
    let (status, _) = send(
        app,
        post(
            "/api/ratings",
            json!({"user_id": user, "movie_id": movie, "score": score}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// ============================================================
// Read-only routes
// ============================================================

#[tokio::test]
async fn health_is_ok() {
    let app = app("health");
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn movies_search_is_case_insensitive() {
    let app = app("movies");
    let (status, body) = send(&app, get("/api/movies?q=FARGO")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["movies"][0]["id"], 3);
    assert_eq!(body["movies"][0]["genres"], "Comedy|Crime|Drama|Thriller");
}

#[tokio::test]
async fn status_reports_counts() {
    let app = app("status");
    rate(&app, "ana", 1, 4).await;
    let (status, body) = send(&app, get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["catalog"]["movies"], 4);
    assert_eq!(body["store"]["users"], 1);
    assert_eq!(body["store"]["ratings"], 1);
}

// ============================================================
// Recommendations
// ============================================================

#[tokio::test]
async fn rate_then_recommend() {
    let app = app("recommend");
    rate(&app, "ana", 1, 5).await;

    let (status, body) = send(&app, get("/api/recommendations/ana?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0]["id"], 2);
    assert_eq!(recs[1]["id"], 3);
}

#[tokio::test]
async fn recommend_for_unknown_user_is_bad_request() {
    let app = app("recommend-unknown");
    let (status, body) = send(&app, get("/api/recommendations/ghost")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");
}

#[tokio::test]
async fn zero_limit_is_bad_request() {
    let app = app("zero-limit");
    rate(&app, "ana", 1, 5).await;
    let (status, _) = send(&app, get("/api/recommendations/ana?limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recorded_recommendations_feed_the_hit_rate() {
    let app = app("hit-rate");
    rate(&app, "ana", 1, 5).await;
    send(&app, get("/api/recommendations/ana?limit=1&record=true")).await;

    let (status, _) = send(
        &app,
        post(
            "/api/feedback",
            json!({"user_id": "ana", "movie_id": 2, "liked": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, get("/api/feedback/ana")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommended"], 1);
    assert_eq!(body["liked"], 1);
    assert_eq!(body["hit_rate"], 1.0);

    // Liked item no longer resurfaces
    let (_, body) = send(&app, get("/api/recommendations/ana")).await;
    let ids: Vec<i64> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert!(!ids.contains(&2));
}

// ============================================================
// Writes and validation
// ============================================================

#[tokio::test]
async fn missing_field_is_bad_request() {
    let app = app("missing-field");
    let (status, body) = send(
        &app,
        post("/api/ratings", json!({"user_id": "ana", "movie_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("score"));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = app("malformed");
    let request = Request::builder()
        .method("POST")
        .uri("/api/ratings")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");
}

#[tokio::test]
async fn out_of_range_score_is_bad_request() {
    let app = app("range");
    let (status, _) = send(
        &app,
        post(
            "/api/ratings",
            json!({"user_id": "ana", "movie_id": 1, "score": 6}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_movie_is_not_found() {
    let app = app("unknown-movie");
    let (status, body) = send(
        &app,
        post(
            "/api/ratings",
            json!({"user_id": "ana", "movie_id": 404, "score": 3}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

// ============================================================
// Similar users
// ============================================================

#[tokio::test]
async fn similar_users_ranked() {
    let app = app("similar");
    rate(&app, "ana", 1, 5).await;
    rate(&app, "bo", 2, 5).await;
    rate(&app, "cy", 4, 5).await;

    let (status, body) = send(&app, get("/api/users/ana/similar")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target_user"], "ana");
    assert_eq!(body["matches"][0]["user_id"], "bo");
    assert_eq!(body["matches"][0]["similarity"], 1.0);
}

#[tokio::test]
async fn similar_users_lone_rater_is_unprocessable() {
    let app = app("similar-lonely");
    rate(&app, "ana", 1, 5).await;
    let (status, body) = send(&app, get("/api/users/ana/similar")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "insufficient_data");
}

#[tokio::test]
async fn similar_users_unknown_target_is_not_found() {
    let app = app("similar-unknown");
    rate(&app, "ana", 1, 5).await;
    rate(&app, "bo", 1, 5).await;
    let (status, _) = send(&app, get("/api/users/zed/similar")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feedback_summary_unknown_user_is_not_found() {
    let app = app("summary-unknown");
    let (status, _) = send(&app, get("/api/feedback/ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
