// Web server: Axum-based JSON API over the recommender.
//
// A thin adapter: handlers parse the request, call one `Recommender`
// method, and serialize the result. Engine errors map to HTTP statuses in
// one place (`IntoResponse for EngineError`) so every route reports them
// the same way.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::db::RatingStore;
use crate::error::EngineError;
use crate::pipeline::Recommender;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub store: Arc<dyn RatingStore>,
    pub config: Arc<Config>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(
    config: Config,
    recommender: Recommender,
    store: Arc<dyn RatingStore>,
    port: u16,
    bind: &str,
) -> Result<()> {
    let state = AppState {
        recommender: Arc::new(recommender),
        store,
        config: Arc::new(config),
    };

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("reelmatch API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/status", get(handlers::status::get_status))
        .route("/api/movies", get(handlers::movies::list_movies))
        .route("/api/ratings", post(handlers::ratings::post_rating))
        .route("/api/feedback", post(handlers::ratings::post_feedback))
        .route(
            "/api/feedback/{user_id}",
            get(handlers::users::get_feedback_summary),
        )
        .route(
            "/api/recommendations/{user_id}",
            get(handlers::recommendations::get_recommendations),
        )
        .route(
            "/api/users/{user_id}/similar",
            get(handlers::users::get_similar_users),
        );

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check: always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str, kind: &str) -> Response {
    (
        status,
        axum::Json(serde_json::json!({ "error": message, "kind": kind })),
    )
        .into_response()
}

impl EngineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::InsufficientData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::InternalInconsistency(_) => StatusCode::CONFLICT,
            EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let EngineError::Storage(ref e) = self {
            // Store internals stay in the log, not the response body
            error!(error = %e, "Storage error while handling request");
            return api_error(status, "Storage error", self.kind());
        }
        api_error(status, &self.to_string(), self.kind())
    }
}
