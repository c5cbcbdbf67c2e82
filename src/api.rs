// src/api.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::aggregator::Aggregator;
use crate::profile::Query;

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/search", post(search))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    website: Option<String>,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

async fn search(State(state): State<AppState>, Json(body): Json<SearchRequest>) -> Response {
    let query = Query::new(body.name, body.website);
    match state.aggregator.aggregate(&query).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => {
            error!(error = %e, "search request rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
