//! HTTP request handlers

use super::state::AppState;
use crate::provider::{ProviderError, SearchQuery};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Query parameters for the search proxy
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviesParams {
    /// Search term
    pub search_term: Option<String>,
    /// Page number (1-indexed); anything unparsable means page 1
    pub page: Option<String>,
}

/// Error body returned by the proxy
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Search proxy: forwards `searchTerm`/`page` to the provider
pub async fn movies(
    State(state): State<AppState>,
    Query(params): Query<MoviesParams>,
) -> Response {
    let term = match params.search_term {
        Some(t) if !t.trim().is_empty() => t,
        _ => return error_response(StatusCode::BAD_REQUEST, "Search term is required"),
    };

    let page = params
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<u32>().ok())
        .unwrap_or(1);
    let query = SearchQuery::new(term, page);

    match state.provider.search(&query).await {
        Ok(page) => Json(page.items).into_response(),
        Err(ProviderError::Provider(message)) => error_response(StatusCode::NOT_FOUND, message),
        Err(e) => {
            tracing::error!("Proxy search for '{}' failed: {}", query.term, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch movies")
        }
    }
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "instance": state.instance_name(),
        "provider": state.provider.name(),
        "version": crate::VERSION
    }))
}
