//! HTTP request handlers

use super::state::AppState;
use crate::providers::ProviderKind;
use crate::routing::Strategy;
use crate::search::SearchQuery;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

/// Default result count per batch query
const BATCH_DEFAULT_RESULTS: usize = 3;

/// Body of the search endpoints
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: Option<usize>,
    pub search_strategy: Option<String>,
}

/// Body of the batch endpoint
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub queries: Vec<String>,
    pub max_results_per_query: Option<usize>,
}

/// Client error rendered as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Search using the requested (or configured) strategy
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    let strategy = request
        .search_strategy
        .as_deref()
        .map(str::parse::<Strategy>)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    run_search(&state, request, strategy).await
}

/// Search with Tavily only
pub async fn search_tavily(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    run_search(&state, request, Some(Strategy::TavilyOnly)).await
}

/// Search with SerpAPI only
pub async fn search_serp(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    run_search(&state, request, Some(Strategy::SerpOnly)).await
}

async fn run_search(
    state: &AppState,
    request: SearchRequest,
    strategy: Option<Strategy>,
) -> Result<Response, ApiError> {
    let query = build_query(state, &request.query, request.max_results, strategy)?;
    info!(query = %query.text(), strategy = %query.strategy(), "API search");

    let response = state.search.execute(&query).await;
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(response)).into_response())
}

/// Run several queries concurrently
pub async fn search_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Response, ApiError> {
    let limit = state.settings.server.batch_limit;
    if request.queries.len() > limit {
        return Err(ApiError::bad_request(format!(
            "Maximum {} queries per batch",
            limit
        )));
    }

    let max_results = request
        .max_results_per_query
        .unwrap_or(BATCH_DEFAULT_RESULTS);
    let queries = request
        .queries
        .iter()
        .filter(|q| !q.trim().is_empty())
        .map(|q| build_query(&state, q, Some(max_results), None))
        .collect::<Result<Vec<_>, _>>()?;

    info!(queries = queries.len(), "API batch search");
    let results = state.search.execute_batch(&queries).await;

    Ok(Json(json!({
        "success": true,
        "total_queries": results.len(),
        "results": results,
    }))
    .into_response())
}

fn build_query(
    state: &AppState,
    text: &str,
    max_results: Option<usize>,
    strategy: Option<Strategy>,
) -> Result<SearchQuery, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::bad_request("Query cannot be empty"));
    }

    let bound = state.settings.server.max_results;
    let max_results = match max_results {
        Some(n) if n == 0 || n > bound => {
            return Err(ApiError::bad_request(format!(
                "max_results must be between 1 and {}",
                bound
            )));
        }
        Some(n) => n,
        // The configured default may exceed what the API allows
        None => state.search.defaults().max_results.min(bound),
    };

    state.search.query(text, Some(max_results), strategy).map_err(|e| {
        warn!(error = %e, "rejected API query");
        ApiError::bad_request(e.to_string())
    })
}

/// API information
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": state.instance_name(),
        "version": crate::VERSION,
        "health": "/health",
        "status": "/status",
    }))
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": state.instance_name(),
        "version": crate::VERSION,
    }))
}

/// Configuration and provider statistics
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let providers: serde_json::Map<_, _> = ProviderKind::all()
        .into_iter()
        .map(|kind| {
            let configured = if state.is_configured(kind) {
                "configured"
            } else {
                "not configured"
            };
            (kind.to_string(), json!(configured))
        })
        .collect();

    let defaults = state.search.defaults();
    Json(json!({
        "api_status": "running",
        "search_providers": providers,
        "search_strategy": defaults.strategy,
        "max_search_results": defaults.max_results,
        "search_timeout": defaults.timeout,
        "metrics": {
            "total_searches": state.metrics.total_searches(),
            "failed_searches": state.metrics.failed_searches(),
            "providers": state.metrics.snapshot(),
        },
        "endpoints": {
            "intelligent_search": "/search",
            "tavily_only": "/search/tavily",
            "serp_only": "/search/serp",
            "batch_search": "/search/batch",
            "health": "/health",
        },
    }))
}
