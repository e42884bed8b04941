//! HTTP request handlers.

use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use folio_core::PaginationConfig;
use serde::Serialize;
use serde_json::json;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// CDN caching for project data: fresh for an hour, stale for six more.
pub const CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=21600";

type Params = Query<HashMap<String, String>>;

/// JSON body with the shared `Cache-Control` header.
fn cached_json<T: Serialize>(body: T) -> Response {
    let mut response = Json(body).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    response
}

fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// `GET /api/projects/initial`
pub async fn handle_initial_projects(State(state): State<Arc<AppState>>) -> Response {
    cached_json(state.projects.get_initial_projects().await)
}

/// `GET /api/projects?offset=N` or `GET /api/projects?page=N`.
///
/// `offset` wins when both are given. With neither, the batch after the
/// first page is returned.
pub async fn handle_projects(
    State(state): State<Arc<AppState>>,
    Query(params): Params,
) -> Response {
    if let Some(page) = params.get("page").filter(|_| !params.contains_key("offset")) {
        let page = parse_page(page);
        debug!("Projects page {} requested", page);
        return cached_json(state.projects.get_projects_page(page).await);
    }

    let offset = match params.get("offset") {
        Some(raw) => match parse_offset(raw) {
            Some(offset) => offset,
            None => return error_json(StatusCode::BAD_REQUEST, "Invalid offset parameter"),
        },
        None => PaginationConfig::PROJECTS_PAGE_SIZE,
    };
    debug!("Projects batch at offset {} requested", offset);
    cached_json(state.projects.get_projects_batch(offset).await)
}

/// `GET /api/projects/readme?repo=NAME[&full=true]`
pub async fn handle_readme(
    State(state): State<Arc<AppState>>,
    Query(params): Params,
) -> Response {
    let repo_name = match params.get("repo").map(|r| r.trim()).filter(|r| !r.is_empty()) {
        Some(repo) => repo.to_string(),
        None => return error_json(StatusCode::BAD_REQUEST, "Missing repo parameter"),
    };

    if params.get("full").is_some_and(|v| is_truthy(v)) {
        let readme = state.projects.fetch_repo_readme_full(&repo_name).await;
        return cached_json(json!({ "repoName": repo_name, "readme": readme }));
    }

    let preview = state.projects.fetch_repo_readme_preview(&repo_name).await;
    cached_json(json!({ "repoName": repo_name, "preview": preview }))
}

/// Non-negative integer offset; anything else is rejected.
fn parse_offset(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

/// Page number, falling back to the first page when unparseable.
fn parse_page(raw: &str) -> usize {
    raw.trim().parse::<usize>().unwrap_or(1)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "yes")
}

/// Convert a handler panic into a JSON 500.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", detail);

    error_json(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
