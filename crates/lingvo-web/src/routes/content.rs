//! Site listing and multilingual info pages.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use lingvo_engine::{Catalog, ContentDocument, DEFAULT_LANGUAGE, INFO_FOLDER};
use serde::Deserialize;

use crate::{ApiError, AppState};

const DEFAULT_INFO_PAGE: &str = "about";

pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/api/content", get(list_content))
        .route("/api/content/info", get(info_page))
}

#[derive(Debug, Deserialize)]
struct ContentQuery {
    /// Comma separated, most preferred first.
    languages: Option<String>,
}

async fn list_content(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<Catalog>, ApiError> {
    let languages = parse_languages(query.languages.as_deref());
    let catalog = Catalog::build(state.repository(), &languages)?;
    Ok(Json(catalog))
}

#[derive(Debug, Deserialize)]
struct InfoQuery {
    lang: Option<String>,
    page: Option<String>,
}

async fn info_page(
    State(state): State<AppState>,
    Query(query): Query<InfoQuery>,
) -> Result<Json<ContentDocument>, ApiError> {
    let lang = non_empty(query.lang).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let page = non_empty(query.page).unwrap_or_else(|| DEFAULT_INFO_PAGE.to_string());
    if !is_page_name(&page) {
        return Err(ApiError::bad_request("Invalid page"));
    }

    state
        .repository()
        .get_by_language(&format!("{INFO_FOLDER}/{page}"), &[lang.as_str(), DEFAULT_LANGUAGE])?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Content not found"))
}

fn parse_languages(raw: Option<&str>) -> Vec<String> {
    let languages: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect();
    if languages.is_empty() {
        vec![DEFAULT_LANGUAGE.to_string()]
    } else {
        languages
    }
}

/// A page is one folder directly under the info folder.
fn is_page_name(page: &str) -> bool {
    !matches!(page, "." | "..") && !page.contains(['/', '\\', '\0'])
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
