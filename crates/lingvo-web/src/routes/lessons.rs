use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use lingvo_engine::{LESSONS_FOLDER, Navigation};
use serde::Deserialize;

use crate::{ApiError, AppState};

pub fn lesson_routes() -> Router<AppState> {
    Router::new().route("/api/lessons/navigation", get(navigation))
}

#[derive(Debug, Deserialize)]
struct NavigationQuery {
    current: Option<String>,
}

async fn navigation(
    State(state): State<AppState>,
    Query(query): Query<NavigationQuery>,
) -> Result<Json<Navigation>, ApiError> {
    let current = query
        .current
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("Current lesson alias is required"))?;

    let navigation = state.repository().next_and_prev(LESSONS_FOLDER, &current)?;
    Ok(Json(navigation))
}
