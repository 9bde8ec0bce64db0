//! A single document, segmented and rendered for display.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use lingvo_engine::{Meta, RenderedBlock, content::render_blocks};
use serde::Serialize;

use crate::{ApiError, AppState};

pub fn document_routes() -> Router<AppState> {
    Router::new().route("/api/{folder}/{alias}", get(document))
}

#[derive(Debug, Serialize)]
struct DocumentPayload {
    meta: Meta,
    /// One list of blocks per `---` separated section.
    sections: Vec<Vec<RenderedBlock>>,
}

async fn document(
    State(state): State<AppState>,
    Path((folder, alias)): Path<(String, String)>,
) -> Result<Json<DocumentPayload>, ApiError> {
    let doc = state
        .repository()
        .get_by_alias(&folder, &alias)?
        .ok_or_else(|| ApiError::not_found(format!("No document {alias:?} in {folder:?}")))?;

    log::debug!("rendering {folder}/{alias}");
    let sections = state
        .segmenter_for(&folder)
        .segment_sections(&doc.body)
        .iter()
        .map(|blocks| render_blocks(blocks))
        .collect();

    Ok(Json(DocumentPayload {
        meta: doc.meta,
        sections,
    }))
}
