//! Converted document routes
//!
//! Serves page assets of converted documents.

use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
    Router,
};

use crate::response::BufferedResponse;
use crate::state::AppState;
use crate::storage::Doc;

use super::finish;

/// Create the documents router
pub fn router() -> Router<AppState> {
    Router::new().route("/:doc_id/pages/:page/background", get(page_background))
}

/// Send the background image of a page (1-based)
async fn page_background(
    State(state): State<AppState>,
    Path((doc_id, page)): Path<(String, u32)>,
) -> Response {
    let doc = Doc::new(doc_id);
    let mut response = BufferedResponse::new();
    let result = state
        .adapter()
        .doc_page_background_to_response(&doc, page, &mut response)
        .await;
    finish(response, result)
}
