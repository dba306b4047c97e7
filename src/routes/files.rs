//! File download routes
//!
//! Serves original PDF files from storage.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::response::BufferedResponse;
use crate::state::AppState;
use crate::storage::File;

use super::finish;

/// Query parameters for file downloads
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// Ask the client to save the file instead of displaying it (default: true)
    #[serde(default = "default_attachment")]
    pub attachment: bool,
}

fn default_attachment() -> bool {
    true
}

/// Create the files router
pub fn router() -> Router<AppState> {
    Router::new().route("/:file_id", get(download_file))
}

/// Send a stored file
async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let file = File::new(file_id);
    let mut response = BufferedResponse::new();
    let result = state
        .adapter()
        .file_to_response(&file, &mut response, query.attachment)
        .await;
    finish(response, result)
}
