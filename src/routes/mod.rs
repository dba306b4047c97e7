//! Route modules for the pdf2web server

pub mod docs;
pub mod files;
pub mod health;

use axum::{
    response::{IntoResponse, Response},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::StorageError;
use crate::response::BufferedResponse;
use crate::state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/health", health::router())
        .nest("/files", files::router())
        .nest("/docs", docs::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Turn the outcome of an adapter call into the response sent on the wire.
///
/// On failure the buffered payload is dropped and the client gets the
/// status and body of the error kind, including when the adapter could not
/// report it because the payload had already started.
fn finish(response: BufferedResponse, result: Result<u64, StorageError>) -> Response {
    match result {
        Ok(_) => response.into_response(),
        Err(err) => {
            if response.status().is_success() {
                tracing::warn!(error = %err, "Discarding partial response");
            }
            err.kind().into_response()
        }
    }
}
