//! Application state management

use std::sync::Arc;

use crate::adapter::ResponseAdapter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    adapter: ResponseAdapter,
}

impl AppState {
    pub fn new(adapter: ResponseAdapter) -> Self {
        Self {
            inner: Arc::new(AppStateInner { adapter }),
        }
    }

    /// Get the response adapter
    pub fn adapter(&self) -> &ResponseAdapter {
        &self.inner.adapter
    }
}
