//! Application state

use std::sync::Arc;
use std::time::Duration;

use todo_core::{Context, TaskHandler};
use tokio_util::sync::CancellationToken;

use crate::app::App;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    app: App,
    shutdown: CancellationToken,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(app: App, shutdown: CancellationToken, request_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                app,
                shutdown,
                request_timeout,
            }),
        }
    }

    pub fn app(&self) -> &App {
        &self.inner.app
    }

    /// Get reference to the task handler
    pub fn handler(&self) -> &TaskHandler {
        self.inner.app.handler()
    }

    /// Context for one request: cancelled on server shutdown, bounded by the
    /// request timeout
    pub fn request_context(&self) -> Context {
        Context::with_token(self.inner.shutdown.child_token()).with_timeout(self.inner.request_timeout)
    }
}
