//! Client-side navigation seam.

use std::sync::Mutex;

/// Moves the UI to another route without a reload.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Logs the requested route. Used by the command-line front end, which has no
/// router of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(route, "navigate");
    }
}

/// Keeps every requested route, in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.routes().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}
