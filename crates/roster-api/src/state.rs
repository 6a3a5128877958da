//! Shared application state for the API server.

use std::sync::Arc;

use roster_db::Repository;
use roster_stats::StatsOptions;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// repository is the only path to stored data.
#[derive(Clone)]
pub struct AppState {
    /// Data access port.
    pub repo: Arc<dyn Repository>,
    /// Options passed to every statistics computation.
    pub stats: StatsOptions,
}

impl AppState {
    /// Create a new application state with default statistics options.
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            stats: StatsOptions::default(),
        }
    }

    /// Replace the statistics options.
    #[must_use]
    pub fn with_stats_options(mut self, options: StatsOptions) -> Self {
        self.stats = options;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
