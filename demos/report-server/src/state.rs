use epichart::AsyncReportEngine;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// The report engine. Each request opens and releases its own read-only
    /// connection, so no locking is needed here.
    pub engine: AsyncReportEngine,
}
