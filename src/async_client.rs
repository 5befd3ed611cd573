//! Async wrapper around [`ReportEngine`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every report on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], since both the DuckDB round trip and the
//! PNG encoding block the calling thread.
//!
//! # Example
//!
//! ```no_run
//! use epichart::models::{ReportId, ReportRequest};
//! use epichart::AsyncReportEngine;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let engine = AsyncReportEngine::builder()
//!         .database("covid.duckdb")
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let report = engine
//!         .render_report(ReportRequest::form(ReportId::Aggregate))
//!         .await
//!         .unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ReportError, Result};
use crate::models::ReportRequest;
use crate::{ChartReport, EngineConfig, ReportEngine};

// ---------------------------------------------------------------------------
// AsyncReportEngineBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncReportEngine`].
#[derive(Default)]
pub struct AsyncReportEngineBuilder {
    config: Option<EngineConfig>,
    database: Option<PathBuf>,
    timeout: Option<Option<Duration>>,
}

impl AsyncReportEngineBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the DuckDB database file to read from.
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the per-query timeout; `None` or a zero duration waits indefinitely.
    pub fn query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the engine on the blocking pool so catalog construction never
    /// stalls the event loop.
    pub async fn build(self) -> Result<AsyncReportEngine> {
        tokio::task::spawn_blocking(move || {
            let mut builder = ReportEngine::builder();
            if let Some(config) = self.config {
                builder = builder.config(config);
            }
            if let Some(db) = self.database {
                builder = builder.database(db);
            }
            if let Some(timeout) = self.timeout {
                builder = builder.query_timeout(timeout);
            }
            Ok(AsyncReportEngine {
                inner: Arc::new(builder.build()?),
            })
        })
        .await
        .map_err(join_error)?
    }
}

// ---------------------------------------------------------------------------
// AsyncReportEngine
// ---------------------------------------------------------------------------

/// Async wrapper around [`ReportEngine`].
///
/// The engine holds only read-only state, so it is shared through an `Arc`
/// without locking and concurrent requests run in parallel.
#[derive(Clone)]
pub struct AsyncReportEngine {
    inner: Arc<ReportEngine>,
}

impl AsyncReportEngine {
    pub fn builder() -> AsyncReportEngineBuilder {
        AsyncReportEngineBuilder::default()
    }

    /// Wrap an already built engine.
    pub fn new(engine: ReportEngine) -> Self {
        Self {
            inner: Arc::new(engine),
        }
    }

    /// Run a sync engine operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReportEngine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let engine = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(join_error)?
    }

    /// Async [`ReportEngine::render_report`].
    pub async fn render_report(&self, request: ReportRequest) -> Result<Option<ChartReport>> {
        self.run(move |e| e.render_report(&request)).await
    }

    pub fn engine(&self) -> &ReportEngine {
        &self.inner
    }
}

fn join_error(e: tokio::task::JoinError) -> ReportError {
    ReportError::Io(std::io::Error::other(format!("task join error: {e}")))
}
