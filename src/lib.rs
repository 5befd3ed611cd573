//! Epidemiological report charts.
//!
//! Answers four fixed analytical questions about a COVID-19 dataset stored in
//! DuckDB and renders each answer as a PNG chart ready to embed in a web page:
//!
//! request parameters → [`resolver`] (validation, defaults) → [`queries`]
//! (bound execution through a [`connection::Store`]) → rows → [`series`] →
//! [`render`] → base64 image.
//!
//! # Quick start
//!
//! ```no_run
//! use epichart::models::{RawParams, ReportId, ReportRequest};
//! use epichart::ReportEngine;
//!
//! let engine = ReportEngine::builder()
//!     .database("covid.duckdb")
//!     .build()
//!     .unwrap();
//!
//! let mut raw = RawParams::new();
//! raw.insert("locations[]", "Africa").insert("locations[]", "Europe");
//! let report = engine
//!     .render_report(&ReportRequest::new(ReportId::Ranking, raw))
//!     .unwrap()
//!     .expect("parameters were given");
//! println!("<img src=\"{}\">", report.data_uri());
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod connection;
pub mod dataset;
pub mod error;
pub mod models;
pub mod queries;
pub mod render;
pub mod resolver;
pub mod series;
pub mod sql_builder;

#[cfg(feature = "async")]
pub use async_client::AsyncReportEngine;
pub use config::{EngineConfig, RenderConfig, StoreConfig};
pub use connection::{ConnectionProvider, Store};
pub use dataset::Dataset;
pub use error::{ReportError, Result};
pub use queries::QueryCatalog;
pub use render::{ChartKind, ChartLabels, ChartRenderer};
pub use resolver::ReportResolver;
pub use sql_builder::SqlBuilder;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use models::{ChartSeries, ParameterSet, RenderedImage, ReportId, ReportRequest};

// ---------------------------------------------------------------------------
// ReportEngineBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`ReportEngine`].
///
/// Use [`ReportEngine::builder()`] to obtain a builder, adjust the
/// configuration, and call [`build()`](ReportEngineBuilder::build).
#[derive(Default)]
pub struct ReportEngineBuilder {
    config: EngineConfig,
}

impl ReportEngineBuilder {
    /// Replace the whole configuration, e.g. one loaded with
    /// [`EngineConfig::from_file`].
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the DuckDB database file to read from.
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.store.database = path.as_ref().to_path_buf();
        self
    }

    /// Set the dataset table name. Defaults to `covid_data`.
    pub fn table(mut self, table: &str) -> Self {
        self.config.store.table = table.to_string();
        self
    }

    /// Set the per-query timeout; `None` or a zero duration waits
    /// indefinitely. Fractions of a second round up.
    ///
    /// Defaults to 30 seconds.
    pub fn query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.store.query_timeout_secs = timeout
            .filter(|t| !t.is_zero())
            .map(|t| t.as_secs() + u64::from(t.subsec_nanos() > 0));
        self
    }

    /// Set the locations a ranking request may choose from.
    pub fn locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// Build the engine over DuckDB. No connection is opened until the first
    /// request.
    pub fn build(self) -> Result<ReportEngine> {
        let store = ConnectionProvider::new(self.config.store.clone());
        ReportEngine::with_store(store, self.config)
    }
}

// ---------------------------------------------------------------------------
// ReportEngine
// ---------------------------------------------------------------------------

/// The query-to-visualization pipeline.
///
/// Holds only read-only state (configuration, the query catalog and the
/// store handle), so one engine serves any number of independent requests.
pub struct ReportEngine<S: Store = ConnectionProvider> {
    store: S,
    catalog: QueryCatalog,
    renderer: ChartRenderer,
    config: EngineConfig,
}

impl ReportEngine {
    pub fn builder() -> ReportEngineBuilder {
        ReportEngineBuilder::default()
    }
}

impl<S: Store> ReportEngine<S> {
    /// Build an engine over any [`Store`], e.g. a fake one in tests.
    pub fn with_store(store: S, config: EngineConfig) -> Result<Self> {
        let catalog = QueryCatalog::new(&config.store.table)?;
        Ok(Self {
            store,
            catalog,
            renderer: ChartRenderer::new(config.render),
            config,
        })
    }

    pub fn resolver(&self) -> ReportResolver<'_, S> {
        ReportResolver::new(&self.store, &self.catalog, &self.config.locations)
    }

    pub fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the whole pipeline for one request.
    ///
    /// Returns `Ok(None)` when the request carries no parameters for a report
    /// that takes input: the caller should show the form.
    pub fn render_report(&self, request: &ReportRequest) -> Result<Option<ChartReport>> {
        if request.wants_form() {
            return Ok(None);
        }

        let resolver = self.resolver();
        let params = resolver.parameters(request)?;
        let rows = resolver.fetch(&params)?;
        let series = series::transform(request.report_id, &rows)?;
        let labels = chart_labels(&params);
        let kind = ChartKind::for_report(request.report_id);
        let image = self.renderer.render(kind, &series, &labels)?;

        info!(
            report = %request.report_id,
            rows = rows.len(),
            points = series.len(),
            bytes = image.bytes().len(),
            "report rendered"
        );

        let total = match &series {
            ChartSeries::Ratio(r) => Some(r.total()),
            _ => None,
        };
        Ok(Some(ChartReport {
            report: request.report_id,
            parameters: params,
            labels,
            image_base64: image.to_base64(),
            total,
        }))
    }

    /// Render a series directly, bypassing the store.
    pub fn render_series(
        &self,
        kind: ChartKind,
        series: &ChartSeries,
        labels: &ChartLabels,
    ) -> Result<RenderedImage> {
        self.renderer.render(kind, series, labels)
    }
}

impl<S: Store> fmt::Display for ReportEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReportEngine(database={}, table={}, locations=[{}])",
            self.config.store.database.display(),
            self.catalog.table(),
            self.config.locations.join(", ")
        )
    }
}

// ---------------------------------------------------------------------------
// ChartReport
// ---------------------------------------------------------------------------

/// A rendered report, ready for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ChartReport {
    pub report: ReportId,
    pub parameters: ParameterSet,
    pub labels: ChartLabels,
    /// Base64 PNG.
    pub image_base64: String,
    /// The whole the ratio slices add up to (total population).
    pub total: Option<f64>,
}

impl ChartReport {
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.image_base64)
    }
}

/// Title and axis captions for a report, filled in from its parameters.
pub fn chart_labels(params: &ParameterSet) -> ChartLabels {
    match params {
        ParameterSet::Ranking(p) => ChartLabels::new(
            format!("{} by location up to {}", p.metric.label(), p.as_of_date),
            "Location",
            p.metric.label(),
        ),
        ParameterSet::TimeSeries(p) => ChartLabels::new(
            format!(
                "{} in {} between {} and {}",
                p.metric.label(),
                p.location,
                p.start_date,
                p.end_date
            ),
            "Date",
            p.metric.label(),
        )
        .with_series(p.metric.label()),
        ParameterSet::Ratio(p) => ChartLabels::new(
            format!("Fully vaccinated population in {} ({})", p.continent, p.snapshot_date),
            "",
            "",
        ),
        ParameterSet::Aggregate => ChartLabels::new(
            "Life expectancy vs. hospital beds per thousand people",
            "Average life expectancy",
            "Hospital beds per thousand",
        ),
    }
}
