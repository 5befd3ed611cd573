//! Per-request DuckDB connections and positional query execution.
//!
//! A [`ConnectionProvider`] holds the store configuration and opens a fresh
//! read-only connection for each request. The connection is closed when the
//! request is done with it, on every exit path: explicitly through
//! [`Connection::release`], or by `Drop` on early return and unwinding.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate};
use duckdb::{types::ValueRef, AccessMode, Config, Connection as DuckDbConnection, InterruptHandle};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{ReportError, Result};
use crate::models::ResultRow;
use crate::queries::BoundQuery;

/// Anything that can execute a bound query and hand back rows.
///
/// The report pipeline only talks to the database through this trait, so a
/// fake store can stand in for DuckDB.
pub trait Store {
    fn fetch(&self, query: &BoundQuery) -> Result<Vec<ResultRow>>;
}

impl<S: Store + ?Sized> Store for &S {
    fn fetch(&self, query: &BoundQuery) -> Result<Vec<ResultRow>> {
        (**self).fetch(query)
    }
}

// ---------------------------------------------------------------------------
// ConnectionProvider
// ---------------------------------------------------------------------------

/// Opens one connection per request from fixed configuration. No pooling.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    config: StoreConfig,
    open: Arc<AtomicUsize>,
}

impl ConnectionProvider {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            open: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Connections acquired from this provider (or its clones) that are not
    /// yet closed.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Open a new read-only connection to the configured database file.
    pub fn acquire(&self) -> Result<Connection> {
        let flags = Config::default().access_mode(AccessMode::ReadOnly)?;
        let conn = DuckDbConnection::open_with_flags(&self.config.database, flags)?;
        self.open.fetch_add(1, Ordering::SeqCst);
        debug!(database = %self.config.database.display(), "connection opened");
        Ok(Connection {
            conn: Some(conn),
            open: Arc::clone(&self.open),
        })
    }

    /// Run `f` with a freshly acquired connection, releasing it afterwards
    /// whether `f` succeeds or fails.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.acquire()?;
        let out = f(&conn);
        conn.release();
        out
    }

    /// Execute on a worker thread and give up after `timeout`.
    ///
    /// On expiry the running query is interrupted; a worker that has not
    /// started its query yet never runs it. The worker owns its connection
    /// and releases it once DuckDB returns.
    fn fetch_with_timeout(
        &self,
        query: &BoundQuery,
        timeout: std::time::Duration,
    ) -> Result<Vec<ResultRow>> {
        let provider = self.clone();
        let query = query.clone();
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(Cancellation::default());
        let worker_cancel = Arc::clone(&cancel);

        thread::Builder::new()
            .name("epichart-query".to_string())
            .spawn(move || {
                let result = provider.with_connection(|conn| {
                    if !worker_cancel.register(conn.interrupt_handle()?) {
                        debug!("caller gave up before the query started");
                        return Err(ReportError::StoreTimeout(timeout));
                    }
                    conn.query(&query)
                });
                if let Err(e) = &result {
                    debug!(error = %e, "query worker finished with an error");
                }
                // The receiver is gone if the caller timed out.
                let _ = tx.send(result);
            })?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(?timeout, "query timed out");
                cancel.abandon();
                Err(ReportError::StoreTimeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ReportError::Io(std::io::Error::other(
                "query worker exited without a result",
            ))),
        }
    }
}

/// Hand-off between a timed-out caller and its query worker.
///
/// Whichever side comes second acts: `abandon` interrupts a registered
/// query, and `register` refuses once the caller has abandoned.
#[derive(Default)]
struct Cancellation {
    state: Mutex<CancelState>,
}

#[derive(Default)]
struct CancelState {
    abandoned: bool,
    handle: Option<Arc<InterruptHandle>>,
}

impl Cancellation {
    /// Record the worker's interrupt handle. `false` means the caller has
    /// already given up and the query must not run.
    fn register(&self, handle: Arc<InterruptHandle>) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.abandoned {
            return false;
        }
        state.handle = Some(handle);
        true
    }

    /// Give up on the query, interrupting it if it has started.
    fn abandon(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.abandoned = true;
        if let Some(handle) = state.handle.take() {
            handle.interrupt();
        }
    }

    #[cfg(test)]
    fn is_abandoned(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .abandoned
    }
}

impl Store for ConnectionProvider {
    fn fetch(&self, query: &BoundQuery) -> Result<Vec<ResultRow>> {
        match self.config.query_timeout() {
            Some(timeout) => self.fetch_with_timeout(query, timeout),
            None => self.with_connection(|conn| conn.query(query)),
        }
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// A single open DuckDB connection, scoped to one request.
pub struct Connection {
    conn: Option<DuckDbConnection>,
    open: Arc<AtomicUsize>,
}

impl Connection {
    /// Execute with positional binding and return rows in select order.
    pub fn query(&self, query: &BoundQuery) -> Result<Vec<ResultRow>> {
        let conn = self.raw()?;
        debug!(sql = %query.sql, params = query.values.len(), "executing");

        let mut stmt = conn.prepare(&query.sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = query
            .values
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run.
        let column_names: Vec<String> = rows
            .as_ref()
            .map(|s| {
                s.column_names()
                    .into_iter()
                    .map(|c| c.to_string())
                    .collect()
            })
            .unwrap_or_default();

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = ResultRow::new();
            for (i, name) in column_names.iter().enumerate() {
                record.push(name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(record);
        }

        Ok(out)
    }

    /// Close the connection. Close failures are logged, not returned: the
    /// request outcome is already decided by then.
    pub fn release(mut self) {
        self.close();
    }

    /// A handle that cancels whatever this connection is running.
    pub fn interrupt_handle(&self) -> Result<Arc<InterruptHandle>> {
        Ok(self.raw()?.interrupt_handle())
    }

    fn raw(&self) -> Result<&DuckDbConnection> {
        self.conn.as_ref().ok_or_else(|| {
            ReportError::Io(std::io::Error::other("connection already released"))
        })
    }

    fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.open.fetch_sub(1, Ordering::SeqCst);
            match conn.close() {
                Ok(()) => debug!("connection closed"),
                Err((_, e)) => warn!(error = %e, "failed to close connection"),
            }
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Convert a DuckDB `ValueRef` to a JSON scalar.
fn convert_value_ref(val: ValueRef<'_>) -> Value {
    match val {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Number(n.into()),
        ValueRef::SmallInt(n) => Value::Number(n.into()),
        ValueRef::Int(n) => Value::Number(n.into()),
        ValueRef::BigInt(n) => Value::Number(n.into()),
        ValueRef::UTinyInt(n) => Value::Number(n.into()),
        ValueRef::USmallInt(n) => Value::Number(n.into()),
        ValueRef::UInt(n) => Value::Number(n.into()),
        ValueRef::UBigInt(n) => Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // Counts never need 128 bits; fall back to a lossy float.
            if let Ok(i) = i64::try_from(n) {
                Value::Number(i.into())
            } else {
                float_value(n as f64)
            }
        }
        ValueRef::Float(f) => float_value(f as f64),
        ValueRef::Double(f) => float_value(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).to_string()),
        ValueRef::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(float_value)
            .unwrap_or(Value::Null),
        ValueRef::Date32(days) => epoch_date(days)
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        // Timestamps are reported by day, like DATE columns.
        ValueRef::Timestamp(unit, t) => DateTime::from_timestamp_micros(unit.to_micros(t))
            .map(|dt| Value::String(dt.date_naive().format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn float_value(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn epoch_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(ChronoDuration::days(days as i64))
}
