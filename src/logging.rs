//! Pluggable logging.
//!
//! Components never reach for a process-wide logger. Each one receives a
//! [`SharedLogger`] at construction time (through
//! [`RepositoryClientConfig`](crate::repository::RepositoryClientConfig)) and the
//! default is [`NoopLogger`].
//!
//! [`TracingLogger`] forwards every message to the `tracing` ecosystem so that the
//! application's subscriber decides where it ends up:
//!
//! ```
//! use graphdb_http::logging::{Logger, LogLevel, TracingLogger};
//!
//! let logger = TracingLogger::new();
//! logger.log(LogLevel::Info, "switching endpoint");
//! ```

use std::fmt;
use std::sync::Arc;

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Very verbose diagnostics
    Trace,
    /// Request level diagnostics
    Debug,
    /// Lifecycle events (transactions, failover recovery)
    Info,
    /// Recoverable failures
    Warn,
    /// Failures surfaced to the caller
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Sink for log messages emitted by the client components.
pub trait Logger: fmt::Debug + Send + Sync {
    /// Record a message at the given level.
    fn log(&self, level: LogLevel, message: &str);
}

/// Logger handle shared between components.
pub type SharedLogger = Arc<dyn Logger>;

/// Logger that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// Logger that emits `tracing` events under the `graphdb_http` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl TracingLogger {
    /// Create a new tracing logger.
    pub fn new() -> Self {
        TracingLogger
    }

    /// Create a shared handle, ready for the client configuration.
    pub fn shared() -> SharedLogger {
        Arc::new(TracingLogger)
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "graphdb_http", "{}", message),
            LogLevel::Debug => tracing::debug!(target: "graphdb_http", "{}", message),
            LogLevel::Info => tracing::info!(target: "graphdb_http", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "graphdb_http", "{}", message),
            LogLevel::Error => tracing::error!(target: "graphdb_http", "{}", message),
        }
    }
}

/// The default logger handle.
pub fn noop_logger() -> SharedLogger {
    Arc::new(NoopLogger)
}
