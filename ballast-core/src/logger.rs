//! Pluggable logging sinks.

use std::error::Error;

/// A logging sink used by the runtime and by `ballast::interceptors::LoggingInterceptor`.
///
/// Implementations must be cheap to call; the coordinator logs from its hot
/// paths.
pub trait BallastLogger: Send + Sync + 'static {
    /// Verbose diagnostic output.
    fn debug(&self, message: &str);

    /// Normal operational output.
    fn info(&self, message: &str);

    /// An error worth surfacing.
    fn error(&self, error: &(dyn Error + 'static));
}

/// A logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl BallastLogger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn error(&self, _error: &(dyn Error + 'static)) {}
}

/// A logger that writes to stdout, and errors to stderr.
#[derive(Debug, Clone)]
pub struct PrintlnLogger {
    tag: String,
}

impl PrintlnLogger {
    /// Create a logger that prefixes each line with `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl BallastLogger for PrintlnLogger {
    fn debug(&self, message: &str) {
        println!("[{}] {}", self.tag, message);
    }

    fn info(&self, message: &str) {
        println!("[{}] {}", self.tag, message);
    }

    fn error(&self, error: &(dyn Error + 'static)) {
        eprintln!("[{}] {}", self.tag, error);
        let mut source = error.source();
        while let Some(cause) = source {
            eprintln!("[{}]   caused by: {}", self.tag, cause);
            source = cause.source();
        }
    }
}

/// A logger that forwards to the `tracing` crate.
///
/// Every record carries a `view_model` field so output from several
/// ViewModels can be told apart.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    view_model: String,
}

impl TracingLogger {
    /// Create a logger for the ViewModel named `view_model`.
    pub fn new(view_model: impl Into<String>) -> Self {
        Self {
            view_model: view_model.into(),
        }
    }
}

impl BallastLogger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(view_model = %self.view_model, "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(view_model = %self.view_model, "{message}");
    }

    fn error(&self, error: &(dyn Error + 'static)) {
        tracing::error!(view_model = %self.view_model, error = %error, "ViewModel error");
    }
}
