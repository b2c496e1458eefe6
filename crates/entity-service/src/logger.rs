//! Operation-level diagnostics for an [`EntityService`](crate::EntityService).
//!
//! The logger is optional per service. A service without one is silent; its
//! behaviour is otherwise identical.

use tracing::Level;

/// Leveled diagnostic sink.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, entity_type: &str, message: &str);

    fn debug(&self, entity_type: &str, message: &str) {
        self.log(Level::DEBUG, entity_type, message);
    }

    fn info(&self, entity_type: &str, message: &str) {
        self.log(Level::INFO, entity_type, message);
    }

    fn warn(&self, entity_type: &str, message: &str) {
        self.log(Level::WARN, entity_type, message);
    }

    fn error(&self, entity_type: &str, message: &str) {
        self.log(Level::ERROR, entity_type, message);
    }
}

/// [`Logger`] that forwards to the `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, entity_type: &str, message: &str) {
        // tracing's macros need the level at compile time
        match level {
            Level::ERROR => tracing::error!(entity_type, "{message}"),
            Level::WARN => tracing::warn!(entity_type, "{message}"),
            Level::INFO => tracing::info!(entity_type, "{message}"),
            Level::DEBUG => tracing::debug!(entity_type, "{message}"),
            _ => tracing::trace!(entity_type, "{message}"),
        }
    }
}
