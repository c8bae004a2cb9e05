use std::path::PathBuf;
use std::sync::Arc;

use crate::error::LogError;
use crate::record::{LogRecord, Severity};
use crate::writer::LogWriter;

/// A subscriber to new log records.
///
/// Sinks are notified in subscription order, so every sink observes records
/// in the order they were published.
pub trait LogSink: Send + Sync {
    fn notify(&self, record: &LogRecord) -> Result<(), LogError>;
}

impl LogSink for LogWriter {
    fn notify(&self, record: &LogRecord) -> Result<(), LogError> {
        self.append(record)
    }
}

/// Front door of the facility: builds records and fans them out to an
/// ordered list of sinks. File persistence is just one subscriber among
/// possibly several.
#[derive(Default)]
pub struct Logger {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logger with a file writer on `dir` already subscribed.
    pub fn to_dir(dir: impl Into<PathBuf>) -> Result<Self, LogError> {
        let mut logger = Self::new();
        logger.subscribe(Arc::new(LogWriter::with_dir(dir)?));
        Ok(logger)
    }

    /// Register a sink. Sinks receive records in subscription order.
    pub fn subscribe(&mut self, sink: Arc<dyn LogSink>) {
        self.sinks.push(sink);
    }

    /// Notify every sink of `record`.
    ///
    /// A failing sink does not stop later sinks from observing the record;
    /// the first error is returned once all sinks have run, so a write
    /// failure is never silently dropped.
    pub fn publish(&self, record: &LogRecord) -> Result<(), LogError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.notify(record) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Log a message at Info severity.
    pub fn write(&self, message: &str, source: &str) -> Result<(), LogError> {
        self.write_with(message, source, Severity::Info)
    }

    /// Log a message at an explicit severity.
    pub fn write_with(
        &self,
        message: &str,
        source: &str,
        severity: Severity,
    ) -> Result<(), LogError> {
        self.publish(&LogRecord::new(message, source, severity))
    }
}
