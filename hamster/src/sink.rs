//! Destinations for finished reports.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::report::Report;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Receives every report a [`Hamster`](crate::Hamster) produces.
///
/// Errors and panics raised here are contained by the caller: they are
/// logged and returned from the reporting call, never propagated as unwinds.
///
/// Closures work as sinks:
///
/// ```
/// use hamster::{Hamster, ErrorRecord};
///
/// let hamster = Hamster::new(|report: hamster::Report| -> Result<(), hamster::BoxError> {
///     eprintln!("{}: {}", report.kind, report.message);
///     Ok(())
/// });
/// hamster.report(&ErrorRecord::new("boom")).unwrap();
/// ```
pub trait Sink: Send + Sync {
    fn on_error(&self, report: Report) -> Result<(), BoxError>;
}

impl<F> Sink for F
where
    F: Fn(Report) -> Result<(), BoxError> + Send + Sync,
{
    fn on_error(&self, report: Report) -> Result<(), BoxError> {
        self(report)
    }
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl Sink for NoopSink {
    fn on_error(&self, _report: Report) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Writes each report as one JSON line to the `log` facade at error level.
#[derive(Debug, Clone)]
pub struct LogSink {
    target: String,
}

impl LogSink {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new("hamster")
    }
}

impl Sink for LogSink {
    fn on_error(&self, report: Report) -> Result<(), BoxError> {
        let json = report.to_json()?;
        log::error!(target: self.target.as_str(), "{json}");
        Ok(())
    }
}

/// Keeps reports in memory until taken.
///
/// Clones share the same storage, so one clone can be handed to a
/// [`Hamster`](crate::Hamster) while another reads the reports back.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything collected so far.
    pub fn take(&self) -> Vec<Report> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Report>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for MemorySink {
    fn on_error(&self, report: Report) -> Result<(), BoxError> {
        self.lock().push(report);
        Ok(())
    }
}
