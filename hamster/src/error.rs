use snafu::Snafu;
use hamster_macro::error_like;

use crate::ReportType;
use crate::sink::BoxError;

/// Failures of the capture system itself.
///
/// None of these ever unwind into the code being observed; they come back
/// from the explicit entry points so the caller can decide what to do.
#[error_like]
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[error_like(code = 1)]
    #[snafu(display("sink rejected report of type {kind}"))]
    SinkRejected { kind: ReportType, source: BoxError },

    #[error_like(code = 2)]
    #[snafu(display("sink panicked: {message}"))]
    SinkPanicked { message: String },

    #[error_like(code = 3)]
    #[snafu(display("dropped a report nested {depth} deep in another report"))]
    Reentrant { depth: usize },

    #[snafu(display("failed to serialize report"))]
    Serialize { source: serde_json::Error },

    #[snafu(display("invalid configuration"))]
    Config { source: serde_json::Error },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
