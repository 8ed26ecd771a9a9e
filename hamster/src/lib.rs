//! # Hamster
//!
//! Client-side error capture that turns whatever an error carries into one
//! normalized, deduplicated [`Report`] and hands it to a sink you supply.
//!
//! ## Motivation
//!
//! Errors reach a reporter in very different shapes:
//! - **With a textual stack**: multi-line traces in one of several historical
//!   formats, mixing function names, URLs, line and column numbers
//! - **Without one**: only a message, perhaps a file and a line
//! - **Uncaught**: nothing but the scalars a global handler receives
//!
//! Hamster degrades gracefully across all three. It parses what it can, walks
//! the live call chain when there is nothing to parse, and always produces a
//! report.
//!
//! ## Features
//!
//! - 🔍 **Capability probing**: detects once whether native stack traces exist
//! - 🧩 **Stack parsing**: `at name (url:line:col)` and `name@url:line:col`
//!   lines become structured frames, anything else is kept raw
//! - 🪜 **Caller walking**: a bounded synthetic stack when no trace is available
//! - 🗂️ **File deduplication**: frames reference a per-report file table
//! - 🪝 **Panic hook**: uncaught panics are reported, and the previous hook
//!   keeps running
//! - 🛡️ **Contained sinks**: a failing sink never unwinds into your code
//!
//! ## Basic Usage
//!
//! ```rust
//! use hamster::{ErrorRecord, Hamster, MemorySink, ReportType};
//!
//! let sink = MemorySink::new();
//! let hamster = Hamster::builder().native_stack(true).sink(sink.clone()).build();
//!
//! let err = ErrorRecord::new("x is undefined")
//!     .with_name("TypeError")
//!     .with_stack(
//!         "TypeError: x is undefined\n\
//!          \x20   at render (http://app.example/ui.js:12:5)\n\
//!          \x20   at http://app.example/ui.js:40:1",
//!     );
//! hamster.report(&err).unwrap();
//!
//! let report = &sink.take()[0];
//! assert_eq!(report.kind, ReportType::ErrorStack);
//! assert_eq!(report.stack.len(), 3);
//! assert_eq!(report.files, ["http://app.example/ui.js"]);
//! ```
//!
//! ## Capturing
//!
//! Errors can be routed to a reporter from either side of a call:
//!
//! ```rust
//! use hamster::{ErrorRecord, Hamster, MemorySink, Reportable, ReportResultExt};
//!
//! let sink = MemorySink::new();
//! let hamster = Hamster::new(sink.clone());
//!
//! // wrap the function: failures are reported and swallowed
//! let parse = hamster.capture(|s: &str| s.parse::<u8>().map_err(|e| ErrorRecord::new(e.to_string())));
//! assert_eq!(parse("7"), Some(7));
//! assert_eq!(parse("seven"), None);
//!
//! // or report from the error itself and keep propagating
//! let result: Result<(), ErrorRecord> = Err(ErrorRecord::new("disk full"));
//! assert!(result.report_err(&hamster).is_err());
//! ErrorRecord::new("quota exceeded").report_to(&hamster).unwrap();
//!
//! assert_eq!(sink.len(), 3);
//! ```
//!
//! ## How It Works
//!
//! 1. **Strategy**: a [`Hamster`] decides once whether textual stacks are
//!    parsed ([`native_stack_supported`], or [`Config::native_stack`])
//!
//! 2. **Frames**: an error with a stack goes through [`parse_stack`]; one
//!    without is given a synthetic stack by [`walk_callers`]
//!
//! 3. **Report**: [`Report::build`] merges the frames with the error's own
//!    fields, back-fills the first frame and builds the file table
//!
//! 4. **Emission**: the report is handed to the [`Sink`] synchronously, under a
//!    reentrancy guard and with panics contained

extern crate self as hamster;

mod caller;
mod client;
mod config;
mod error;
mod error_like;
mod frame;
mod hook;
mod parse;
mod probe;
mod report;
mod sink;

// Re-export the proc macros so users only need to depend on this crate
pub use hamster_macro::{capture, error_like};

pub use caller::{
    BacktraceIntrospector, CallIntrospector, Invocation, MAX_CALLER_DEPTH, is_reporting_frame,
    walk_callers,
};
pub use client::{Builder, Hamster, ReportResultExt, Reportable};
pub use config::Config;
pub use error::{Error, Result};
pub use error_like::{ErrorLike, ErrorRecord};
pub use frame::{FileRef, Frame};
pub use hook::install_panic_hook;
pub use parse::{parse_line, parse_stack};
pub use probe::native_stack_supported;
pub use report::{Report, ReportType};
pub use sink::{BoxError, LogSink, MemorySink, NoopSink, Sink};
