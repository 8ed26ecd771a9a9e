//! The reporting entry points.

use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use snafu::ResultExt;

use crate::caller::{BacktraceIntrospector, CallIntrospector, is_reporting_frame, walk_callers};
use crate::config::Config;
use crate::error::{ReentrantSnafu, Result, SinkPanickedSnafu, SinkRejectedSnafu};
use crate::error_like::{ErrorLike, ErrorRecord, panic_message};
use crate::frame::Frame;
use crate::hook::CaptureScope;
use crate::parse::parse_stack;
use crate::probe::native_stack_supported;
use crate::report::{Report, ReportType};
use crate::sink::{NoopSink, Sink};

thread_local! {
    /// Sink invocations currently running on this thread.
    static NESTING: Cell<usize> = const { Cell::new(0) };
}

/// Captures errors and hands normalized [`Report`]s to a sink.
///
/// Every entry point is synchronous: the report reaches the sink before the
/// call returns.
///
/// ```
/// use hamster::{ErrorRecord, Hamster, MemorySink, ReportType};
///
/// let sink = MemorySink::new();
/// let hamster = Hamster::builder().native_stack(true).sink(sink.clone()).build();
///
/// let err = ErrorRecord::new("x is undefined")
///     .with_stack("TypeError: x is undefined\n    at f (http://x.com/a.js:3:7)");
/// hamster.report(&err).unwrap();
///
/// let report = &sink.take()[0];
/// assert_eq!(report.kind, ReportType::ErrorStack);
/// assert_eq!(report.files, ["http://x.com/a.js"]);
/// ```
pub struct Hamster {
    sink: Box<dyn Sink>,
    native_stack: bool,
    caller_depth: usize,
    max_nested_reports: usize,
    introspector: Option<Box<dyn CallIntrospector>>,
}

impl fmt::Debug for Hamster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hamster")
            .field("native_stack", &self.native_stack)
            .field("caller_depth", &self.caller_depth)
            .field("max_nested_reports", &self.max_nested_reports)
            .field("introspection", &self.introspector.is_some())
            .finish_non_exhaustive()
    }
}

impl Hamster {
    /// A reporter with the default configuration.
    pub fn new(sink: impl Sink + 'static) -> Self {
        Self::builder().sink(sink).build()
    }

    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Whether textual stacks are parsed. When false every report walks the
    /// caller chain instead.
    pub fn native_stack(&self) -> bool {
        self.native_stack
    }

    /// Reports a caught error.
    ///
    /// The stack is parsed from the error's textual stack when there is one,
    /// and walked from the live call chain otherwise. A failing sink comes
    /// back as `Err`; it never unwinds through here.
    pub fn report(&self, err: &dyn ErrorLike) -> Result<()> {
        let (kind, frames) = self.frames_for(err);
        self.emit(Report::build(kind, err, frames))
    }

    /// Entry point for errors nobody caught.
    ///
    /// With an error object this is the same as [`report`](Self::report).
    /// Without one, a `window` report is built from the scalars alone. A line
    /// or column of `0` means unknown.
    pub fn on_window_error(
        &self,
        message: &str,
        url: Option<&str>,
        line: Option<u32>,
        column: Option<u32>,
        error: Option<&dyn ErrorLike>,
    ) -> Result<()> {
        if let Some(err) = error {
            return self.report(err);
        }

        let err = ErrorRecord {
            message: Some(message.to_owned()),
            file_name: url.map(str::to_owned),
            line_number: line.filter(|&l| l > 0),
            column_number: column.filter(|&c| c > 0),
            ..ErrorRecord::default()
        };
        self.emit(Report::build(ReportType::Window, &err, Vec::new()))
    }

    /// Runs `f`, reporting and swallowing a panic.
    pub fn guard<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        let scope = CaptureScope::enter();
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Some(value),
            Err(payload) => {
                let mut err = ErrorRecord::from_panic(payload.as_ref());
                if let Some(site) = scope.take_site() {
                    err.file_name = err.file_name.or(Some(site.file));
                    err.line_number = err.line_number.or(Some(site.line));
                    err.column_number = err.column_number.or(Some(site.column));
                }
                self.report_swallowed(&err);
                None
            }
        }
    }

    /// Runs `f`, reporting and swallowing an `Err` or a panic.
    ///
    /// ```
    /// use hamster::{ErrorRecord, Hamster, MemorySink};
    ///
    /// let sink = MemorySink::new();
    /// let hamster = Hamster::new(sink.clone());
    ///
    /// let parsed = hamster.call(|| "42".parse::<i32>().map_err(|e| ErrorRecord::new(e.to_string())));
    /// assert_eq!(parsed, Some(42));
    ///
    /// let parsed = hamster.call(|| "x".parse::<i32>().map_err(|e| ErrorRecord::new(e.to_string())));
    /// assert_eq!(parsed, None);
    /// assert_eq!(sink.len(), 1);
    /// ```
    pub fn call<T, E: ErrorLike>(&self, f: impl FnOnce() -> std::result::Result<T, E>) -> Option<T> {
        match self.guard(f)? {
            Ok(value) => Some(value),
            Err(err) => {
                self.report_swallowed(&err);
                None
            }
        }
    }

    /// Wraps `f` so that every call goes through [`call`](Self::call).
    ///
    /// Several arguments are passed as a tuple.
    pub fn capture<'a, A, T, E, F>(&'a self, f: F) -> impl Fn(A) -> Option<T> + 'a
    where
        F: Fn(A) -> std::result::Result<T, E> + 'a,
        A: 'a,
        T: 'a,
        E: ErrorLike + 'a,
    {
        move |args| self.call(|| f(args))
    }

    fn frames_for(&self, err: &dyn ErrorLike) -> (ReportType, Vec<Frame>) {
        if self.native_stack {
            if let Some(text) = err.stack().filter(|s| !s.trim().is_empty()) {
                return (ReportType::ErrorStack, parse_stack(&text));
            }
        }

        let frames = match &self.introspector {
            Some(introspector) => {
                walk_callers(introspector.as_ref(), self.caller_depth, &is_reporting_frame)
            }
            None => Vec::new(),
        };
        (ReportType::Caller, frames)
    }

    fn report_swallowed(&self, err: &dyn ErrorLike) {
        // Sink failures are already logged by `emit`.
        let _ = self.report(err);
    }

    fn emit(&self, report: Report) -> Result<()> {
        let kind = report.kind;
        let Some(_nesting) = Nesting::enter(self.max_nested_reports) else {
            let depth = NESTING.with(Cell::get);
            log::warn!("dropping {kind} report raised from inside a sink: {}", report.message);
            return ReentrantSnafu { depth }.fail();
        };

        log::debug!("emitting {kind} report: {}", report.message);
        match panic::catch_unwind(AssertUnwindSafe(|| self.sink.on_error(report))) {
            Ok(result) => result
                .context(SinkRejectedSnafu { kind })
                .inspect_err(|err| log::warn!("{err}")),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::warn!("sink panicked on a {kind} report: {message}");
                SinkPanickedSnafu { message }.fail()
            }
        }
    }
}

struct Nesting;

impl Nesting {
    fn enter(max_nested: usize) -> Option<Self> {
        NESTING.with(|depth| {
            let current = depth.get();
            (current <= max_nested).then(|| {
                depth.set(current + 1);
                Nesting
            })
        })
    }
}

impl Drop for Nesting {
    fn drop(&mut self) {
        NESTING.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Assembles a [`Hamster`].
#[derive(Default)]
pub struct Builder {
    config: Config,
    sink: Option<Box<dyn Sink>>,
    introspector: Option<Box<dyn CallIntrospector>>,
}

impl Builder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Defaults to [`NoopSink`].
    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Overrides the probed capability flag.
    pub fn native_stack(mut self, enabled: bool) -> Self {
        self.config.native_stack = Some(enabled);
        self
    }

    /// Replaces the backtrace based introspection of the caller path.
    pub fn introspector(mut self, introspector: impl CallIntrospector + 'static) -> Self {
        self.introspector = Some(Box::new(introspector));
        self.config.introspection = true;
        self
    }

    /// Disables the caller path; errors without a textual stack are reported
    /// with their top-level location only.
    pub fn without_introspection(mut self) -> Self {
        self.introspector = None;
        self.config.introspection = false;
        self
    }

    pub fn build(self) -> Hamster {
        let native_stack = self.config.native_stack.unwrap_or_else(native_stack_supported);
        let introspector = match self.introspector {
            Some(custom) => Some(custom),
            None if self.config.introspection => {
                Some(Box::new(BacktraceIntrospector) as Box<dyn CallIntrospector>)
            }
            None => None,
        };
        log::debug!(
            "capturing with {} stacks",
            if native_stack { "native" } else { "synthetic" }
        );

        Hamster {
            sink: self.sink.unwrap_or_else(|| Box::new(NoopSink)),
            native_stack,
            caller_depth: self.config.effective_caller_depth(),
            max_nested_reports: self.config.max_nested_reports,
            introspector,
        }
    }
}

/// Reporting as a method of the error itself.
///
/// ```
/// use hamster::{ErrorRecord, Hamster, MemorySink, Reportable};
///
/// let sink = MemorySink::new();
/// let hamster = Hamster::new(sink.clone());
///
/// let err = ErrorRecord::new("disk full");
/// err.report_to(&hamster).unwrap();
/// assert_eq!(sink.take()[0].message, "disk full");
/// ```
pub trait Reportable: ErrorLike {
    fn report_to(&self, hamster: &Hamster) -> Result<()>;
}

impl<E: ErrorLike + ?Sized> Reportable for E {
    fn report_to(&self, hamster: &Hamster) -> Result<()> {
        hamster.report(&self)
    }
}

/// Reports the error of a `Result` on its way through.
pub trait ReportResultExt<T, E> {
    /// Reports an `Err` and returns the result unchanged, leaving propagation
    /// to the caller.
    fn report_err(self, hamster: &Hamster) -> std::result::Result<T, E>;
}

impl<T, E: ErrorLike> ReportResultExt<T, E> for std::result::Result<T, E> {
    fn report_err(self, hamster: &Hamster) -> std::result::Result<T, E> {
        if let Err(err) = &self {
            hamster.report_swallowed(err);
        }
        self
    }
}
