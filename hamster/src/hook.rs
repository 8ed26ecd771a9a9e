//! Uncaught panics as a source of reports.
//!
//! The process panic hook plays the part of a global error handler: it learns
//! the message and location of every panic. Panics that a capture scope is
//! about to catch are left to that scope, which picks up the location recorded
//! here so its report still points at the panic site.

use std::cell::{Cell, RefCell};
use std::panic::{self, Location, PanicHookInfo};
use std::sync::Arc;

use crate::client::Hamster;
use crate::error_like::{ErrorLike, ErrorRecord, panic_message};

thread_local! {
    static CAPTURE_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PANIC_SITE: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PanicSite {
    pub(crate) file: String,
    pub(crate) line: u32,
    pub(crate) column: u32,
}

impl From<&Location<'_>> for PanicSite {
    fn from(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_owned(),
            line: location.line(),
            column: location.column(),
        }
    }
}

/// Marks the current thread as inside `guard`, `call` or a captured function.
#[must_use]
pub(crate) struct CaptureScope {
    _priv: (),
}

impl CaptureScope {
    pub(crate) fn enter() -> Self {
        clear_site();
        CAPTURE_DEPTH.with(|depth| depth.set(depth.get() + 1));
        CaptureScope { _priv: () }
    }

    /// Location of the panic this scope just caught, if a hook saw it.
    pub(crate) fn take_site(&self) -> Option<PanicSite> {
        PANIC_SITE.with(|site| site.borrow_mut().take())
    }
}

impl Drop for CaptureScope {
    fn drop(&mut self) {
        // A site nobody took belongs to a panic the scope's own code caught.
        clear_site();
        CAPTURE_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

fn clear_site() {
    PANIC_SITE.with(|site| *site.borrow_mut() = None);
}

fn in_capture_scope() -> bool {
    CAPTURE_DEPTH.with(Cell::get) > 0
}

/// Reports uncaught panics to `hamster`.
///
/// The hook installed before this call keeps running after every report, so
/// other handlers and the default panic message are unaffected. A payload
/// raised with `std::panic::panic_any(ErrorRecord)` is reported as the error
/// object; any other panic becomes a `window` report carrying the panic
/// message and location.
///
/// A sink that panics while handling a report from this hook aborts the
/// process, as does any panic inside a panic hook.
pub fn install_panic_hook(hamster: Arc<Hamster>) {
    let previous = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        if in_capture_scope() {
            if let Some(location) = info.location() {
                PANIC_SITE.with(|site| *site.borrow_mut() = Some(location.into()));
            }
        } else {
            // Failures were logged when the sink was called.
            let _ = report_panic(&hamster, info);
        }

        previous(info);
    }));
}

fn report_panic(hamster: &Hamster, info: &PanicHookInfo<'_>) -> crate::Result<()> {
    let location = info.location();
    let error = info
        .payload()
        .downcast_ref::<ErrorRecord>()
        .map(|record| record as &dyn ErrorLike);

    hamster.on_window_error(
        &panic_message(info.payload()),
        location.map(Location::file),
        location.map(Location::line),
        location.map(Location::column),
        error,
    )
}
