//! Detection of native stack trace support.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

static NATIVE_STACK: OnceLock<bool> = OnceLock::new();

/// Whether the runtime attaches a textual stack trace to a freshly created
/// error.
///
/// Probed once per process by capturing a throwaway [`Backtrace`], which is
/// only populated when `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` asks for it.
/// The answer never changes afterwards.
pub fn native_stack_supported() -> bool {
    *NATIVE_STACK.get_or_init(|| {
        let supported = probe();
        log::debug!("native stack traces supported: {supported}");
        supported
    })
}

fn probe() -> bool {
    panic::catch_unwind(AssertUnwindSafe(|| {
        Backtrace::capture().status() == BacktraceStatus::Captured
    }))
    .unwrap_or(false)
}
