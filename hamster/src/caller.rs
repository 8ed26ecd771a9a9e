//! Synthetic stacks built by walking the live call chain.
//!
//! This path is taken when an error carries no textual stack. It records which
//! functions were active when the error was reported but never their file or
//! line; the first frame of the report gets those from the error itself.

use crate::frame::Frame;

/// Upper bound on the frames a walk records.
pub const MAX_CALLER_DEPTH: usize = 10;

/// Symbol prefixes that belong to the reporting path rather than to the code
/// being observed.
const REPORTING_PATH: &[&str] = &["hamster::", "<hamster::", "backtrace::", "<backtrace::"];

/// One active function call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Identity of the function, used to recognize the reporting path.
    pub function: String,
    /// Printable form of the function. Defaults to `function`.
    pub source: Option<String>,
    /// Arguments of the call, when the runtime can capture them.
    pub arguments: Option<Vec<serde_json::Value>>,
}

impl Invocation {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            source: None,
            arguments: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<serde_json::Value>) -> Self {
        self.arguments = Some(arguments);
        self
    }
}

/// Access to the calls active on the current thread.
///
/// Implementations visit invocations innermost first and stop as soon as
/// `visit` returns `false`.
pub trait CallIntrospector: Send + Sync {
    fn for_each_caller(&self, visit: &mut dyn FnMut(Invocation) -> bool);
}

/// Walks the native stack with the `backtrace` crate.
///
/// Frames without a resolvable symbol are passed over. Rust does not keep
/// argument values around, so invocations carry none.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceIntrospector;

impl CallIntrospector for BacktraceIntrospector {
    fn for_each_caller(&self, visit: &mut dyn FnMut(Invocation) -> bool) {
        backtrace::trace(|frame| {
            let mut function = None;
            backtrace::resolve_frame(frame, |symbol| {
                if function.is_none() {
                    function = symbol.name().map(|name| format!("{name:#}"));
                }
            });

            match function {
                Some(function) => visit(Invocation::new(function)),
                None => true,
            }
        });
    }
}

/// Whether an invocation is part of the reporting machinery.
pub fn is_reporting_frame(call: &Invocation) -> bool {
    REPORTING_PATH
        .iter()
        .any(|prefix| call.function.starts_with(prefix))
}

/// Records up to `depth` callers, clamped to [`MAX_CALLER_DEPTH`].
///
/// Invocations matching `skip` are passed over without counting against the
/// bound.
pub fn walk_callers(
    introspector: &dyn CallIntrospector,
    depth: usize,
    skip: &dyn Fn(&Invocation) -> bool,
) -> Vec<Frame> {
    let depth = depth.min(MAX_CALLER_DEPTH);
    let mut frames = Vec::with_capacity(depth);
    if depth == 0 {
        return frames;
    }

    introspector.for_each_caller(&mut |call| {
        if skip(&call) {
            return true;
        }
        let source = call.source.unwrap_or(call.function);
        frames.push(Frame::synthetic(source, call.arguments));
        frames.len() < depth
    });

    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Replays a fixed chain, innermost first.
    struct Scripted(Vec<Invocation>);

    impl CallIntrospector for Scripted {
        fn for_each_caller(&self, visit: &mut dyn FnMut(Invocation) -> bool) {
            for call in &self.0 {
                if !visit(call.clone()) {
                    break;
                }
            }
        }
    }

    fn chain(len: usize) -> Scripted {
        Scripted(
            (0..len)
                .map(|i| Invocation::new(format!("app::level_{i}")))
                .collect(),
        )
    }

    #[test]
    fn walk_is_bounded() {
        let frames = walk_callers(&chain(25), MAX_CALLER_DEPTH, &is_reporting_frame);
        assert_eq!(frames.len(), MAX_CALLER_DEPTH);
        assert_eq!(frames[0].function_source.as_deref(), Some("app::level_0"));
        assert_eq!(frames[9].function_source.as_deref(), Some("app::level_9"));
    }

    #[test]
    fn depth_above_the_bound_is_clamped() {
        assert_eq!(walk_callers(&chain(25), 40, &is_reporting_frame).len(), MAX_CALLER_DEPTH);
    }

    #[test]
    fn short_chains_end_early() {
        assert_eq!(walk_callers(&chain(3), MAX_CALLER_DEPTH, &is_reporting_frame).len(), 3);
        assert!(walk_callers(&chain(0), MAX_CALLER_DEPTH, &is_reporting_frame).is_empty());
        assert!(walk_callers(&chain(5), 0, &is_reporting_frame).is_empty());
    }

    #[test]
    fn reporting_frames_are_skipped_without_counting() {
        let mut calls = vec![
            Invocation::new("hamster::caller::walk_callers"),
            Invocation::new("hamster::client::Hamster::report"),
        ];
        calls.extend(chain(12).0);
        calls.insert(5, Invocation::new("<hamster::client::Hamster as core::ops::Drop>::drop"));

        let frames = walk_callers(&Scripted(calls), MAX_CALLER_DEPTH, &is_reporting_frame);
        assert_eq!(frames.len(), MAX_CALLER_DEPTH);
        assert!(
            frames
                .iter()
                .all(|f| f.function_source.as_deref().is_some_and(|s| s.starts_with("app::")))
        );
    }

    #[test]
    fn source_and_arguments_are_recorded() {
        let calls = vec![
            Invocation::new("handler")
                .with_source("function handler(e) { throw e; }")
                .with_arguments(vec![json!({ "id": 7 })]),
        ];
        let frames = walk_callers(&Scripted(calls), MAX_CALLER_DEPTH, &is_reporting_frame);
        assert_eq!(
            frames,
            vec![Frame::synthetic(
                "function handler(e) { throw e; }",
                Some(vec![json!({ "id": 7 })])
            )]
        );
    }

    #[test]
    fn backtrace_walk_sees_this_test() {
        let frames = walk_callers(&BacktraceIntrospector, MAX_CALLER_DEPTH, &is_reporting_frame);
        assert!(frames.len() <= MAX_CALLER_DEPTH);
        assert!(frames.iter().all(|f| f.file.is_none() && f.line.is_none()));
    }
}
