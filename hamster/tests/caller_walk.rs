use hamster::{ErrorRecord, Hamster, MAX_CALLER_DEPTH, MemorySink, ReportType};

#[inline(never)]
fn user_code_reports(hamster: &Hamster) {
    hamster.report(&ErrorRecord::new("boom")).unwrap();
}

#[test]
fn live_walk_starts_at_the_reporting_function() {
    let sink = MemorySink::new();
    let hamster = Hamster::builder()
        .native_stack(false)
        .sink(sink.clone())
        .build();

    user_code_reports(&hamster);

    let report = &sink.take()[0];
    assert_eq!(report.kind, ReportType::Caller);
    assert!(!report.stack.is_empty());
    assert!(report.stack.len() <= MAX_CALLER_DEPTH);
    assert_eq!(
        report.stack[0].function_source.as_deref(),
        Some("caller_walk::user_code_reports")
    );

    for frame in &report.stack {
        let function = frame.function_source.as_deref().unwrap_or_default();
        for prefix in ["hamster::", "<hamster::", "backtrace::", "<backtrace::"] {
            assert!(!function.starts_with(prefix), "reporting frame {function} was recorded");
        }
    }
}
