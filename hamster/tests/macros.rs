use std::fmt;

use hamster::{ErrorLike, Hamster, MemorySink, ReportType, capture, error_like};
use snafu::Snafu;

#[error_like]
#[derive(Debug, Snafu)]
enum StorageError {
    #[error_like(code = 28)]
    #[snafu(display("disk full while writing {path}"))]
    DiskFull { path: String },

    #[error_like(name = "Timeout", code = -1)]
    #[snafu(display("timed out after {secs}s"))]
    TimedOut { secs: u64 },

    #[snafu(display("index is corrupted"))]
    Corrupted,
}

#[error_like(name = "Network", code = 500)]
#[derive(Debug, Snafu)]
enum NetworkError {
    #[snafu(display("connection refused"))]
    Refused,

    #[error_like(name = "Dns", code = 3)]
    #[snafu(display("cannot resolve {host}"))]
    Unresolved { host: String },
}

#[error_like(code = 404)]
#[derive(Debug)]
struct NotFound(String);

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} not found", self.0)
    }
}

thread_local! {
    static SINK: MemorySink = MemorySink::new();
}

fn reporter() -> Hamster {
    Hamster::builder()
        .native_stack(true)
        .without_introspection()
        .sink(SINK.with(Clone::clone))
        .build()
}

fn reported() -> Vec<hamster::Report> {
    SINK.with(MemorySink::take)
}

#[capture(reporter())]
fn parse_port(text: &str) -> Result<u16, NotFound> {
    text.parse().map_err(|_| NotFound(format!("port {text}")))
}

#[capture(reporter())]
fn checked_write(free: u64, needed: u64) -> Result<u64, StorageError> {
    if needed > free {
        return DiskFullSnafu { path: "/var/data" }.fail();
    }
    Ok(free - needed)
}

#[capture(reporter())]
fn first_byte(bytes: &[u8]) -> u8 {
    bytes[0]
}

#[capture(reporter())]
fn touch(flag: &mut bool) {
    *flag = true;
}

#[test]
fn enum_variants_become_names_and_codes() {
    let err = StorageError::DiskFull {
        path: "/var/data".into(),
    };
    assert_eq!(err.message().as_deref(), Some("disk full while writing /var/data"));
    assert_eq!(err.name().as_deref(), Some("DiskFull"));
    assert_eq!(err.code(), Some(28));
    assert_eq!(err.stack(), None);

    let err = StorageError::TimedOut { secs: 30 };
    assert_eq!(err.name().as_deref(), Some("Timeout"));
    assert_eq!(err.code(), Some(-1));

    let err = StorageError::Corrupted;
    assert_eq!(err.name().as_deref(), Some("Corrupted"));
    assert_eq!(err.code(), None);
}

#[test]
fn enum_level_settings_are_variant_defaults() {
    let err = NetworkError::Refused;
    assert_eq!(err.name().as_deref(), Some("Network"));
    assert_eq!(err.code(), Some(500));

    let err = NetworkError::Unresolved {
        host: "db.internal".into(),
    };
    assert_eq!(err.message().as_deref(), Some("cannot resolve db.internal"));
    assert_eq!(err.name().as_deref(), Some("Dns"));
    assert_eq!(err.code(), Some(3));
}

#[test]
fn structs_use_the_type_name() {
    let err = NotFound("user 7".into());
    assert_eq!(err.message().as_deref(), Some("user 7 not found"));
    assert_eq!(err.name().as_deref(), Some("NotFound"));
    assert_eq!(err.code(), Some(404));
}

#[test]
fn captured_result_functions_return_options() {
    assert_eq!(parse_port("8080"), Some(8080));
    assert!(reported().is_empty());

    assert_eq!(parse_port("http"), None);
    let reports = reported();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, ReportType::Caller);
    assert_eq!(reports[0].message, "port http not found");
    assert_eq!(reports[0].code, Some(404));
}

#[test]
fn early_returns_and_context_selectors_work_inside_captured_functions() {
    assert_eq!(checked_write(10, 4), Some(6));
    assert_eq!(checked_write(1, 4), None);

    let reports = reported();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name.as_deref(), Some("DiskFull"));
    assert_eq!(reports[0].code, Some(28));
}

#[test]
fn captured_plain_functions_only_report_panics() {
    assert_eq!(first_byte(b"hi"), Some(b'h'));
    assert!(reported().is_empty());

    assert_eq!(first_byte(b""), None);
    let reports = reported();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name.as_deref(), Some("panic"));

    let mut flag = false;
    assert_eq!(touch(&mut flag), Some(()));
    assert!(flag);
}
