//! Error-like values accepted by the reporting entry points.

use std::any::Any;

use serde::{Deserialize, Serialize};

/// The fields an error may expose to a report.
///
/// Only [`message`](ErrorLike::message) is required. Everything else defaults
/// to `None`, and the report builder falls back where it can: `description`
/// stands in for a missing message, `number` for a missing code, and the
/// location fields fill the first frame when the stack lacks one.
///
/// Most error enums get this trait from the [`error_like`](crate::error_like)
/// attribute. Values coming from another runtime, or assembled by hand, can use
/// [`ErrorRecord`].
pub trait ErrorLike {
    fn message(&self) -> Option<String>;

    fn description(&self) -> Option<String> {
        None
    }

    /// Error class or category label.
    fn name(&self) -> Option<String> {
        None
    }

    fn code(&self) -> Option<i64> {
        None
    }

    /// Platform specific error number, used when there is no `code`.
    fn number(&self) -> Option<i64> {
        None
    }

    /// Textual stack trace, if the error carries one.
    fn stack(&self) -> Option<String> {
        None
    }

    fn file_name(&self) -> Option<String> {
        None
    }

    fn line_number(&self) -> Option<u32> {
        None
    }

    fn column_number(&self) -> Option<u32> {
        None
    }
}

impl<T: ErrorLike + ?Sized> ErrorLike for &T {
    fn message(&self) -> Option<String> {
        (**self).message()
    }
    fn description(&self) -> Option<String> {
        (**self).description()
    }
    fn name(&self) -> Option<String> {
        (**self).name()
    }
    fn code(&self) -> Option<i64> {
        (**self).code()
    }
    fn number(&self) -> Option<i64> {
        (**self).number()
    }
    fn stack(&self) -> Option<String> {
        (**self).stack()
    }
    fn file_name(&self) -> Option<String> {
        (**self).file_name()
    }
    fn line_number(&self) -> Option<u32> {
        (**self).line_number()
    }
    fn column_number(&self) -> Option<u32> {
        (**self).column_number()
    }
}

/// An owned error-like value.
///
/// ```
/// use hamster::{ErrorLike, ErrorRecord};
///
/// let err = ErrorRecord::new("x is undefined")
///     .with_name("TypeError")
///     .with_stack("TypeError: x is undefined\n    at f (http://x.com/a.js:1:2)")
///     .at("http://x.com/a.js", 1, 2);
/// assert_eq!(err.name().as_deref(), Some("TypeError"));
/// assert_eq!(err.line_number(), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorRecord {
    pub message: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub code: Option<i64>,
    pub number: Option<i64>,
    pub stack: Option<String>,
    pub file_name: Option<String>,
    pub line_number: Option<u32>,
    pub column_number: Option<u32>,
}

impl ErrorRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Copies every field out of another error-like value.
    pub fn from_error_like(err: &dyn ErrorLike) -> Self {
        Self {
            message: err.message(),
            description: err.description(),
            name: err.name(),
            code: err.code(),
            number: err.number(),
            stack: err.stack(),
            file_name: err.file_name(),
            line_number: err.line_number(),
            column_number: err.column_number(),
        }
    }

    /// Describes a standard error: its `Display` output becomes the message,
    /// the type name from its `Debug` output becomes the name, and the source
    /// chain is kept as the description.
    pub fn from_std_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut current = err.source();
        while let Some(source) = current {
            causes.push(source.to_string());
            current = source.source();
        }

        Self {
            message: Some(err.to_string()),
            description: (!causes.is_empty()).then(|| causes.join(": ")),
            name: type_name_from_debug(err),
            ..Self::default()
        }
    }

    /// Turns a panic payload into a record.
    ///
    /// A record raised with [`std::panic::panic_any`] is returned as is.
    /// String payloads become a record named `panic`.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        if let Some(record) = payload.downcast_ref::<ErrorRecord>() {
            return record.clone();
        }

        let mut record = Self::new(panic_message(payload));
        record.name = Some("panic".to_owned());
        record
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_number(mut self, number: i64) -> Self {
        self.number = Some(number);
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Sets the top-level location.
    pub fn at(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file_name = Some(file.into());
        self.line_number = Some(line);
        self.column_number = Some(column);
        self
    }
}

impl ErrorLike for ErrorRecord {
    fn message(&self) -> Option<String> {
        self.message.clone()
    }
    fn description(&self) -> Option<String> {
        self.description.clone()
    }
    fn name(&self) -> Option<String> {
        self.name.clone()
    }
    fn code(&self) -> Option<i64> {
        self.code
    }
    fn number(&self) -> Option<i64> {
        self.number
    }
    fn stack(&self) -> Option<String> {
        self.stack.clone()
    }
    fn file_name(&self) -> Option<String> {
        self.file_name.clone()
    }
    fn line_number(&self) -> Option<u32> {
        self.line_number
    }
    fn column_number(&self) -> Option<u32> {
        self.column_number
    }
}

/// Best effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(record) = payload.downcast_ref::<ErrorRecord>() {
        record.message.clone().unwrap_or_default()
    } else {
        "Box<dyn Any>".to_owned()
    }
}

fn type_name_from_debug(err: &dyn std::error::Error) -> Option<String> {
    let debug = format!("{err:?}");
    debug
        .split(|c: char| c == '{' || c == '(' || c.is_whitespace())
        .next()
        .filter(|s| !s.is_empty() && !s.starts_with('"'))
        .map(str::to_owned)
}
