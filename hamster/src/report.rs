//! The normalized record handed to a sink.

use std::fmt;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{Result, SerializeSnafu};
use crate::error_like::ErrorLike;
use crate::frame::{FileRef, Frame};

/// How the stack of a report was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    /// Parsed from the error's textual stack.
    #[serde(rename = "error.stack")]
    ErrorStack,
    /// Reconstructed by walking the live call chain.
    #[serde(rename = "caller")]
    Caller,
    /// Built from the scalars of an uncaught error.
    #[serde(rename = "window")]
    Window,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::ErrorStack => "error.stack",
            ReportType::Caller => "caller",
            ReportType::Window => "window",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured error, normalized.
///
/// Frames reference files by index into `files`, which lists every file once
/// in the order frames first mention it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "type")]
    pub kind: ReportType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    pub stack: Vec<Frame>,
    pub files: Vec<String>,
}

impl Report {
    /// Merges `frames` with the top-level fields of `err`.
    ///
    /// An empty frame list gets a single placeholder frame, and the first
    /// frame borrows whatever location it lacks from `err`. File URLs are then
    /// replaced by their index in the file table.
    ///
    /// ```
    /// use hamster::{ErrorRecord, FileRef, Frame, Report, ReportType};
    ///
    /// let frames = vec![
    ///     Frame::at("a.js", 1, None),
    ///     Frame::at("b.js", 2, None),
    ///     Frame::at("a.js", 3, None),
    /// ];
    /// let report = Report::build(ReportType::ErrorStack, &ErrorRecord::new("boom"), frames);
    /// assert_eq!(report.files, ["a.js", "b.js"]);
    /// assert_eq!(report.stack[2].file, Some(FileRef::Index(0)));
    /// ```
    pub fn build(kind: ReportType, err: &dyn ErrorLike, mut frames: Vec<Frame>) -> Report {
        let message = err
            .message()
            .filter(|m| !m.is_empty())
            .or_else(|| err.description().filter(|d| !d.is_empty()))
            .unwrap_or_default();

        if frames.is_empty() {
            frames.push(Frame::default());
        }
        backfill_location(&mut frames[0], err);

        let files = index_files(&mut frames);

        Report {
            kind,
            message,
            name: err.name(),
            code: err.code().or_else(|| err.number()),
            stack: frames,
            files,
        }
    }

    /// The file a frame of this report points at.
    pub fn file_of(&self, frame: &Frame) -> Option<&str> {
        frame
            .file_index()
            .and_then(|index| self.files.get(index))
            .map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context(SerializeSnafu)
    }
}

fn backfill_location(frame: &mut Frame, err: &dyn ErrorLike) {
    if frame.file.is_none() {
        frame.file = err
            .file_name()
            .filter(|f| !f.is_empty())
            .map(FileRef::Url);
    }
    if frame.line.is_none() {
        frame.line = err.line_number();
    }
    if frame.column.is_none() {
        frame.column = err.column_number();
    }
}

/// Replaces file URLs with their first-seen index and returns the table.
fn index_files(frames: &mut [Frame]) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();

    for frame in frames.iter_mut() {
        let Some(FileRef::Url(url)) = &frame.file else {
            continue;
        };
        let index = match files.iter().position(|known| known == url) {
            Some(index) => index,
            None => {
                files.push(url.clone());
                files.len() - 1
            }
        };
        frame.file = Some(FileRef::Index(index));
    }

    files
}
