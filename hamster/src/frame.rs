//! Stack frames as they appear in a [`Report`](crate::Report).

use serde::{Deserialize, Serialize};

/// Where a frame's source lives.
///
/// Frames come out of the parser and the walker carrying the URL they were
/// found with. [`Report::build`](crate::Report::build) swaps every URL for its
/// position in the report's file table, so a built report only holds
/// [`FileRef::Index`] values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileRef {
    /// Position in [`Report::files`](crate::Report::files).
    Index(usize),
    /// A URL or path, before deduplication.
    Url(String),
}

impl From<&str> for FileRef {
    fn from(url: &str) -> Self {
        FileRef::Url(url.to_owned())
    }
}

impl From<String> for FileRef {
    fn from(url: String) -> Self {
        FileRef::Url(url)
    }
}

impl From<usize> for FileRef {
    fn from(index: usize) -> Self {
        FileRef::Index(index)
    }
}

/// One level of a reconstructed call stack.
///
/// The native-stack path fills `function_label`, `file`, `line`, `column` and
/// `raw`. The synthetic-chain path fills `function_source` and
/// `call_arguments`. Consumers tell the two apart by the report type.
///
/// On the wire every field is optional and omitted when unset:
///
/// ```text
/// { "k": "foo", "f": 0, "l": 12, "c": 5 }
/// { "raw": "some garbage text" }
/// { "fn": "app::worker::run", "args": [] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "k", default, skip_serializing_if = "Option::is_none")]
    pub function_label: Option<String>,
    #[serde(rename = "f", default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileRef>,
    #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(rename = "c", default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(rename = "fn", default, skip_serializing_if = "Option::is_none")]
    pub function_source: Option<String>,
    #[serde(rename = "args", default, skip_serializing_if = "Option::is_none")]
    pub call_arguments: Option<Vec<serde_json::Value>>,
}

impl Frame {
    /// A frame holding only the text of a line that could not be decomposed.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            raw: Some(text.into()),
            ..Self::default()
        }
    }

    /// A frame recorded by walking the live call chain.
    pub fn synthetic(source: impl Into<String>, arguments: Option<Vec<serde_json::Value>>) -> Self {
        Self {
            function_source: Some(source.into()),
            call_arguments: arguments,
            ..Self::default()
        }
    }

    /// A frame pointing at a location.
    pub fn at(file: impl Into<FileRef>, line: u32, column: Option<u32>) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
            column,
            ..Self::default()
        }
    }

    /// Sets the function label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.function_label = Some(label.into());
        self
    }

    /// True when the frame carries nothing at all, which only happens for the
    /// placeholder a report builds for an empty stack.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// The file table index, once the frame belongs to a built report.
    pub fn file_index(&self) -> Option<usize> {
        match self.file {
            Some(FileRef::Index(index)) => Some(index),
            _ => None,
        }
    }

    /// The file URL, while the frame has not been through a report yet.
    pub fn file_url(&self) -> Option<&str> {
        match &self.file {
            Some(FileRef::Url(url)) => Some(url),
            _ => None,
        }
    }
}
