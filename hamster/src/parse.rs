//! Textual stack trace parsing.
//!
//! Two historical conventions are recognized for the function name:
//!
//! ```text
//! at handleClick (http://app.example/main.js:12:5)
//! handleClick@http://app.example/main.js:12:5
//! ```
//!
//! The location is any `scheme://...:line[:column]` token closing the line or
//! followed by `)`. Lines matching neither survive as raw frames.

use std::sync::OnceLock;

use regex::Regex;

use crate::frame::{FileRef, Frame};

static FUNCTION_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static LOCATION_REGEX: OnceLock<Regex> = OnceLock::new();

fn function_name_regex() -> &'static Regex {
    FUNCTION_NAME_REGEX.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^(?:
                at\x20([\w.\x20]*)\x20\(      # at NAME (location)
                |
                ([\w.\x20]*)(?:\(.*\))?@      # NAME(args)@location
            )
            ",
        )
        .expect("function name pattern is valid")
    })
}

fn location_regex() -> &'static Regex {
    LOCATION_REGEX.get_or_init(|| {
        Regex::new(
            r"(?x)
            ([A-Za-z][A-Za-z0-9+.\-]*://.+?)   # scheme://host/path
            :(\d+)                             # :line
            (?::(\d+))?                        # :column
            (?:\)|$)
            ",
        )
        .expect("location pattern is valid")
    })
}

/// Splits a stack trace into frames, one per non-empty line, innermost first.
///
/// ```
/// use hamster::parse_stack;
///
/// let frames = parse_stack("Error: boom\n    at foo (http://x.com/a.js:12:5)\n");
/// assert_eq!(frames.len(), 2);
/// assert_eq!(frames[0].raw.as_deref(), Some("Error: boom"));
/// assert_eq!(frames[1].function_label.as_deref(), Some("foo"));
/// assert_eq!(frames[1].line, Some(12));
/// ```
pub fn parse_stack(text: &str) -> Vec<Frame> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

/// Parses one trimmed, non-empty line.
pub fn parse_line(line: &str) -> Frame {
    let mut frame = Frame {
        function_label: function_label(line),
        ..Frame::default()
    };

    match location_regex().captures(line) {
        Some(caps) => {
            frame.file = caps.get(1).map(|m| FileRef::Url(m.as_str().to_owned()));
            frame.line = caps.get(2).and_then(|m| m.as_str().parse().ok());
            frame.column = caps.get(3).and_then(|m| m.as_str().parse().ok());
        }
        None => frame.raw = Some(line.to_owned()),
    }

    frame
}

fn function_label(line: &str) -> Option<String> {
    let caps = function_name_regex().captures(line)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}
