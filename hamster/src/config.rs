use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::caller::MAX_CALLER_DEPTH;
use crate::error::{ConfigSnafu, Result};

/// Settings for a [`Hamster`](crate::Hamster).
///
/// ```
/// use hamster::Config;
///
/// let config = Config::from_json(r#"{ "native_stack": false, "caller_depth": 4 }"#).unwrap();
/// assert_eq!(config.native_stack, Some(false));
/// assert_eq!(config.caller_depth, 4);
/// assert_eq!(config.max_nested_reports, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Forces the native stack strategy on or off. Probed when unset.
    pub native_stack: Option<bool>,
    /// Frames recorded when walking the caller chain, at most
    /// [`MAX_CALLER_DEPTH`].
    pub caller_depth: usize,
    /// Reports that may be produced while a sink is already running on the
    /// same thread. Anything deeper is dropped.
    pub max_nested_reports: usize,
    /// Walk the live stack with the `backtrace` crate when an error has no
    /// textual stack.
    pub introspection: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            native_stack: None,
            caller_depth: MAX_CALLER_DEPTH,
            max_nested_reports: 0,
            introspection: true,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context(ConfigSnafu)
    }

    pub(crate) fn effective_caller_depth(&self) -> usize {
        self.caller_depth.min(MAX_CALLER_DEPTH)
    }
}
