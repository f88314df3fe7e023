/// Errors from the OpenTMF library layer.
use thiserror::Error;

/// Raw status code returned by every fallible `opentmf_*` call.
pub type RawStatus = i32;

/// Status code of a successful call (`OPENTMF_SUCCESS`).
pub const STATUS_SUCCESS: RawStatus = 0;

/// A non-success status reported by the library.
///
/// Carries the numeric code together with the library's own description of it,
/// so diagnostics render as `"<text> (<code>)"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{text} ({code})")]
pub struct Status {
    /// Raw status code.
    pub code: RawStatus,
    /// Text from `opentmf_get_status_str`.
    pub text: String,
}

impl Status {
    #[must_use]
    pub fn new(code: RawStatus, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }
}

/// Failure to make the shared library usable at all.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The shared library file could not be opened.
    #[error("cannot open '{path}': {source}")]
    Open {
        /// Path or file name handed to the system loader.
        path: String,
        #[source]
        source: libloading::Error,
    },

    /// The library was opened but lacks a required entry point.
    #[error("missing symbol '{symbol}': {source}")]
    Symbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
}
