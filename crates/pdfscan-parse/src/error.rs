//! Error types for the parsing layer.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`BackendError`]
//! for the few caller-contract violations the parsing layer reports and its
//! conversion to [`PdfError`].

use pdfscan_core::PdfError;
use thiserror::Error;

/// Error type for parsing-layer operations.
///
/// Malformed input never produces one of these; extraction degrades and
/// reports warnings instead.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A configured resource limit was exceeded.
    #[error("{name} limit exceeded (limit: {limit}, actual: {actual})")]
    Limit {
        /// Name of the limit.
        name: &'static str,
        /// Configured value.
        limit: usize,
        /// Observed value.
        actual: usize,
    },

    /// Page index past the end of the page list.
    #[error("page {index} requested but document has {page_count} pages")]
    PageIndex {
        /// Requested index.
        index: usize,
        /// Pages available.
        page_count: usize,
    },

    /// A core library error.
    #[error(transparent)]
    Core(#[from] PdfError),
}

impl From<BackendError> for PdfError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Limit {
                name,
                limit,
                actual,
            } => PdfError::ResourceLimitExceeded {
                limit_name: name.to_string(),
                limit_value: limit,
                actual_value: actual,
            },
            BackendError::PageIndex { index, page_count } => {
                PdfError::PageOutOfRange { index, page_count }
            }
            BackendError::Core(e) => e,
        }
    }
}
