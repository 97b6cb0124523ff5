//! Error and warning types for pdfscan.
//!
//! Provides [`PdfError`] for caller-level failures that stop processing,
//! [`ExtractWarning`] for the best-effort degradations extraction absorbs,
//! [`ExtractResult`] for pairing a value with collected warnings, and
//! [`ExtractOptions`] for configuring resource limits and warning behavior.

use std::fmt;

use crate::unicode_norm::UnicodeNorm;

/// Fatal error types.
///
/// Malformed PDF structure is never fatal; these only report violations of
/// the caller's own contract (limits, page indices).
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    /// A configured resource limit was exceeded.
    ResourceLimitExceeded {
        /// Name of the limit that was exceeded (e.g., "max_input_bytes").
        limit_name: String,
        /// The configured limit value.
        limit_value: usize,
        /// The actual value that exceeded the limit.
        actual_value: usize,
    },
    /// A page index past the end of the page list was requested.
    PageOutOfRange {
        /// Requested 0-based index.
        index: usize,
        /// Number of pages in the document.
        page_count: usize,
    },
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => write!(
                f,
                "resource limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value})"
            ),
            PdfError::PageOutOfRange { index, page_count } => {
                write!(f, "page index {index} out of range (page count: {page_count})")
            }
            PdfError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PdfError {}

/// Machine-readable warning code for categorizing extraction issues.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum ExtractWarningCode {
    /// A referenced indirect object is not in the object table.
    MissingObject,
    /// An object expected to carry a stream has no `stream` keyword.
    MissingStream,
    /// A Flate stream failed to inflate with every framing and was used raw.
    DecodeFallback,
    /// A text operator had too few or mistyped operands and was skipped.
    MalformedOperator,
    /// A configured resource limit was reached during extraction.
    ResourceLimitReached,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl ExtractWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            ExtractWarningCode::MissingObject => "MISSING_OBJECT",
            ExtractWarningCode::MissingStream => "MISSING_STREAM",
            ExtractWarningCode::DecodeFallback => "DECODE_FALLBACK",
            ExtractWarningCode::MalformedOperator => "MALFORMED_OPERATOR",
            ExtractWarningCode::ResourceLimitReached => "RESOURCE_LIMIT_REACHED",
            ExtractWarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for ExtractWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue encountered during extraction.
///
/// Extraction always continues after a warning; the warning only records
/// where the output degraded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractWarning {
    /// Machine-readable warning code.
    pub code: ExtractWarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Page number where the warning occurred (0-indexed), if applicable.
    pub page: Option<usize>,
    /// Index of the operator in the page's content where the warning occurred.
    pub operator_index: Option<usize>,
    /// Font resource name associated with the warning, if applicable.
    pub font_name: Option<String>,
}

impl ExtractWarning {
    /// Create a warning with just a description.
    ///
    /// Uses [`ExtractWarningCode::Other`] as the default code.
    pub fn new(description: impl Into<String>) -> Self {
        let desc = description.into();
        Self {
            code: ExtractWarningCode::Other(desc.clone()),
            description: desc,
            page: None,
            operator_index: None,
            font_name: None,
        }
    }

    /// Create a warning with a specific code and description.
    pub fn with_code(code: ExtractWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            page: None,
            operator_index: None,
            font_name: None,
        }
    }

    /// Set the page, returning the modified warning (builder pattern).
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the operator index, returning the modified warning.
    pub fn at_operator(mut self, operator_index: usize) -> Self {
        self.operator_index = Some(operator_index);
        self
    }

    /// Set the font name, returning the modified warning.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = Some(font_name.into());
        self
    }

    /// Convert this warning into a [`PdfError`].
    ///
    /// Used by strict mode to escalate warnings to errors.
    pub fn to_error(&self) -> PdfError {
        PdfError::Other(self.to_string())
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {page})")?;
        }
        if let Some(ref font_name) = self.font_name {
            write!(f, " [font {font_name}]")?;
        }
        if let Some(index) = self.operator_index {
            write!(f, " [operator #{index}]")?;
        }
        Ok(())
    }
}

/// Result wrapper that pairs a value with collected warnings.
#[derive(Debug, Clone)]
pub struct ExtractResult<T> {
    /// The extracted value.
    pub value: T,
    /// Warnings collected during extraction.
    pub warnings: Vec<ExtractWarning>,
}

impl<T> ExtractResult<T> {
    /// Create a result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<ExtractWarning>) -> Self {
        Self { value, warnings }
    }

    /// Returns true if there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Transform the value while preserving warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractResult<U> {
        ExtractResult {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// Options controlling extraction behavior and resource limits.
///
/// Extraction has no built-in iteration budget; these limits are the
/// external bounds to set when the input is untrusted.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum input PDF size in bytes (default: None = no limit).
    pub max_input_bytes: Option<usize>,
    /// Maximum number of pages to process (default: None = no limit).
    pub max_pages: Option<usize>,
    /// Maximum decompressed bytes kept per stream (default: 100 MB).
    pub max_stream_bytes: usize,
    /// Maximum number of text items emitted per page (default: None = no limit).
    pub max_items_per_page: Option<usize>,
    /// Whether to collect warnings during extraction (default: true).
    pub collect_warnings: bool,
    /// Unicode normalization applied to item text (default: None).
    pub unicode_norm: UnicodeNorm,
    /// When true, any warning is escalated to an error (default: false).
    pub strict_mode: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: None,
            max_pages: None,
            max_stream_bytes: 100 * 1024 * 1024,
            max_items_per_page: None,
            collect_warnings: true,
            unicode_norm: UnicodeNorm::None,
            strict_mode: false,
        }
    }
}
