//! pdfscan: Extract positioned text runs from PDF documents.
//!
//! This is the public API facade crate for pdfscan. It re-exports types from
//! pdfscan-core and uses pdfscan-parse for object scanning and content
//! interpretation.
//!
//! # Architecture
//!
//! - **pdfscan-core**: Backend-independent data types and options
//! - **pdfscan-parse**: Object scanning, stream decoding, CMaps, page walking
//!   and the text-operator interpreter
//! - **pdfscan** (this crate): Public API that ties everything together
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), pdfscan::PdfError> {
//! let bytes = std::fs::read("report.pdf").map_err(|e| pdfscan::PdfError::Other(e.to_string()))?;
//! let result = pdfscan::extract(&bytes)?;
//! for item in &result.value.items {
//!     println!("{} ({:.1}, {:.1}) {}", item.page, item.x, item.y, item.text);
//! }
//! # Ok(())
//! # }
//! ```

mod page;
mod pdf;

pub use page::Page;
pub use pdf::{PagesIter, Pdf, extract};

pub use pdfscan_core::{
    ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, Extraction, Matrix,
    ObjectRef, PdfError, TextItem, UnicodeNorm,
};

pub use pdfscan_core;
pub use pdfscan_parse;
