//! pdfscan-core: Backend-independent data types.
//!
//! This crate provides the foundational types ([`ObjectRef`], [`Matrix`],
//! [`TextItem`], [`Extraction`]) and the error, warning and option types
//! shared by the parsing layer and the public facade.

pub mod error;
pub mod geometry;
pub mod object;
pub mod text;
pub mod unicode_norm;

pub use error::{ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, PdfError};
pub use geometry::Matrix;
pub use object::ObjectRef;
pub use text::{Extraction, TextItem};
pub use unicode_norm::{UnicodeNorm, normalize_items};
