//! pdfscan-parse: object scanning, stream decoding and the text interpreter.
//!
//! This crate turns raw PDF bytes into positioned text. It scans indirect
//! objects with tolerant byte patterns ([`ObjectTable`]), inflates content
//! streams ([`decode_stream`]), parses ToUnicode maps ([`CMap`]), walks the
//! page tree ([`Document`]) and replays text operators
//! ([`interpret_content_stream`]). It depends on pdfscan-core for shared
//! data types.

pub mod cmap;
pub mod document;
pub mod error;
pub mod handler;
pub mod interpreter;
pub mod object_table;
pub mod stream;
pub mod text_renderer;
pub mod text_state;
pub mod tokenizer;

pub use cmap::CMap;
pub use document::{Document, FontMap, Page};
pub use error::BackendError;
pub use handler::ContentHandler;
pub use interpreter::{TextExtractor, TextOperator, interpret_content_stream};
pub use object_table::{ObjectResolver, ObjectTable};
pub use pdfscan_core;
pub use stream::{DecodedStream, Framing, decode_stream};
pub use text_renderer::decode_text;
pub use text_state::TextState;
pub use tokenizer::{Token, Tokenizer};
