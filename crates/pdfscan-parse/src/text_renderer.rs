//! Byte-to-text decoding for the text-showing operators (Tj, TJ, ', ").

use crate::cmap::CMap;
use crate::tokenizer::Token;

/// An element of a TJ array operand.
#[derive(Debug, Clone, PartialEq)]
pub enum TjElement<'a> {
    /// A string of bytes to show.
    String(&'a [u8]),
    /// A numeric adjustment in thousandths of a unit of text space.
    Adjustment(f64),
}

impl<'a> TjElement<'a> {
    /// Classify an array element. Anything that is neither string nor
    /// number yields `None`.
    pub fn from_token(token: &'a Token) -> Option<Self> {
        match token {
            Token::String(s) => Some(TjElement::String(s)),
            other => other.as_number().map(TjElement::Adjustment),
        }
    }
}

/// `TJ` operand: the string elements concatenated, adjustments dropped.
pub fn concat_tj(elements: &[Token]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for element in elements.iter().filter_map(TjElement::from_token) {
        if let TjElement::String(s) = element {
            bytes.extend_from_slice(s);
        }
    }
    bytes
}

/// Decode shown bytes into text.
///
/// Without a CMap each byte is the character with that code point. With a
/// one-byte CMap unmapped bytes fall back the same way. With a two-byte CMap
/// bytes are read in big-endian pairs (an odd trailing byte is padded with
/// zero) and unmapped codes produce nothing.
pub fn decode_text(bytes: &[u8], cmap: Option<&CMap>) -> String {
    let Some(cmap) = cmap else {
        return latin1(bytes);
    };

    let mut out = String::new();
    if cmap.is_two_byte() {
        for pair in bytes.chunks(2) {
            let code = (u32::from(pair[0]) << 8) | pair.get(1).map_or(0, |&b| u32::from(b));
            if let Some(s) = cmap.lookup(code) {
                out.push_str(s);
            }
        }
    } else {
        for &b in bytes {
            match cmap.lookup(u32::from(b)) {
                Some(s) => out.push_str(s),
                None => out.push(char::from(b)),
            }
        }
    }
    out
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
