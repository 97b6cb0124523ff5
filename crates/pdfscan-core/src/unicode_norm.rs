//! Unicode normalization for extracted text.
//!
//! Provides [`UnicodeNorm`] for selecting a normalization form and
//! [`normalize_items`] for applying it to extracted text items.

use unicode_normalization::UnicodeNormalization;

use crate::text::TextItem;

/// Unicode normalization form to apply to extracted text.
///
/// ToUnicode CMaps from different producers may emit composed or
/// decomposed forms for the same visual text. Normalizing makes the output
/// comparable across documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnicodeNorm {
    /// No normalization (default). Text is exactly what the CMap produced.
    #[default]
    None,
    /// Canonical Decomposition, followed by Canonical Composition (NFC).
    Nfc,
    /// Canonical Decomposition (NFD).
    Nfd,
    /// Compatibility Decomposition, followed by Canonical Composition (NFKC).
    Nfkc,
    /// Compatibility Decomposition (NFKD).
    Nfkd,
}

impl UnicodeNorm {
    /// Apply this normalization form to the given string.
    ///
    /// Returns the input unchanged if normalization is `None`.
    pub fn normalize(&self, text: &str) -> String {
        match self {
            UnicodeNorm::None => text.to_string(),
            UnicodeNorm::Nfc => text.nfc().collect(),
            UnicodeNorm::Nfd => text.nfd().collect(),
            UnicodeNorm::Nfkc => text.nfkc().collect(),
            UnicodeNorm::Nfkd => text.nfkd().collect(),
        }
    }
}

/// Normalize the text of each item in place. Positions and fonts are untouched.
pub fn normalize_items(items: &mut [TextItem], norm: UnicodeNorm) {
    if norm == UnicodeNorm::None {
        return;
    }
    for item in items {
        item.text = norm.normalize(&item.text);
    }
}
