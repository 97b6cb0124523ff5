//! Page type for accessing the text extracted from a PDF page.

use pdfscan_core::{ExtractWarning, ObjectRef, TextItem};

/// A single extracted page.
///
/// Holds the positioned text items of the page in content-stream order,
/// plus the warnings raised while interpreting it. Constructed by
/// [`Pdf::page`](crate::Pdf::page).
#[derive(Debug, Clone)]
pub struct Page {
    /// Page index (0-based).
    index: usize,
    /// The page object.
    reference: ObjectRef,
    items: Vec<TextItem>,
    warnings: Vec<ExtractWarning>,
}

impl Page {
    pub(crate) fn new(
        index: usize,
        reference: ObjectRef,
        items: Vec<TextItem>,
        warnings: Vec<ExtractWarning>,
    ) -> Self {
        Self {
            index,
            reference,
            items,
            warnings,
        }
    }

    /// Returns the page index (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the page object reference.
    pub fn reference(&self) -> ObjectRef {
        self.reference
    }

    /// Returns the text items, in content-stream order.
    pub fn items(&self) -> &[TextItem] {
        &self.items
    }

    /// Returns the warnings raised while interpreting this page.
    pub fn warnings(&self) -> &[ExtractWarning] {
        &self.warnings
    }

    /// Item texts joined with `separator`.
    pub fn text(&self, separator: &str) -> String {
        self.items
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Consumes the page, returning its items and warnings.
    pub fn into_parts(self) -> (Vec<TextItem>, Vec<ExtractWarning>) {
        (self.items, self.warnings)
    }
}
