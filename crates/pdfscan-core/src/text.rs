use std::collections::BTreeSet;

/// A run of text shown by one text-showing operator.
///
/// `x` and `y` are the translation components of the text matrix at the
/// moment the operator executed, in unscaled text space. Glyph advance is
/// not modeled, so consecutive show operators without repositioning report
/// the same origin.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextItem {
    /// 0-based page index in page-tree order.
    pub page: usize,
    pub x: f64,
    pub y: f64,
    /// Decoded text. Never empty.
    pub text: String,
    /// Font resource name selected by the last `Tf`, without the leading `/`.
    pub font: Option<String>,
}

/// The result of extracting a whole document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extraction {
    /// Number of pages discovered in the page tree.
    pub page_count: usize,
    /// Items of all pages, page by page, each page in content-stream order.
    pub items: Vec<TextItem>,
}

impl Extraction {
    /// Items belonging to one page, in encounter order.
    pub fn items_on_page(&self, page: usize) -> impl Iterator<Item = &TextItem> {
        self.items.iter().filter(move |item| item.page == page)
    }

    /// Distinct item texts, sorted.
    pub fn unique_texts(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|item| item.text.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
