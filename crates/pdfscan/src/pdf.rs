//! Top-level PDF document type for opening and extracting text.

use pdfscan_core::{
    ExtractOptions, ExtractResult, ExtractWarning, Extraction, PdfError, TextItem, UnicodeNorm,
    normalize_items,
};
use pdfscan_parse::{ContentHandler, Document};

use crate::Page;

/// Iterator over pages of a PDF document, yielding each page on demand.
///
/// Created by [`Pdf::pages_iter()`]. Each call to [`next()`](Iterator::next)
/// interprets one page's content. Pages are not retained after being
/// yielded; the caller owns the `Page` value.
pub struct PagesIter<'a> {
    pdf: &'a Pdf,
    current: usize,
    count: usize,
}

impl Iterator for PagesIter<'_> {
    type Item = Result<Page, PdfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.count {
            return None;
        }
        let result = self.pdf.page(self.current);
        self.current += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PagesIter<'_> {}

/// A PDF document opened for extraction.
///
/// Opening scans the objects, walks the page tree and decodes each page's
/// fonts and content streams. Text is interpreted per page on request, so
/// pages can be extracted in any order or in parallel.
///
/// # Example
///
/// ```ignore
/// let pdf = Pdf::open(bytes, None)?;
/// let page = pdf.page(0)?;
/// println!("{}", page.text("\n"));
/// ```
#[derive(Debug)]
pub struct Pdf {
    doc: Document,
    options: ExtractOptions,
}

/// Internal handler that collects interpreter output for one page.
struct CollectingHandler {
    items: Vec<TextItem>,
    warnings: Vec<ExtractWarning>,
    page_index: usize,
    collect_warnings: bool,
}

impl CollectingHandler {
    fn new(page_index: usize, collect_warnings: bool) -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
            page_index,
            collect_warnings,
        }
    }
}

impl ContentHandler for CollectingHandler {
    fn on_text(&mut self, item: TextItem) {
        self.items.push(item);
    }

    fn on_warning(&mut self, mut warning: ExtractWarning) {
        if self.collect_warnings {
            // Decorate warnings with page context
            if warning.page.is_none() {
                warning.page = Some(self.page_index);
            }
            self.warnings.push(warning);
        }
    }
}

impl Pdf {
    /// Open a PDF document from bytes.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw PDF file bytes.
    /// * `options` - Extraction options (resource limits, etc.). Uses defaults if `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::ResourceLimitExceeded`] if the input exceeds
    /// `max_input_bytes` or the page tree holds more than `max_pages` pages.
    /// In strict mode, the first problem met while walking the document is
    /// returned as [`PdfError::Other`]. Damaged input is otherwise never an
    /// error: unreadable parts are skipped.
    pub fn open(bytes: &[u8], options: Option<ExtractOptions>) -> Result<Self, PdfError> {
        let options = options.unwrap_or_default();
        let doc = Document::open(bytes, &options).map_err(PdfError::from)?;

        if options.strict_mode {
            if let Some(warning) = doc.warnings().first() {
                return Err(warning.to_error());
            }
        }

        Ok(Self { doc, options })
    }

    /// Return the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    /// Return the options this document was opened with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Return the walked document: page objects, content and font maps.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Warnings raised while opening the document (missing objects,
    /// undecodable streams). Empty when `collect_warnings` is off.
    pub fn warnings(&self) -> &[ExtractWarning] {
        if self.options.collect_warnings {
            self.doc.warnings()
        } else {
            &[]
        }
    }

    /// Return an iterator that yields pages one at a time.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let pdf = Pdf::open(bytes, None)?;
    /// for result in pdf.pages_iter() {
    ///     let page = result?;
    ///     println!("Page {}: {}", page.index(), page.text(" "));
    /// }
    /// ```
    pub fn pages_iter(&self) -> PagesIter<'_> {
        PagesIter {
            pdf: self,
            current: 0,
            count: self.page_count(),
        }
    }

    /// Process all pages in parallel using rayon, returning a Vec of Results.
    ///
    /// The returned Vec is ordered by page index (0-based).
    ///
    /// # Example
    ///
    /// ```ignore
    /// let pdf = Pdf::open(bytes, None)?;
    /// let pages: Vec<Page> = pdf.pages_parallel()
    ///     .into_iter()
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// ```
    #[cfg(feature = "parallel")]
    pub fn pages_parallel(&self) -> Vec<Result<Page, PdfError>> {
        use rayon::prelude::*;

        (0..self.page_count())
            .into_par_iter()
            .map(|i| self.page(i))
            .collect()
    }

    /// Access a page by 0-based index, interpreting its text operators.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::PageOutOfRange`] if the index is past the last
    /// page. In strict mode, the first warning raised on the page is
    /// returned as [`PdfError::Other`].
    pub fn page(&self, index: usize) -> Result<Page, PdfError> {
        let parsed = self.doc.page(index).map_err(PdfError::from)?;

        let collect = self.options.collect_warnings || self.options.strict_mode;
        let mut handler = CollectingHandler::new(index, collect);
        parsed.extract(&mut handler, &self.options);

        if self.options.strict_mode {
            if let Some(warning) = handler.warnings.first() {
                return Err(warning.to_error());
            }
        }

        let CollectingHandler {
            mut items,
            warnings,
            ..
        } = handler;

        // Apply Unicode normalization if configured
        if self.options.unicode_norm != UnicodeNorm::None {
            normalize_items(&mut items, self.options.unicode_norm);
        }

        Ok(Page::new(index, parsed.reference, items, warnings))
    }

    /// Extract every page, in page-tree order.
    ///
    /// The warnings hold the document-level warnings followed by each
    /// page's warnings.
    ///
    /// # Errors
    ///
    /// Only in strict mode, where the first warning becomes an error.
    pub fn extract(&self) -> Result<ExtractResult<Extraction>, PdfError> {
        let mut items = Vec::new();
        let mut warnings = self.warnings().to_vec();

        for page in self.pages_iter() {
            let (page_items, page_warnings) = page?.into_parts();
            items.extend(page_items);
            warnings.extend(page_warnings);
        }

        Ok(ExtractResult::with_warnings(
            Extraction {
                page_count: self.page_count(),
                items,
            },
            warnings,
        ))
    }
}

/// Open `bytes` with default options and extract every page.
///
/// # Errors
///
/// Never fails with default options; see [`Pdf::open`] and
/// [`Pdf::extract`] for the failures configurable limits introduce.
pub fn extract(bytes: &[u8]) -> Result<ExtractResult<Extraction>, PdfError> {
    Pdf::open(bytes, None)?.extract()
}
