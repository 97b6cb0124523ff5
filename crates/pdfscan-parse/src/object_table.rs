//! Indirect object discovery.
//!
//! Scans raw PDF bytes for `N G obj ... endobj` definitions without consulting
//! the cross-reference table, so documents with damaged or missing xrefs still
//! yield their objects.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

use pdfscan_core::ObjectRef;
use regex::bytes::Regex;

static OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)([0-9]+)\s+([0-9]+)\s+obj(.*?)endobj").expect("valid object regex")
});

/// Read access to object bodies by reference.
///
/// Implemented by [`ObjectTable`] for scanned documents and by plain maps so
/// the walker can run over hand-assembled object sets.
pub trait ObjectResolver {
    /// Body bytes of the object, trimmed of surrounding whitespace.
    fn body(&self, reference: ObjectRef) -> Option<&[u8]>;

    /// Number of distinct objects known.
    fn object_count(&self) -> usize;

    /// All known references, in first-appearance order where applicable.
    fn references(&self) -> Vec<ObjectRef>;
}

/// Object map produced by [`ObjectTable::scan`].
///
/// Borrows the input buffer; bodies are slices into it.
#[derive(Debug, Clone)]
pub struct ObjectTable<'a> {
    data: &'a [u8],
    spans: HashMap<ObjectRef, Range<usize>>,
    order: Vec<ObjectRef>,
}

impl<'a> ObjectTable<'a> {
    /// Find every indirect object definition in `data`.
    ///
    /// Matches are non-overlapping and taken left to right. When an object
    /// number and generation are defined more than once, the later body wins
    /// while the reference keeps its first-appearance position. Definitions
    /// whose numbers do not fit the reference types are skipped.
    pub fn scan(data: &'a [u8]) -> Self {
        let mut spans = HashMap::new();
        let mut order = Vec::new();

        for caps in OBJECT_RE.captures_iter(data) {
            let (Some(num), Some(generation), Some(body)) = (caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };
            let Some(reference) = ObjectRef::from_ascii(num.as_bytes(), generation.as_bytes())
            else {
                continue;
            };
            let span = trim_span(data, body.range());
            if spans.insert(reference, span).is_none() {
                order.push(reference);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(objects = order.len(), "scanned object table");

        Self { data, spans, order }
    }

    /// The buffer this table was scanned from.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Body bytes for `reference`, or `None` if it was never defined.
    pub fn get(&self, reference: ObjectRef) -> Option<&'a [u8]> {
        self.spans
            .get(&reference)
            .map(|span| &self.data[span.clone()])
    }

    /// Number of distinct objects.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no object definitions were found.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate `(reference, body)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectRef, &'a [u8])> + '_ {
        self.order
            .iter()
            .filter_map(move |r| self.get(*r).map(|body| (*r, body)))
    }
}

impl ObjectResolver for ObjectTable<'_> {
    fn body(&self, reference: ObjectRef) -> Option<&[u8]> {
        self.get(reference)
    }

    fn object_count(&self) -> usize {
        self.len()
    }

    fn references(&self) -> Vec<ObjectRef> {
        self.order.clone()
    }
}

impl ObjectResolver for HashMap<ObjectRef, Vec<u8>> {
    fn body(&self, reference: ObjectRef) -> Option<&[u8]> {
        self.get(&reference).map(Vec::as_slice)
    }

    fn object_count(&self) -> usize {
        self.len()
    }

    fn references(&self) -> Vec<ObjectRef> {
        let mut refs: Vec<ObjectRef> = self.keys().copied().collect();
        refs.sort();
        refs
    }
}

fn trim_span(data: &[u8], span: Range<usize>) -> Range<usize> {
    let slice = &data[span.clone()];
    let trimmed = slice.trim_ascii();
    if trimmed.is_empty() {
        return span.start..span.start;
    }
    let lead = slice.len() - slice.trim_ascii_start().len();
    let start = span.start + lead;
    start..start + trimmed.len()
}
