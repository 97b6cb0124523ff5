//! Document walker: catalog, page tree, per-page fonts and content.
//!
//! Everything is located with tolerant byte-pattern searches over object
//! bodies, so damaged documents still yield whatever pages and fonts can be
//! reached. Problems along the way become warnings, never errors.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use pdfscan_core::{ExtractOptions, ExtractWarning, ExtractWarningCode, ObjectRef};
use regex::bytes::{Captures, Regex};

use crate::cmap::CMap;
use crate::error::BackendError;
use crate::handler::ContentHandler;
use crate::interpreter::interpret_content_stream;
use crate::object_table::{ObjectResolver, ObjectTable};
use crate::stream::{Framing, decode_stream};

/// Font resource name (operand of `Tf`) to the font's ToUnicode map.
pub type FontMap = HashMap<String, Arc<CMap>>;

/// Nesting limit for the page tree walk.
pub const MAX_PAGE_TREE_DEPTH: usize = 64;

macro_rules! pattern {
    ($name:ident, $re:literal) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!("valid regex ", stringify!($name))));
    };
}

pattern!(CATALOG_TYPE_RE, r"(?-u)/Type\s*/Catalog\b");
pattern!(PAGES_REF_RE, r"(?-u)/Pages\s+([0-9]+)\s+([0-9]+)\s+R");
pattern!(PAGE_TYPE_RE, r"(?-u)/Type\s*/Page\b");
pattern!(KIDS_RE, r"(?s-u)/Kids\s*\[(.*?)\]");
pattern!(REF_RE, r"(?-u)([0-9]+)\s+([0-9]+)\s+R");
pattern!(RESOURCES_REF_RE, r"(?-u)/Resources\s+([0-9]+)\s+([0-9]+)\s+R");
pattern!(FONT_DICT_RE, r"(?s-u)/Font\s*<<(.+?)>>");
pattern!(FONT_REF_RE, r"(?-u)/Font\s+([0-9]+)\s+([0-9]+)\s+R");
pattern!(
    FONT_ENTRY_RE,
    r"(?-u)/([^\s/<>\[\]()%{}]+)\s+([0-9]+)\s+([0-9]+)\s+R"
);
pattern!(TO_UNICODE_RE, r"(?-u)/ToUnicode\s+([0-9]+)\s+([0-9]+)\s+R");
pattern!(
    CONTENTS_RE,
    r"(?s-u)/Contents\s*(?:([0-9]+)\s+([0-9]+)\s+R|\[(.*?)\])"
);

/// A page as discovered by the walker.
#[derive(Debug, Clone)]
pub struct Page {
    /// 0-based position in page-tree order.
    pub index: usize,
    pub reference: ObjectRef,
    /// Content stream references, in `/Contents` order.
    pub contents: Vec<ObjectRef>,
    /// Fonts with a usable ToUnicode map.
    pub fonts: FontMap,
    /// Decoded content streams joined with newlines.
    pub content: Vec<u8>,
}

impl Page {
    /// Replay this page's text operators into `handler`.
    ///
    /// Returns the number of items emitted.
    pub fn extract(&self, handler: &mut dyn ContentHandler, options: &ExtractOptions) -> usize {
        interpret_content_stream(&self.content, self.index, &self.fonts, handler, options)
    }
}

/// Walked document: the page list and everything needed to interpret it.
///
/// Immutable after construction; pages can be extracted independently.
#[derive(Debug, Clone, Default)]
pub struct Document {
    catalog: Option<ObjectRef>,
    pages: Vec<Page>,
    object_count: usize,
    warnings: Vec<ExtractWarning>,
}

impl Document {
    /// Scan `data` for objects and walk its page tree.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Limit`] when the input is larger than
    /// `max_input_bytes` or has more pages than `max_pages`.
    pub fn open(data: &[u8], options: &ExtractOptions) -> Result<Self, BackendError> {
        if let Some(max) = options.max_input_bytes {
            if data.len() > max {
                return Err(BackendError::Limit {
                    name: "max_input_bytes",
                    limit: max,
                    actual: data.len(),
                });
            }
        }
        let table = ObjectTable::scan(data);
        Self::from_resolver(&table, options)
    }

    /// Walk the page tree of an already resolved object set.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Limit`] when more than `max_pages` pages
    /// were found.
    pub fn from_resolver<R: ObjectResolver + ?Sized>(
        resolver: &R,
        options: &ExtractOptions,
    ) -> Result<Self, BackendError> {
        let mut walker = Walker {
            resolver,
            options,
            warnings: Vec::new(),
            cmaps: HashMap::new(),
        };

        let Some((catalog, root)) = find_catalog(resolver) else {
            walker.warn(
                ExtractWarning::with_code(
                    ExtractWarningCode::MissingObject,
                    "no document catalog with a /Pages reference",
                ),
            );
            return Ok(Self {
                catalog: None,
                pages: Vec::new(),
                object_count: resolver.object_count(),
                warnings: walker.warnings,
            });
        };

        let page_refs = walker.walk_page_tree(root);

        if let Some(max) = options.max_pages {
            if page_refs.len() > max {
                return Err(BackendError::Limit {
                    name: "max_pages",
                    limit: max,
                    actual: page_refs.len(),
                });
            }
        }

        let pages: Vec<Page> = page_refs
            .into_iter()
            .enumerate()
            .map(|(index, reference)| walker.load_page(index, reference))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            pages = pages.len(),
            fonts = walker.cmaps.len(),
            "walked page tree"
        );

        Ok(Self {
            catalog: Some(catalog),
            pages,
            object_count: resolver.object_count(),
            warnings: walker.warnings,
        })
    }

    pub fn catalog(&self) -> Option<ObjectRef> {
        self.catalog
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Page by 0-based index.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::PageIndex`] if `index` is past the last page.
    pub fn page(&self, index: usize) -> Result<&Page, BackendError> {
        self.pages.get(index).ok_or(BackendError::PageIndex {
            index,
            page_count: self.pages.len(),
        })
    }

    /// Number of indirect objects found in the input.
    pub fn object_count(&self) -> usize {
        self.object_count
    }

    /// Problems met while walking the document, in encounter order.
    pub fn warnings(&self) -> &[ExtractWarning] {
        &self.warnings
    }
}

/// First object, in document order, typed `/Catalog` with a `/Pages`
/// reference. Returns `(catalog, page tree root)`.
pub fn find_catalog<R: ObjectResolver + ?Sized>(resolver: &R) -> Option<(ObjectRef, ObjectRef)> {
    resolver.references().into_iter().find_map(|reference| {
        let body = resolver.body(reference)?;
        if !CATALOG_TYPE_RE.is_match(body) {
            return None;
        }
        let root = PAGES_REF_RE.captures(body).and_then(|c| capture_ref(&c, 1))?;
        Some((reference, root))
    })
}

/// References listed by `/Contents`, either one `N G R` or an array.
pub fn content_refs(page_body: &[u8]) -> Vec<ObjectRef> {
    let Some(caps) = CONTENTS_RE.captures(page_body) else {
        return Vec::new();
    };
    if let Some(single) = capture_ref(&caps, 1) {
        return vec![single];
    }
    caps.get(3).map(|m| refs_in(m.as_bytes())).unwrap_or_default()
}

fn refs_in(bytes: &[u8]) -> Vec<ObjectRef> {
    REF_RE
        .captures_iter(bytes)
        .filter_map(|c| capture_ref(&c, 1))
        .collect()
}

/// Reference formed by capture groups `first` and `first + 1`.
fn capture_ref(caps: &Captures<'_>, first: usize) -> Option<ObjectRef> {
    let number = caps.get(first)?;
    let generation = caps.get(first + 1)?;
    ObjectRef::from_ascii(number.as_bytes(), generation.as_bytes())
}

struct Walker<'r, R: ?Sized> {
    resolver: &'r R,
    options: &'r ExtractOptions,
    warnings: Vec<ExtractWarning>,
    /// Decoded ToUnicode maps by font object; `None` when unusable.
    cmaps: HashMap<ObjectRef, Option<Arc<CMap>>>,
}

impl<R: ObjectResolver + ?Sized> Walker<'_, R> {
    fn warn(&mut self, warning: ExtractWarning) {
        #[cfg(feature = "tracing")]
        tracing::warn!(code = %warning.code, "{}", warning.description);
        self.warnings.push(warning);
    }

    /// Depth-first, in `/Kids` order.
    fn walk_page_tree(&mut self, root: ObjectRef) -> Vec<ObjectRef> {
        let mut pages = Vec::new();
        let mut visited = HashSet::new();
        self.walk_node(root, 0, &mut visited, &mut pages);
        pages
    }

    fn walk_node(
        &mut self,
        reference: ObjectRef,
        depth: usize,
        visited: &mut HashSet<ObjectRef>,
        pages: &mut Vec<ObjectRef>,
    ) {
        let resolver = self.resolver;
        if !visited.insert(reference) {
            return;
        }
        if depth > MAX_PAGE_TREE_DEPTH {
            self.warn(ExtractWarning::with_code(
                ExtractWarningCode::ResourceLimitReached,
                format!("page tree deeper than {MAX_PAGE_TREE_DEPTH} at {reference}"),
            ));
            return;
        }
        let Some(body) = resolver.body(reference) else {
            let warning = missing("page tree node", reference);
            self.warn(warning);
            return;
        };
        if PAGE_TYPE_RE.is_match(body) {
            pages.push(reference);
            return;
        }
        let Some(kids) = KIDS_RE.captures(body).and_then(|c| c.get(1)) else {
            return;
        };
        for kid in refs_in(kids.as_bytes()) {
            self.walk_node(kid, depth + 1, visited, pages);
        }
    }

    fn load_page(&mut self, index: usize, reference: ObjectRef) -> Page {
        let resolver = self.resolver;
        let (fonts, contents) = match resolver.body(reference) {
            Some(body) => (self.page_fonts(index, body), content_refs(body)),
            None => (FontMap::new(), Vec::new()),
        };
        let content = self.load_content(index, &contents);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            page = index,
            streams = contents.len(),
            fonts = fonts.len(),
            bytes = content.len(),
            "loaded page"
        );

        Page {
            index,
            reference,
            contents,
            fonts,
            content,
        }
    }

    /// Fonts from `/Resources` (indirect, else the page body itself).
    fn page_fonts(&mut self, page: usize, page_body: &[u8]) -> FontMap {
        let resolver = self.resolver;
        let resources = match RESOURCES_REF_RE
            .captures(page_body)
            .and_then(|c| capture_ref(&c, 1))
        {
            Some(reference) => match resolver.body(reference) {
                Some(body) => body,
                None => {
                    let warning = missing("resources", reference).on_page(page);
                    self.warn(warning);
                    return FontMap::new();
                }
            },
            None => page_body,
        };

        let entries: Vec<(String, ObjectRef)> = match font_dict(resolver, resources) {
            Some(dict) => FONT_ENTRY_RE
                .captures_iter(dict)
                .filter_map(|c| {
                    let name = c.get(1)?.as_bytes().iter().map(|&b| char::from(b)).collect();
                    Some((name, capture_ref(&c, 2)?))
                })
                .collect(),
            None => Vec::new(),
        };

        let mut fonts = FontMap::new();
        for (name, font_ref) in entries {
            if let Some(cmap) = self.font_cmap(page, &name, font_ref) {
                fonts.insert(name, cmap);
            }
        }
        fonts
    }

    /// ToUnicode map of a font object, decoded once per document.
    fn font_cmap(&mut self, page: usize, name: &str, font_ref: ObjectRef) -> Option<Arc<CMap>> {
        if let Some(cached) = self.cmaps.get(&font_ref) {
            return cached.clone();
        }
        let cmap = self.decode_font_cmap(page, name, font_ref);
        self.cmaps.insert(font_ref, cmap.clone());
        cmap
    }

    fn decode_font_cmap(
        &mut self,
        page: usize,
        name: &str,
        font_ref: ObjectRef,
    ) -> Option<Arc<CMap>> {
        let resolver = self.resolver;
        let Some(font_body) = resolver.body(font_ref) else {
            let warning = missing("font", font_ref).on_page(page).with_font(name);
            self.warn(warning);
            return None;
        };
        let to_unicode = TO_UNICODE_RE
            .captures(font_body)
            .and_then(|c| capture_ref(&c, 1))?;
        let Some(cmap_body) = resolver.body(to_unicode) else {
            let warning = missing("ToUnicode stream", to_unicode)
                .on_page(page)
                .with_font(name);
            self.warn(warning);
            return None;
        };
        let Some(decoded) = decode_stream(cmap_body, self.options.max_stream_bytes) else {
            self.warn(
                ExtractWarning::with_code(
                    ExtractWarningCode::MissingStream,
                    format!("ToUnicode object {to_unicode} has no stream"),
                )
                .on_page(page)
                .with_font(name),
            );
            return None;
        };
        self.check_decoded(page, to_unicode, decoded.framing, decoded.truncated);

        let cmap = CMap::parse(&decoded.data);
        (!cmap.is_empty()).then(|| Arc::new(cmap))
    }

    fn load_content(&mut self, page: usize, refs: &[ObjectRef]) -> Vec<u8> {
        let resolver = self.resolver;
        let mut content = Vec::new();
        let mut joined = false;
        for &reference in refs {
            let Some(body) = resolver.body(reference) else {
                let warning = missing("content stream", reference).on_page(page);
                self.warn(warning);
                continue;
            };
            let Some(decoded) = decode_stream(body, self.options.max_stream_bytes) else {
                self.warn(
                    ExtractWarning::with_code(
                        ExtractWarningCode::MissingStream,
                        format!("content object {reference} has no stream"),
                    )
                    .on_page(page),
                );
                continue;
            };
            self.check_decoded(page, reference, decoded.framing, decoded.truncated);
            if joined {
                content.push(b'\n');
            }
            joined = true;
            content.extend_from_slice(&decoded.data);
        }
        content
    }

    fn check_decoded(&mut self, page: usize, reference: ObjectRef, framing: Framing, truncated: bool) {
        if framing == Framing::Passthrough {
            self.warn(
                ExtractWarning::with_code(
                    ExtractWarningCode::DecodeFallback,
                    format!("stream {reference} did not inflate, raw bytes used"),
                )
                .on_page(page),
            );
        }
        if truncated {
            self.warn(
                ExtractWarning::with_code(
                    ExtractWarningCode::ResourceLimitReached,
                    format!(
                        "stream {reference} truncated at max_stream_bytes ({})",
                        self.options.max_stream_bytes
                    ),
                )
                .on_page(page),
            );
        }
    }
}

fn missing(what: &str, reference: ObjectRef) -> ExtractWarning {
    ExtractWarning::with_code(
        ExtractWarningCode::MissingObject,
        format!("{what} {reference} not found"),
    )
}

/// Body of the `/Font` dictionary: inline `<< ... >>` or an indirect one.
fn font_dict<'b, R: ObjectResolver + ?Sized>(resolver: &'b R, resources: &'b [u8]) -> Option<&'b [u8]> {
    if let Some(inline) = FONT_DICT_RE.captures(resources).and_then(|c| c.get(1)) {
        return Some(inline.as_bytes());
    }
    let reference = FONT_REF_RE
        .captures(resources)
        .and_then(|c| capture_ref(&c, 1))?;
    resolver.body(reference)
}
