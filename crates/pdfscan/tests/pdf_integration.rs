//! End-to-end extraction through the public API.
//!
//! PDFs are built programmatically with lopdf, or assembled by hand where
//! the byte layout itself is under test (raw deflate, missing xref).

use std::io::Write;

use flate2::Compression;
use flate2::write::{DeflateEncoder, ZlibEncoder};
use lopdf::{Object, ObjectId, Stream, dictionary};
use pdfscan::{ExtractOptions, ExtractWarningCode, Pdf, TextItem, extract};

// --- Test PDF creation helpers ---

const TWO_BYTE_CMAP: &str = "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
3 beginbfchar
<0001> <0048>
<0002> <0069>
<0100> <00E9>
endbfchar
1 beginbfrange
<0010> <0012> <0041>
endbfrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end
";

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn raw_deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Assemble a document from page content streams sharing one font `F1`.
///
/// With `to_unicode`, F1 carries a ToUnicode CMap. With `compress`, content
/// streams are Flate-encoded.
fn build_pdf(pages: &[Vec<Vec<u8>>], to_unicode: Option<&str>, compress: bool) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");

    let mut font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "TestSans",
    };
    if let Some(cmap) = to_unicode {
        let cmap_id = doc.add_object(Stream::new(dictionary! {}, cmap.as_bytes().to_vec()));
        font.set("ToUnicode", Object::Reference(cmap_id));
    }
    let font_id = doc.add_object(font);

    let mut page_ids: Vec<ObjectId> = Vec::new();
    for streams in pages {
        let contents: Vec<Object> = streams
            .iter()
            .map(|content| {
                let stream = if compress {
                    Stream::new(dictionary! { "Filter" => "FlateDecode" }, zlib(content))
                } else {
                    Stream::new(dictionary! {}, content.clone())
                };
                Object::Reference(doc.add_object(stream))
            })
            .collect();

        let page_dict = dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Contents" => contents,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        };
        page_ids.push(doc.add_object(page_dict));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(pages.len() as i64),
    });

    for &pid in &page_ids {
        if let Ok(page_obj) = doc.get_object_mut(pid) {
            if let Ok(dict) = page_obj.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn single(content: &str) -> Vec<Vec<u8>> {
    vec![content.as_bytes().to_vec()]
}

fn texts(items: &[TextItem]) -> Vec<&str> {
    items.iter().map(|i| i.text.as_str()).collect()
}

// --- Tests ---

#[test]
fn lopdf_document_single_page() {
    let bytes = build_pdf(
        &[single("BT /F1 12 Tf 72 720 Td (Hello World) Tj ET")],
        None,
        false,
    );
    let result = extract(&bytes).unwrap();
    assert!(result.is_clean(), "{:?}", result.warnings);
    assert_eq!(result.value.page_count, 1);
    assert_eq!(
        result.value.items,
        vec![TextItem {
            page: 0,
            x: 72.0,
            y: 720.0,
            text: "Hello World".to_string(),
            font: Some("F1".to_string()),
        }]
    );
}

#[test]
fn multi_page_order_and_positions() {
    let bytes = build_pdf(
        &[
            single("BT /F1 10 Tf 72 720 Td (first) Tj 0 -14 Td (second) Tj ET"),
            single("BT /F1 10 Tf 14 TL 50 600 Td T* (third) Tj ET"),
        ],
        None,
        false,
    );
    let pdf = Pdf::open(&bytes, None).unwrap();
    assert_eq!(pdf.page_count(), 2);

    let result = pdf.extract().unwrap();
    let positions: Vec<(usize, f64, f64, &str)> = result
        .value
        .items
        .iter()
        .map(|i| (i.page, i.x, i.y, i.text.as_str()))
        .collect();
    assert_eq!(
        positions,
        vec![
            (0, 72.0, 720.0, "first"),
            (0, 72.0, 706.0, "second"),
            (1, 50.0, 586.0, "third"),
        ]
    );
}

#[test]
fn to_unicode_cmap_decodes_two_byte_codes() {
    let bytes = build_pdf(
        &[single(
            "BT /F1 12 Tf 10 10 Td <00010002> Tj [<0100> -120 <001000110012>] TJ ET",
        )],
        Some(TWO_BYTE_CMAP),
        false,
    );
    let result = extract(&bytes).unwrap();
    assert_eq!(texts(&result.value.items), vec!["Hi", "\u{e9}ABC"]);
    assert!(result.value.items.iter().all(|i| i.font.as_deref() == Some("F1")));
}

#[test]
fn flate_content_streams_are_inflated() {
    let bytes = build_pdf(
        &[single("BT /F1 12 Tf 100 200 Td <0001> Tj ET")],
        Some(TWO_BYTE_CMAP),
        true,
    );
    let result = extract(&bytes).unwrap();
    assert!(result.is_clean(), "{:?}", result.warnings);
    assert_eq!(texts(&result.value.items), vec!["H"]);
    assert_eq!((result.value.items[0].x, result.value.items[0].y), (100.0, 200.0));
}

#[test]
fn content_array_shares_one_text_state() {
    let bytes = build_pdf(
        &[vec![
            b"BT /F1 12 Tf 30 40 Td".to_vec(),
            b"(split) Tj ET".to_vec(),
        ]],
        None,
        false,
    );
    let result = extract(&bytes).unwrap();
    assert_eq!(result.value.items.len(), 1);
    assert_eq!(result.value.items[0].x, 30.0);
    assert_eq!(result.value.items[0].font.as_deref(), Some("F1"));
}

#[test]
fn text_outside_bt_et_is_ignored() {
    let bytes = build_pdf(&[single("(stray) Tj BT (kept) Tj ET (late) Tj")], None, false);
    let result = extract(&bytes).unwrap();
    assert_eq!(texts(&result.value.items), vec!["kept"]);
}

#[test]
fn missing_xref_still_extracts() {
    let bytes = build_pdf(&[single("BT (survivor) Tj ET")], None, false);
    // Cut everything from the cross-reference section on.
    let cut = bytes
        .windows(4)
        .position(|w| w == b"xref")
        .unwrap_or(bytes.len());
    let result = extract(&bytes[..cut]).unwrap();
    assert_eq!(texts(&result.value.items), vec!["survivor"]);
}

/// Hand-assembled document whose content stream is raw deflate under a
/// `/FlateDecode` filter.
fn raw_deflate_pdf() -> Vec<u8> {
    let payload = raw_deflate(b"BT /F1 9 Tf 1 0 0 1 5 6 Tm (raw) Tj ET");
    let mut out = Vec::new();
    out.extend_from_slice(
        b"%PDF-1.4\n\
          1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
          2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n\
          3 0 obj\n<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>\nendobj\n",
    );
    out.extend_from_slice(
        format!(
            "4 0 obj\n<< /Length {} /Filter /FlateDecode >>\nstream\n",
            payload.len()
        )
        .as_bytes(),
    );
    out.extend_from_slice(&payload);
    out.extend_from_slice(b"\nendstream\nendobj\n%%EOF\n");
    out
}

#[test]
fn raw_deflate_stream_decodes_via_fallback() {
    let result = extract(&raw_deflate_pdf()).unwrap();
    assert!(result.is_clean(), "{:?}", result.warnings);
    assert_eq!(
        result.value.items,
        vec![TextItem {
            page: 0,
            x: 5.0,
            y: 6.0,
            text: "raw".to_string(),
            font: Some("F1".to_string()),
        }]
    );
}

#[test]
fn undecodable_stream_warns_and_continues() {
    let bytes = b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj \
                  2 0 obj << /Type /Pages /Kids [3 0 R] >> endobj \
                  3 0 obj << /Type /Page /Contents 4 0 R >> endobj \
                  4 0 obj << /Filter /FlateDecode >>\nstream\nBT (plain) Tj ET\nendstream\nendobj";
    let result = extract(bytes).unwrap();
    // Passthrough bytes are still interpreted.
    assert_eq!(texts(&result.value.items), vec!["plain"]);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, ExtractWarningCode::DecodeFallback);
    assert_eq!(result.warnings[0].page, Some(0));
}

#[test]
fn max_stream_bytes_truncates_content() {
    let bytes = build_pdf(&[single("BT (kept) Tj (dropped) Tj ET")], None, true);
    let options = ExtractOptions {
        max_stream_bytes: 13,
        ..ExtractOptions::default()
    };
    let result = Pdf::open(&bytes, Some(options)).unwrap().extract().unwrap();
    assert_eq!(texts(&result.value.items), vec!["kept"]);
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.code == ExtractWarningCode::ResourceLimitReached)
    );
}

#[test]
fn unique_texts_are_sorted_and_distinct() {
    let bytes = build_pdf(
        &[
            single("BT (b) Tj (a) Tj ET"),
            single("BT (b) Tj (c) Tj ET"),
        ],
        None,
        false,
    );
    let result = extract(&bytes).unwrap();
    assert_eq!(result.value.unique_texts(), vec!["a", "b", "c"]);
    assert_eq!(result.value.items_on_page(1).count(), 2);
}

#[cfg(feature = "serde")]
#[test]
fn extraction_serializes_to_json() {
    let bytes = build_pdf(&[single("BT /F1 12 Tf 1 2 Td (json) Tj ET")], None, false);
    let result = extract(&bytes).unwrap();
    let json = serde_json::to_value(&result.value).unwrap();
    assert_eq!(json["page_count"], 1);
    assert_eq!(json["items"][0]["text"], "json");
    assert_eq!(json["items"][0]["font"], "F1");
}
