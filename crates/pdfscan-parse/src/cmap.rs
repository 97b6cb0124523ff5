//! ToUnicode CMap parser for mapping character codes to Unicode strings.
//!
//! Parses the `beginbfchar` and `beginbfrange` blocks of a decoded
//! `/ToUnicode` stream. Each block header carries its entry count, and exactly
//! that many following lines are read as entries. Destination strings are
//! UTF-16BE encoded.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::bytes::Regex;

static HEX_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)<([0-9A-Fa-f]+)>").expect("valid hex token regex"));

/// Upper bound on codes produced by one contiguous `bfrange` entry.
pub const MAX_RANGE_CODES: u32 = 65_536;

/// A parsed ToUnicode CMap that maps character codes to Unicode strings.
///
/// Unicode values may be single characters or multi-character strings
/// (e.g., ligatures like "ﬁ" → "fi"), or empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CMap {
    /// Mapping from character code to Unicode string.
    mappings: HashMap<u32, String>,
    /// Whether any code exceeds one byte.
    two_byte: bool,
}

#[derive(Clone, Copy)]
enum Block {
    Char,
    Range,
}

impl CMap {
    /// Parse a ToUnicode CMap from its decoded byte content.
    ///
    /// Never fails: lines that do not have the expected shape are skipped and
    /// an input without blocks yields an empty map.
    pub fn parse(data: &[u8]) -> Self {
        let lines = split_lines(data);
        let mut mappings = HashMap::new();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i].trim_ascii();
            let block = if line.ends_with(b"beginbfchar") {
                Some(Block::Char)
            } else if line.ends_with(b"beginbfrange") {
                Some(Block::Range)
            } else {
                None
            };

            if let Some(block) = block {
                let count = block_count(line);
                for _ in 0..count {
                    i += 1;
                    let Some(entry) = lines.get(i) else {
                        break;
                    };
                    match block {
                        Block::Char => parse_bfchar_line(entry, &mut mappings),
                        Block::Range => parse_bfrange_line(entry, &mut mappings),
                    }
                }
            }
            i += 1;
        }

        let two_byte = mappings.keys().any(|&code| code > 0xFF);
        CMap { mappings, two_byte }
    }

    /// Look up the Unicode string for a character code.
    ///
    /// Returns `None` if the code has no mapping in this CMap.
    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(|s| s.as_str())
    }

    /// Whether text shown with this CMap is read two bytes per code.
    pub fn is_two_byte(&self) -> bool {
        self.two_byte
    }

    /// Returns the number of mappings in this CMap.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns true if this CMap has no mappings.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Split on LF, CR, or CRLF.
fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'\n' => {
                lines.push(&data[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&data[start..i]);
                if data.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < data.len() {
        lines.push(&data[start..]);
    }
    lines
}

/// Entry count from the first token of a block header; non-numeric is 0.
fn block_count(header: &[u8]) -> usize {
    header
        .split(|b| b.is_ascii_whitespace())
        .find(|tok| !tok.is_empty())
        .and_then(|tok| std::str::from_utf8(tok).ok())
        .and_then(|tok| tok.parse().ok())
        .unwrap_or(0)
}

/// Extract all `<hex>` tokens from a line.
fn hex_tokens(line: &[u8]) -> Vec<&[u8]> {
    HEX_TOKEN_RE
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_bytes())
        .collect()
}

/// Parse a hex token like `0041` into a code. `None` if wider than 32 bits.
fn parse_hex_code(hex: &[u8]) -> Option<u32> {
    let text = std::str::from_utf8(hex).ok()?;
    u32::from_str_radix(text, 16).ok()
}

/// Decode a hex token as UTF-16BE.
///
/// Bytes are paired big-endian; an odd trailing byte is ignored, so a
/// two-digit token decodes to the empty string. Unpaired surrogates become
/// U+FFFD.
fn decode_utf16be_hex(hex: &[u8]) -> String {
    let bytes: Vec<u8> = hex
        .chunks(2)
        .map(|pair| {
            let hi = hex_value(pair[0]);
            let lo = pair.get(1).map_or(0, |&d| hex_value(d));
            (hi << 4) | lo
        })
        .collect();
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

/// UTF-16BE rendering of a numeric destination: one unit up to 0xFFFF,
/// otherwise the high and low halves as two units.
fn decode_utf16be_value(value: u32) -> String {
    match u16::try_from(value) {
        Ok(unit) => String::from_utf16_lossy(&[unit]),
        Err(_) => String::from_utf16_lossy(&[(value >> 16) as u16, value as u16]),
    }
}

/// `<src> <dst>`
fn parse_bfchar_line(line: &[u8], mappings: &mut HashMap<u32, String>) {
    let tokens = hex_tokens(line);
    if tokens.len() < 2 {
        return;
    }
    if let Some(code) = parse_hex_code(tokens[0]) {
        mappings.insert(code, decode_utf16be_hex(tokens[1]));
    }
}

/// `<lo> <hi> <dst>` or `<lo> <hi> [<d0> <d1> ...]`
fn parse_bfrange_line(line: &[u8], mappings: &mut HashMap<u32, String>) {
    let tokens = hex_tokens(line);

    if line.contains(&b'[') {
        if tokens.len() < 2 {
            return;
        }
        let (Some(lo), Some(hi)) = (parse_hex_code(tokens[0]), parse_hex_code(tokens[1])) else {
            return;
        };
        for (offset, dst) in tokens[2..].iter().enumerate() {
            let Some(code) = u32::try_from(offset).ok().and_then(|o| lo.checked_add(o)) else {
                break;
            };
            if code > hi {
                break;
            }
            mappings.insert(code, decode_utf16be_hex(dst));
        }
        return;
    }

    if tokens.len() < 3 {
        return;
    }
    let (Some(lo), Some(hi), Some(dst)) = (
        parse_hex_code(tokens[0]),
        parse_hex_code(tokens[1]),
        parse_hex_code(tokens[2]),
    ) else {
        return;
    };
    if hi < lo {
        return;
    }
    let span = (hi - lo).min(MAX_RANGE_CODES - 1);
    for offset in 0..=span {
        let Some(code) = lo.checked_add(offset) else {
            break;
        };
        mappings.insert(code, decode_utf16be_value(dst.wrapping_add(offset)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- CMap construction and basic lookup ---

    #[test]
    fn empty_cmap_returns_none() {
        let cmap = CMap::parse(b"");
        assert!(cmap.is_empty());
        assert_eq!(cmap.len(), 0);
        assert_eq!(cmap.lookup(0x0041), None);
        assert!(!cmap.is_two_byte());
    }

    // --- beginbfchar ---

    #[test]
    fn bfchar_single_mapping() {
        let data = b"\
            1 beginbfchar\n\
            <0041> <0041>\n\
            endbfchar\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.lookup(0x0041), Some("A"));
    }

    #[test]
    fn bfchar_multiple_mappings() {
        let data = b"\
            3 beginbfchar\n\
            <0041> <0041>\n\
            <0042> <0042>\n\
            <0043> <0043>\n\
            endbfchar\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.lookup(0x0041), Some("A"));
        assert_eq!(cmap.lookup(0x0042), Some("B"));
        assert_eq!(cmap.lookup(0x0043), Some("C"));
        assert_eq!(cmap.len(), 3);
    }

    #[test]
    fn bfchar_reads_exactly_count_lines() {
        let data = b"\
            1 beginbfchar\n\
            <01> <0041>\n\
            <02> <0042>\n\
            endbfchar\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.lookup(0x01), Some("A"));
        assert_eq!(cmap.lookup(0x02), None);
    }

    #[test]
    fn non_numeric_count_reads_nothing() {
        let data = b"\
            beginbfchar\n\
            <01> <0041>\n\
            endbfchar\n";
        assert!(CMap::parse(data).is_empty());
    }

    #[test]
    fn count_past_end_of_input() {
        let data = b"5 beginbfchar\n<01> <0041>\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.len(), 1);
    }

    #[test]
    fn bfchar_single_byte_codes_are_one_byte_map() {
        let data = b"\
            1 beginbfchar\n\
            <41> <0041>\n\
            endbfchar\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.lookup(0x41), Some("A"));
        assert!(!cmap.is_two_byte());
    }

    #[test]
    fn key_above_255_makes_map_two_byte() {
        let data = b"2 beginbfchar\n<01> <0041>\n<0100> <0042>\n";
        assert!(CMap::parse(data).is_two_byte());
    }

    #[test]
    fn bfchar_multi_char_unicode_ligature() {
        let data = b"1 beginbfchar\n<0001> <00660069>\nendbfchar\n";
        assert_eq!(CMap::parse(data).lookup(0x0001), Some("fi"));
    }

    #[test]
    fn bfchar_non_bmp_character() {
        // U+1F600 as surrogate pair D83D DE00
        let data = b"1 beginbfchar\n<0005> <D83DDE00>\nendbfchar\n";
        assert_eq!(CMap::parse(data).lookup(0x0005), Some("\u{1F600}"));
    }

    #[test]
    fn bfchar_unpaired_surrogate_is_replaced() {
        let data = b"1 beginbfchar\n<0005> <D83D>\nendbfchar\n";
        assert_eq!(CMap::parse(data).lookup(0x0005), Some("\u{FFFD}"));
    }

    #[test]
    fn bfchar_two_digit_destination_is_empty() {
        let data = b"1 beginbfchar\n<07> <41>\nendbfchar\n";
        assert_eq!(CMap::parse(data).lookup(0x07), Some(""));
    }

    #[test]
    fn bfchar_odd_trailing_byte_ignored() {
        let data = b"1 beginbfchar\n<07> <004142>\nendbfchar\n";
        assert_eq!(CMap::parse(data).lookup(0x07), Some("A"));
    }

    #[test]
    fn bfchar_with_surrounding_cmap_boilerplate() {
        let data = b"\
            /CIDInit /ProcSet findresource begin\n\
            12 dict begin\n\
            begincmap\n\
            /CMapName /Adobe-Identity-UCS def\n\
            1 begincodespacerange\n\
            <0000> <FFFF>\n\
            endcodespacerange\n\
            2 beginbfchar\n\
            <0003> <0020>\n\
            <0011> <002E>\n\
            endbfchar\n\
            endcmap\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.len(), 2);
        assert_eq!(cmap.lookup(0x0003), Some(" "));
        assert_eq!(cmap.lookup(0x0011), Some("."));
        // codespacerange is not a mapping block
        assert_eq!(cmap.lookup(0x0000), None);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let data = b"\
            3 beginbfchar\n\
            <0041>\n\
            garbage here\n\
            <0042> <0042>\n\
            endbfchar\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.len(), 1);
        assert_eq!(cmap.lookup(0x42), Some("B"));
    }

    // --- beginbfrange ---

    #[test]
    fn bfrange_contiguous() {
        let data = b"1 beginbfrange\n<0003> <0005> <0044>\nendbfrange\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.lookup(3), Some("D"));
        assert_eq!(cmap.lookup(4), Some("E"));
        assert_eq!(cmap.lookup(5), Some("F"));
        assert_eq!(cmap.len(), 3);
    }

    #[test]
    fn bfrange_array_destination() {
        let data = b"1 beginbfrange\n<0000> <0002> [<0041> <0042> <0043> <0044>]\nendbfrange\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.lookup(0), Some("A"));
        assert_eq!(cmap.lookup(1), Some("B"));
        assert_eq!(cmap.lookup(2), Some("C"));
        assert_eq!(cmap.lookup(3), None);
        assert_eq!(cmap.len(), 3);
    }

    #[test]
    fn bfrange_array_shorter_than_range() {
        let data = b"1 beginbfrange\n<0010> <0015> [<0058>]\nendbfrange\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.lookup(0x10), Some("X"));
        assert_eq!(cmap.len(), 1);
    }

    #[test]
    fn bfrange_single_code() {
        let data = b"1 beginbfrange\n<0020> <0020> <0041>\nendbfrange\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.len(), 1);
        assert_eq!(cmap.lookup(0x20), Some("A"));
    }

    #[test]
    fn bfrange_end_before_start_maps_nothing() {
        let data = b"1 beginbfrange\n<0005> <0003> <0041>\nendbfrange\n";
        assert!(CMap::parse(data).is_empty());
    }

    #[test]
    fn bfrange_increments_low_surrogate() {
        let data = b"1 beginbfrange\n<0001> <0002> <D83DDE00>\nendbfrange\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.lookup(1), Some("\u{1F600}"));
        assert_eq!(cmap.lookup(2), Some("\u{1F601}"));
    }

    #[test]
    fn bfrange_is_clamped() {
        let data = b"1 beginbfrange\n<00000000> <FFFFFFFF> <0041>\nendbfrange\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.len(), MAX_RANGE_CODES as usize);
        assert_eq!(cmap.lookup(0), Some("A"));
        assert_eq!(cmap.lookup(MAX_RANGE_CODES), None);
    }

    #[test]
    fn combined_bfchar_and_bfrange() {
        let data = b"\
            1 beginbfchar\n\
            <0001> <0041>\n\
            endbfchar\n\
            2 beginbfrange\n\
            <0010> <0011> <0061>\n\
            <0020> <0021> [<0030> <0031>]\n\
            endbfrange\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.lookup(0x01), Some("A"));
        assert_eq!(cmap.lookup(0x10), Some("a"));
        assert_eq!(cmap.lookup(0x11), Some("b"));
        assert_eq!(cmap.lookup(0x20), Some("0"));
        assert_eq!(cmap.lookup(0x21), Some("1"));
        assert_eq!(cmap.len(), 5);
    }

    #[test]
    fn crlf_and_cr_line_endings() {
        let crlf = b"2 beginbfchar\r\n<01> <0041>\r\n<02> <0042>\r\nendbfchar\r\n";
        assert_eq!(CMap::parse(crlf).len(), 2);
        let cr = b"2 beginbfchar\r<01> <0041>\r<02> <0042>\rendbfchar\r";
        assert_eq!(CMap::parse(cr).len(), 2);
    }

    #[test]
    fn whitespace_variations() {
        let data = b"  1   beginbfchar  \n\t<0041>\t\t<0061>  \nendbfchar";
        assert_eq!(CMap::parse(data).lookup(0x41), Some("a"));
    }

    #[test]
    fn later_entries_override_earlier() {
        let data = b"2 beginbfchar\n<01> <0041>\n<01> <0042>\nendbfchar\n";
        let cmap = CMap::parse(data);
        assert_eq!(cmap.len(), 1);
        assert_eq!(cmap.lookup(1), Some("B"));
    }

    #[test]
    fn split_lines_handles_all_endings() {
        let lines = split_lines(b"a\nb\r\nc\rd");
        assert_eq!(lines, vec![&b"a"[..], &b"b"[..], &b"c"[..], &b"d"[..]]);
        assert!(split_lines(b"").is_empty());
    }
}
