//! Content stream tokenizer.
//!
//! Lexes raw content stream bytes into a lazy sequence of [`Token`]s. The
//! lexer never fails: stray delimiters are skipped and unterminated strings
//! or arrays end at the end of input with whatever was read.

/// Deepest array nesting kept as [`Token::Array`] values. Arrays nested
/// below this are skipped and left out of their parent.
pub const MAX_ARRAY_DEPTH: usize = 64;

/// A lexical token from a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Integer number (e.g., `42`, `-7`).
    Integer(i64),
    /// Real number (e.g., `3.25`, `.5`, `5.`), or an integer too large for `i64`.
    Real(f64),
    /// Name object without the leading `/`, one char per byte.
    Name(String),
    /// Literal or hex string, as raw bytes.
    String(Vec<u8>),
    /// Array of tokens (e.g., `[(a) -120 (b)]`).
    Array(Vec<Token>),
    /// Any other run of regular characters (`BT`, `Tj`, `T*`, `true`, ...).
    Operator(String),
}

impl Token {
    /// Numeric value of an `Integer` or `Real`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Token::Integer(i) => Some(*i as f64),
            Token::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Token::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for operand tokens (everything except operators).
    pub fn is_operand(&self) -> bool {
        !matches!(self, Token::Operator(_))
    }
}

/// Lazy, single-pass lexer over content stream bytes.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let input = self.input;
        let pos = &mut self.pos;

        loop {
            skip_whitespace_and_comments(input, pos);
            let &b = input.get(*pos)?;

            match b {
                b'(' => return Some(Token::String(parse_literal_string(input, pos))),
                b'<' => {
                    if input.get(*pos + 1) == Some(&b'<') {
                        skip_dictionary(input, pos);
                        continue;
                    }
                    return Some(Token::String(parse_hex_string(input, pos)));
                }
                b'[' => {
                    *pos += 1;
                    return Some(Token::Array(parse_array(input, pos, 1)));
                }
                b'/' => return Some(Token::Name(parse_name(input, pos))),
                b')' | b'>' | b']' | b'{' | b'}' => {
                    *pos += 1;
                    continue;
                }
                _ => {
                    if let Some(number) = parse_number(input, pos) {
                        return Some(number);
                    }
                    let keyword = parse_keyword(input, pos);
                    if keyword.is_empty() {
                        *pos += 1;
                        continue;
                    }
                    if keyword == "ID" {
                        skip_inline_image_data(input, pos);
                    }
                    return Some(Token::Operator(keyword));
                }
            }
        }
    }
}

/// Returns `true` if `b` is a PDF whitespace character.
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

/// Returns `true` if `b` is a PDF delimiter character.
fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

/// Skip whitespace and comments.
fn skip_whitespace_and_comments(input: &[u8], pos: &mut usize) {
    while *pos < input.len() {
        if is_whitespace(input[*pos]) {
            *pos += 1;
        } else if input[*pos] == b'%' {
            // Comment: skip to end of line
            while *pos < input.len() && input[*pos] != b'\n' && input[*pos] != b'\r' {
                *pos += 1;
            }
        } else {
            break;
        }
    }
}

/// Parse a literal string `(...)` with balanced parentheses and escape sequences.
fn parse_literal_string(input: &[u8], pos: &mut usize) -> Vec<u8> {
    *pos += 1; // skip opening '('

    let mut result = Vec::new();
    let mut depth = 1u32;

    while *pos < input.len() {
        let b = input[*pos];
        *pos += 1;
        match b {
            b'(' => {
                depth += 1;
                result.push(b'(');
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return result;
                }
                result.push(b')');
            }
            b'\\' => {
                let Some(&escaped) = input.get(*pos) else {
                    break;
                };
                *pos += 1;
                match escaped {
                    b'n' => result.push(b'\n'),
                    b'r' => result.push(b'\r'),
                    b't' => result.push(b'\t'),
                    b'b' => result.push(0x08),
                    b'f' => result.push(0x0C),
                    b'0'..=b'7' => {
                        // Octal escape (1-3 digits), high bits dropped
                        let mut val = u16::from(escaped - b'0');
                        for _ in 0..2 {
                            match input.get(*pos) {
                                Some(&d @ b'0'..=b'7') => {
                                    val = val * 8 + u16::from(d - b'0');
                                    *pos += 1;
                                }
                                _ => break,
                            }
                        }
                        result.push(val as u8);
                    }
                    // `\(`, `\)`, `\\` and unknown escapes yield the byte itself
                    other => result.push(other),
                }
            }
            _ => result.push(b),
        }
    }

    result
}

/// Parse a hex string `<...>`. Whitespace and non-hex bytes are ignored.
fn parse_hex_string(input: &[u8], pos: &mut usize) -> Vec<u8> {
    *pos += 1; // skip '<'

    let mut nibbles = Vec::new();
    while let Some(&b) = input.get(*pos) {
        *pos += 1;
        if b == b'>' {
            break;
        }
        if let Some(v) = hex_digit(b) {
            nibbles.push(v);
        }
    }

    // Odd number of digits: final digit is the high nibble
    nibbles
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

/// Convert a hex digit character to its value (0-15).
fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Parse array elements until `]`. Assumes `[` already consumed.
///
/// `depth` is the nesting level of this array, 1 for a top-level one.
fn parse_array(input: &[u8], pos: &mut usize, depth: usize) -> Vec<Token> {
    let mut elements = Vec::new();

    loop {
        skip_whitespace_and_comments(input, pos);
        let Some(&b) = input.get(*pos) else {
            return elements;
        };

        match b {
            b']' => {
                *pos += 1;
                return elements;
            }
            b'(' => elements.push(Token::String(parse_literal_string(input, pos))),
            b'<' => {
                if input.get(*pos + 1) == Some(&b'<') {
                    skip_dictionary(input, pos);
                } else {
                    elements.push(Token::String(parse_hex_string(input, pos)));
                }
            }
            b'[' => {
                *pos += 1;
                if depth < MAX_ARRAY_DEPTH {
                    elements.push(Token::Array(parse_array(input, pos, depth + 1)));
                } else {
                    skip_array(input, pos);
                }
            }
            b'/' => elements.push(Token::Name(parse_name(input, pos))),
            b')' | b'>' | b'{' | b'}' => *pos += 1,
            _ => {
                if let Some(number) = parse_number(input, pos) {
                    elements.push(number);
                    continue;
                }
                let keyword = parse_keyword(input, pos);
                if keyword.is_empty() {
                    *pos += 1;
                } else {
                    elements.push(Token::Operator(keyword));
                }
            }
        }
    }
}

/// Skip to the `]` closing an array, counting nested brackets instead of
/// building tokens. Assumes `[` already consumed.
fn skip_array(input: &[u8], pos: &mut usize) {
    let mut depth = 1usize;

    loop {
        skip_whitespace_and_comments(input, pos);
        let Some(&b) = input.get(*pos) else {
            return;
        };

        match b {
            b'[' => {
                depth += 1;
                *pos += 1;
            }
            b']' => {
                depth -= 1;
                *pos += 1;
                if depth == 0 {
                    return;
                }
            }
            b'(' => {
                parse_literal_string(input, pos);
            }
            b'<' if input.get(*pos + 1) == Some(&b'<') => skip_dictionary(input, pos),
            b'<' => {
                parse_hex_string(input, pos);
            }
            _ => *pos += 1,
        }
    }
}

/// Skip a dictionary `<< ... >>`, including nested dictionaries and any
/// strings inside it. Assumes current bytes are `<<`.
fn skip_dictionary(input: &[u8], pos: &mut usize) {
    *pos += 2;
    let mut depth = 1u32;

    while *pos < input.len() {
        match input[*pos] {
            b'<' if input.get(*pos + 1) == Some(&b'<') => {
                depth += 1;
                *pos += 2;
            }
            b'>' if input.get(*pos + 1) == Some(&b'>') => {
                *pos += 2;
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
            b'(' => {
                parse_literal_string(input, pos);
            }
            b'<' => {
                parse_hex_string(input, pos);
            }
            b'%' => skip_whitespace_and_comments(input, pos),
            _ => *pos += 1,
        }
    }
}

/// Parse a `/Name` token. Assumes current byte is `/`.
fn parse_name(input: &[u8], pos: &mut usize) -> String {
    *pos += 1; // skip '/'
    parse_keyword(input, pos)
}

/// Read a run of regular characters, one char per byte.
fn parse_keyword(input: &[u8], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < input.len() && is_regular(input[*pos]) {
        *pos += 1;
    }
    input[start..*pos].iter().map(|&b| char::from(b)).collect()
}

/// Parse `[+-]?(digits[.digits] | .digits)`. Leaves `pos` untouched when the
/// bytes do not form a number.
fn parse_number(input: &[u8], pos: &mut usize) -> Option<Token> {
    let start = *pos;
    let mut i = start;

    if matches!(input.get(i), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while input.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut has_dot = false;
    let mut frac_digits = 0;
    if input.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while input.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        frac_digits = j - frac_start;
        if int_digits > 0 || frac_digits > 0 {
            has_dot = true;
            i = j;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    let text = std::str::from_utf8(&input[start..i]).ok()?;
    let token = if has_dot {
        Token::Real(text.parse().ok()?)
    } else {
        match text.parse::<i64>() {
            Ok(v) => Token::Integer(v),
            Err(_) => Token::Real(text.parse().ok()?),
        }
    };
    *pos = i;
    Some(token)
}

/// Skip inline image sample data following an `ID` operator, through the
/// terminating `EI`.
fn skip_inline_image_data(input: &[u8], pos: &mut usize) {
    // Single whitespace byte separates ID from the data
    if input.get(*pos).copied().is_some_and(is_whitespace) {
        *pos += 1;
    }
    let data_start = *pos;
    while *pos + 2 <= input.len() {
        let at_boundary = *pos == data_start || is_whitespace(input[*pos - 1]);
        if at_boundary
            && &input[*pos..*pos + 2] == b"EI"
            && input.get(*pos + 2).is_none_or(|&b| !is_regular(b))
        {
            *pos += 2;
            return;
        }
        *pos += 1;
    }
    *pos = input.len();
}
