//! Text-operator interpreter.
//!
//! Replays the text-positioning and text-showing operators of a content
//! stream and emits one [`TextItem`] per non-empty shown string. Every other
//! operator is skipped. Malformed operators are no-ops that report a warning.

use pdfscan_core::{ExtractOptions, ExtractWarning, ExtractWarningCode, Matrix, TextItem};

use crate::cmap::CMap;
use crate::document::FontMap;
use crate::handler::ContentHandler;
use crate::text_renderer::{concat_tj, decode_text};
use crate::text_state::TextState;
use crate::tokenizer::{Token, Tokenizer};

/// The operators the interpreter acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOperator {
    /// `BT`
    BeginText,
    /// `ET`
    EndText,
    /// `Tf font size`
    SetFont,
    /// `Tm a b c d e f`
    SetTextMatrix,
    /// `Td tx ty`
    MoveText,
    /// `TD tx ty`
    MoveTextSetLeading,
    /// `TL leading`
    SetLeading,
    /// `T*`
    NextLine,
    /// `Tj string`
    ShowText,
    /// `TJ array`
    ShowTextArray,
    /// `' string`
    NextLineShowText,
    /// `" aw ac string`
    NextLineShowTextSpaced,
}

impl TextOperator {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "BT" => Self::BeginText,
            "ET" => Self::EndText,
            "Tf" => Self::SetFont,
            "Tm" => Self::SetTextMatrix,
            "Td" => Self::MoveText,
            "TD" => Self::MoveTextSetLeading,
            "TL" => Self::SetLeading,
            "T*" => Self::NextLine,
            "Tj" => Self::ShowText,
            "TJ" => Self::ShowTextArray,
            "'" => Self::NextLineShowText,
            "\"" => Self::NextLineShowTextSpaced,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::BeginText => "BT",
            Self::EndText => "ET",
            Self::SetFont => "Tf",
            Self::SetTextMatrix => "Tm",
            Self::MoveText => "Td",
            Self::MoveTextSetLeading => "TD",
            Self::SetLeading => "TL",
            Self::NextLine => "T*",
            Self::ShowText => "Tj",
            Self::ShowTextArray => "TJ",
            Self::NextLineShowText => "'",
            Self::NextLineShowTextSpaced => "\"",
        }
    }

    /// Number of operands taken from the top of the stack.
    pub fn arity(self) -> usize {
        match self {
            Self::BeginText | Self::EndText | Self::NextLine => 0,
            Self::SetLeading | Self::ShowText | Self::ShowTextArray | Self::NextLineShowText => 1,
            Self::SetFont | Self::MoveText | Self::MoveTextSetLeading => 2,
            Self::NextLineShowTextSpaced => 3,
            Self::SetTextMatrix => 6,
        }
    }
}

/// Text extraction state machine for one page.
///
/// Operand tokens are pushed on a stack; each operator takes its operands
/// from the top and the stack is then cleared.
#[derive(Debug)]
pub struct TextExtractor<'f> {
    page: usize,
    fonts: &'f FontMap,
    state: TextState,
    operands: Vec<Token>,
    operator_index: usize,
}

impl<'f> TextExtractor<'f> {
    pub fn new(page: usize, fonts: &'f FontMap) -> Self {
        Self {
            page,
            fonts,
            state: TextState::new(),
            operands: Vec::new(),
            operator_index: 0,
        }
    }

    /// Current text state.
    pub fn state(&self) -> &TextState {
        &self.state
    }

    /// Feed one token; returns the item a text-showing operator produced.
    pub fn step(&mut self, token: Token) -> Option<TextItem> {
        self.try_step(token).ok().flatten()
    }

    /// Like [`step`](Self::step), but reports operators that were skipped
    /// for missing or mistyped operands.
    pub fn try_step(&mut self, token: Token) -> Result<Option<TextItem>, ExtractWarning> {
        let keyword = match token {
            Token::Operator(keyword) => keyword,
            operand => {
                self.operands.push(operand);
                return Ok(None);
            }
        };

        let index = self.operator_index;
        self.operator_index += 1;
        let operands = std::mem::take(&mut self.operands);

        let Some(op) = TextOperator::from_keyword(&keyword) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(operator = %keyword, "skipping non-text operator");
            return Ok(None);
        };

        let Some(args) = operands.len().checked_sub(op.arity()).map(|s| &operands[s..]) else {
            return Err(self.malformed(op, index, "missing operands"));
        };

        self.execute(op, args)
            .ok_or_else(|| self.malformed(op, index, "mistyped operands"))
    }

    /// Run one operator. `None` means the operands had the wrong types.
    fn execute(&mut self, op: TextOperator, args: &[Token]) -> Option<Option<TextItem>> {
        match op {
            TextOperator::BeginText => self.state.begin_text(),
            TextOperator::EndText => self.state.end_text(),
            TextOperator::SetFont => {
                self.state.set_font(args[0].as_name().map(str::to_string));
            }
            TextOperator::SetTextMatrix => {
                let m = numbers::<6>(args)?;
                self.state.set_text_matrix(Matrix::from_array(m));
            }
            TextOperator::MoveText => {
                let [tx, ty] = numbers::<2>(args)?;
                self.state.move_text_position(tx, ty);
            }
            TextOperator::MoveTextSetLeading => {
                let [tx, ty] = numbers::<2>(args)?;
                self.state.move_text_position_and_set_leading(tx, ty);
            }
            TextOperator::SetLeading => {
                let [leading] = numbers::<1>(args)?;
                self.state.set_leading(leading);
            }
            TextOperator::NextLine => self.state.move_to_next_line(),
            TextOperator::ShowText => {
                let bytes = args[0].as_string()?;
                return Some(self.show(bytes));
            }
            TextOperator::ShowTextArray => {
                let Token::Array(elements) = &args[0] else {
                    return None;
                };
                return Some(self.show(&concat_tj(elements)));
            }
            TextOperator::NextLineShowText => {
                let bytes = args[0].as_string()?;
                return Some(self.next_line_and_show(bytes));
            }
            TextOperator::NextLineShowTextSpaced => {
                let bytes = args[2].as_string()?;
                return Some(self.next_line_and_show(bytes));
            }
        }
        Some(None)
    }

    fn next_line_and_show(&mut self, bytes: &[u8]) -> Option<TextItem> {
        if !self.state.in_text_object() {
            return None;
        }
        self.state.move_to_next_line();
        self.show(bytes)
    }

    fn show(&self, bytes: &[u8]) -> Option<TextItem> {
        if !self.state.in_text_object() {
            return None;
        }
        let text = decode_text(bytes, self.current_cmap());
        if text.is_empty() {
            return None;
        }
        let (x, y) = self.state.origin();
        Some(TextItem {
            page: self.page,
            x,
            y,
            text,
            font: self.state.font.clone(),
        })
    }

    fn current_cmap(&self) -> Option<&CMap> {
        let font = self.state.font.as_deref()?;
        self.fonts.get(font).map(|cmap| cmap.as_ref())
    }

    fn malformed(&self, op: TextOperator, index: usize, what: &str) -> ExtractWarning {
        let mut warning = ExtractWarning::with_code(
            ExtractWarningCode::MalformedOperator,
            format!("{} skipped: {what}", op.keyword()),
        )
        .on_page(self.page)
        .at_operator(index);
        if let Some(font) = &self.state.font {
            warning = warning.with_font(font.clone());
        }
        warning
    }
}

/// The last `N` operands as numbers.
fn numbers<const N: usize>(args: &[Token]) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(args) {
        *slot = token.as_number()?;
    }
    Some(out)
}

/// Interpret one page's content, reporting items and warnings to `handler`.
///
/// Stops emitting once `options.max_items_per_page` items were produced,
/// when that limit is set.
/// Returns the number of items emitted.
pub fn interpret_content_stream(
    content: &[u8],
    page: usize,
    fonts: &FontMap,
    handler: &mut dyn ContentHandler,
    options: &ExtractOptions,
) -> usize {
    let mut extractor = TextExtractor::new(page, fonts);
    let mut emitted = 0;

    for token in Tokenizer::new(content) {
        match extractor.try_step(token) {
            Ok(Some(item)) => {
                if let Some(limit) = options.max_items_per_page.filter(|&l| emitted == l) {
                    handler.on_warning(
                        ExtractWarning::with_code(
                            ExtractWarningCode::ResourceLimitReached,
                            format!(
                                "max_items_per_page limit of {limit} reached, remaining text skipped"
                            ),
                        )
                        .on_page(page),
                    );
                    break;
                }
                emitted += 1;
                handler.on_text(item);
            }
            Ok(None) => {}
            Err(warning) => handler.on_warning(warning),
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(page, items = emitted, "interpreted page content");

    emitted
}
