//! Text state for the content stream interpreter.
//!
//! Tracks the text object (BT/ET), the selected font (Tf), the text and line
//! matrices (Tm, Td, TD, T*) and the leading (TL).

use pdfscan_core::Matrix;

/// Text positioning state carried across the operators of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    /// Text leading (TL operator). Distance between baselines of consecutive lines.
    pub leading: f64,
    /// Font resource name set by the last Tf operator, if it named one.
    pub font: Option<String>,
    /// Whether we are inside a BT/ET text object.
    in_text_object: bool,
    /// The text matrix (set by Tm, replaced by Td/TD/T*).
    text_matrix: Matrix,
    /// The text line matrix (start of the current line).
    line_matrix: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}

impl TextState {
    /// Create a new TextState: outside a text object, identity matrices,
    /// zero leading, no font.
    pub fn new() -> Self {
        Self {
            leading: 0.0,
            font: None,
            in_text_object: false,
            text_matrix: Matrix::identity(),
            line_matrix: Matrix::identity(),
        }
    }

    /// Whether we are currently inside a BT/ET text object.
    pub fn in_text_object(&self) -> bool {
        self.in_text_object
    }

    /// Get the current text matrix.
    pub fn text_matrix(&self) -> &Matrix {
        &self.text_matrix
    }

    /// Get the current line matrix.
    pub fn line_matrix(&self) -> &Matrix {
        &self.line_matrix
    }

    /// Position at which the next shown string is reported.
    pub fn origin(&self) -> (f64, f64) {
        self.text_matrix.origin()
    }

    // --- BT operator ---

    /// `BT` operator: begin text object.
    ///
    /// Resets the text matrix and line matrix to identity. Leading and font
    /// carry over from before.
    pub fn begin_text(&mut self) {
        self.text_matrix = Matrix::identity();
        self.line_matrix = Matrix::identity();
        self.in_text_object = true;
    }

    // --- ET operator ---

    /// `ET` operator: end text object. Matrices are left as they were.
    pub fn end_text(&mut self) {
        self.in_text_object = false;
    }

    // --- Tf operator ---

    /// `Tf` operator: select the font resource, or clear it when the operand
    /// was not a name.
    pub fn set_font(&mut self, font: Option<String>) {
        self.font = font;
    }

    // --- TL operator ---

    /// `TL` operator: set text leading.
    pub fn set_leading(&mut self, leading: f64) {
        self.leading = leading;
    }

    // --- Tm operator ---

    /// `Tm` operator: set the text matrix and line matrix directly.
    ///
    /// This replaces (not concatenates) the current text matrix.
    pub fn set_text_matrix(&mut self, m: Matrix) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    // --- Td operator ---

    /// `Td` operator: line matrix becomes `line · [1 0 0 1 tx ty]`, and the
    /// text matrix is set to it.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = self.line_matrix.then(&Matrix::translation(tx, ty));
        self.text_matrix = self.line_matrix;
    }

    // --- TD operator ---

    /// `TD` operator: sets leading to `-ty` then moves as `Td`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.leading = -ty;
        self.move_text_position(tx, ty);
    }

    // --- T* operator ---

    /// `T*` operator: equivalent to `0 -leading Td`.
    pub fn move_to_next_line(&mut self) {
        let leading = self.leading;
        self.move_text_position(0.0, -leading);
    }
}
