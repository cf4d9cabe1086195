//! Words from the text layer and the visual lines built from them.

use serde::{Deserialize, Serialize};

/// A positioned word as delivered by a [`TextLayer`](crate::parser::TextLayer).
///
/// Coordinates are top-down: `top` grows towards the bottom of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// The word text
    pub text: String,
    /// Left edge
    pub x0: f32,
    /// Distance from the top of the page to the top of the glyphs
    pub top: f32,
    /// Distance from the top of the page to the bottom of the glyphs
    pub bottom: f32,
    /// Font size in points
    pub font_size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl Word {
    /// Create a word.
    pub fn new(
        text: impl Into<String>,
        x0: f32,
        top: f32,
        bottom: f32,
        font_size: f32,
        font_name: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            x0,
            top,
            bottom,
            font_size,
            font_name: font_name.into(),
        }
    }
}

/// All words of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageWords {
    /// 1-based page number
    pub page: u32,
    /// Page height in points
    pub height: f32,
    /// Words in content-stream order
    pub words: Vec<Word>,
}

impl PageWords {
    /// Create an empty page.
    pub fn new(page: u32, height: f32) -> Self {
        Self {
            page,
            height,
            words: Vec::new(),
        }
    }

    /// Add a word.
    pub fn push(&mut self, word: Word) {
        self.words.push(word);
    }
}

/// One physical line of text with its typography and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Words joined by single spaces
    pub text: String,
    /// Font size of the first word in reading order
    pub font_size: f32,
    /// First word's font name contains "bold"
    pub is_bold: bool,
    /// First word's font name contains "italic" or "oblique"
    pub is_italic: bool,
    /// Top of the line (top-down coordinates)
    pub top: f32,
    /// Bottom of the line (top-down coordinates)
    pub bottom: f32,
    /// Gap to the previous line on the same page, never negative
    pub whitespace_above: f32,
    /// 1-based page number
    pub page: u32,
    /// Height of the page the line sits on
    pub page_height: f32,
}

impl TextLine {
    /// Create a line with plain defaults; used mostly by tests and synthetic inputs.
    pub fn new(text: impl Into<String>, font_size: f32, page: u32) -> Self {
        Self {
            text: text.into(),
            font_size,
            is_bold: false,
            is_italic: false,
            top: 0.0,
            bottom: font_size,
            whitespace_above: 0.0,
            page,
            page_height: 792.0,
        }
    }

    /// Set the vertical position, keeping the line height equal to the font size.
    pub fn at(mut self, top: f32) -> Self {
        self.top = top;
        self.bottom = top + self.font_size;
        self
    }

    /// Mark the line bold.
    pub fn bold(mut self) -> Self {
        self.is_bold = true;
        self
    }

    /// Trimmed text.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Font size rounded to one decimal, as an integer key.
    pub fn font_key(&self) -> i32 {
        font_key(self.font_size)
    }
}

/// Round a font size to one decimal place and return it as tenths.
///
/// Integer keys make font sizes usable in sets and maps.
pub fn font_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}
