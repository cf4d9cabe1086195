//! Content-stream interpretation: text operators to positioned words.
//!
//! Only the text state needed for line grouping is tracked. Glyph widths are
//! not read from font programs; every character advances half the font size.

use std::collections::HashMap;

use crate::model::{PageWords, Word};

use super::backend::{get_number_from_value, ContentOp, PdfValue};

/// Average glyph advance as a fraction of the font size.
const CHAR_WIDTH_RATIO: f32 = 0.5;
/// Portion of the font size above the baseline.
const ASCENT_RATIO: f32 = 0.8;
/// Portion of the font size below the baseline.
const DESCENT_RATIO: f32 = 0.2;
/// TJ adjustment (thousandths of an em) treated as a word break.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A font entry from the page resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontResource {
    /// `BaseFont` name, e.g. `Helvetica-Bold`
    pub base_font: String,
    /// Name of the `Encoding` entry when it is a simple name
    pub encoding: Option<String>,
}

/// Text matrix state: the line matrix plus the advance since the line start.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    advance: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            advance: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            advance: 0.0,
        };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
        self.advance = 0.0;
    }

    /// Position of the current glyph origin in user space.
    fn position(&self) -> (f32, f32) {
        (
            self.e + self.advance * self.a,
            self.f + self.advance * self.b,
        )
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

struct WordCollector<'a> {
    fonts: &'a HashMap<Vec<u8>, FontResource>,
    decode: &'a dyn Fn(&[u8], &[u8]) -> String,
    out: PageWords,
    matrix: TextMatrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    in_text: bool,
}

impl<'a> WordCollector<'a> {
    fn font_name(&self) -> String {
        self.fonts
            .get(&self.font)
            .map(|f| f.base_font.clone())
            .unwrap_or_else(|| String::from_utf8_lossy(&self.font).into_owned())
    }

    fn next_line(&mut self) {
        self.matrix.translate(0.0, -self.leading);
    }

    fn decode_bytes(&self, bytes: &[u8]) -> String {
        (self.decode)(&self.font, bytes)
    }

    fn apply(&mut self, op: &ContentOp) {
        let num = |i: usize| op.operands.get(i).and_then(get_number_from_value);

        match op.operator.as_str() {
            "BT" => {
                self.in_text = true;
                self.matrix = TextMatrix::default();
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.font = name.clone();
                }
                self.font_size = num(1).unwrap_or(12.0);
            }
            "TL" => self.leading = num(0).unwrap_or(0.0),
            "Td" => self
                .matrix
                .translate(num(0).unwrap_or(0.0), num(1).unwrap_or(0.0)),
            "TD" => {
                let ty = num(1).unwrap_or(0.0);
                self.leading = -ty;
                self.matrix.translate(num(0).unwrap_or(0.0), ty);
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    self.matrix.set(
                        num(0).unwrap_or(1.0),
                        num(1).unwrap_or(0.0),
                        num(2).unwrap_or(0.0),
                        num(3).unwrap_or(1.0),
                        num(4).unwrap_or(0.0),
                        num(5).unwrap_or(0.0),
                    );
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let text = self.decode_bytes(bytes);
                    self.show(&text, 0.0);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    self.show_array(items);
                }
            }
            "'" => {
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let text = self.decode_bytes(bytes);
                    self.show(&text, 0.0);
                }
            }
            "\"" => {
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    let text = self.decode_bytes(bytes);
                    self.show(&text, 0.0);
                }
            }
            _ => {}
        }
    }

    /// TJ: strings interleaved with kerning adjustments.
    fn show_array(&mut self, items: &[PdfValue]) {
        let mut combined = String::new();
        let mut kerning = 0.0;

        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&self.decode_bytes(bytes)),
                PdfValue::Integer(_) | PdfValue::Real(_) => {
                    let adjustment = -get_number_from_value(item).unwrap_or(0.0);
                    kerning += adjustment / 1000.0 * self.font_size;
                    if adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(char::is_whitespace)
                        && !combined.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }

        self.show(&combined, kerning);
    }

    /// Emit the words of a shown string and advance the text position.
    fn show(&mut self, text: &str, extra_advance: f32) {
        let char_count = text.chars().count() as f32;
        let text_advance = char_count * self.font_size * CHAR_WIDTH_RATIO + extra_advance;

        if !self.in_text || text.trim().is_empty() {
            self.matrix.advance += text_advance;
            return;
        }

        let (x, y) = self.matrix.position();
        let size = self.font_size * self.matrix.vertical_scale();
        let char_width = self.font_size * CHAR_WIDTH_RATIO * self.matrix.horizontal_scale();
        let height = self.out.height;
        let top = height - (y + size * ASCENT_RATIO);
        let bottom = height - (y - size * DESCENT_RATIO);
        let font_name = self.font_name();

        for (offset, token) in split_words(text) {
            self.out.push(Word::new(
                token,
                x + offset as f32 * char_width,
                top,
                bottom,
                size,
                font_name.clone(),
            ));
        }

        self.matrix.advance += text_advance;
    }
}

/// Split on whitespace, returning each token with its char offset.
fn split_words(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start: Option<(usize, usize)> = None;

    for (char_idx, (byte_idx, c)) in text.char_indices().enumerate() {
        match (c.is_whitespace(), start) {
            (true, Some((char_start, byte_start))) => {
                words.push((char_start, &text[byte_start..byte_idx]));
                start = None;
            }
            (false, None) => start = Some((char_idx, byte_idx)),
            _ => {}
        }
    }
    if let Some((char_start, byte_start)) = start {
        words.push((char_start, &text[byte_start..]));
    }
    words
}

/// Chinese and Japanese don't put spaces between words; Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

/// Interpret a page's content stream into words.
///
/// `decode` maps (font resource name, shown bytes) to text.
pub fn collect_words(
    page: u32,
    height: f32,
    ops: &[ContentOp],
    fonts: &HashMap<Vec<u8>, FontResource>,
    decode: &dyn Fn(&[u8], &[u8]) -> String,
) -> PageWords {
    let mut collector = WordCollector {
        fonts,
        decode,
        out: PageWords::new(page, height),
        matrix: TextMatrix::default(),
        font: Vec::new(),
        font_size: 12.0,
        leading: 0.0,
        in_text: false,
    };

    for op in ops {
        collector.apply(op);
    }
    collector.out
}
