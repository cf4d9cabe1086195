//! PDF text-layer abstraction.
//!
//! The outline pipeline only needs positioned words per page. [`TextLayer`]
//! is that capability; [`LopdfTextLayer`] implements it on top of lopdf so the
//! rest of the crate never touches lopdf types.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::detect::{check_pdf_file, pdf_version};
use crate::error::{Error, Result};
use crate::model::PageWords;

use super::words::{collect_words, FontResource};

/// US Letter height, used when a page declares no MediaBox.
pub const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Source of positioned words, one page at a time.
pub trait TextLayer {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Words of a 1-based page, with the page height.
    fn page_words(&self, page: u32) -> Result<PageWords>;
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Build an operation; handy for tests and synthetic streams.
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        return decode_utf16be(&bytes[2..]);
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

fn decode_utf16be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

/// [`TextLayer`] backed by `lopdf::Document`.
pub struct LopdfTextLayer {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfTextLayer {
    /// Load from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        check_pdf_file(path)?;
        let doc = LopdfDocument::load(path)?;
        Ok(Self::from_document(doc))
    }

    /// Load from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        pdf_version(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: LopdfDocument) -> Self {
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; text may not decode");
        }
        let pages = doc.get_pages();
        Self { doc, pages }
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
    }

    /// Page height from the MediaBox, following inherited attributes.
    fn page_height(&self, page_id: ObjectId) -> f32 {
        let mut current = Some(page_id);
        // Page trees are shallow; the bound guards against reference cycles.
        for _ in 0..32 {
            let Some(id) = current else { break };
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };
            if let Ok(array) = dict.get(b"MediaBox").and_then(Object::as_array) {
                if array.len() >= 4 {
                    let y0 = array[1].as_float().unwrap_or(0.0);
                    let y1 = array[3].as_float().unwrap_or(DEFAULT_PAGE_HEIGHT);
                    return (y1 - y0).abs();
                }
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }
        DEFAULT_PAGE_HEIGHT
    }

    /// Font resources of a page keyed by resource name (e.g. `F1`).
    fn font_resources(
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    ) -> HashMap<Vec<u8>, FontResource> {
        fonts
            .iter()
            .map(|(name, dict)| {
                let base_font = dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).into_owned())
                    .unwrap_or_else(|| String::from_utf8_lossy(name).into_owned());
                let encoding = dict.get(b"Encoding").ok().and_then(|o| match o {
                    Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
                    _ => None,
                });
                (name.clone(), FontResource { base_font, encoding })
            })
            .collect()
    }

    /// Raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content has no words.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => s
                    .decompressed_content()
                    .or_else(|_| Ok(s.content.clone())),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            if let Ok(data) = s.decompressed_content() {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content = lopdf::content::Content::decode(data)
            .map_err(|e| Error::TextExtract(format!("content stream decode error: {}", e)))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }
}

impl TextLayer for LopdfTextLayer {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_words(&self, page: u32) -> Result<PageWords> {
        let page_id = self.page_id(page)?;
        let height = self.page_height(page_id);

        let lopdf_fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(format!("cannot get page fonts: {}", e)))?;
        let fonts = Self::font_resources(&lopdf_fonts);
        let encodings: HashMap<Vec<u8>, _> = lopdf_fonts
            .iter()
            .filter_map(|(name, dict)| {
                dict.get_font_encoding(&self.doc)
                    .ok()
                    .map(|enc| (name.clone(), enc))
            })
            .collect();

        let decode = |font: &[u8], bytes: &[u8]| -> String {
            if let Some(enc) = encodings.get(font) {
                if let Ok(text) = LopdfDocument::decode_text(enc, bytes) {
                    return text;
                }
            }
            decode_for_font(fonts.get(font), bytes)
        };

        let content = self.page_content(page_id)?;
        let ops = self.decode_content(&content)?;

        Ok(collect_words(page, height, &ops, &fonts, &decode))
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Decode shown bytes for a font.
///
/// Identity-encoded (CID) fonts usually carry UTF-16BE codes; everything
/// else goes through [`decode_text_simple`].
pub(crate) fn decode_for_font(font: Option<&FontResource>, bytes: &[u8]) -> String {
    let identity = font
        .and_then(|f| f.encoding.as_deref())
        .map(|enc| enc.contains("Identity"))
        .unwrap_or(false);

    if identity && bytes.len() >= 2 && bytes.len() % 2 == 0 {
        let decoded = decode_utf16be(bytes);
        if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
            return decoded;
        }
    }
    decode_text_simple(bytes)
}
