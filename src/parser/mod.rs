//! PDF text-layer access and line extraction.

mod backend;
mod lines;
mod options;
mod words;

pub use backend::{
    decode_text_simple, get_number_from_value, ContentOp, LopdfTextLayer, PdfValue, TextLayer,
    DEFAULT_PAGE_HEIGHT,
};
pub use lines::LineFeatureExtractor;
pub use options::{ErrorMode, ExtractOptions};
pub use words::{collect_words, FontResource};
