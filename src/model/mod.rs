//! Data model shared by the outline pipeline.
//!
//! Lines flow in from the text layer, heading candidates come out of the
//! classifier, and the assembled [`Document`] is what gets serialized.

mod document;
mod heading;
mod line;

pub use document::{Document, OutlineNode};
pub use heading::{HeadingCandidate, HeadingLevel, ParseLevelError};
pub use line::{font_key, PageWords, TextLine, Word};
