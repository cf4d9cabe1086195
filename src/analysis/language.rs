//! Script-based language identification.
//!
//! The document language only steers two decisions: the word-count window
//! for headings and whether capital-letter ratios mean anything. Both depend
//! on the writing system, so the dominant Unicode script of the opening lines
//! is enough.

use std::fmt;

use crate::error::LanguageError;
use crate::model::TextLine;

/// Lines sampled from the start of the document.
pub const SAMPLE_LINES: usize = 10;

/// Minimum letters in the sample before a decision is made.
const MIN_LETTERS: usize = 3;

/// Writing systems the detector distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Latin,
    Cyrillic,
    Greek,
    Han,
    Kana,
    Hangul,
    Devanagari,
    Arabic,
    Hebrew,
    Thai,
}

impl Script {
    const ALL: [Script; 10] = [
        Script::Latin,
        Script::Cyrillic,
        Script::Greek,
        Script::Han,
        Script::Kana,
        Script::Hangul,
        Script::Devanagari,
        Script::Arabic,
        Script::Hebrew,
        Script::Thai,
    ];

    /// Script of a character, if it is one we track.
    pub fn of(c: char) -> Option<Script> {
        let code = c as u32;
        let script = match code {
            0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F | 0x1E00..=0x1EFF => {
                Script::Latin
            }
            0x0370..=0x03FF | 0x1F00..=0x1FFF => Script::Greek,
            0x0400..=0x052F => Script::Cyrillic,
            0x0590..=0x05FF => Script::Hebrew,
            0x0600..=0x06FF | 0x0750..=0x077F | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF => {
                Script::Arabic
            }
            0x0900..=0x097F => Script::Devanagari,
            0x0E00..=0x0E7F => Script::Thai,
            0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7AF => Script::Hangul,
            0x3040..=0x30FF | 0x31F0..=0x31FF | 0xFF66..=0xFF9F => Script::Kana,
            0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2EBEF => {
                Script::Han
            }
            _ => return None,
        };
        Some(script)
    }

    /// Whether the script distinguishes upper and lower case.
    pub fn is_cased(&self) -> bool {
        matches!(self, Script::Latin | Script::Cyrillic | Script::Greek)
    }

    fn index(&self) -> usize {
        Script::ALL
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }
}

/// A detected document language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 code
    pub code: &'static str,
    pub script: Script,
}

impl Language {
    /// The fallback language.
    pub const ENGLISH: Language = Language {
        code: "en",
        script: Script::Latin,
    };

    /// Language for a dominant script.
    pub fn for_script(script: Script) -> Self {
        let code = match script {
            Script::Latin => "en",
            Script::Cyrillic => "ru",
            Script::Greek => "el",
            Script::Han => "zh",
            Script::Kana => "ja",
            Script::Hangul => "ko",
            Script::Devanagari => "hi",
            Script::Arabic => "ar",
            Script::Hebrew => "he",
            Script::Thai => "th",
        };
        Self { code, script }
    }

    /// Whether the language is written without letter case.
    ///
    /// Caseless languages get a wider heading word-count window and a zero
    /// capital ratio.
    pub fn is_caseless(&self) -> bool {
        !self.script.is_cased()
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::ENGLISH
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

/// Identify the language of a text sample by its dominant script.
///
/// Kana and Han are counted together as one CJK group. When that group
/// dominates, any kana in it makes the sample Japanese, since Japanese mixes
/// kana with Han.
pub fn detect_text(sample: &str) -> Result<Language, LanguageError> {
    if sample.trim().is_empty() {
        return Err(LanguageError::EmptySample);
    }

    let mut counts = [0usize; Script::ALL.len()];
    let mut letters = 0;
    for c in sample.chars().filter(|c| c.is_alphabetic()) {
        letters += 1;
        if let Some(script) = Script::of(c) {
            counts[script.index()] += 1;
        }
    }

    if letters < MIN_LETTERS {
        return Err(LanguageError::TooShort(letters));
    }

    let kana = std::mem::take(&mut counts[Script::Kana.index()]);
    counts[Script::Han.index()] += kana;

    let mut ranked: Vec<(Script, usize)> = Script::ALL
        .iter()
        .map(|s| (*s, counts[s.index()]))
        .filter(|(_, n)| *n > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    match ranked.as_slice() {
        [] => Err(LanguageError::Ambiguous),
        [(_, first), (_, second), ..] if first == second => Err(LanguageError::Ambiguous),
        [(Script::Han, _), ..] if kana > 0 => Ok(Language::for_script(Script::Kana)),
        [(script, _), ..] => Ok(Language::for_script(*script)),
    }
}

/// Identify the language from the first [`SAMPLE_LINES`] non-empty lines.
pub fn detect_language(lines: &[TextLine]) -> Result<Language, LanguageError> {
    let sample = lines
        .iter()
        .map(|l| l.trimmed())
        .filter(|t| !t.is_empty())
        .take(SAMPLE_LINES)
        .collect::<Vec<_>>()
        .join(" ");
    detect_text(&sample)
}
