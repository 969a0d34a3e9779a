//! Misaki G2P (grapheme-to-phoneme) wrapper.
//!
//! Converts English text to the phoneme strings Kokoro's character-level
//! tokenizer expects. A small normalization pass runs first so that typed
//! text (smart quotes, "$5", "Dr.") is pronounced sensibly.

use crate::error::{Result, SynthError};

/// Thin wrapper around `misaki-rs` G2P for phonemization.
pub struct Phonemizer {
    g2p: misaki_rs::G2P,
}

impl Phonemizer {
    /// Create a phonemizer. `british` selects British English pronunciation.
    pub fn new(british: bool) -> Self {
        let lang = if british {
            misaki_rs::Language::EnglishGB
        } else {
            misaki_rs::Language::EnglishUS
        };
        Self {
            g2p: misaki_rs::G2P::new(lang),
        }
    }

    /// Convert text to a phoneme string suitable for Kokoro's tokenizer.
    ///
    /// # Errors
    ///
    /// Returns an error if phonemization fails or produces nothing.
    pub fn phonemize(&self, text: &str) -> Result<String> {
        let normalized = normalize_text(text);
        let (phonemes, _tokens) = self
            .g2p
            .g2p(&normalized)
            .map_err(|e| SynthError::Tts(format!("phonemization failed: {e}")))?;
        if phonemes.is_empty() {
            return Err(SynthError::Tts("phonemization produced empty output".into()));
        }
        Ok(phonemes)
    }
}

/// Normalize typed text for pronunciation.
///
/// Smart punctuation becomes ASCII, currency symbols and a handful of
/// title abbreviations become words. Anything else passes through.
pub fn normalize_text(text: &str) -> String {
    let text = ascii_punctuation(text);
    let text = expand_currency(&text);
    expand_abbreviations(&text)
}

/// Replace curly quotes and long dashes with ASCII equivalents.
fn ascii_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push_str(" - "),
            '\u{2026}' => out.push_str("..."),
            _ => out.push(ch),
        }
    }
    out
}

/// Rewrite `$5` as `5 dollars` (and `£`/`€` likewise) for integer amounts.
fn expand_currency(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let unit = match chars[i] {
            '$' => Some("dollars"),
            '£' => Some("pounds"),
            '€' => Some("euros"),
            _ => None,
        };

        if let Some(unit) = unit {
            let amount: String = chars[i + 1..]
                .iter()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if !amount.is_empty() {
                out.push_str(&amount);
                out.push(' ');
                out.push_str(unit);
                i += 1 + amount.len();
                continue;
            }
        }

        out.push(chars[i]);
        i += 1;
    }

    out
}

/// Title abbreviations and their spoken forms. Longer patterns first so
/// "Mrs." is not matched as "Mr." plus trailing text.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("Mrs.", "Missus"),
    ("Mr.", "Mister"),
    ("Ms.", "Miz"),
    ("Dr.", "Doctor"),
    ("St.", "Saint"),
    ("vs.", "versus"),
    ("etc.", "etcetera"),
];

/// Expand known abbreviations when they stand alone as a word.
fn expand_abbreviations(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            ABBREVIATIONS
                .iter()
                .find(|(abbrev, _)| word == *abbrev)
                .map_or(word, |(_, spoken)| *spoken)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
