//! Morphology: word -> base forms and service-word classification
//!
//! The indexer and the search ranker only talk to [`MorphologyAdapter`]. The
//! bundled implementation, [`StemmerMorphology`], reduces words with Snowball
//! stemmers and classifies function words from fixed per-language lists.

mod service_words;
mod stemmer;

pub use stemmer::StemmerMorphology;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::fmt;

/// Morphological capability consumed by lemma extraction
///
/// Implementations receive lowercased single words drawn from the language
/// alphabet.
pub trait MorphologyAdapter: Send + Sync {
    /// Returns true for function words (conjunction, particle, interjection,
    /// preposition, pronoun) that are excluded from indexing
    fn is_service_word(&self, word: &str) -> bool;

    /// Returns every candidate base form of `word`
    ///
    /// An ambiguous word may yield several forms; an empty result means the
    /// word has no indexable form.
    fn base_forms(&self, word: &str) -> Vec<String>;
}

/// Target language of the morphology engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Russian,
}

lazy_static! {
    static ref ENGLISH_WORD: Regex = Regex::new(r"[a-z]+").expect("valid regex");
    static ref RUSSIAN_WORD: Regex = Regex::new(r"[а-яё]+").expect("valid regex");
}

impl Language {
    /// Regex matching one lowercased word of the language alphabet
    pub fn word_pattern(&self) -> &'static Regex {
        match self {
            Self::English => &*ENGLISH_WORD,
            Self::Russian => &*RUSSIAN_WORD,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => write!(f, "english"),
            Self::Russian => write!(f, "russian"),
        }
    }
}
