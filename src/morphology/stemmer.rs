use super::service_words::{ENGLISH, RUSSIAN};
use super::{Language, MorphologyAdapter};
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;

/// Morphology backed by Snowball stemmers
///
/// The stem of a word stands in for its dictionary base form. Stemming never
/// produces more than one candidate, so every word maps to exactly one form.
pub struct StemmerMorphology {
    language: Language,
    stemmer: Stemmer,
    service_words: &'static HashSet<&'static str>,
}

impl StemmerMorphology {
    pub fn new(language: Language) -> Self {
        let (algorithm, service_words): (Algorithm, &'static HashSet<&'static str>) =
            match language {
                Language::English => (Algorithm::English, &*ENGLISH),
                Language::Russian => (Algorithm::Russian, &*RUSSIAN),
            };

        Self {
            language,
            stemmer: Stemmer::create(algorithm),
            service_words,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    fn fold(&self, word: &str) -> String {
        match self.language {
            Language::Russian => word.replace('ё', "е"),
            Language::English => word.to_string(),
        }
    }
}

impl std::fmt::Debug for StemmerMorphology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StemmerMorphology")
            .field("language", &self.language)
            .finish()
    }
}

impl MorphologyAdapter for StemmerMorphology {
    fn is_service_word(&self, word: &str) -> bool {
        self.service_words.contains(word) || self.service_words.contains(self.fold(word).as_str())
    }

    fn base_forms(&self, word: &str) -> Vec<String> {
        if word.is_empty() {
            return Vec::new();
        }
        let folded = self.fold(word);
        vec![self.stemmer.stem(&folded).into_owned()]
    }
}
