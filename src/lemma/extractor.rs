use super::html::visible_text;
use crate::morphology::{Language, MorphologyAdapter};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

/// Reduces text to lemma occurrence counts
///
/// Text is NFKC-normalized and lowercased, split on the language alphabet,
/// stripped of service words and mapped to base forms. Every candidate base
/// form of an ambiguous word is counted.
#[derive(Clone)]
pub struct LemmaExtractor {
    morphology: Arc<dyn MorphologyAdapter>,
    language: Language,
}

impl LemmaExtractor {
    pub fn new(morphology: Arc<dyn MorphologyAdapter>, language: Language) -> Self {
        Self {
            morphology,
            language,
        }
    }

    /// Lemma counts of the visible text of an HTML document
    pub fn extract_html(&self, html: &str) -> HashMap<String, u32> {
        self.extract_text(&visible_text(html))
    }

    /// Lemma counts of plain text
    pub fn extract_text(&self, text: &str) -> HashMap<String, u32> {
        let mut counts = HashMap::new();
        for form in self.forms(text) {
            *counts.entry(form).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct lemmas of a text, used for queries and snippet matching
    pub fn lemma_set(&self, text: &str) -> HashSet<String> {
        self.forms(text).collect()
    }

    /// Words of a text in their original form, split on whitespace
    pub fn words(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    fn forms<'a>(&'a self, text: &str) -> impl Iterator<Item = String> + 'a {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let tokens: Vec<String> = self
            .language
            .word_pattern()
            .find_iter(&normalized)
            .map(|m| m.as_str().to_string())
            .collect();

        tokens
            .into_iter()
            .filter(move |token| !self.morphology.is_service_word(token))
            .flat_map(move |token| self.morphology.base_forms(&token))
    }
}

impl std::fmt::Debug for LemmaExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemmaExtractor")
            .field("language", &self.language)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::StemmerMorphology;

    fn english() -> LemmaExtractor {
        LemmaExtractor::new(
            Arc::new(StemmerMorphology::new(Language::English)),
            Language::English,
        )
    }

    /// Returns two forms for every word, to exercise ambiguity
    struct Ambiguous;

    impl MorphologyAdapter for Ambiguous {
        fn is_service_word(&self, word: &str) -> bool {
            word == "of"
        }

        fn base_forms(&self, word: &str) -> Vec<String> {
            vec![word.to_string(), format!("{}-alt", word)]
        }
    }

    #[test]
    fn test_counts_occurrences_of_base_forms() {
        let counts = english().extract_text("Cats run. The cat runs and the dogs are running!");
        assert_eq!(counts.get("cat"), Some(&2));
        assert_eq!(counts.get("run"), Some(&3));
        assert_eq!(counts.get("dog"), Some(&1));
    }

    #[test]
    fn test_drops_service_words_and_noise() {
        let counts = english().extract_text("the and of 42 -- ?? they");
        assert!(counts.is_empty());
    }

    #[test]
    fn test_extract_html_ignores_markup() {
        let html = "<html><body><p class=\"lead\">Rust compiler</p><script>compiler()</script></body></html>";
        let counts = english().extract_html(html);
        assert_eq!(counts.get("compil"), Some(&1));
        assert!(!counts.contains_key("lead"));
        assert!(!counts.contains_key("class"));
    }

    #[test]
    fn test_ambiguous_words_count_every_form() {
        let extractor = LemmaExtractor::new(Arc::new(Ambiguous), Language::English);
        let counts = extractor.extract_text("bank of bank");
        assert_eq!(counts.get("bank"), Some(&2));
        assert_eq!(counts.get("bank-alt"), Some(&2));
        assert!(!counts.contains_key("of"));
    }

    #[test]
    fn test_lemma_set_is_distinct() {
        let set = english().lemma_set("Running runners run");
        assert!(set.contains("run"));
        assert!(set.len() <= 2);
    }

    #[test]
    fn test_nfkc_folds_compatibility_forms() {
        let counts = english().extract_text("ﬁle FILE");
        assert_eq!(counts.get("file"), Some(&2));
    }

    #[test]
    fn test_words_keep_original_case() {
        assert_eq!(LemmaExtractor::words(" Hello,  World "), vec!["Hello,", "World"]);
    }
}
