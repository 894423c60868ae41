//! Result snippets
//!
//! A snippet is a window of the page's visible words around the first word
//! whose lemmas intersect the query, with every matching word in the window
//! wrapped in `<b>`. Page words are HTML-escaped.

use crate::lemma::LemmaExtractor;
use std::collections::HashSet;

/// Words of context kept before the first match
const LEAD_WORDS: usize = 5;

/// Builds the snippet of `text` for the lemma set `query`
///
/// When no word matches, the first `window` words are returned unemphasized.
pub fn build_snippet(
    text: &str,
    query: &HashSet<String>,
    extractor: &LemmaExtractor,
    window: usize,
) -> String {
    let words = LemmaExtractor::words(text);
    if words.is_empty() || window == 0 {
        return String::new();
    }

    let is_match = |word: &str| !extractor.lemma_set(word).is_disjoint(query);

    let first = words.iter().position(|w| is_match(w));
    let start = first.map(|i| i.saturating_sub(LEAD_WORDS)).unwrap_or(0);
    let end = (start + window).min(words.len());

    words[start..end]
        .iter()
        .map(|word| {
            let escaped = escape_html(word);
            if first.is_some() && is_match(word) {
                format!("<b>{}</b>", escaped)
            } else {
                escaped
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_html(word: &str) -> String {
    let mut escaped = String::with_capacity(word.len());
    for c in word.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{Language, StemmerMorphology};
    use std::sync::Arc;

    fn extractor() -> LemmaExtractor {
        LemmaExtractor::new(
            Arc::new(StemmerMorphology::new(Language::English)),
            Language::English,
        )
    }

    fn query(text: &str) -> HashSet<String> {
        extractor().lemma_set(text)
    }

    #[test]
    fn test_window_starts_before_first_match() {
        let text = "one two three four five six seven eight nine Cats ten eleven";
        let snippet = build_snippet(text, &query("cat"), &extractor(), 4);
        assert_eq!(snippet, "five six seven eight");

        let snippet = build_snippet(text, &query("cat"), &extractor(), 8);
        assert_eq!(snippet, "five six seven eight nine <b>Cats</b> ten eleven");
    }

    #[test]
    fn test_every_match_in_window_is_emphasized() {
        let text = "A cat, another cat and a dog";
        let snippet = build_snippet(text, &query("cats"), &extractor(), 25);
        assert_eq!(snippet, "A <b>cat,</b> another <b>cat</b> and a dog");
    }

    #[test]
    fn test_no_match_returns_leading_window() {
        let text = "alpha beta gamma delta";
        let snippet = build_snippet(text, &query("zebra"), &extractor(), 2);
        assert_eq!(snippet, "alpha beta");
    }

    #[test]
    fn test_escapes_markup() {
        let text = "use <script> tags & cats";
        let snippet = build_snippet(text, &query("cat"), &extractor(), 25);
        assert_eq!(snippet, "use &lt;script&gt; tags &amp; <b>cats</b>");
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(build_snippet("", &query("cat"), &extractor(), 25), "");
    }
}
