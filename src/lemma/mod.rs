//! Lemma extraction
//!
//! Turns stored page content into lemma occurrence counts for the indexer and
//! query text into lemma sets for the search ranker.

mod extractor;
mod html;

pub use extractor::LemmaExtractor;
pub use html::visible_text;
