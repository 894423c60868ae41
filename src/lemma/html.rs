//! Visible-text extraction from stored HTML

use lazy_static::lazy_static;
use scraper::{Html, Node, Selector};

lazy_static! {
    static ref BODY: Selector = Selector::parse("body").expect("valid selector");
}

/// Elements whose text content is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Returns the visible text of an HTML document
///
/// Text inside `script`, `style`, `noscript`, `template` and `head` is skipped;
/// the remaining text nodes are joined with single spaces and runs of
/// whitespace are collapsed.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let scope = document
        .select(&BODY)
        .next()
        .map(|body| *body)
        .unwrap_or_else(|| document.tree.root());

    let mut pieces: Vec<&str> = Vec::new();
    for node in scope.descendants() {
        let text = match node.value() {
            Node::Text(text) => text,
            _ => continue,
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|el| HIDDEN_ELEMENTS.contains(&el.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }

        pieces.extend(text.split_whitespace());
    }

    pieces.join(" ")
}
