// ABOUTME: Selector-based collection helpers for text, attributes and markup.
// ABOUTME: Every helper returns matches in document order and an empty Vec on a miss.

//! Selector-based collection utilities.
//!
//! Key behaviors:
//! - Matches are returned in document order; an element matched by several
//!   alternatives of a selector group appears once.
//! - An invalid selector behaves like a selector with no matches.
//! - Nothing is deduplicated, sorted or trimmed unless the helper says so.

use scraper::{ElementRef, Html, Node};

use crate::extractors::compiled::get_or_compile;

/// Concatenates every descendant text node of an element.
///
/// A `<br>` becomes `\n` so that "one<br>two" does not read "onetwo".
pub fn element_text(el: &ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Collects the text of each element matching `css`.
///
/// Elements without any text contribute no entry.
pub fn select_texts(doc: &Html, css: &str) -> Vec<String> {
    let Some(selector) = get_or_compile(css) else {
        return vec![];
    };

    doc.select(&selector)
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
        .collect()
}

/// Collects the raw value of `attr` for each element matching `css`.
///
/// Elements lacking the attribute are skipped; empty values are kept.
pub fn select_attrs(doc: &Html, css: &str, attr: &str) -> Vec<String> {
    let Some(selector) = get_or_compile(css) else {
        return vec![];
    };

    doc.select(&selector)
        .filter_map(|el| el.value().attr(attr).map(str::to_string))
        .collect()
}

/// Collects the outer HTML of each element matching `css`.
pub fn select_outer_html(doc: &Html, css: &str) -> Vec<String> {
    let Some(selector) = get_or_compile(css) else {
        return vec![];
    };

    doc.select(&selector).map(|el| el.html()).collect()
}

/// Returns the trimmed text of the first element matching `css` whose text is
/// not blank, or "" when there is none.
pub fn select_first_text_trimmed(doc: &Html, css: &str) -> String {
    get_or_compile(css)
        .and_then(|selector| {
            doc.select(&selector)
                .map(|el| element_text(&el).trim().to_string())
                .find(|text| !text.is_empty())
        })
        .unwrap_or_default()
}

/// Collects elements matching `css`.
pub fn select_elements<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match get_or_compile(css) {
        Some(selector) => doc.select(&selector).collect(),
        None => vec![],
    }
}

/// Collects descendants of `el` matching `css`.
pub fn select_within<'a>(el: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match get_or_compile(css) {
        Some(selector) => el.select(&selector).collect(),
        None => vec![],
    }
}
