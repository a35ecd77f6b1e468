// ABOUTME: Category extraction and normalization over a parsed Document.
// ABOUTME: A dispatch table maps each Category to its selector rule; extract() runs the requested ones.

//! Multi-category extraction.
//!
//! `extract` is a pure function: it reads the document, performs no I/O, and
//! returns one `ExtractedField` per requested category. A selector that
//! matches nothing produces an empty field, never an error.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::category::{Category, ExtractionRequest};
use crate::document::Document;
use crate::extractors::select::{
    element_text, select_attrs, select_elements, select_first_text_trimmed, select_outer_html,
    select_texts, select_within,
};

/// One `<table>` as rows of trimmed cell texts. Rows keep their own length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

/// Contact details found in `span.name`, `span.email` and `span.phone`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// The extracted value for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtractedField {
    /// Text content or raw attribute values.
    Strings(Vec<String>),
    /// Absolute URLs resolved against the document base.
    Urls(Vec<String>),
    Tables(Vec<Table>),
    Personal(PersonalInfo),
}

impl ExtractedField {
    /// Number of extracted items; a personal record always counts as one.
    pub fn len(&self) -> usize {
        match self {
            ExtractedField::Strings(v) | ExtractedField::Urls(v) => v.len(),
            ExtractedField::Tables(t) => t.len(),
            ExtractedField::Personal(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The string items of a text or URL field.
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            ExtractedField::Strings(v) | ExtractedField::Urls(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

/// Extracted fields keyed by category, iterated in menu order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArtifactSet {
    fields: BTreeMap<Category, ExtractedField>,
}

impl ArtifactSet {
    pub fn get(&self, category: Category) -> Option<&ExtractedField> {
        self.fields.get(&category)
    }

    pub fn insert(&mut self, category: Category, field: ExtractedField) {
        self.fields.insert(category, field);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.fields.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &ExtractedField)> + '_ {
        self.fields.iter().map(|(c, f)| (*c, f))
    }
}

type ExtractFn = fn(&Document) -> ExtractedField;

/// Selector rule for every category.
const RULES: [(Category, ExtractFn); 14] = [
    (Category::Title, extract_title),
    (Category::Images, extract_images),
    (Category::Links, extract_links),
    (Category::Paragraphs, extract_paragraphs),
    (Category::Spans, extract_spans),
    (Category::Pdfs, extract_pdfs),
    (Category::Docs, extract_docs),
    (Category::Videos, extract_videos),
    (Category::Audios, extract_audios),
    (Category::Tables, extract_tables),
    (Category::Quotes, extract_quotes),
    (Category::Headings, extract_headings),
    (Category::Lists, extract_lists),
    (Category::Personal, extract_personal),
];

fn rule_for(category: Category) -> ExtractFn {
    RULES
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, f)| *f)
        .unwrap_or(empty_field)
}

fn empty_field(_: &Document) -> ExtractedField {
    ExtractedField::Strings(vec![])
}

/// Runs the rule of every requested category against `doc`.
pub fn extract(doc: &Document, request: &ExtractionRequest) -> ArtifactSet {
    let mut artifacts = ArtifactSet::default();
    for category in request.iter() {
        let field = rule_for(category)(doc);
        tracing::debug!(category = category.name(), items = field.len(), "extracted");
        artifacts.insert(category, field);
    }
    artifacts
}

/// Extracts a single category.
pub fn extract_category(doc: &Document, category: Category) -> ExtractedField {
    rule_for(category)(doc)
}

fn extract_title(doc: &Document) -> ExtractedField {
    ExtractedField::Strings(select_texts(doc.html(), "title"))
}

fn extract_images(doc: &Document) -> ExtractedField {
    resolved_attrs(doc, "img", "src")
}

// Links stay exactly as written in the page.
fn extract_links(doc: &Document) -> ExtractedField {
    ExtractedField::Strings(select_attrs(doc.html(), "a", "href"))
}

fn extract_paragraphs(doc: &Document) -> ExtractedField {
    ExtractedField::Strings(select_texts(doc.html(), "p"))
}

fn extract_spans(doc: &Document) -> ExtractedField {
    ExtractedField::Strings(select_texts(doc.html(), "span"))
}

fn extract_pdfs(doc: &Document) -> ExtractedField {
    resolved_attrs(doc, "a[href$='.pdf']", "href")
}

fn extract_docs(doc: &Document) -> ExtractedField {
    resolved_attrs(doc, "a[href$='.doc']", "href")
}

fn extract_videos(doc: &Document) -> ExtractedField {
    resolved_media_sources(
        doc,
        "video source[src], source[type^='video'][src], a[href$='.mp4'], a[href$='.webm']",
    )
}

fn extract_audios(doc: &Document) -> ExtractedField {
    resolved_media_sources(
        doc,
        "audio source[src], source[type^='audio'][src], a[href$='.mp3'], a[href$='.wav']",
    )
}

fn extract_tables(doc: &Document) -> ExtractedField {
    let tables = select_elements(doc.html(), "table")
        .iter()
        .map(|table| Table {
            rows: select_within(table, "tr")
                .iter()
                .map(|row| {
                    select_within(row, "td, th")
                        .iter()
                        .map(|cell| element_text(cell).trim().to_string())
                        .collect()
                })
                .collect(),
        })
        .collect();
    ExtractedField::Tables(tables)
}

fn extract_quotes(doc: &Document) -> ExtractedField {
    ExtractedField::Strings(select_texts(doc.html(), "blockquote"))
}

fn extract_headings(doc: &Document) -> ExtractedField {
    ExtractedField::Strings(select_texts(doc.html(), "h1, h2, h3, h4, h5, h6"))
}

fn extract_lists(doc: &Document) -> ExtractedField {
    ExtractedField::Strings(select_outer_html(doc.html(), "ul, ol"))
}

fn extract_personal(doc: &Document) -> ExtractedField {
    let html = doc.html();
    ExtractedField::Personal(PersonalInfo {
        name: select_first_text_trimmed(html, "span.name"),
        email: select_first_text_trimmed(html, "span.email"),
        phone: select_first_text_trimmed(html, "span.phone"),
    })
}

fn resolved_attrs(doc: &Document, css: &str, attr: &str) -> ExtractedField {
    ExtractedField::Urls(
        select_attrs(doc.html(), css, attr)
            .iter()
            .map(|raw| doc.resolve(raw))
            .collect(),
    )
}

/// `<source>` elements carry `src`, anchors carry `href`.
fn resolved_media_sources(doc: &Document, css: &str) -> ExtractedField {
    ExtractedField::Urls(
        select_elements(doc.html(), css)
            .iter()
            .filter_map(|el| {
                let attr = if el.value().name() == "a" { "href" } else { "src" };
                el.value().attr(attr)
            })
            .map(|raw| doc.resolve(raw))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Sample</title></head>
<body>
  <h1>Top</h1>
  <p>First <em>para</em></p>
  <h3>Third level</h3>
  <h2>Second level</h2>
  <img src="/img/logo.png"><img src="https://cdn.example.com/b.jpg">
  <a href="/files/report.pdf">Report</a>
  <a href="notes.doc">Notes</a>
  <a href="notes.docx">Not a doc</a>
  <video><source src="/v/clip.webm" type="video/webm"></video>
  <a href="/v/movie.mp4">Movie</a>
  <audio><source src="song.ogg"></audio>
  <source type="audio/mpeg" src="/a/loose.mp3">
  <a href="/a/track.wav">Track</a>
  <blockquote>Quoted</blockquote>
  <ol><li>x</li></ol>
  <span class="name"> Grace Hopper </span>
  <span class="email">grace@example.com</span>
</body>
</html>"#;

    fn doc() -> Document {
        Document::parse(PAGE, "https://example.com/dir/page.html").unwrap()
    }

    fn urls(field: &ExtractedField) -> Vec<&str> {
        field
            .as_strings()
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn test_rules_cover_every_category() {
        for category in Category::ALL {
            assert!(
                RULES.iter().any(|(c, _)| *c == category),
                "missing rule for {}",
                category
            );
        }
    }

    #[test]
    fn test_headings_in_document_order() {
        let field = extract_category(&doc(), Category::Headings);
        assert_eq!(
            field,
            ExtractedField::Strings(vec![
                "Top".to_string(),
                "Third level".to_string(),
                "Second level".to_string()
            ])
        );
    }

    #[test]
    fn test_images_are_resolved() {
        let field = extract_category(&doc(), Category::Images);
        assert_eq!(
            urls(&field),
            vec![
                "https://example.com/img/logo.png",
                "https://cdn.example.com/b.jpg"
            ]
        );
    }

    #[test]
    fn test_pdfs_and_docs_match_exact_suffix() {
        let d = doc();
        assert_eq!(
            urls(&extract_category(&d, Category::Pdfs)),
            vec!["https://example.com/files/report.pdf"]
        );
        assert_eq!(
            urls(&extract_category(&d, Category::Docs)),
            vec!["https://example.com/dir/notes.doc"]
        );
    }

    #[test]
    fn test_videos_combine_sources_and_anchors_in_order() {
        assert_eq!(
            urls(&extract_category(&doc(), Category::Videos)),
            vec![
                "https://example.com/v/clip.webm",
                "https://example.com/v/movie.mp4"
            ]
        );
    }

    #[test]
    fn test_audios_combine_sources_and_anchors_in_order() {
        assert_eq!(
            urls(&extract_category(&doc(), Category::Audios)),
            vec![
                "https://example.com/dir/song.ogg",
                "https://example.com/a/loose.mp3",
                "https://example.com/a/track.wav"
            ]
        );
    }

    #[test]
    fn test_paragraph_text_includes_inline_children() {
        assert_eq!(
            extract_category(&doc(), Category::Paragraphs),
            ExtractedField::Strings(vec!["First para".to_string()])
        );
    }

    #[test]
    fn test_lists_are_raw_markup() {
        assert_eq!(
            extract_category(&doc(), Category::Lists),
            ExtractedField::Strings(vec!["<ol><li>x</li></ol>".to_string()])
        );
    }

    #[test]
    fn test_personal_fields_are_trimmed_and_defaulted() {
        assert_eq!(
            extract_category(&doc(), Category::Personal),
            ExtractedField::Personal(PersonalInfo {
                name: "Grace Hopper".to_string(),
                email: "grace@example.com".to_string(),
                phone: String::new(),
            })
        );
    }

    #[test]
    fn test_tables_trim_cells_and_keep_empty_cells() {
        let html = r#"<table>
            <tr><th> Name </th><th>Age</th></tr>
            <tr><td>Ann</td><td></td></tr>
            <tr><td> solo </td></tr>
        </table>"#;
        let d = Document::parse(html, "https://example.com/").unwrap();
        assert_eq!(
            extract_category(&d, Category::Tables),
            ExtractedField::Tables(vec![Table {
                rows: vec![
                    vec!["Name".to_string(), "Age".to_string()],
                    vec!["Ann".to_string(), String::new()],
                    vec!["solo".to_string()],
                ]
            }])
        );
    }

    #[test]
    fn test_extract_only_requested_categories() {
        let request = ExtractionRequest::parse(["quotes", "tables"], true).unwrap();
        let artifacts = extract(&doc(), &request);
        let keys: Vec<Category> = artifacts.categories().collect();
        assert_eq!(keys, vec![Category::Tables, Category::Quotes]);
        assert!(artifacts.get(Category::Tables).unwrap().is_empty());
    }

    #[test]
    fn test_artifact_set_serializes_by_category_name() {
        let request = ExtractionRequest::parse(["title", "personal"], true).unwrap();
        let json = serde_json::to_value(extract(&doc(), &request)).unwrap();
        assert_eq!(json["title"], serde_json::json!(["Sample"]));
        assert_eq!(json["personal"]["name"], "Grace Hopper");
        assert_eq!(json["personal"]["phone"], "");
    }
}
