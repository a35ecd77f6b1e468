// ABOUTME: The closed set of extractable content categories and the operator's request set.
// ABOUTME: Parses category names or menu numbers, dropping or rejecting unknown tokens.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ScrapeError;

/// One named kind of extractable content.
///
/// Declaration order is the menu order and the iteration order of requests
/// and artifact sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Title,
    Images,
    Links,
    Paragraphs,
    Spans,
    Pdfs,
    Docs,
    Videos,
    Audios,
    Tables,
    Quotes,
    Headings,
    Lists,
    Personal,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Category; 14] = [
        Category::Title,
        Category::Images,
        Category::Links,
        Category::Paragraphs,
        Category::Spans,
        Category::Pdfs,
        Category::Docs,
        Category::Videos,
        Category::Audios,
        Category::Tables,
        Category::Quotes,
        Category::Headings,
        Category::Lists,
        Category::Personal,
    ];

    /// Stable lowercase name, also used as the artifact file stem.
    pub fn name(self) -> &'static str {
        match self {
            Category::Title => "title",
            Category::Images => "images",
            Category::Links => "links",
            Category::Paragraphs => "paragraphs",
            Category::Spans => "spans",
            Category::Pdfs => "pdfs",
            Category::Docs => "docs",
            Category::Videos => "videos",
            Category::Audios => "audios",
            Category::Tables => "tables",
            Category::Quotes => "quotes",
            Category::Headings => "headings",
            Category::Lists => "lists",
            Category::Personal => "personal",
        }
    }

    /// 1-based position in the operator menu.
    pub fn menu_number(self) -> usize {
        Category::ALL
            .iter()
            .position(|c| *c == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// File prefix and fallback extension for downloaded media items.
    pub fn media_naming(self) -> Option<(&'static str, &'static str)> {
        match self {
            Category::Images => Some(("image", "jpg")),
            Category::Videos => Some(("video", "mp4")),
            Category::Audios => Some(("audio", "mp3")),
            Category::Pdfs => Some(("pdf", "pdf")),
            Category::Docs => Some(("doc", "doc")),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Category {
    type Err = ScrapeError;

    /// Accepts a category name (case-insensitive) or its menu number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if let Ok(n) = token.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| Category::ALL.get(i).copied())
                .ok_or_else(|| ScrapeError::invalid_category(token, "ParseCategory"));
        }
        let lower = token.to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.name() == lower)
            .ok_or_else(|| ScrapeError::invalid_category(token, "ParseCategory"))
    }
}

/// The set of categories selected by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionRequest {
    categories: BTreeSet<Category>,
}

impl ExtractionRequest {
    /// Builds a request from operator tokens.
    ///
    /// Empty tokens are skipped. Unknown tokens are dropped with a warning,
    /// or rejected with an `InvalidCategory` error when `strict` is set.
    pub fn parse<I, S>(tokens: I, strict: bool) -> Result<Self, ScrapeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories = BTreeSet::new();
        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            match token.parse::<Category>() {
                Ok(category) => {
                    categories.insert(category);
                }
                Err(err) if strict => return Err(err),
                Err(_) => {
                    tracing::warn!(token, "ignoring unrecognized category");
                }
            }
        }
        Ok(Self { categories })
    }

    /// Splits a comma-separated selection such as `"1,links, tables"`.
    pub fn parse_list(list: &str, strict: bool) -> Result<Self, ScrapeError> {
        Self::parse(list.split(','), strict)
    }

    /// A request for every category.
    pub fn all() -> Self {
        Category::ALL.into_iter().collect()
    }

    pub fn contains(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    pub fn insert(&mut self, category: Category) -> bool {
        self.categories.insert(category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Iterates categories in menu order.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.iter().copied()
    }
}

impl FromIterator<Category> for ExtractionRequest {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        Self {
            categories: iter.into_iter().collect(),
        }
    }
}
