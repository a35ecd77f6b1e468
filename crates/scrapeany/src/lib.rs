// ABOUTME: Main library entry point for the scrapeany page extractor.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, Category, ExtractionRequest, extract, sinks and errors.

//! scrapeany - fetch one page and save selected kinds of content from it.
//!
//! A run fetches a URL, extracts the requested categories (title, images,
//! links, tables, ...) with fixed CSS selector rules, writes one artifact per
//! category into an output directory, and zips that directory.
//!
//! # Example
//!
//! ```no_run
//! use scrapeany::{Client, ExtractionRequest, ScrapeError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ScrapeError> {
//!     let client = Client::builder().output_dir("ScrapedData").build()?;
//!     let request = client.parse_request(["title", "links", "tables"])?;
//!     let report = client.scrape("https://example.com", &request).await?;
//!     println!("{:?}", report.archive);
//!     Ok(())
//! }
//! ```
//!
//! Extraction alone is a pure function over a parsed [`Document`]:
//!
//! ```
//! use scrapeany::{extract, Category, Document, ExtractionRequest, ExtractedField};
//!
//! let doc = Document::parse("<title>Home</title><a href=\"/a\">a</a>", "http://x.com/").unwrap();
//! let request: ExtractionRequest = [Category::Title].into_iter().collect();
//! let artifacts = extract(&doc, &request);
//! assert_eq!(
//!     artifacts.get(Category::Title),
//!     Some(&ExtractedField::Strings(vec!["Home".to_string()]))
//! );
//! ```

pub mod category;
pub mod client;
pub mod document;
pub mod error;
pub mod extract;
pub mod extractors;
pub mod options;
pub mod resource;
pub mod sink;

pub use crate::category::{Category, ExtractionRequest};
pub use crate::client::{Client, MediaItem, ScrapeReport};
pub use crate::document::Document;
pub use crate::error::{ErrorCode, ScrapeError};
pub use crate::extract::{extract, ArtifactSet, ExtractedField, PersonalInfo, Table};
pub use crate::options::{ClientBuilder, MediaMode, Options, DEFAULT_OUTPUT_DIR};
pub use crate::sink::archive::archive_dir;
pub use crate::sink::{write_artifacts, DirSink, MemorySink, Sink};
