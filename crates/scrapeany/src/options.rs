// ABOUTME: Configuration options for scrapeany including MediaMode, Options, and ClientBuilder.
// ABOUTME: ClientBuilder provides a fluent API for constructing Client instances with custom settings.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::client::Client;
use crate::resource::MAX_CONTENT_LENGTH;

/// Default output directory, also the stem of the archive name.
pub const DEFAULT_OUTPUT_DIR: &str = "ScrapedData";

/// Default maximum size of one downloaded media item (100 MB).
pub const MAX_MEDIA_LENGTH: usize = 100 * 1024 * 1024;

/// How media categories (images, videos, audios, pdfs, docs) are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaMode {
    /// Write only the list of resolved URLs.
    #[default]
    List,
    /// Write the URL list and download every item next to it.
    Download,
}

impl fmt::Display for MediaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MediaMode::List => "list",
            MediaMode::Download => "download",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MediaMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "list" => Ok(MediaMode::List),
            "download" => Ok(MediaMode::Download),
            other => Err(format!("unknown media mode {:?} (expected list or download)", other)),
        }
    }
}

/// Configuration options for the scrapeany client.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub allow_private_networks: bool,
    pub http_client: Option<reqwest::Client>,
    pub headers: HashMap<String, String>,
    pub output_dir: PathBuf,
    pub media_mode: MediaMode,
    pub archive: bool,
    pub strict_categories: bool,
    pub max_page_size: usize,
    pub max_media_size: usize,
    pub download_concurrency: usize,
    /// Empty `output_dir` before writing so nothing from earlier runs is archived.
    pub clean_output: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("scrapeany/", env!("CARGO_PKG_VERSION")).to_string(),
            allow_private_networks: false,
            http_client: None,
            headers: HashMap::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            media_mode: MediaMode::List,
            archive: true,
            strict_categories: false,
            max_page_size: MAX_CONTENT_LENGTH,
            max_media_size: MAX_MEDIA_LENGTH,
            download_concurrency: 4,
            clean_output: false,
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Allow or disallow requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Set the directory artifacts are written to.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.opts.output_dir = dir.into();
        self
    }

    pub fn media_mode(mut self, mode: MediaMode) -> Self {
        self.opts.media_mode = mode;
        self
    }

    /// Zip the output directory after writing artifacts.
    pub fn archive(mut self, archive: bool) -> Self {
        self.opts.archive = archive;
        self
    }

    /// Reject unknown category names instead of dropping them.
    pub fn strict_categories(mut self, strict: bool) -> Self {
        self.opts.strict_categories = strict;
        self
    }

    pub fn max_page_size(mut self, bytes: usize) -> Self {
        self.opts.max_page_size = bytes;
        self
    }

    pub fn max_media_size(mut self, bytes: usize) -> Self {
        self.opts.max_media_size = bytes;
        self
    }

    /// Number of media downloads in flight at once (at least 1).
    pub fn download_concurrency(mut self, n: usize) -> Self {
        self.opts.download_concurrency = n.max(1);
        self
    }

    /// Remove whatever is already in the output directory before writing.
    pub fn clean_output(mut self, clean: bool) -> Self {
        self.opts.clean_output = clean;
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Result<Client, crate::error::ScrapeError> {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
