// ABOUTME: The main Client struct for scrapeany that wires the fetcher, extractor, sink and archiver.
// ABOUTME: Provides async scrape() and scrape_html() runs plus the individual fetch and download steps.

use std::net::IpAddr;
use std::path::PathBuf;
use std::pin::pin;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use url::Url;

use crate::category::{Category, ExtractionRequest};
use crate::document::Document;
use crate::error::ScrapeError;
use crate::extract::{extract, ArtifactSet, ExtractedField};
use crate::options::{ClientBuilder, MediaMode, Options};
use crate::resource::{fetch, is_private_ip, FetchOptions};
use crate::sink::archive::archive_dir;
use crate::sink::{write_artifacts, DirSink, Sink};

/// Maximum number of redirects followed for one request.
const MAX_REDIRECTS: usize = 10;

/// Outcome of one scrape run.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub url: String,
    pub output_dir: PathBuf,
    /// Artifact names in write order.
    pub artifacts_written: Vec<String>,
    /// File names of successfully downloaded media items.
    pub downloads: Vec<String>,
    pub archive: Option<PathBuf>,
    pub artifacts: ArtifactSet,
}

/// One downloaded media item, named for the sink.
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub name: String,
    pub url: String,
    pub bytes: Bytes,
}

/// The scrapeany client: fetches a page, extracts the requested categories and persists them.
pub struct Client {
    opts: Options,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Result<Self, ScrapeError> {
        let http_client = match opts.http_client.clone() {
            Some(client) => client,
            None => build_http_client(&opts)?,
        };
        Ok(Self { opts, http_client })
    }

    /// Builds a request from operator tokens, honoring the strict-categories setting.
    pub fn parse_request<I, S>(&self, tokens: I) -> Result<ExtractionRequest, ScrapeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ExtractionRequest::parse(tokens, self.opts.strict_categories)
    }

    /// Fetches `url` and parses it, using the final URL after redirects as the base.
    pub async fn fetch_document(&self, url: &str) -> Result<Document, ScrapeError> {
        let fetch_opts = self.fetch_options(self.opts.max_page_size);
        let result = fetch(&self.http_client, url, &fetch_opts).await?;
        tracing::info!(
            url,
            final_url = %result.final_url,
            bytes = result.body.len(),
            "fetched page"
        );

        let final_url = Url::parse(&result.final_url).map_err(|e| {
            ScrapeError::invalid_url(&result.final_url, "FetchDocument", Some(e.into()))
        })?;
        Ok(Document::from_parts(&result.text_utf8(), final_url))
    }

    /// Parses local HTML as if it had been fetched from `url`.
    pub fn document_from_html(&self, html: &str, url: &str) -> Result<Document, ScrapeError> {
        if html.is_empty() {
            return Err(ScrapeError::invalid_url(
                url,
                "ParseHTML",
                Some(anyhow::anyhow!("empty HTML")),
            ));
        }
        Document::parse(html, url)
    }

    /// Fetches `url`, extracts `request`, and writes (and optionally archives) the artifacts.
    pub async fn scrape(
        &self,
        url: &str,
        request: &ExtractionRequest,
    ) -> Result<ScrapeReport, ScrapeError> {
        let artifacts = {
            let document = self.fetch_document(url).await?;
            extract(&document, request)
        };
        self.persist(url, artifacts).await
    }

    /// Same as `scrape`, reading the page from an HTML string.
    pub async fn scrape_html(
        &self,
        html: &str,
        url: &str,
        request: &ExtractionRequest,
    ) -> Result<ScrapeReport, ScrapeError> {
        let artifacts = {
            let document = self.document_from_html(html, url)?;
            extract(&document, request)
        };
        self.persist(url, artifacts).await
    }

    async fn persist(
        &self,
        url: &str,
        artifacts: ArtifactSet,
    ) -> Result<ScrapeReport, ScrapeError> {
        let mut sink = if self.opts.clean_output {
            DirSink::create_clean(&self.opts.output_dir)?
        } else {
            DirSink::create(&self.opts.output_dir)?
        };
        let artifacts_written = write_artifacts(&mut sink, &artifacts)?;

        let mut downloads = Vec::new();
        if self.opts.media_mode == MediaMode::Download {
            let mut items = pin!(self.media_downloads(&artifacts));
            while let Some(item) = items.next().await {
                sink.put_bytes(&item.name, &item.bytes)?;
                downloads.push(item.name);
            }
        }

        let archive = if self.opts.archive {
            Some(archive_dir(sink.dir())?)
        } else {
            None
        };

        Ok(ScrapeReport {
            url: url.to_string(),
            output_dir: sink.dir().to_path_buf(),
            artifacts_written,
            downloads,
            archive,
            artifacts,
        })
    }

    /// Streams the media items of `artifacts` in per-category index order.
    ///
    /// At most `download_concurrency` downloads are in flight, and items are
    /// yielded as they complete in order, so a caller that writes each item
    /// before polling again holds only that many bodies. Items that fail to
    /// download are logged and left out.
    pub fn media_downloads(
        &self,
        artifacts: &ArtifactSet,
    ) -> impl Stream<Item = MediaItem> + '_ {
        let jobs: Vec<(String, String)> = artifacts
            .iter()
            .filter_map(|(category, field)| match field {
                ExtractedField::Urls(urls) => Some((category, urls)),
                _ => None,
            })
            .flat_map(|(category, urls)| {
                urls.iter()
                    .enumerate()
                    .filter_map(move |(index, url)| {
                        media_file_name(category, index, url).map(|name| (name, url.clone()))
                    })
            })
            .collect();

        let fetch_opts = self.fetch_options(self.opts.max_media_size);
        stream::iter(jobs)
            .map(move |(name, url)| {
                let fetch_opts = fetch_opts.clone();
                async move {
                    match fetch(&self.http_client, &url, &fetch_opts).await {
                        Ok(result) => Some(MediaItem {
                            name,
                            url,
                            bytes: result.body,
                        }),
                        Err(err) => {
                            tracing::warn!(url = %url, error = %err, "skipping media download");
                            None
                        }
                    }
                }
            })
            .buffered(self.opts.download_concurrency.max(1))
            .filter_map(|item| async move { item })
    }

    fn fetch_options(&self, max_content_length: usize) -> FetchOptions {
        FetchOptions {
            headers: self.opts.headers.clone(),
            allow_private_networks: self.opts.allow_private_networks,
            max_content_length,
        }
    }
}

fn build_http_client(opts: &Options) -> Result<reqwest::Client, ScrapeError> {
    let allow_private = opts.allow_private_networks;
    let redirect_policy = reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let blocked = !allow_private
            && attempt
                .url()
                .host_str()
                .map(|host| host.trim_start_matches('[').trim_end_matches(']'))
                .and_then(|host| host.parse::<IpAddr>().ok())
                .is_some_and(|ip| is_private_ip(&ip));
        if blocked {
            return attempt.error("redirect to private IP blocked");
        }
        attempt.follow()
    });

    reqwest::Client::builder()
        .redirect(redirect_policy)
        .user_agent(&opts.user_agent)
        .timeout(opts.timeout)
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .map_err(|e| ScrapeError::fetch("", "BuildClient", Some(e.into())))
}

/// `<prefix>_<index>.<ext>` for a media URL, or None for non-media categories.
///
/// The extension comes from the URL path when it looks like one.
fn media_file_name(category: Category, index: usize, url: &str) -> Option<String> {
    let (prefix, fallback) = category.media_naming()?;
    let ext = url_extension(url).unwrap_or_else(|| fallback.to_string());
    Some(format!("{}_{}.{}", prefix, index, ext))
}

fn url_extension(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    let valid = !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}
