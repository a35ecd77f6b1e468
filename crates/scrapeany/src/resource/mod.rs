// ABOUTME: Fetcher plumbing for pages and media items.
// ABOUTME: Handles HTTP fetching with SSRF protection, body-size limits, and charset decoding.

use std::collections::HashMap;
use std::net::IpAddr;
use std::pin::pin;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use ipnet::{Ipv4Net, Ipv6Net};
use url::Url;

use crate::error::ScrapeError;

/// Default maximum page size (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Options for fetching a resource.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
    pub max_content_length: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            headers: HashMap::new(),
            allow_private_networks: false,
            max_content_length: MAX_CONTENT_LENGTH,
        }
    }
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as UTF-8 text, using charset hints from the content-type header.
    pub fn text_utf8(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Check if an IP address is in a private/reserved range.
pub(crate) fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => {
            const V4_BLOCKED: [&str; 5] = [
                "10.0.0.0/8",
                "172.16.0.0/12",
                "192.168.0.0/16",
                // Loopback
                "127.0.0.0/8",
                // Link-local
                "169.254.0.0/16",
            ];
            V4_BLOCKED
                .iter()
                .filter_map(|net| net.parse::<Ipv4Net>().ok())
                .any(|net| net.contains(ip))
        }
        IpAddr::V6(ip) => {
            if ip.is_loopback() {
                return true;
            }
            // Unique local fc00::/7, link-local fe80::/10
            ["fc00::/7", "fe80::/10"]
                .iter()
                .filter_map(|net| net.parse::<Ipv6Net>().ok())
                .any(|net| net.contains(ip))
        }
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Parse `url` and require an http(s) scheme.
pub(crate) fn validate_url(url: &str, op: &str) -> Result<Url, ScrapeError> {
    if url.is_empty() {
        return Err(ScrapeError::invalid_url(url, op, None));
    }

    let parsed = Url::parse(url).map_err(|e| {
        ScrapeError::invalid_url(url, op, Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ScrapeError::invalid_url(
            url,
            op,
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }
    Ok(parsed)
}

/// Reject `target` if its host is, or resolves to, a private address.
async fn ensure_public(target: &Url, url: &str, what: &str) -> Result<(), ScrapeError> {
    let Some(host) = target.host_str() else {
        return Ok(());
    };
    // IPv6 literals keep their brackets in host_str
    let bare = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = bare.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(ScrapeError::ssrf(
                url,
                "Fetch",
                Some(anyhow::anyhow!("{} private IP address is not allowed", what)),
            ));
        }
        return Ok(());
    }

    let port = target.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        ScrapeError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("DNS lookup failed: {}", e)),
        )
    })?;

    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            return Err(ScrapeError::ssrf(
                url,
                "Fetch",
                Some(anyhow::anyhow!("{} private IP address is not allowed", what)),
            ));
        }
    }
    Ok(())
}

fn too_large(url: &str) -> ScrapeError {
    ScrapeError::fetch(url, "Fetch", Some(anyhow::anyhow!("content too large")))
}

fn request_error(url: &str, e: reqwest::Error) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::timeout(url, "Fetch", Some(anyhow::anyhow!("request timed out: {}", e)))
    } else {
        ScrapeError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
    }
}

/// Fetch a resource from the given URL.
///
/// Only a 200 response is accepted.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, ScrapeError> {
    let parsed_url = validate_url(url, "Fetch")?;

    if !opts.allow_private_networks {
        ensure_public(&parsed_url, url, "target").await?;
    }

    let mut request = client.get(parsed_url);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    let response = request.send().await.map_err(|e| request_error(url, e))?;

    // Redirects may have moved us onto a private address
    if !opts.allow_private_networks {
        ensure_public(response.url(), url, "redirect to").await?;
    }

    if let Some(len) = response.content_length() {
        if len > opts.max_content_length as u64 {
            return Err(too_large(url));
        }
    }

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    if status != 200 {
        return Err(ScrapeError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status)),
        ));
    }

    // Content-Length may be absent; the limit holds while reading too
    let mut body = BytesMut::new();
    let mut chunks = pin!(response.bytes_stream());
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| request_error(url, e))?;
        if body.len() + chunk.len() > opts.max_content_length {
            return Err(too_large(url));
        }
        body.extend_from_slice(&chunk);
    }
    let body = body.freeze();

    Ok(FetchResult {
        status,
        url: url.to_string(),
        final_url,
        content_type,
        body,
    })
}
