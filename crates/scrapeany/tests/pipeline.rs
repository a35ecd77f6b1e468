// ABOUTME: End-to-end tests for Client::scrape against a mock HTTP server.
// ABOUTME: Verifies written artifacts, archive contents, download mode and fatal error propagation.

use std::fs::{self, File};
use std::io::Read;

use httpmock::prelude::*;
use scrapeany::{Client, MediaMode};
use tempfile::TempDir;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Catalog</title></head>
<body>
  <h2>Files</h2>
  <a href="docs/manual.pdf">Manual</a>
  <a href="/media/intro.mp4">Intro</a>
  <audio><source src="/media/theme.mp3" type="audio/mpeg"></audio>
  <ul><li>one</li></ul>
  <span class="name">Ada Lovelace</span>
  <span class="email"> ada@example.com </span>
</body>
</html>"#;

fn zip_entries(path: &std::path::Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn scrape_writes_artifacts_and_archive() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path("/catalog/index.html");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(PAGE);
    });

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("ScrapedData");
    let client = Client::builder()
        .allow_private_networks(true)
        .output_dir(&out)
        .build()
        .unwrap();
    let request = client
        .parse_request(["title", "pdfs", "videos", "audios", "lists", "personal", "headings"])
        .unwrap();

    let report = client
        .scrape(&server.url("/catalog/index.html"), &request)
        .await
        .unwrap();
    page.assert();

    assert_eq!(
        fs::read_to_string(out.join("pdfs.txt")).unwrap(),
        server.url("/catalog/docs/manual.pdf")
    );
    assert_eq!(
        fs::read_to_string(out.join("videos.txt")).unwrap(),
        server.url("/media/intro.mp4")
    );
    assert_eq!(
        fs::read_to_string(out.join("audios.txt")).unwrap(),
        server.url("/media/theme.mp3")
    );
    assert_eq!(
        fs::read_to_string(out.join("lists.txt")).unwrap(),
        "<ul><li>one</li></ul>"
    );
    assert_eq!(fs::read_to_string(out.join("headings.txt")).unwrap(), "Files");

    let personal: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("personal.json")).unwrap()).unwrap();
    assert_eq!(
        personal,
        serde_json::json!({"name": "Ada Lovelace", "email": "ada@example.com", "phone": ""})
    );

    let archive = report.archive.expect("archive is on by default");
    assert_eq!(archive, temp.path().join("ScrapedData.zip"));
    assert_eq!(
        zip_entries(&archive),
        vec![
            "audios.txt",
            "headings.txt",
            "lists.txt",
            "pdfs.txt",
            "personal.json",
            "title.txt",
            "videos.txt"
        ]
    );
    assert!(report.downloads.is_empty());
}

#[tokio::test]
async fn download_mode_saves_items_and_lists() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/catalog/index.html");
        then.status(200).header("content-type", "text/html").body(PAGE);
    });
    let pdf = server.mock(|when, then| {
        when.method(GET).path("/catalog/docs/manual.pdf");
        then.status(200).body("%PDF-1.4");
    });

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("run");
    let client = Client::builder()
        .allow_private_networks(true)
        .output_dir(&out)
        .media_mode(MediaMode::Download)
        .build()
        .unwrap();
    let request = client.parse_request(["pdfs"]).unwrap();

    let report = client
        .scrape(&server.url("/catalog/index.html"), &request)
        .await
        .unwrap();
    pdf.assert();

    assert_eq!(report.downloads, vec!["pdf_0.pdf"]);
    assert_eq!(fs::read(out.join("pdf_0.pdf")).unwrap(), b"%PDF-1.4");
    assert!(out.join("pdfs.txt").is_file());

    let archive = report.archive.unwrap();
    assert_eq!(zip_entries(&archive), vec!["pdf_0.pdf", "pdfs.txt"]);

    let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
    let mut body = String::new();
    zip.by_name("pdf_0.pdf")
        .unwrap()
        .read_to_string(&mut body)
        .unwrap();
    assert_eq!(body, "%PDF-1.4");
}

#[tokio::test]
async fn downloads_beyond_concurrency_all_land_in_order() {
    let server = MockServer::start();
    let page: String = (0..5)
        .map(|i| format!(r#"<img src="/img/{}.png">"#, i))
        .collect();
    server.mock(|when, then| {
        when.method(GET).path("/gallery");
        then.status(200)
            .header("content-type", "text/html")
            .body(page.as_str());
    });
    for i in 0..5 {
        server.mock(|when, then| {
            when.method(GET).path(format!("/img/{}.png", i));
            then.status(200).body(format!("image-{}", i));
        });
    }

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("gallery");
    let client = Client::builder()
        .allow_private_networks(true)
        .output_dir(&out)
        .media_mode(MediaMode::Download)
        .download_concurrency(2)
        .archive(false)
        .build()
        .unwrap();
    let request = client.parse_request(["images"]).unwrap();

    let report = client
        .scrape(&server.url("/gallery"), &request)
        .await
        .unwrap();

    let expected: Vec<String> = (0..5).map(|i| format!("image_{}.png", i)).collect();
    assert_eq!(report.downloads, expected);
    for i in 0..5 {
        assert_eq!(
            fs::read_to_string(out.join(format!("image_{}.png", i))).unwrap(),
            format!("image-{}", i)
        );
    }
}

#[tokio::test]
async fn clean_output_archives_only_current_run() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("run");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("table_5.csv"), "stale").unwrap();

    let request = scrapeany::ExtractionRequest::parse(["title"], true).unwrap();
    let html = "<title>Now</title>";

    let keep = Client::builder().output_dir(&out).build().unwrap();
    let report = keep
        .scrape_html(html, "https://example.com/", &request)
        .await
        .unwrap();
    assert_eq!(
        zip_entries(&report.archive.unwrap()),
        vec!["table_5.csv", "title.txt"]
    );

    let clean = Client::builder()
        .output_dir(&out)
        .clean_output(true)
        .build()
        .unwrap();
    let report = clean
        .scrape_html(html, "https://example.com/", &request)
        .await
        .unwrap();
    assert!(!out.join("table_5.csv").exists());
    assert_eq!(zip_entries(&report.archive.unwrap()), vec!["title.txt"]);
}

#[tokio::test]
async fn fetch_error_is_fatal_before_any_write() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/down");
        then.status(503);
    });

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let client = Client::builder()
        .allow_private_networks(true)
        .output_dir(&out)
        .build()
        .unwrap();
    let request = client.parse_request(["title"]).unwrap();

    let err = client
        .scrape(&server.url("/down"), &request)
        .await
        .unwrap_err();
    assert!(err.is_fetch());
    assert!(!out.exists());
}

#[tokio::test]
async fn private_network_is_blocked_by_default() {
    let server = MockServer::start();
    let temp = TempDir::new().unwrap();
    let client = Client::builder()
        .output_dir(temp.path().join("out"))
        .build()
        .unwrap();
    let request = client.parse_request(["title"]).unwrap();

    let err = client
        .scrape(&server.url("/"), &request)
        .await
        .unwrap_err();
    assert!(err.is_ssrf());
}

#[tokio::test]
async fn sink_failure_is_fatal() {
    let temp = TempDir::new().unwrap();
    let blocked = temp.path().join("not-a-dir");
    fs::write(&blocked, "file in the way").unwrap();

    let client = Client::builder().output_dir(&blocked).build().unwrap();
    let request = client.parse_request(["title"]).unwrap();

    let err = client
        .scrape_html("<title>x</title>", "https://example.com/", &request)
        .await
        .unwrap_err();
    assert!(err.is_sink());
}

#[tokio::test]
async fn strict_client_rejects_unknown_categories() {
    let client = Client::builder().strict_categories(true).build().unwrap();
    let err = client.parse_request(["title", "gifs"]).unwrap_err();
    assert!(err.is_invalid_category());

    let lenient = Client::builder().build().unwrap();
    let request = lenient.parse_request(["title", "gifs"]).unwrap();
    assert_eq!(request.len(), 1);
}
