// ABOUTME: CLI binary for the scrapeany page extractor.
// ABOUTME: Fetches a URL (or reads an HTML file), saves the selected categories, and zips the output.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use scrapeany::{Category, Client, MediaMode, ScrapeReport, DEFAULT_OUTPUT_DIR};

#[derive(Parser, Debug)]
#[command(name = "scrapeany")]
#[command(about = "Scrape selected kinds of content from a web page into files and a zip archive")]
struct Args {
    /// Categories to extract, comma separated names or menu numbers (e.g. "1,links,10")
    #[arg(short = 'c', long = "categories")]
    categories: Option<String>,

    /// Output directory; the archive is written next to it as <DIR>.zip
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// HTML file to parse instead of fetching (requires --url)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// Page URL used to resolve links when parsing --html
    #[arg(long = "url")]
    url: Option<String>,

    /// Media handling: list (write resolved URLs) or download (also save each item)
    #[arg(long = "media", default_value = "list")]
    media: MediaMode,

    /// Fail on unknown category names instead of ignoring them
    #[arg(long = "strict")]
    strict: bool,

    /// Do not zip the output directory
    #[arg(long = "no-archive")]
    no_archive: bool,

    /// Empty the output directory before writing
    #[arg(long = "clean")]
    clean: bool,

    /// Allow fetching from private/local networks
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// Request timeout in seconds
    #[arg(long = "timeout", default_value_t = 30)]
    timeout: u64,

    /// Custom User-Agent header
    #[arg(long = "user-agent")]
    user_agent: Option<String>,

    /// Print the run report as JSON instead of a summary line
    #[arg(long = "json")]
    json_output: bool,

    /// Print the numbered category menu and exit
    #[arg(long = "list-categories")]
    list_categories: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// URL to scrape (fetch mode)
    #[arg()]
    target: Option<String>,
}

fn print_menu(out: &mut impl Write) -> io::Result<()> {
    for category in Category::ALL {
        let name = category.name();
        let mut chars = name.chars();
        let label = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        writeln!(out, "{}: {}", category.menu_number(), label)?;
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", label)?;
    stdout.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Positional URL, or an interactive prompt when stdin is a terminal.
fn resolve_target(args: &Args, interactive: bool) -> Result<Option<String>> {
    if args.html.is_some() {
        return Ok(None);
    }
    match &args.target {
        Some(url) => Ok(Some(url.clone())),
        None if interactive => {
            let url = prompt("Enter URL to scrape: ")?;
            if url.is_empty() {
                bail!("a URL is required");
            }
            Ok(Some(url))
        }
        None => bail!("a URL is required, or use --html with --url"),
    }
}

fn resolve_categories(args: &Args, interactive: bool) -> Result<String> {
    match &args.categories {
        Some(list) => Ok(list.clone()),
        None if interactive => {
            print_menu(&mut io::stdout())?;
            prompt("Enter categories to scrape (comma separated, e.g. 1,3): ")
        }
        None => bail!("at least one category is required (use -c/--categories)"),
    }
}

fn format_report(report: &ScrapeReport, json_output: bool) -> Result<String> {
    if json_output {
        return serde_json::to_string_pretty(report).context("encoding report");
    }
    let saved_in = report.archive.as_ref().unwrap_or(&report.output_dir);
    Ok(format!(
        "Data scraped successfully and saved in {}",
        saved_in.display()
    ))
}

async fn run(args: Args) -> Result<()> {
    if args.list_categories {
        print_menu(&mut io::stdout())?;
        return Ok(());
    }

    if args.html.is_some() && args.url.is_none() {
        bail!("--url is required when using --html");
    }
    if args.html.is_some() && args.target.is_some() {
        bail!("cannot use both --html and a positional URL");
    }

    let interactive = io::stdin().is_terminal();
    let target = resolve_target(&args, interactive)?;
    let categories = resolve_categories(&args, interactive)?;

    let mut builder = Client::builder()
        .output_dir(&args.output)
        .media_mode(args.media)
        .archive(!args.no_archive)
        .clean_output(args.clean)
        .strict_categories(args.strict)
        .allow_private_networks(args.allow_private_networks)
        .timeout(Duration::from_secs(args.timeout));
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua);
    }
    let client = builder.build()?;

    let request = client.parse_request(categories.split(','))?;
    if request.is_empty() {
        tracing::warn!("no recognized categories selected; output will be empty");
    }

    let start = Instant::now();
    let report = match (&args.html, &args.url, &target) {
        (Some(html_path), Some(url), _) => {
            let html = fs::read_to_string(html_path)
                .with_context(|| format!("reading {}", html_path.display()))?;
            client.scrape_html(&html, url, &request).await?
        }
        (_, _, Some(url)) => client.scrape(url, &request).await?,
        _ => bail!("a URL is required, or use --html with --url"),
    };
    let elapsed = start.elapsed();

    println!("{}", format_report(&report, args.json_output)?);

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}
