use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::Context;
use blogsift_core::{
    ExtractConfig, ExtractionResult, Extractor, FetchConfig, NodeSelector, OutputFormat, fetch_file, fetch_stdin,
    fetch_url,
};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for extraction results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Html,
    Text,
    Markdown,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(format!("Invalid format: {}. Valid options: json, html, text, markdown", s)),
        }
    }
}

/// Extract the article and images of a blog post
#[derive(Parser, Debug)]
#[command(name = "blogsift")]
#[command(version)]
#[command(about = "Extract blog articles and their images from web pages", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Base URL for resolving relative image URLs (default: the fetched URL)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Output format (json, html, text, markdown)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: Format,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "20", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Visible text a class-matched region must exceed to be chosen
    #[arg(long, default_value = "200", value_name = "NUM")]
    min_text_length: usize,

    /// Extra selector to strip from the article (repeatable)
    #[arg(long = "remove", value_name = "SELECTOR")]
    remove: Vec<NodeSelector>,

    /// Title used when the page has none
    #[arg(long, default_value = "Untitled", value_name = "TITLE")]
    fallback_title: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

enum Input {
    Stdin,
    Url(String),
    File(String),
}

impl Input {
    fn detect(input: &str) -> Self {
        if input == "-" {
            Input::Stdin
        } else if input.starts_with("http://") || input.starts_with("https://") {
            Input::Url(input.to_string())
        } else {
            Input::File(input.to_string())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "blogsift_core=debug,blogsift=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Reads the page, returning its HTML and the URL relative references resolve against.
async fn read_input(args: &Args) -> anyhow::Result<(String, Option<String>)> {
    match Input::detect(&args.input) {
        Input::Stdin => {
            if args.verbose {
                echo::print_step(1, 3, "Reading from stdin");
            }
            let html = fetch_stdin().context("Failed to read from stdin")?;
            Ok((html, args.base_url.clone()))
        }
        Input::Url(url) => {
            if args.verbose {
                echo::print_step(1, 3, &format!("Fetching from {}", url.bright_white().underline()));
            }

            let mut config = FetchConfig { timeout: args.timeout, ..Default::default() };
            if let Some(user_agent) = &args.user_agent {
                config.user_agent = user_agent.clone();
            }

            let page = fetch_url(&url, &config).await.context("Failed to fetch URL")?;
            let base = args.base_url.clone().unwrap_or_else(|| page.url.to_string());
            Ok((page.html, Some(base)))
        }
        Input::File(path) => {
            if args.verbose {
                echo::print_step(1, 3, &format!("Reading from file {}", path.bright_white()));
            }
            let html = fetch_file(&path).with_context(|| format!("Failed to read file: {}", path))?;
            Ok((html, args.base_url.clone()))
        }
    }
}

fn render(result: &ExtractionResult, format: Format) -> anyhow::Result<String> {
    let output = match format {
        Format::Json => {
            let json = result.to_json().context("Failed to serialize result")?;
            format!("{json:#}\n")
        }
        Format::Html => format!("{}\n", result.content_html),
        Format::Text => format!("{}\n", result.to_text()),
        Format::Markdown => result
            .to_format(OutputFormat::Markdown)
            .context("Failed to convert to Markdown")?,
    };
    debug!(?format, bytes = output.len(), "rendered output");
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let started = Instant::now();
    let mut timings: Vec<(&str, Duration)> = Vec::new();

    let (html, base_url) = read_input(&args).await?;
    timings.push(("Read", started.elapsed()));

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(html.len()).bright_white());
        if let Some(base) = &base_url {
            eprintln!("  {} {}", "Base URL:".dimmed(), base.bright_white());
        }
        eprintln!();
        echo::print_step(2, 3, "Extracting article");
    }

    let mut builder = ExtractConfig::builder()
        .min_text_length(args.min_text_length)
        .fallback_title(args.fallback_title.clone());
    for selector in &args.remove {
        builder = builder.noise_selector(selector.clone());
    }

    let stage = Instant::now();
    let result = Extractor::with_config(builder.build())
        .extract(&html, base_url.as_deref())
        .context("Failed to extract article")?;
    timings.push(("Extract", stage.elapsed()));

    if args.verbose {
        echo::print_extraction_details(&result);
        if result.title == args.fallback_title {
            echo::print_warning("No heading or <title> found, using the fallback title");
        }
        echo::print_step(3, 3, &format!("Writing {:?} output", args.format));
    }

    let output = render(&result, args.format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    if args.verbose {
        echo::print_timing_summary(started.elapsed(), &timings);
    }

    Ok(())
}
