//! Search a transcript file from the command line.
//!
//! The transcript is either a JSON array (bare strings or cue objects with
//! `text`, `begin`, `end`, `speaker`) or plain text with one item per line.
//!
//! Usage:
//!     cargo run --release --bin transcript-search -- --transcript talk.json --query "soap"

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use scribe::{MatchResult, ResultOrder, SearchOptions, TranscriptInput, TranscriptSearchApi, TranscriptSearcher};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transcript file (JSON array or one item per line)
    #[arg(short, long)]
    transcript: PathBuf,

    /// Search query; omit to list nothing
    #[arg(short, long)]
    query: Option<String>,

    /// JSON file with search options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Result ordering
    #[arg(long, value_enum, default_value_t = Order::Relevance)]
    order: Order,

    /// Print the whole result set as JSON
    #[arg(long)]
    json: bool,

    /// Marker inserted before each highlighted run
    #[arg(long, default_value = "[")]
    open: String,

    /// Marker inserted after each highlighted run
    #[arg(long, default_value = "]")]
    close: String,

    /// Log search details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
    Relevance,
    Chronological,
}

impl From<Order> for ResultOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Relevance => ResultOrder::Relevance,
            Order::Chronological => ResultOrder::Chronological,
        }
    }
}

fn load_transcript(path: &Path) -> Result<Vec<TranscriptInput>> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(&raw).with_context(|| format!("Failed to parse {} as JSON", path.display()));
    }
    Ok(raw.lines().map(TranscriptInput::from).collect())
}

fn load_options(path: Option<&Path>) -> Result<SearchOptions> {
    let Some(path) = path else {
        return Ok(SearchOptions::default());
    };
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let options: SearchOptions =
        serde_json::from_str(&raw).with_context(|| format!("Invalid search options in {}", path.display()))?;
    options.check()?;
    Ok(options)
}

fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0);
    let minutes = (total / 60.0).floor() as u64;
    format!("{:02}:{:05.2}", minutes, total - minutes as f64 * 60.0)
}

fn format_result(m: &MatchResult, open: &str, close: &str) -> String {
    let mut line = String::new();
    if let Some((begin, end)) = m.item.content.span() {
        line.push_str(&format!("[{}-{}] ", format_timestamp(begin), format_timestamp(end)));
    }
    if let Some(speaker) = &m.item.speaker {
        line.push_str(speaker);
        line.push_str(": ");
    }
    line.push_str(&m.marked_text(open, close));
    line
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let items = load_transcript(&args.transcript)?;
    let options = load_options(args.options.as_deref())?;
    let item_count = items.len();

    let searcher = TranscriptSearcher::with_options(options);
    searcher.set_items(items);
    let results = searcher
        .search(args.query.clone())
        .await?
        .context("Search was superseded")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(results.as_ref())?);
        return Ok(());
    }

    let Some(query) = &results.query else {
        println!("No active search ({} items loaded)", item_count);
        return Ok(());
    };

    println!("{} of {} items match {:?}", results.len(), item_count, query);
    let order = ResultOrder::from(args.order);
    for &id in results.ids(order) {
        let (Some(m), Some((n, total))) = (results.get(id), results.position(id, order)) else {
            continue;
        };
        println!("{:>4} of {}  #{:<5} {}", n, total, id, format_result(m, &args.open, &args.close));
    }

    Ok(())
}
