//! Generate a synthetic timed transcript for benchmarks and manual testing.
//!
//! Usage:
//!     cargo run --release --bin generate-transcript -- --count 5000 --output transcript.json

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of cues to generate
    #[arg(short, long, default_value_t = 1000)]
    count: usize,

    /// RNG seed; the same seed always yields the same transcript
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Output path; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

const SPEAKERS: &[&str] = &["Alice", "Bob", "Narrator", "Interviewer"];

const WORDS: &[&str] = &[
    "the", "a", "and", "of", "to", "in", "that", "it", "was", "for", "on", "with", "as", "his", "her",
    "they", "be", "at", "one", "have", "this", "from", "by", "hot", "word", "but", "what", "some",
    "river", "bottle", "poison", "railway", "mouse", "soap", "children", "milk", "quick", "brown",
    "fox", "lazy", "dog", "named", "rinsed", "messy", "drink", "struck", "against", "roof", "hall",
    "somehow", "fallen", "sea", "ventured", "taste", "little", "eyes", "wink", "inquisitively",
    "don't", "can't", "o'clock", "well-known", "café", "naïve", "twenty-five", "1987", "3:15",
];

fn generate_sentence(rng: &mut StdRng) -> String {
    let len = rng.gen_range(4..=18);
    let mut sentence = String::new();
    for i in 0..len {
        let word = WORDS.choose(rng).copied().unwrap_or("the");
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                sentence.extend(first.to_uppercase());
                sentence.push_str(chars.as_str());
            }
            continue;
        }
        if rng.gen_bool(0.08) {
            sentence.push(',');
        }
        sentence.push(' ');
        sentence.push_str(word);
    }
    sentence.push(['.', '.', '.', '?', '!'].choose(rng).copied().unwrap_or('.'));
    sentence
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut clock = 0.0f64;
    let cues: Vec<serde_json::Value> = (0..args.count)
        .map(|_| {
            let text = generate_sentence(&mut rng);
            let begin = clock;
            let end = begin + 1.0 + text.len() as f64 * 0.06;
            clock = end + rng.gen_range(0.0..0.8);
            json!({
                "text": text,
                "begin": (begin * 1000.0).round() / 1000.0,
                "end": (end * 1000.0).round() / 1000.0,
                "speaker": SPEAKERS.choose(&mut rng).copied().unwrap_or("Narrator"),
            })
        })
        .collect();

    let body = serde_json::to_string_pretty(&cues)?;
    match &args.output {
        Some(path) => {
            fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {} cues to {}", args.count, path.display());
        }
        None => println!("{}", body),
    }
    Ok(())
}
