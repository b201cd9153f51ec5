//! Example: Batch extraction over a directory of `.eml` files.
//!
//! Parses every message, runs extraction on subject and body, and prints a
//! summary with the success rate.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example scan_mailbox -- ./testdata
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use vericode::{CodeExtractor, IncomingMessage};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vericode=warn")),
        )
        .init();

    let dir = env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("testdata"), PathBuf::from);

    let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"))
        })
        .collect();
    files.sort();

    println!("Found {} .eml files in {}", files.len(), dir.display());

    let extractor = CodeExtractor::default();
    let mut found = 0usize;

    for path in &files {
        let name = path.file_name().map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        let raw = fs::read(path)?;
        let message = match IncomingMessage::parse(&raw) {
            Ok(message) => message,
            Err(e) => {
                println!("ERR  {name}: {e}");
                continue;
            }
        };

        match extractor.extract_from_message(&message) {
            Some(code) => {
                found += 1;
                println!("OK   {name}: {code} ({})", message.subject());
            }
            None => println!("--   {name}: no verification code"),
        }
    }

    if !files.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let rate = found as f64 / files.len() as f64 * 100.0;
        println!("\nTotal: {}, found: {found}, success rate: {rate:.2}%", files.len());
    }
    Ok(())
}
