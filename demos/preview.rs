//! Example: Interactive extraction preview.
//!
//! Runs the diagnostic pipeline on a piece of text and prints the JSON result
//! a settings page would show.
//!
//! # Usage
//!
//! ```bash
//! # Text from the command line
//! cargo run --example preview -- "Your login code is 482913"
//!
//! # Text from stdin, with a sender and custom settings
//! export VERICODE_SENDER="Service <auth@service.example>"
//! export VERICODE_SETTINGS=settings.json
//! export RUST_LOG=vericode=debug
//! cat message.txt | cargo run --example preview
//! ```

use std::env;
use std::fs;
use std::io::{self, Read};

use tracing_subscriber::EnvFilter;
use vericode::{CodeExtractor, Settings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vericode=info")),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let settings = match env::var("VERICODE_SETTINGS") {
        Ok(path) => Settings::from_json(&fs::read_to_string(path)?)?,
        Err(_) => Settings::default(),
    };
    let sender = env::var("VERICODE_SENDER").ok();

    let text = {
        let args: Vec<String> = env::args().skip(1).collect();
        if args.is_empty() {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            args.join(" ")
        }
    };

    let extractor = CodeExtractor::new(&settings);
    let result = extractor.test_extraction(&text, sender.as_deref());

    println!("{}", serde_json::to_string_pretty(&result.to_json())?);
    Ok(())
}
