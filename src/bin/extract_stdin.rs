//! Simple CLI that reads HTML from stdin and outputs JSON to stdout.
//!
//! `PURIFIER_URL` names the page URL (used for policy dispatch), and
//! `PURIFIER_POLICY_DIR` an optional directory of `policy*.json` files.
//! Logs go to stderr, filtered with `RUST_LOG`.

use std::io::{self, Read};
use std::path::Path;

use rs_purifier::{Agent, AgentOptions, Extraction};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Output {
    #[serde(flatten)]
    extraction: Option<Extraction>,
    error: Option<String>,
    skipped: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut html = String::new();
    if io::stdin().read_to_string(&mut html).is_err() {
        eprintln!("Failed to read from stdin");
        std::process::exit(1);
    }

    let url = std::env::var("PURIFIER_URL").unwrap_or_default();
    let options = AgentOptions {
        extract_title: true,
        ..AgentOptions::default()
    };

    let mut builder = Agent::builder(&options);
    if let Ok(dir) = std::env::var("PURIFIER_POLICY_DIR") {
        if let Err(err) = builder.load_policy_dir(Path::new(&dir), None) {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
    let agent = builder.build();

    let output = match agent.extract("text/html", &url, &html, true) {
        Ok(extraction) => Output {
            extraction: Some(extraction),
            error: None,
            skipped: false,
        },
        Err(err) => Output {
            extraction: None,
            skipped: err.should_skip(),
            error: Some(err.to_string()),
        },
    };

    println!("{}", serde_json::to_string(&output).unwrap_or_default());
}
