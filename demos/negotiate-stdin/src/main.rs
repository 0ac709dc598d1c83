//! Content negotiation from the command line.
//!
//! Reads one JSON document per line from stdin and prints what a server
//! would resolve for it. A line is either bare `initialize` params or an
//! object of the form `{"session": "...", "params": {...}}`.
//!
//! ## Running
//!
//! ```bash
//! echo '{"capabilities":{"experimental":{"extensions":{"io.mcp.content-negotiation":{"features":["agent","format=json"]}}}}}' \
//!     | RUST_LOG=featurekit_server=debug cargo run -p negotiate-stdin
//! ```
//!
//! ## What This Demonstrates
//!
//! - Feeding `initialize` params to a [`Negotiator`]
//! - Write-once sessions: repeating a session id keeps the first result
//! - Reading the resolution back through a request context

use std::io::{self, BufRead, Write};

use featurekit::prelude::*;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let negotiator = Negotiator::default();
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let document: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "skipping invalid JSON");
                continue;
            }
        };

        let fallback = format!("line-{}", index + 1);
        let session = document
            .get("session")
            .and_then(Value::as_str)
            .unwrap_or(&fallback)
            .to_owned();
        let params = document.get("params").unwrap_or(&document);

        let outcome = negotiator.on_initialize(Some(&session), params);
        let ctx = negotiator.context(Some(&session));

        let report = json!({
            "session": session,
            "outcome": outcome_name(outcome),
            "tags": ctx.features(),
            "resolution": ctx.resolution(),
        });
        writeln!(stdout, "{report}")?;
    }

    tracing::info!(sessions = negotiator.store().session_count(), "done");
    Ok(())
}

const fn outcome_name(outcome: SetOutcome) -> &'static str {
    match outcome {
        SetOutcome::Negotiated => "negotiated",
        SetOutcome::AlreadyNegotiated => "already-negotiated",
        SetOutcome::Closed => "closed",
    }
}
