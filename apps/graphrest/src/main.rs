//! # graphrest
//!
//! Exposes the nodes and relationships of a graph store as HTTP resources.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                 apps/graphrest (THE BINARY)               │
//! │                                                           │
//! │   ┌─────────────┐   ┌──────────────┐   ┌──────────────┐   │
//! │   │    CLI      │   │  HTTP server │   │   Config     │   │
//! │   │   (clap)    │   │    (axum)    │   │   (toml)     │   │
//! │   └──────┬──────┘   └──────┬───────┘   └──────┬───────┘   │
//! │          │                 │  Dispatcher      │           │
//! │          └─────────────────┼──────────────────┘           │
//! │                            ▼                              │
//! │                   ┌─────────────────┐                     │
//! │                   │ graphrest-core  │                     │
//! │                   │  (THE ADAPTER)  │                     │
//! │                   └─────────────────┘                     │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server with the types listed in people.toml
//! graphrest --config people.toml serve --port 4567
//!
//! # CLI operations
//! graphrest status
//! graphrest --config people.toml schema
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // GRAPHREST_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("GRAPHREST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "graphrest=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        r#"
   __ _ _ __ __ _ _ __ | |__  _ __ ___  ___| |_
  / _` | '__/ _` | '_ \| '_ \| '__/ _ \/ __| __|
 | (_| | | | (_| | |_) | | | | | |  __/\__ \ |_
  \__, |_|  \__,_| .__/|_| |_|_|  \___||___/\__|
  |___/          |_|

  graph resources over HTTP v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
