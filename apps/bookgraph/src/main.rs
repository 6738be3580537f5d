//! # Bookgraph - CSV to Graph Loader
//!
//! The main binary for Bookgraph.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 apps/bookgraph (THE BINARY)              │
//! │                                                          │
//! │  ┌─────────────┐   ┌─────────────┐   ┌──────────────┐    │
//! │  │    CLI      │   │   Config    │   │ Neo4j Store  │    │
//! │  │   (clap)    │   │  (dotenvy)  │   │   (neo4rs)   │    │
//! │  └──────┬──────┘   └──────┬──────┘   └──────┬───────┘    │
//! │         └─────────────────┼─────────────────┘            │
//! │                           ▼                              │
//! │                  ┌────────────────┐                      │
//! │                  │ bookgraph-core │                      │
//! │                  │  (THE LOADER)  │                      │
//! │                  └────────────────┘                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Load books.csv, tags.csv and book_tags.csv from the working directory
//! bookgraph
//!
//! # Explicit files and database
//! bookgraph load --books data/books.csv --database library
//!
//! # Check how the files are read
//! bookgraph inspect
//! ```

use bookgraph::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing - BOOKGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("BOOKGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "bookgraph=debug,bookgraph_core=debug"
    } else {
        "bookgraph=info,bookgraph_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so stdout stays clean for --json-mode.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        eprintln!("Failed to upload data: {}", e);
        std::process::exit(1);
    }
}

/// Print the Bookgraph startup banner.
fn print_banner() {
    println!(
        r#"
  Bookgraph v{}

  books + tags + book_tags -> Neo4j
"#,
        env!("CARGO_PKG_VERSION")
    );
}
