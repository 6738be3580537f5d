//! # Bookgraph CLI Module
//!
//! This module implements the CLI interface for Bookgraph.
//!
//! ## Available Commands
//!
//! - `load` - Upsert books, tags and book-tag links into Neo4j (default)
//! - `inspect` - Show how each input file is read, without touching a store

mod commands;

use bookgraph_core::primitives::{
    DEFAULT_BOOK_TAGS_FILE, DEFAULT_BOOKS_FILE, DEFAULT_PROGRESS_INTERVAL, DEFAULT_TAGS_FILE,
};
use bookgraph_core::{DatasetPaths, LoaderError};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Bookgraph - CSV to graph loader
///
/// Loads books, tags and their associations into a Neo4j database with
/// idempotent upserts inside a single transaction.
#[derive(Parser, Debug)]
#[command(name = "bookgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Read connection settings from this file instead of ./.env
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the three files into the graph
    Load(LoadArgs),

    /// Show delimiter, columns and row count of each input file
    Inspect(InputArgs),
}

/// Locations of the three input files.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct InputArgs {
    /// Books file (book_id, title, authors)
    #[arg(long, default_value = DEFAULT_BOOKS_FILE)]
    pub books: PathBuf,

    /// Tags file (tag_id, tag_name)
    #[arg(long, default_value = DEFAULT_TAGS_FILE)]
    pub tags: PathBuf,

    /// Book-tag associations file (goodreads_book_id, tag_id, count)
    #[arg(long, default_value = DEFAULT_BOOK_TAGS_FILE)]
    pub book_tags: PathBuf,
}

impl Default for InputArgs {
    fn default() -> Self {
        let paths = DatasetPaths::default();
        Self {
            books: paths.books,
            tags: paths.tags,
            book_tags: paths.book_tags,
        }
    }
}

impl InputArgs {
    pub fn paths(&self) -> DatasetPaths {
        DatasetPaths {
            books: self.books.clone(),
            tags: self.tags.clone(),
            book_tags: self.book_tags.clone(),
        }
    }
}

/// Options of the `load` command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LoadArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Neo4j database to load into (overrides NEO4J_DATABASE)
    #[arg(long)]
    pub database: Option<String>,

    /// Rows between progress lines within a phase (0 disables)
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    pub progress_interval: usize,

    /// Load into an in-memory graph instead of Neo4j
    #[arg(long)]
    pub dry_run: bool,
}

impl Default for LoadArgs {
    fn default() -> Self {
        Self {
            input: InputArgs::default(),
            database: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            dry_run: false,
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), LoaderError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Load(args)) => cmd_load(&args, cli.env_file.as_deref(), json_mode),
        Some(Commands::Inspect(input)) => cmd_inspect(&input, json_mode),
        None => {
            // No subcommand - load the default files
            cmd_load(&LoadArgs::default(), cli.env_file.as_deref(), json_mode)
        }
    }
}
