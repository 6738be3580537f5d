//! # bookgraph
//!
//! The binary side of Bookgraph: connection settings, the Neo4j store and
//! the command line. All loading logic lives in `bookgraph-core`.

pub mod cli;
pub mod config;
pub mod store;
