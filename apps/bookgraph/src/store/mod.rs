//! # Stores
//!
//! Network-backed `GraphStore` implementations.

mod neo4j;

pub use neo4j::{Neo4jStore, Neo4jTxn};
