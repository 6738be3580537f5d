//! # Formats Module
//!
//! Delimited-text input for the loader.
//!
//! - `sniff`: delimiter inference from a file sample
//! - `table`: the Tabular Reader (`Table`, `Row`, `read_table`)
//! - `dataset`: the three input tables read together

mod dataset;
mod sniff;
mod table;

pub use dataset::{Dataset, DatasetPaths};
pub use sniff::{delimiter_name, sniff_delimiter};
pub use table::{Row, Table, read_table};
