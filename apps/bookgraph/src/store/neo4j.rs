//! # Neo4j Store
//!
//! `GraphStore` over a Neo4j database through `neo4rs`.
//!
//! The loader is synchronous; the store owns a current-thread tokio
//! runtime and blocks on each driver future. One load opens exactly one
//! explicit transaction on the configured database.

use crate::config::Neo4jConfig;
use bookgraph_core::{Applied, GraphStore, GraphTxn, LoaderError, Mutation, Param};
use neo4rs::{ConfigBuilder, Graph, Query, Txn, query};
use tokio::runtime::{Builder, Runtime};

/// Statement used to prove the session works before any mutation.
const PING_CYPHER: &str = "RETURN 1";

/// A connected Neo4j database.
pub struct Neo4jStore {
    runtime: Runtime,
    graph: Graph,
    database: String,
}

impl Neo4jStore {
    /// Connect and verify the session.
    ///
    /// Any failure here is a `ConnectionError`; nothing has been written.
    pub fn connect(config: &Neo4jConfig) -> Result<Self, LoaderError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LoaderError::ConnectionError(format!("cannot start runtime: {}", e)))?;

        let driver_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .build()
            .map_err(|e| LoaderError::ConnectionError(format!("invalid settings: {}", e)))?;

        tracing::info!("Connecting to {} (database '{}')", config.uri, config.database);

        let graph = runtime
            .block_on(async {
                let graph = Graph::connect(driver_config).await?;
                graph.run(query(PING_CYPHER)).await?;
                Ok::<_, neo4rs::Error>(graph)
            })
            .map_err(|e| LoaderError::ConnectionError(format!("{}: {}", config.uri, e)))?;

        Ok(Self {
            runtime,
            graph,
            database: config.database.clone(),
        })
    }

    /// The database transactions run against.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }
}

impl GraphStore for Neo4jStore {
    type Txn<'a> = Neo4jTxn<'a>;

    fn begin(&mut self) -> Result<Neo4jTxn<'_>, LoaderError> {
        let txn = self
            .runtime
            .block_on(self.graph.start_txn())
            .map_err(|e| {
                LoaderError::TransactionError(format!(
                    "cannot open transaction on '{}': {}",
                    self.database, e
                ))
            })?;
        tracing::debug!("Opened write transaction on '{}'", self.database);

        Ok(Neo4jTxn {
            runtime: &self.runtime,
            txn,
        })
    }
}

/// An explicit Neo4j write transaction.
///
/// Dropping it without `commit` leaves the server to roll it back.
pub struct Neo4jTxn<'a> {
    runtime: &'a Runtime,
    txn: Txn,
}

impl GraphTxn for Neo4jTxn<'_> {
    fn apply(&mut self, mutation: &Mutation) -> Result<Applied, LoaderError> {
        let statement = to_query(mutation);
        let txn = &mut self.txn;

        if !mutation.reports_matches() {
            self.runtime
                .block_on(txn.run(statement))
                .map_err(|e| LoaderError::StoreError(e.to_string()))?;
            return Ok(Applied::Written);
        }

        let linked = self
            .runtime
            .block_on(async {
                let mut stream = txn.execute(statement).await?;
                let mut linked = 0i64;
                // Drain the stream so the connection is ready for the next statement.
                while let Some(row) = stream.next(txn.handle()).await? {
                    linked = row.get::<i64>("linked").unwrap_or(0);
                }
                Ok::<_, neo4rs::Error>(linked)
            })
            .map_err(|e| LoaderError::StoreError(e.to_string()))?;

        Ok(if linked > 0 {
            Applied::Written
        } else {
            Applied::Unmatched
        })
    }

    fn commit(self) -> Result<(), LoaderError> {
        self.runtime
            .block_on(self.txn.commit())
            .map_err(|e| LoaderError::TransactionError(format!("commit failed: {}", e)))
    }

    fn rollback(self) -> Result<(), LoaderError> {
        self.runtime
            .block_on(self.txn.rollback())
            .map_err(|e| LoaderError::TransactionError(format!("rollback failed: {}", e)))
    }
}

/// Bind a mutation's Cypher text to its parameters.
fn to_query(mutation: &Mutation) -> Query {
    mutation
        .params()
        .into_iter()
        .fold(query(mutation.cypher()), |statement, (name, value)| match value {
            Param::Int(v) => statement.param(name, v),
            Param::Text(v) => statement.param(name, v),
        })
}


#[cfg(test)]
mod tests {
    use super::*;
    use bookgraph_core::{BookId, TagCount, TagId};

    /// `$name` placeholders referenced by a Cypher statement.
    fn placeholders(cypher: &str) -> Vec<&str> {
        cypher
            .split('$')
            .skip(1)
            .map(|rest| {
                let end = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                &rest[..end]
            })
            .collect()
    }

    fn every_mutation() -> [Mutation; 3] {
        [
            Mutation::UpsertBook {
                id: BookId(1),
                title: "Dune".into(),
                author: "Frank Herbert".into(),
            },
            Mutation::UpsertTag {
                tag_id: TagId(5),
                name: "scifi".into(),
            },
            Mutation::LinkBookTag {
                book_id: BookId(1),
                tag_id: TagId(5),
                count: TagCount::new(42),
            },
        ]
    }

    #[test]
    fn every_placeholder_is_bound() {
        for mutation in every_mutation() {
            let statement = to_query(&mutation);
            let names = placeholders(mutation.cypher());
            assert!(!names.is_empty(), "{} has no parameters", mutation.key());
            for name in names {
                assert!(
                    statement.has_param_key(name),
                    "${} unbound in {}",
                    name,
                    mutation.cypher()
                );
            }
        }
    }

    #[test]
    fn no_parameter_is_bound_without_a_placeholder() {
        for mutation in every_mutation() {
            let names = placeholders(mutation.cypher());
            for (name, _) in mutation.params() {
                assert!(names.contains(&name), "{} unused in {}", name, mutation.cypher());
            }
        }
    }

    #[test]
    fn placeholder_scan_stops_at_punctuation() {
        assert_eq!(
            placeholders("MATCH (b:Book {id: $bid}), (t {x:$tid}) SET r.count = $count"),
            vec!["bid", "tid", "count"]
        );
    }
}
