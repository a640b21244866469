//! Databricks Spark source for sqlsrc
//!
//! Connects a query engine to a Databricks SQL warehouse or cluster through
//! the Simba Spark JDBC driver, authenticating with a personal access token
//! over HTTP transport.

mod conf;
#[cfg(test)]
mod conf_tests;
mod dialect;

pub use conf::*;
pub use dialect::spark_dialect;
