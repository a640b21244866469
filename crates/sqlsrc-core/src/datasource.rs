//! Contract with the external pooled data source provider
//!
//! A source configuration never opens connections itself. It assembles a
//! [`DataSourceRequest`] and hands it to a [`DataSourceFactory`], which owns
//! pooling, timeouts and retries.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Driver properties passed alongside the connection URL
pub type ConnectionProperties = BTreeMap<String, String>;

/// Who manages transaction commits on pooled connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Leave the driver's own auto-commit setting untouched
    #[default]
    DriverSpecified,
    /// Force auto-commit on every connection
    ForceAuto,
    /// Force manual commits; the pool commits or rolls back
    ForceManual,
}

/// Everything a factory needs to build a pooled data source
#[derive(Debug)]
pub struct DataSourceRequest {
    /// Driver identifier (e.g. a JDBC driver class name)
    pub driver: String,
    /// Connection URL
    pub url: String,
    /// Username presented to the backend
    pub username: String,
    /// Password or token presented to the backend
    pub password: SecretString,
    /// Driver properties
    pub properties: ConnectionProperties,
    /// Commit-mode policy
    pub commit_mode: CommitMode,
    /// Maximum number of idle connections kept by the pool
    pub max_idle_connections: Option<u32>,
    /// Seconds an idle connection may live before it is closed
    pub idle_timeout_secs: Option<u64>,
}

impl DataSourceRequest {
    /// Idle timeout as a Duration if set
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }
}

/// A closable handle to a pooled data source
#[async_trait]
pub trait PooledDataSource: Send + Sync {
    /// URL the pool connects to
    fn url(&self) -> &str;

    /// Close the pool and every connection it holds
    async fn close(&self) -> anyhow::Result<()>;

    /// Check if the pool has been closed
    fn is_closed(&self) -> bool;
}

/// Factory that turns a request into a pooled data source
#[async_trait]
pub trait DataSourceFactory: Send + Sync {
    /// Build a new pooled data source.
    ///
    /// Any failure (unreachable host, rejected credentials, missing driver) is
    /// reported as-is; the caller decides whether retrying makes sense.
    async fn new_pooled_data_source(
        &self,
        request: DataSourceRequest,
    ) -> anyhow::Result<Box<dyn PooledDataSource>>;
}

#[async_trait]
impl<T: DataSourceFactory + ?Sized> DataSourceFactory for Arc<T> {
    async fn new_pooled_data_source(
        &self,
        request: DataSourceRequest,
    ) -> anyhow::Result<Box<dyn PooledDataSource>> {
        (**self).new_pooled_data_source(request).await
    }
}
