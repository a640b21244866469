//! Runtime configuration handed to the JDBC plugin layer

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{ArpDialect, PooledDataSource, Result};

/// Callback producing a fresh pooled data source on demand
pub type DataSourceSupplier =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Box<dyn PooledDataSource>>> + Send + Sync>;

/// Static metadata describing a source type to the catalog and UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceType {
    /// Identifier persisted in source records (e.g., "SPARK")
    pub id: &'static str,
    /// Display label
    pub label: &'static str,
    /// Layout file the UI uses to arrange the fields
    pub ui_config: &'static str,
    /// Whether the source can serve external (pass-through) queries
    pub external_query_supported: bool,
}

/// Plugin configuration assembled from a validated source configuration
pub struct JdbcPluginConfig {
    source_type: SourceType,
    dialect: &'static ArpDialect,
    fetch_size: u32,
    data_source_supplier: DataSourceSupplier,
    hidden_schemas: BTreeSet<String>,
    allow_external_query: bool,
}

impl JdbcPluginConfig {
    /// Start building a configuration
    pub fn builder(
        source_type: SourceType,
        dialect: &'static ArpDialect,
        supplier: DataSourceSupplier,
    ) -> JdbcPluginConfigBuilder {
        JdbcPluginConfigBuilder {
            source_type,
            dialect,
            fetch_size: DEFAULT_FETCH_SIZE,
            data_source_supplier: supplier,
            hidden_schemas: BTreeSet::from(["information_schema".to_string()]),
            allow_external_query: false,
        }
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn dialect(&self) -> &'static ArpDialect {
        self.dialect
    }

    pub fn fetch_size(&self) -> u32 {
        self.fetch_size
    }

    /// Schemas the catalog should not list
    pub fn hidden_schemas(&self) -> &BTreeSet<String> {
        &self.hidden_schemas
    }

    pub fn allow_external_query(&self) -> bool {
        self.allow_external_query
    }

    /// Create a new pooled data source through the configured supplier.
    ///
    /// Every call builds a new data source; callers own deduplication.
    pub async fn new_data_source(&self) -> Result<Box<dyn PooledDataSource>> {
        (self.data_source_supplier)().await
    }
}

impl fmt::Debug for JdbcPluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JdbcPluginConfig")
            .field("source_type", &self.source_type.id)
            .field("dialect", &self.dialect.id())
            .field("fetch_size", &self.fetch_size)
            .field("hidden_schemas", &self.hidden_schemas)
            .field("allow_external_query", &self.allow_external_query)
            .finish_non_exhaustive()
    }
}

const DEFAULT_FETCH_SIZE: u32 = 200;

/// Builder for [`JdbcPluginConfig`]
pub struct JdbcPluginConfigBuilder {
    source_type: SourceType,
    dialect: &'static ArpDialect,
    fetch_size: u32,
    data_source_supplier: DataSourceSupplier,
    hidden_schemas: BTreeSet<String>,
    allow_external_query: bool,
}

impl JdbcPluginConfigBuilder {
    pub fn with_fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    pub fn add_hidden_schema(mut self, schema: impl Into<String>) -> Self {
        self.hidden_schemas.insert(schema.into());
        self
    }

    pub fn clear_hidden_schemas(mut self) -> Self {
        self.hidden_schemas.clear();
        self
    }

    pub fn with_allow_external_query(mut self, allow: bool) -> Self {
        self.allow_external_query = allow;
        self
    }

    pub fn build(self) -> JdbcPluginConfig {
        JdbcPluginConfig {
            source_type: self.source_type,
            dialect: self.dialect,
            fetch_size: self.fetch_size,
            data_source_supplier: self.data_source_supplier,
            hidden_schemas: self.hidden_schemas,
            allow_external_query: self.allow_external_query,
        }
    }
}
