//! sqlsrc core - contracts shared by external SQL source configurations
//!
//! This crate defines what every source configuration is built from:
//!
//! - `FieldDescriptor` - declarative per-field metadata and constraints
//! - `SourceConf` - trait tying a configuration to its field table and dialect
//! - `DataSourceFactory` - the external pooled data source provider
//! - `ArpDialect` - pushdown rules loaded from an embedded definition file
//! - `JdbcPluginConfig` - what the plugin layer receives at runtime

mod datasource;
mod dialect;
mod error;
mod field;
mod plugin;
pub mod secret;
mod source;

pub use datasource::*;
pub use dialect::*;
pub use error::*;
pub use field::*;
pub use plugin::*;
pub use source::*;
