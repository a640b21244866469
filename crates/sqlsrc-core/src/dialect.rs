//! Declarative ARP dialect definitions
//!
//! A source ships its pushdown rules as a TOML file embedded in the crate.
//! The file is parsed once into an [`ArpDialect`] and shared read-only for the
//! rest of the process. This module only loads and exposes the rules; nothing
//! here rewrites SQL.
//!
//! Layout of a dialect file:
//! - `[metadata]` - identifier, display name, rule-set version
//! - `[syntax]` - quoting and LIMIT support
//! - `[[data_type]]` - backend type to engine type mappings
//! - `[functions]` - scalar/aggregate functions that may be pushed down

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Identity of a dialect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectMetadata {
    /// Dialect identifier (e.g., "spark")
    pub id: String,
    /// Human-readable display name
    pub display_name: String,
    /// Version of the rule set
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1".to_string()
}

/// Syntax features of the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectSyntax {
    /// Character used to quote identifiers
    #[serde(default = "default_identifier_quote")]
    pub identifier_quote: char,
    /// Whether LIMIT can be pushed down
    #[serde(default)]
    pub supports_limit: bool,
    /// Whether identifiers are case-sensitive
    #[serde(default)]
    pub case_sensitive: bool,
}

fn default_identifier_quote() -> char {
    '"'
}

impl Default for DialectSyntax {
    fn default() -> Self {
        Self {
            identifier_quote: default_identifier_quote(),
            supports_limit: false,
            case_sensitive: false,
        }
    }
}

/// Mapping from a backend type name to the engine type it is read as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTypeMapping {
    /// Type name as reported by the backend
    pub source: String,
    /// Engine type name
    pub target: String,
}

/// Functions that may be pushed down
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSupport {
    #[serde(default)]
    pub scalar: Vec<String>,
    #[serde(default)]
    pub aggregate: Vec<String>,
}

/// Complete dialect definition loaded from a dialect file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArpDialect {
    pub metadata: DialectMetadata,
    #[serde(default)]
    pub syntax: DialectSyntax,
    #[serde(default, rename = "data_type")]
    pub data_types: Vec<DataTypeMapping>,
    #[serde(default)]
    pub functions: FunctionSupport,
}

impl ArpDialect {
    /// Parse a dialect definition from TOML
    pub fn from_toml(source: &str) -> Result<Self> {
        let dialect: ArpDialect =
            toml::from_str(source).map_err(|e| ConfigError::Dialect(e.to_string()))?;
        tracing::debug!(
            dialect = %dialect.metadata.id,
            data_types = dialect.data_types.len(),
            "loaded dialect definition"
        );
        Ok(dialect)
    }

    /// Get dialect ID
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        &self.metadata.display_name
    }

    /// Quote an identifier, doubling any embedded quote characters
    pub fn quote_identifier(&self, ident: &str) -> String {
        let quote = self.syntax.identifier_quote;
        let escaped = ident.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Engine type a backend type is read as, matched case-insensitively
    pub fn map_type(&self, source_type: &str) -> Option<&str> {
        self.data_types
            .iter()
            .find(|m| m.source.eq_ignore_ascii_case(source_type))
            .map(|m| m.target.as_str())
    }

    /// Check if a scalar or aggregate function may be pushed down
    pub fn supports_function(&self, name: &str) -> bool {
        self.functions
            .scalar
            .iter()
            .chain(self.functions.aggregate.iter())
            .any(|f| f.eq_ignore_ascii_case(name))
    }
}
