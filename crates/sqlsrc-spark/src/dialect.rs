//! Embedded Spark pushdown rules

use std::sync::OnceLock;

use sqlsrc_core::ArpDialect;

/// Embedded dialect definition
const SPARK_DIALECT_TOML: &str = include_str!("../dialect/spark.toml");

/// Spark dialect - parsed once on first access and never mutated afterwards
pub fn spark_dialect() -> &'static ArpDialect {
    static DIALECT: OnceLock<ArpDialect> = OnceLock::new();
    DIALECT.get_or_init(|| {
        ArpDialect::from_toml(SPARK_DIALECT_TOML)
            .expect("Failed to parse embedded Spark dialect definition")
    })
}
