//! Error types for source configuration

use thiserror::Error;

/// Boxed cause reported by an external collaborator
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while validating a source configuration or building a data
/// source from it
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required field is blank or absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A numeric field failed to parse or is outside its allowed bounds
    #[error("Value out of range for field {0}: {1:?}")]
    OutOfRange(&'static str, String),

    /// The external data source factory failed (network, auth, driver)
    #[error("Failed to create data source for {url} using driver {driver}")]
    DataSourceCreation {
        driver: String,
        url: String,
        #[source]
        source: BoxError,
    },

    /// A packaged dialect definition could not be loaded
    #[error("Dialect error: {0}")]
    Dialect(String),
}

impl ConfigError {
    /// Returns `true` if the caller must fix the configuration and recreate it.
    ///
    /// `false` means the configuration was accepted but the backend could not
    /// be reached or authenticated against.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ConfigError::MissingField(_) | ConfigError::OutOfRange(..) | ConfigError::Dialect(_)
        )
    }

    /// Name of the offending field, for configuration errors
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigError::MissingField(name) | ConfigError::OutOfRange(name, _) => Some(name),
            _ => None,
        }
    }
}

/// Result type alias for source configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
