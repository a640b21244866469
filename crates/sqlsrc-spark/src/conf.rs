//! Databricks Spark source configuration

use std::borrow::Cow;
use std::sync::Arc;

use futures::FutureExt;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use sqlsrc_core::{
    ArpDialect, CommitMode, ConfigError, ConnectionProperties, DataSourceFactory,
    DataSourceRequest, DataSourceSupplier, FieldDescriptor, FieldRange, JdbcPluginConfig,
    PooledDataSource, REDACTED, Result, SourceConf, SourceType, secret,
};

use crate::spark_dialect;

/// JDBC driver class loaded by the pool
pub const DRIVER: &str = "com.simba.spark.jdbc.Driver";

/// Username sent with personal access token authentication
pub const TOKEN_USERNAME: &str = "token";

const URL_SCHEME: &str = "jdbc:spark";
const DEFAULT_DATABASE: &str = "default";

/// Driver property keys and values
pub mod properties {
    pub const TRANSPORT_MODE: &str = "transportMode";
    pub const HTTP_PATH: &str = "httpPath";
    pub const AUTH_MECHANISM: &str = "AuthMech";
    pub const SSL: &str = "SSL";

    pub const TRANSPORT_MODE_HTTP: &str = "http";
    /// UID + PWD, where the password is a personal access token
    pub const AUTH_MECHANISM_TOKEN: &str = "3";
    pub const SSL_ENABLED: &str = "1";
}

// Field names, as used in records and errors
const HOSTNAME: &str = "hostname";
const PORT: &str = "port";
const HTTP_PATH: &str = "httpPath";
const ACCESS_TOKEN: &str = "accessToken";
const USE_SSL: &str = "useSsl";
const ENABLE_EXTERNAL_QUERY: &str = "enableExternalQuery";
const FETCH_SIZE: &str = "fetchSize";
const MAX_IDLE_CONNS: &str = "maxIdleConns";
const IDLE_TIME_SEC: &str = "idleTimeSec";

const PORT_RANGE: FieldRange = FieldRange { min: 1, max: 65535 };

static FIELDS: [FieldDescriptor; 9] = [
    FieldDescriptor::text(1, HOSTNAME, "Server Hostname").required(),
    FieldDescriptor::number(2, PORT, "Port")
        .required()
        .range(PORT_RANGE.min, PORT_RANGE.max),
    FieldDescriptor::text(3, HTTP_PATH, "HTTP Path").required(),
    FieldDescriptor::secret(4, ACCESS_TOKEN, "Access Key").required(),
    FieldDescriptor::boolean(5, USE_SSL, "Encrypt connection"),
    FieldDescriptor::boolean(
        6,
        ENABLE_EXTERNAL_QUERY,
        "Grant External Query access (External Query allows creation of VDS from a Spark SQL query)",
    )
    .not_metadata_impacting(),
    FieldDescriptor::number(7, FETCH_SIZE, "Record fetch size").not_metadata_impacting(),
    FieldDescriptor::number(8, MAX_IDLE_CONNS, "Maximum idle connections").not_metadata_impacting(),
    FieldDescriptor::number(9, IDLE_TIME_SEC, "Connection idle time (s)").not_metadata_impacting(),
];

/// Source type metadata for Spark sources
pub const SPARK_SOURCE_TYPE: SourceType = SourceType {
    id: "SPARK",
    label: "Databricks Spark",
    ui_config: "spark-layout.json",
    external_query_supported: true,
};

/// Connection settings for a Databricks Spark SQL endpoint.
///
/// Instances are built once per configured source and never mutated while a
/// data source created from them is live; reconfiguring means building a new
/// `SparkConf`. Validation happens lazily in [`build_connection_uri`] and
/// [`create_data_source`].
///
/// The access token is excluded from equality, serialization,
/// [`SourceConf::field_value`] and [`SourceConf::describe`]; `Debug` shows it
/// redacted. `enableExternalQuery` is accepted on input but not serialized.
///
/// [`build_connection_uri`]: SparkConf::build_connection_uri
/// [`create_data_source`]: SparkConf::create_data_source
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SparkConf {
    /// Server hostname of the SQL warehouse or cluster
    pub hostname: String,
    /// Port, kept as entered and parsed on use
    #[serde(deserialize_with = "deserialize_port")]
    pub port: String,
    /// HTTP path of the SQL warehouse or cluster
    pub http_path: String,
    /// Personal access token
    #[serde(
        alias = "password",
        deserialize_with = "secret::deserialize_optional",
        skip_serializing
    )]
    pub access_token: Option<SecretString>,
    /// Whether to encrypt the connection
    pub use_ssl: bool,
    /// Whether external (pass-through) queries are allowed; read but never written
    #[serde(skip_serializing)]
    pub enable_external_query: bool,
    /// Rows fetched per round trip
    pub fetch_size: u32,
    /// Maximum idle connections kept by the pool
    pub max_idle_conns: u32,
    /// Seconds before an idle connection is closed
    pub idle_time_sec: u64,
}

impl Default for SparkConf {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            port: "443".to_string(),
            http_path: String::new(),
            access_token: None,
            use_ssl: true,
            enable_external_query: false,
            fetch_size: 500,
            max_idle_conns: 8,
            idle_time_sec: 60,
        }
    }
}

impl PartialEq for SparkConf {
    fn eq(&self, other: &Self) -> bool {
        self.hostname == other.hostname
            && self.port == other.port
            && self.http_path == other.http_path
            && self.use_ssl == other.use_ssl
            && self.enable_external_query == other.enable_external_query
            && self.fetch_size == other.fetch_size
            && self.max_idle_conns == other.max_idle_conns
            && self.idle_time_sec == other.idle_time_sec
    }
}

impl SparkConf {
    /// Create a configuration with the required fields and default tuning
    pub fn new(hostname: &str, http_path: &str, access_token: SecretString) -> Self {
        Self {
            hostname: hostname.to_string(),
            http_path: http_path.to_string(),
            access_token: Some(access_token),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    pub fn with_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    pub fn with_external_query(mut self, enabled: bool) -> Self {
        self.enable_external_query = enabled;
        self
    }

    pub fn with_fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    pub fn with_idle_tuning(mut self, max_idle_conns: u32, idle_time_sec: u64) -> Self {
        self.max_idle_conns = max_idle_conns;
        self.idle_time_sec = idle_time_sec;
        self
    }

    /// Parsed port number
    fn port_number(&self) -> Result<u16> {
        let port = PORT_RANGE.check(PORT, &self.port)?;
        u16::try_from(port).map_err(|_| ConfigError::OutOfRange(PORT, self.port.clone()))
    }

    /// Build the JDBC connection URI.
    ///
    /// The URI always targets the `default` database. The HTTP path is not
    /// part of the URI; the driver receives it through the `httpPath`
    /// property instead.
    pub fn build_connection_uri(&self) -> Result<String> {
        self.validate()?;
        let port = self.port_number()?;
        let uri = format!("{URL_SCHEME}://{}:{port}/{DEFAULT_DATABASE};", self.hostname);
        tracing::debug!(uri = %uri, "built Spark connection URI");
        Ok(uri)
    }

    /// Build the driver properties.
    ///
    /// `SSL` is only present when SSL is enabled; it is never set to a false
    /// value.
    pub fn build_connection_properties(&self) -> ConnectionProperties {
        let mut props = ConnectionProperties::new();
        props.insert(
            properties::TRANSPORT_MODE.to_string(),
            properties::TRANSPORT_MODE_HTTP.to_string(),
        );
        props.insert(properties::HTTP_PATH.to_string(), self.http_path.clone());
        props.insert(
            properties::AUTH_MECHANISM.to_string(),
            properties::AUTH_MECHANISM_TOKEN.to_string(),
        );
        if self.use_ssl {
            props.insert(properties::SSL.to_string(), properties::SSL_ENABLED.to_string());
        }
        props
    }

    /// Validate the configuration and ask `factory` for a pooled data source.
    ///
    /// The factory is only invoked once validation has passed. Each call
    /// creates a new data source.
    #[tracing::instrument(skip(self, factory), fields(host = %self.hostname, port = %self.port))]
    pub async fn create_data_source(
        &self,
        factory: &dyn DataSourceFactory,
    ) -> Result<Box<dyn PooledDataSource>> {
        let url = self.build_connection_uri()?;
        let password = self
            .access_token
            .as_ref()
            .map(secret::duplicate)
            .ok_or(ConfigError::MissingField(ACCESS_TOKEN))?;

        let request = DataSourceRequest {
            driver: DRIVER.to_string(),
            url: url.clone(),
            username: TOKEN_USERNAME.to_string(),
            password,
            properties: self.build_connection_properties(),
            commit_mode: CommitMode::DriverSpecified,
            max_idle_connections: Some(self.max_idle_conns),
            idle_timeout_secs: Some(self.idle_time_sec),
        };

        tracing::debug!("requesting pooled data source");
        match factory.new_pooled_data_source(request).await {
            Ok(source) => {
                tracing::debug!("pooled data source created");
                Ok(source)
            }
            Err(source) => {
                tracing::warn!(error = %source, "failed to create pooled data source");
                Err(ConfigError::DataSourceCreation {
                    driver: DRIVER.to_string(),
                    url,
                    source: source.into(),
                })
            }
        }
    }

    /// Assemble the plugin configuration.
    ///
    /// The returned configuration holds this instance and `factory`; every
    /// data source it creates goes through [`SparkConf::create_data_source`].
    pub fn build_plugin_config(
        self: Arc<Self>,
        factory: Arc<dyn DataSourceFactory>,
    ) -> JdbcPluginConfig {
        let fetch_size = self.fetch_size;
        let allow_external_query = self.enable_external_query;

        let supplier: DataSourceSupplier = Arc::new(move || {
            let conf = Arc::clone(&self);
            let factory = Arc::clone(&factory);
            async move { conf.create_data_source(factory.as_ref()).await }.boxed()
        });

        JdbcPluginConfig::builder(SPARK_SOURCE_TYPE, spark_dialect(), supplier)
            .with_fetch_size(fetch_size)
            .clear_hidden_schemas()
            .with_allow_external_query(allow_external_query)
            .build()
    }
}

impl SourceConf for SparkConf {
    fn source_type(&self) -> SourceType {
        SPARK_SOURCE_TYPE
    }

    fn fields(&self) -> &'static [FieldDescriptor] {
        &FIELDS
    }

    fn field_value(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            HOSTNAME => Some(Cow::Borrowed(self.hostname.as_str())),
            PORT => Some(Cow::Borrowed(self.port.as_str())),
            HTTP_PATH => Some(Cow::Borrowed(self.http_path.as_str())),
            // Presence only; the token itself leaves through the factory request
            ACCESS_TOKEN => self
                .access_token
                .as_ref()
                .filter(|token| !token.expose_secret().trim().is_empty())
                .map(|_| Cow::Borrowed(REDACTED)),
            USE_SSL => Some(Cow::Owned(self.use_ssl.to_string())),
            ENABLE_EXTERNAL_QUERY => Some(Cow::Owned(self.enable_external_query.to_string())),
            FETCH_SIZE => Some(Cow::Owned(self.fetch_size.to_string())),
            MAX_IDLE_CONNS => Some(Cow::Owned(self.max_idle_conns.to_string())),
            IDLE_TIME_SEC => Some(Cow::Owned(self.idle_time_sec.to_string())),
            _ => None,
        }
    }

    fn dialect(&self) -> &'static ArpDialect {
        spark_dialect()
    }
}

/// Accept the port as either a string or an integer
fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortRepr {
        Text(String),
        Number(i64),
    }

    Ok(match PortRepr::deserialize(deserializer)? {
        PortRepr::Text(text) => text,
        PortRepr::Number(number) => number.to_string(),
    })
}
