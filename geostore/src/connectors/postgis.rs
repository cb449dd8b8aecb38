use std::fmt::{Debug, Formatter};

use geostore_core::BoxedError;
use geostore_core::params::ParameterBag;
use geostore_core::resources::{DatasetNamespace, QualifiedName};
use postgres::{Client, Config, NoTls};
use tracing::debug;

use crate::connectors::{ConnectorError, ConnectorResult};

pub const DEFAULT_SCHEMA: &str = "public";

const LIST_TABLES: &str = "
SELECT table_name::text
FROM information_schema.tables
WHERE table_schema = $1
ORDER BY table_name";

/// Tables and views of one PostGIS schema.
pub struct PostgisNamespace {
    client: Client,
    schema: String,
}

impl PostgisNamespace {
    /// Connects with the `host`, `port`, `database`, `user` and `passwd` parameters.
    pub fn connect(params: &ParameterBag) -> ConnectorResult<Self> {
        let config = pg_config(params)?;
        let schema = params
            .get_str("schema")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
        debug!("Connecting to PostGIS {:?} for schema {schema}", config.get_hosts());
        let client = config.connect(NoTls)?;
        Ok(Self { client, schema })
    }
}

fn pg_config(params: &ParameterBag) -> ConnectorResult<Config> {
    let param = |key: &str| params.get_str(key).filter(|v| !v.is_empty());
    let mut config = Config::new();
    config.host(&param("host").unwrap_or_else(|| "localhost".to_string()));
    if let Some(port) = param("port") {
        let port = port
            .parse()
            .map_err(|_| ConnectorError::InvalidParameter { key: "port", value: port.clone() })?;
        config.port(port);
    }
    if let Some(database) = param("database") {
        config.dbname(&database);
    }
    if let Some(user) = param("user") {
        config.user(&user);
    }
    if let Some(password) = param("passwd") {
        config.password(&password);
    }
    Ok(config)
}

impl Debug for PostgisNamespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgisNamespace")
            .field("schema", &self.schema)
            .field("closed", &self.client.is_closed())
            .finish_non_exhaustive()
    }
}

impl DatasetNamespace for PostgisNamespace {
    fn names(&mut self) -> Result<Vec<QualifiedName>, BoxedError> {
        let rows = self
            .client
            .query(LIST_TABLES, &[&self.schema])
            .map_err(ConnectorError::from)?;
        rows.iter()
            .map(|row| -> Result<QualifiedName, BoxedError> {
                let table: String = row.try_get(0).map_err(ConnectorError::from)?;
                Ok(QualifiedName::new(&self.schema, table))
            })
            .collect()
    }
}
