//! Connection descriptor consumed by every backend adapter.
//!
//! One plain value describes where a backend lives and which table or
//! collection an engine binds to. Adapters derive their own connection
//! URL from it (`mysql://…`, `mongodb://…`, `redis://…`); the single-file
//! relational dialect reads the `database` field as a filesystem path.

use serde::Deserialize;

/// Default MySQL port used by the `localhost` constructors.
pub const DEFAULT_SQL_PORT: u16 = 3306;
/// Default Redis port used by [`ConnectionSettings::redis_localhost`].
pub const DEFAULT_REDIS_PORT: u16 = 6379;
/// Default MongoDB port.
pub const DEFAULT_MONGO_PORT: u16 = 27017;

/// Where a backend lives and which table an engine binds to.
///
/// Derives `Deserialize` so deployments can load it from a configuration
/// file; the convenience constructors cover local development.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionSettings {
    /// Backend host name or IP.
    pub host: String,
    /// Backend TCP port.
    pub port: u16,
    /// Database (catalog) name. The single-file relational dialect reads
    /// this as the path of the database file instead.
    pub database: String,
    /// Authentication user.
    pub username: String,
    /// Authentication password.
    pub password: String,
    /// Target table / collection name.
    pub table: String,
}

impl ConnectionSettings {
    /// Build a descriptor from explicit parts.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            username: username.into(),
            password: password.into(),
            table: table.into(),
        }
    }

    /// Local MySQL on the default port with `root`/`root` credentials.
    pub fn localhost(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self::localhost_on(DEFAULT_SQL_PORT, database, table)
    }

    /// Local backend on an explicit port with `root`/`root` credentials.
    pub fn localhost_on(
        port: u16,
        database: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self::new("localhost", port, database, "root", "root", table)
    }

    /// Local Redis on the default port. Cache targets carry no database or
    /// table name.
    #[must_use]
    pub fn redis_localhost() -> Self {
        Self::new("localhost", DEFAULT_REDIS_PORT, "", "root", "root", "")
    }

    /// Relational connection URL: `mysql://<host>:<port>/<database>`.
    #[must_use]
    pub fn sql_url(&self) -> String {
        format!("mysql://{}:{}/{}", self.host, self.port, self.database)
    }

    /// Document-store connection URL: `mongodb://<host>:<port>`.
    #[must_use]
    pub fn mongo_url(&self) -> String {
        format!("mongodb://{}:{}", self.host, self.port)
    }

    /// Cache connection URL: `redis://<host>:<port>`.
    #[must_use]
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_url_format() {
        let settings = ConnectionSettings::new("db.internal", 3307, "app", "svc", "s3cret", "person");
        assert_eq!(settings.sql_url(), "mysql://db.internal:3307/app");
    }

    #[test]
    fn mongo_url_omits_database() {
        let settings = ConnectionSettings::new("mongo.internal", 27017, "app", "svc", "pw", "people");
        assert_eq!(settings.mongo_url(), "mongodb://mongo.internal:27017");
    }

    #[test]
    fn redis_url_format() {
        let settings = ConnectionSettings::redis_localhost();
        assert_eq!(settings.redis_url(), "redis://localhost:6379");
    }

    #[test]
    fn localhost_defaults() {
        let settings = ConnectionSettings::localhost("app", "person");
        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.port, DEFAULT_SQL_PORT);
        assert_eq!(settings.username, "root");
        assert_eq!(settings.password, "root");
        assert_eq!(settings.table, "person");
    }

    #[test]
    fn localhost_on_custom_port() {
        let settings = ConnectionSettings::localhost_on(3310, "app", "person");
        assert_eq!(settings.port, 3310);
    }

    #[test]
    fn deserializes_from_json() {
        let settings: ConnectionSettings = serde_json::from_str(
            r#"{
                "host": "db.internal",
                "port": 3306,
                "database": "app",
                "username": "svc",
                "password": "pw",
                "table": "person"
            }"#,
        )
        .unwrap();
        assert_eq!(settings.host, "db.internal");
        assert_eq!(settings.sql_url(), "mysql://db.internal:3306/app");
    }
}
