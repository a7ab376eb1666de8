//! Connection lifecycle service.
//!
//! [`Service`] owns one connection to a PostgreSQL, MySQL or SQLite backend.
//! It is initialized once with [`Service::init`], handed out through its
//! accessors, and torn down explicitly with [`Service::disconnect`].
//!
//! There is no retry, reconnection or pooling policy here: a single attempt
//! either succeeds or its error goes back to the caller. The service takes
//! `&mut self` for every state change and does no locking of its own; wrap it
//! in a `tokio::sync::Mutex` to share it between tasks.

pub mod client;
pub mod connector;
pub mod handle;

use std::time::Duration;

use log::{debug, error, LevelFilter};
use sea_orm::ConnectOptions;

use crate::constants::{
    DEFAULT_SLOW_THRESHOLD_MS, DEFAULT_TRACE_NAME, LOG_ALREADY_INITIALIZED, LOG_DISCONNECTED, LOG_ERROR_CLOSE,
    LOG_ERROR_CONNECT, LOG_ERROR_NOT_INITIALIZED, LOG_ERROR_PING, LOG_ERROR_UNSUPPORTED, LOG_INITIALIZED,
    LOG_INITIALIZING,
};
use crate::error::{Error, Result};

pub use client::{connection_url, Client, ConnectConfig};
pub use connector::{Connector, OrmConnector};
pub use handle::{Connection, Database, PoolConnection};

/// Behaviour settings for a [`Service`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Enable SeaORM/sqlx statement logging
    pub logging: bool,
    /// Statements slower than this are logged as warnings when logging is on
    pub slow_threshold: Duration,
    /// Prefix for every log line written by the service
    pub trace_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            logging: true,
            slow_threshold: Duration::from_millis(DEFAULT_SLOW_THRESHOLD_MS),
            trace_name: DEFAULT_TRACE_NAME.to_string(),
        }
    }
}

/// Owns the connection to one relational backend.
///
/// # Example
/// ```rust,no_run
/// use sqlkit::{ConnectConfig, Service};
///
/// # async fn example() -> sqlkit::Result<()> {
/// let config = ConnectConfig::new("postgres", "localhost", 5432, "app", "app", "secret");
/// let mut service = Service::new(config, None);
///
/// service.init().await?;
/// let db = service.database().expect("initialized");
/// // ... run queries through db.orm() ...
/// service.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct Service {
    config: ConnectConfig,
    settings: ServiceConfig,
    connector: Box<dyn Connector>,
    conn: Option<Box<dyn Connection>>,
    database: Option<Database>,
}

impl Service {
    /// Create an uninitialized service.
    ///
    /// Passing `None` for `settings` uses [`ServiceConfig::default`].
    pub fn new(config: ConnectConfig, settings: Option<ServiceConfig>) -> Self {
        Self {
            config,
            settings: settings.unwrap_or_default(),
            connector: Box::new(OrmConnector),
            conn: None,
            database: None,
        }
    }

    /// Replace the connector used by [`init`](Self::init).
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Box::new(connector);
        self
    }

    /// Open, ping and store the connection.
    ///
    /// Does nothing if a connection or database handle is already set.
    ///
    /// # Errors
    /// - [`Error::UnsupportedClient`] before any I/O when the client is unknown
    /// - [`Error::InvalidUrl`] when the connection string cannot be built
    /// - [`Error::Database`] with the driver's error when connecting or pinging fails
    pub async fn init(&mut self) -> Result<()> {
        let trace = &self.settings.trace_name;
        debug!("{} {}: {}", trace, LOG_INITIALIZING, self.config.client);

        if self.conn.is_some() || self.database.is_some() {
            debug!("{} {}", trace, LOG_ALREADY_INITIALIZED);
            return Ok(());
        }

        let client = self.config.client().inspect_err(|_| {
            error!("{} {}: {}", trace, LOG_ERROR_UNSUPPORTED, self.config.client);
        })?;
        let options = self.connect_options(client::build_url(client, &self.config)?);

        let (conn, database) = self.connector.connect(client, options).await.inspect_err(|e| {
            error!("{} {}: {}, error: {}", trace, LOG_ERROR_CONNECT, client, e);
        })?;

        conn.ping().await.inspect_err(|e| {
            error!("{} {}: {}, error: {}", trace, LOG_ERROR_PING, client, e);
        })?;

        self.conn = Some(conn);
        self.database = Some(database);

        debug!("{} {}: {}", self.settings.trace_name, LOG_INITIALIZED, client);
        Ok(())
    }

    /// Close the stored connection and release both handles.
    ///
    /// On a close failure the handles are kept so the caller can retry.
    ///
    /// # Errors
    /// - [`Error::NotInitialized`] when no connection is set
    /// - [`Error::Database`] with the driver's close error
    pub async fn disconnect(&mut self) -> Result<()> {
        let trace = &self.settings.trace_name;

        let Some(conn) = self.conn.as_ref() else {
            error!("{} {}: {}", trace, LOG_ERROR_NOT_INITIALIZED, self.config.client);
            return Err(Error::NotInitialized);
        };

        conn.close().await.inspect_err(|e| {
            error!("{} {}: {}, error: {}", trace, LOG_ERROR_CLOSE, self.config.client, e);
        })?;

        debug!("{} {}: {}", trace, LOG_DISCONNECTED, self.config.client);
        self.conn = None;
        self.database = None;
        Ok(())
    }

    pub fn connection(&self) -> Option<&dyn Connection> {
        self.conn.as_deref()
    }

    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.conn.is_some()
    }

    /// Inject a pre-built connection, e.g. a test double.
    pub fn set_connection(&mut self, conn: Box<dyn Connection>) {
        self.conn = Some(conn);
    }

    pub fn set_database(&mut self, database: Database) {
        self.database = Some(database);
    }

    pub fn set_trace_name(&mut self, trace_name: impl Into<String>) {
        self.settings.trace_name = trace_name.into();
    }

    pub fn trace_name(&self) -> &str {
        &self.settings.trace_name
    }

    pub fn config(&self) -> &ConnectConfig {
        &self.config
    }

    fn connect_options(&self, url: String) -> ConnectOptions {
        let mut options = ConnectOptions::new(url);
        options.sqlx_logging(self.settings.logging);
        if self.settings.logging {
            options
                .sqlx_logging_level(LevelFilter::Debug)
                .sqlx_slow_statements_logging_settings(LevelFilter::Warn, self.settings.slow_threshold);
        }
        options
    }
}
