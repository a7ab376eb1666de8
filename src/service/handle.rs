//! Connection and database handles owned by the service.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr};

/// Driver-level handle: liveness checks and teardown.
///
/// The service only ever pings and closes through this trait, which is what
/// lets tests swap in a double for the real pool.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Check that the backend answers.
    async fn ping(&self) -> Result<(), DbErr>;

    /// Close the underlying connection(s).
    async fn close(&self) -> Result<(), DbErr>;
}

/// ORM-level handle used to run queries.
///
/// Cloning shares the same underlying connection.
#[derive(Clone, Debug)]
pub struct Database {
    conn: Arc<DatabaseConnection>,
}

impl Database {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn: Arc::new(conn) }
    }

    /// The SeaORM connection, for use with entities and `ConnectionTrait`.
    pub fn orm(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn backend(&self) -> DbBackend {
        self.conn.get_database_backend()
    }

    /// Driver-level handle sharing this database's pool.
    pub fn connection(&self) -> PoolConnection {
        PoolConnection {
            conn: Arc::clone(&self.conn),
        }
    }
}

impl From<DatabaseConnection> for Database {
    fn from(conn: DatabaseConnection) -> Self {
        Self::new(conn)
    }
}

/// [`Connection`] backed by the pool behind a SeaORM connection.
#[derive(Clone, Debug)]
pub struct PoolConnection {
    conn: Arc<DatabaseConnection>,
}

#[async_trait]
impl Connection for PoolConnection {
    async fn ping(&self) -> Result<(), DbErr> {
        self.conn.ping().await
    }

    /// Closes the shared sqlx pool, so every [`Database`] holding it stops
    /// working too. Connections without a pool (mock, disconnected) have
    /// nothing to release.
    async fn close(&self) -> Result<(), DbErr> {
        let conn = self.conn.as_ref();
        match conn {
            DatabaseConnection::SqlxPostgresPoolConnection(_) => conn.get_postgres_connection_pool().close().await,
            DatabaseConnection::SqlxMySqlPoolConnection(_) => conn.get_mysql_connection_pool().close().await,
            DatabaseConnection::SqlxSqlitePoolConnection(_) => conn.get_sqlite_connection_pool().close().await,
            #[allow(unreachable_patterns)]
            _ => {}
        }
        Ok(())
    }
}
