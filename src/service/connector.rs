//! Opening dialect connections.

use async_trait::async_trait;
use log::debug;
use sea_orm::{ConnectOptions, DbErr};

use super::client::Client;
use super::handle::{Connection, Database};

/// Opens a connection for a dialect and hands back both handles.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        client: Client,
        options: ConnectOptions,
    ) -> Result<(Box<dyn Connection>, Database), DbErr>;
}

/// Default connector going through `sea_orm::Database::connect`.
///
/// SeaORM picks the sqlx driver from the URL scheme, which
/// [`connection_url`](super::connection_url) derives from the client.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrmConnector;

#[async_trait]
impl Connector for OrmConnector {
    async fn connect(
        &self,
        client: Client,
        options: ConnectOptions,
    ) -> Result<(Box<dyn Connection>, Database), DbErr> {
        debug!("Opening {} connection", client);
        let database = Database::new(sea_orm::Database::connect(options).await?);
        Ok((Box::new(database.connection()), database))
    }
}
