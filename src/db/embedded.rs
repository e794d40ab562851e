//! Embedded PostgreSQL support for local development.
//!
//! When `database.type = embedded` is configured, the application boots a
//! bundled PostgreSQL server instead of connecting to an external one. The
//! server lives for the lifetime of the process; `stop` shuts it down on
//! graceful exit. Data is ephemeral unless `persistent` is set.

#![cfg(feature = "embedded-db")]

use std::path::PathBuf;

use postgresql_embedded::{PostgreSQL, Settings};
use tracing::info;

const DATABASE_NAME: &str = "tickerdeck";

pub struct EmbeddedDatabase {
    server: PostgreSQL,
    connection_string: String,
}

impl EmbeddedDatabase {
    /// Boot the embedded server and ensure the application database exists.
    pub async fn start(data_dir: Option<PathBuf>, persistent: bool) -> anyhow::Result<Self> {
        let mut settings = Settings::default();
        settings.temporary = !persistent;
        if let Some(dir) = data_dir {
            settings.data_dir = dir;
        }

        let mut server = PostgreSQL::new(settings);
        server.setup().await?;
        server.start().await?;

        if !server.database_exists(DATABASE_NAME).await? {
            server.create_database(DATABASE_NAME).await?;
        }

        let connection_string = server.settings().url(DATABASE_NAME);
        info!(port = server.settings().port, "Embedded PostgreSQL started");

        Ok(Self {
            server,
            connection_string,
        })
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub async fn stop(self) -> anyhow::Result<()> {
        self.server.stop().await?;
        Ok(())
    }
}
