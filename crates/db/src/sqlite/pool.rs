//! SQLite-Anbindung eines Knotens
//!
//! Peer-Router und Hintergrund-Aufgaben schreiben gleichzeitig; gesperrte
//! Tabellen werden deshalb bis `SPERR_WARTEZEIT` abgewartet.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use tracing::{debug, info};

use crate::error::DbError;
use crate::repository::DatabaseConfig;

const SPERR_WARTEZEIT: Duration = Duration::from_secs(5);

/// Datenbank eines Knotens: Identitaet, Schluessel, Benutzer-Cache, Nachrichten
#[derive(Debug, Clone)]
pub struct SqliteDb {
    pub(crate) pool: SqlitePool,
}

impl SqliteDb {
    /// Oeffnet (oder legt an) die Datei aus der Konfiguration und migriert
    pub async fn oeffnen(config: &DatabaseConfig) -> Result<Self, DbError> {
        let journal = if config.sqlite_wal {
            SqliteJournalMode::Wal
        } else {
            SqliteJournalMode::Delete
        };
        let opts = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(journal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(SPERR_WARTEZEIT)
            .foreign_keys(true);

        let pool_opts = SqlitePoolOptions::new().max_connections(config.max_verbindungen);
        let db = Self::verbinden(pool_opts, opts).await?;
        info!(url = %config.url, wal = config.sqlite_wal, "Knoten-Datenbank geoeffnet");
        Ok(db)
    }

    /// Fluechtige Datenbank mit genau einer dauerhaften Verbindung
    pub async fn in_memory() -> Result<Self, DbError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool_opts = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::verbinden(pool_opts, opts).await
    }

    async fn verbinden(
        pool_opts: SqlitePoolOptions,
        opts: SqliteConnectOptions,
    ) -> Result<Self, DbError> {
        let db = Self {
            pool: pool_opts.connect_with(opts).await?,
        };
        db.migrationen_ausfuehren().await?;
        Ok(db)
    }

    async fn migrationen_ausfuehren(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("Schema aktuell");
        Ok(())
    }

    /// Direkter Pool-Zugriff fuer Tests mit eigenem SQL
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
