//! fernchat-server – Bibliotheks-Root
//!
//! Verdrahtet Datenbank, Schluesselspeicher, Endpoint-Registry,
//! Nachrichtenverwaltung und Peer-Router zu einem lauffaehigen Knoten.

pub mod config;
pub mod logging;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use config::ServerConfig;
use fernchat_chat::{ChatService, SendeDispatcher, Sitzung};
use fernchat_core::EreignisBus;
use fernchat_crypto::KeyStore;
use fernchat_db::SqliteDb;
use fernchat_inbound::InboundServer;
use fernchat_network::{EndpointRegistry, HttpClientFactory};

/// Alle Komponenten eines Knotens, Peer-Router gebunden aber noch nicht aktiv
pub struct Knoten {
    pub db: Arc<SqliteDb>,
    pub service: Arc<ChatService>,
    pub dispatcher: SendeDispatcher,
    inbound: InboundServer,
}

impl Knoten {
    /// Baut den Knoten auf einer bereits geoeffneten Datenbank auf
    pub async fn aufbauen(config: &ServerConfig, db: SqliteDb) -> Result<Self> {
        let db = Arc::new(db);

        let schluessel = KeyStore::initialisieren(Arc::clone(&db))
            .await
            .context("Identitaet konnte nicht geladen werden")?;

        let fabrik = HttpClientFactory::neu(&config.client_konfiguration())
            .context("HTTP-Client konnte nicht erstellt werden")?;
        let registry = EndpointRegistry::neu(Arc::new(fabrik));

        let service = ChatService::neu(
            Arc::clone(&db),
            schluessel,
            registry,
            Arc::new(Sitzung::neu()),
            EreignisBus::neu(),
        );
        let dispatcher = SendeDispatcher::neu(Arc::clone(&service));

        let inbound = InboundServer::binden(config.knoten_bind_adresse()?)
            .await
            .context("Peer-Router konnte nicht gebunden werden")?;

        Ok(Self {
            db,
            service,
            dispatcher,
            inbound,
        })
    }

    /// Tatsaechlich gebundene Adresse des Peer-Routers
    pub fn adresse(&self) -> SocketAddr {
        self.inbound.lokale_adresse()
    }

    /// Bedient Peer-Anfragen bis `stopp` abgeschlossen ist
    pub async fn laufen<F>(self, stopp: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inbound.starten(self.service, stopp).await
    }
}

/// Haelt den Knoten-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Knoten und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbank oeffnen (Migrationen)
    /// 2. Identitaet sicherstellen, Registry und Dienste aufbauen
    /// 3. Peer-Router binden
    /// 4. Login am Verzeichnisdienst, falls konfiguriert (im Hintergrund)
    /// 5. Auf Ctrl-C warten
    pub async fn starten(self) -> Result<()> {
        let db = SqliteDb::oeffnen(&self.config.datenbank_config())
            .await
            .with_context(|| {
                format!("Datenbank '{}' nicht verfuegbar", self.config.datenbank.url)
            })?;

        let knoten = Knoten::aufbauen(&self.config, db).await?;
        tracing::info!(
            adresse = %knoten.adresse(),
            proxy = self.config.netzwerk.proxy_aktiviert,
            "Knoten bereit"
        );

        if let Some((benutzer, passwort, domain)) = self.config.konto.zugangsdaten() {
            let login = knoten.dispatcher.anmelden(benutzer, passwort, domain);
            let benutzer = benutzer.to_string();
            tokio::spawn(async move {
                match login.ergebnis().await {
                    Ok(()) => tracing::info!(
                        benutzer = %benutzer,
                        "Login am Verzeichnisdienst erfolgreich"
                    ),
                    Err(e) => tracing::error!(
                        benutzer = %benutzer,
                        fehler = %e,
                        "Login am Verzeichnisdienst fehlgeschlagen"
                    ),
                }
            });
        } else {
            tracing::warn!("Keine Zugangsdaten konfiguriert, Knoten bleibt abgemeldet");
        }

        knoten
            .laufen(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(fehler = %e, "Ctrl-C-Handler nicht verfuegbar");
                    std::future::pending::<()>().await;
                }
                tracing::info!("Shutdown-Signal empfangen, Knoten wird beendet");
            })
            .await
    }
}
