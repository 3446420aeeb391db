//! Axum HTTP-Server fuer eingehende Peer-Verbindungen

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;

use crate::empfaenger::PeerEmpfaenger;
use crate::routes::peer_router;

/// Gebundener, noch nicht laufender Peer-Server
pub struct InboundServer {
    listener: TcpListener,
    adresse: SocketAddr,
}

impl InboundServer {
    /// Bindet den Listener (Port 0 waehlt einen freien Port)
    pub async fn binden(adresse: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(adresse).await?;
        let adresse = listener.local_addr()?;
        Ok(Self { listener, adresse })
    }

    /// Tatsaechlich gebundene Adresse
    pub fn lokale_adresse(&self) -> SocketAddr {
        self.adresse
    }

    /// Bedient Peer-Anfragen bis `stopp` abgeschlossen ist
    pub async fn starten<F>(self, empfaenger: Arc<dyn PeerEmpfaenger>, stopp: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = peer_router(empfaenger);
        tracing::info!(addr = %self.adresse, "Peer-Router gestartet");

        axum::serve(self.listener, app)
            .with_graceful_shutdown(stopp)
            .await?;

        tracing::info!(addr = %self.adresse, "Peer-Router beendet");
        Ok(())
    }
}

impl std::fmt::Debug for InboundServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundServer")
            .field("adresse", &self.adresse)
            .finish()
    }
}
