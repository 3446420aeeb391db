//! Hintergrund-Dispatcher fuer Netzwerkoperationen
//!
//! Jede Operation laeuft als eigener tokio-Task. Der Aufrufer erhaelt ein
//! [`AufgabeHandle`], ueber das er abbrechen oder auf das Ergebnis warten
//! kann, ohne selbst zu blockieren.

use std::future::Future;
use std::sync::Arc;

use fernchat_crypto::SecretBytes;
use fernchat_db::models::NachrichtRecord;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{ChatError, ChatResult};
use crate::service::ChatService;

/// Handle auf eine laufende Hintergrund-Aufgabe
#[derive(Debug)]
pub struct AufgabeHandle<T> {
    abbruch: CancellationToken,
    task: JoinHandle<ChatResult<T>>,
}

impl<T> AufgabeHandle<T> {
    /// Bricht die Aufgabe vor dem naechsten Endpunkt ab
    pub fn abbrechen(&self) {
        self.abbruch.cancel();
    }

    /// Wartet auf das Ergebnis der Aufgabe
    pub async fn ergebnis(self) -> ChatResult<T> {
        match self.task.await {
            Ok(ergebnis) => ergebnis,
            Err(e) => {
                warn!(fehler = %e, "Hintergrund-Aufgabe beendet ohne Ergebnis");
                Err(ChatError::Abgebrochen)
            }
        }
    }
}

/// Startet Sende-, Austausch- und Verzeichnis-Operationen als Tasks
#[derive(Debug, Clone)]
pub struct SendeDispatcher {
    service: Arc<ChatService>,
}

impl SendeDispatcher {
    pub fn neu(service: Arc<ChatService>) -> Self {
        Self { service }
    }

    fn starten<T, F, Fut>(&self, arbeit: F) -> AufgabeHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<ChatService>, CancellationToken) -> Fut,
        Fut: Future<Output = ChatResult<T>> + Send + 'static,
    {
        let abbruch = CancellationToken::new();
        let task = tokio::spawn(arbeit(Arc::clone(&self.service), abbruch.clone()));
        AufgabeHandle { abbruch, task }
    }

    pub fn text_senden(&self, abonent: &str, text: &str) -> AufgabeHandle<NachrichtRecord> {
        let abonent = abonent.to_string();
        let text = text.to_string();
        self.starten(move |service, abbruch| async move {
            service.text_senden(&abonent, &text, &abbruch).await
        })
    }

    pub fn datei_senden(
        &self,
        abonent: &str,
        dateiname: &str,
        daten: Vec<u8>,
    ) -> AufgabeHandle<NachrichtRecord> {
        let abonent = abonent.to_string();
        let dateiname = dateiname.to_string();
        self.starten(move |service, abbruch| async move {
            service
                .datei_senden(&abonent, &dateiname, &daten, &abbruch)
                .await
        })
    }

    pub fn schluessel_austauschen(&self, abonent: &str) -> AufgabeHandle<SecretBytes> {
        let abonent = abonent.to_string();
        self.starten(move |service, abbruch| async move {
            service.schluessel_austauschen(&abonent, &abbruch).await
        })
    }

    pub fn anmelden(&self, benutzername: &str, passwort: &str, domain: &str) -> AufgabeHandle<()> {
        let benutzername = benutzername.to_string();
        let passwort = passwort.to_string();
        let domain = domain.to_string();
        self.starten(move |service, _| async move {
            service.anmelden(&benutzername, &passwort, &domain).await
        })
    }

    pub fn benutzerliste_aktualisieren(&self) -> AufgabeHandle<usize> {
        self.starten(|service, _| async move { service.benutzerliste_aktualisieren().await })
    }
}
