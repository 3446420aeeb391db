//! Endpoint-Registry
//!
//! Ordnet jedem Abonenten die Clients seiner Domains zu, in
//! Registrierungsreihenfolge. Ein Abonent, dessen Endpunkte geleert
//! wurden, bleibt bekannt (leere Liste); nur nie registrierte Namen
//! liefern [`NetzwerkError::UnbekannterAbonent`].

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::client::{PeerClient, PeerClientFactory};
use crate::directory::VerzeichnisDienst;
use crate::error::{NetzwerkError, NetzwerkResult};

pub struct EndpointRegistry {
    fabrik: Arc<dyn PeerClientFactory>,
    clients: DashMap<String, Vec<Arc<dyn PeerClient>>>,
    verzeichnis: RwLock<Option<Arc<dyn VerzeichnisDienst>>>,
}

impl EndpointRegistry {
    pub fn neu(fabrik: Arc<dyn PeerClientFactory>) -> Arc<Self> {
        Arc::new(Self {
            fabrik,
            clients: DashMap::new(),
            verzeichnis: RwLock::new(None),
        })
    }

    /// Baut einen Client fuer `domain` und haengt ihn an (keine Deduplizierung)
    pub fn endpunkt_registrieren(&self, abonent: &str, domain: &str) -> NetzwerkResult<()> {
        let client = self.fabrik.peer_client(domain)?;
        self.clients
            .entry(abonent.to_string())
            .or_default()
            .push(client);
        debug!(abonent = %abonent, domain = %domain, "Endpunkt registriert");
        Ok(())
    }

    /// Entfernt alle Clients eines Abonenten; der Abonent bleibt registriert
    pub fn endpunkte_leeren(&self, abonent: &str) {
        self.clients
            .entry(abonent.to_string())
            .or_default()
            .clear();
    }

    /// Ersetzt die Endpunkte eines Abonenten durch die angegebenen Domains.
    ///
    /// Domains, fuer die kein Client gebaut werden kann, werden
    /// protokolliert und uebersprungen. Rueckgabe: Anzahl registrierter Endpunkte.
    pub fn endpunkte_neu_aufbauen(&self, abonent: &str, domains: &[String]) -> usize {
        let mut neu = Vec::with_capacity(domains.len());
        for domain in domains {
            match self.fabrik.peer_client(domain) {
                Ok(client) => neu.push(client),
                Err(e) => warn!(
                    abonent = %abonent,
                    domain = %domain,
                    fehler = %e,
                    "Endpunkt konnte nicht registriert werden"
                ),
            }
        }

        // Alte Clients werden in einem Schritt ersetzt, Sender sehen nie eine halbe Liste
        let anzahl = neu.len();
        self.clients.insert(abonent.to_string(), neu);
        debug!(abonent = %abonent, anzahl, "Endpunkte neu aufgebaut");
        anzahl
    }

    /// Clients eines Abonenten in Registrierungsreihenfolge
    pub fn clients_fuer(&self, abonent: &str) -> NetzwerkResult<Vec<Arc<dyn PeerClient>>> {
        self.clients
            .get(abonent)
            .map(|eintrag| eintrag.value().clone())
            .ok_or_else(|| NetzwerkError::UnbekannterAbonent(abonent.to_string()))
    }

    /// Ob der Abonent jemals registriert wurde
    pub fn ist_registriert(&self, abonent: &str) -> bool {
        self.clients.contains_key(abonent)
    }

    /// Baut den Verzeichnis-Client neu, nach dem Login mit Bearer-Token
    pub fn verzeichnis_anbinden(
        &self,
        domain: &str,
        token: Option<String>,
    ) -> NetzwerkResult<Arc<dyn VerzeichnisDienst>> {
        let authentifiziert = token.is_some();
        let client = self.fabrik.verzeichnis_client(domain, token)?;
        *self.verzeichnis.write() = Some(Arc::clone(&client));
        info!(domain = %domain, authentifiziert, "Verzeichnisdienst angebunden");
        Ok(client)
    }

    pub fn verzeichnis(&self) -> NetzwerkResult<Arc<dyn VerzeichnisDienst>> {
        self.verzeichnis
            .read()
            .clone()
            .ok_or(NetzwerkError::KeinVerzeichnis)
    }

    /// Trennt den Verzeichnisdienst und vergisst alle Endpunkte
    pub fn zuruecksetzen(&self) {
        *self.verzeichnis.write() = None;
        self.clients.clear();
    }
}

impl std::fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointRegistry")
            .field("abonenten", &self.clients.len())
            .field("verzeichnis", &self.verzeichnis.read().is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
