//! Geskriptete Peer-Clients und Verzeichnisdienst fuer Tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use fernchat_core::{
    AuthCredentialsRequest, AuthTokenResponse, Certificate, EreignisBus, FileRequest,
    MessageRequest, UserResponse,
};
use fernchat_crypto::{Identity, KeyStore};
use fernchat_db::{models::NeuerBenutzer, SqliteDb, UserRepository};
use fernchat_network::{
    EndpointRegistry, NetzwerkError, NetzwerkResult, PeerClient, PeerClientFactory,
    VerzeichnisDienst,
};
use parking_lot::Mutex;

use crate::service::ChatService;
use crate::session::Sitzung;

/// Verhalten eines geskripteten Endpunkts
#[derive(Clone)]
pub enum Verhalten {
    /// Antwortet mit `OK` bzw. dem hinterlegten Zertifikat
    Erfolg(Option<Certificate>),
    /// Antwortet mit einem beliebigen Body
    Antwort(String),
    /// HTTP-Fehler (simuliert Transportfehler)
    Fehler,
}

/// Gemeinsame Aufzeichnung aller Anfragen
#[derive(Default)]
pub struct Protokoll {
    pub zertifikat_anfragen: AtomicUsize,
    pub nachrichten: Mutex<Vec<(String, MessageRequest)>>,
    pub dateien: Mutex<Vec<(String, FileRequest)>>,
}

struct FakePeer {
    domain: String,
    verhalten: Verhalten,
    protokoll: Arc<Protokoll>,
}

impl FakePeer {
    fn fehler(&self) -> NetzwerkError {
        NetzwerkError::UngueltigeAntwort {
            domain: self.domain.clone(),
            status: 503,
        }
    }

    fn body(&self) -> NetzwerkResult<String> {
        match &self.verhalten {
            Verhalten::Erfolg(_) => Ok("OK".into()),
            Verhalten::Antwort(b) => Ok(b.clone()),
            Verhalten::Fehler => Err(self.fehler()),
        }
    }
}

#[async_trait]
impl PeerClient for FakePeer {
    fn domain(&self) -> &str {
        &self.domain
    }

    async fn nachricht_senden(&self, anfrage: &MessageRequest) -> NetzwerkResult<String> {
        self.protokoll
            .nachrichten
            .lock()
            .push((self.domain.clone(), anfrage.clone()));
        self.body()
    }

    async fn datei_senden(&self, anfrage: &FileRequest) -> NetzwerkResult<String> {
        self.protokoll
            .dateien
            .lock()
            .push((self.domain.clone(), anfrage.clone()));
        self.body()
    }

    async fn zertifikat_senden(&self, _: &Certificate) -> NetzwerkResult<Certificate> {
        self.protokoll.zertifikat_anfragen.fetch_add(1, Ordering::SeqCst);
        match &self.verhalten {
            Verhalten::Erfolg(Some(c)) => Ok(c.clone()),
            Verhalten::Erfolg(None) | Verhalten::Fehler => Err(self.fehler()),
            Verhalten::Antwort(b) => Ok(zertifikat_mit_schluessel(b)),
        }
    }
}

/// Unbrauchbares Zertifikat fuer `Verhalten::Antwort`
fn zertifikat_mit_schluessel(public_key: &str) -> Certificate {
    Certificate {
        username: "bob".into(),
        public_key: public_key.to_string(),
    }
}

struct FakeVerzeichnis {
    benutzer: Option<Vec<UserResponse>>,
}

#[async_trait]
impl VerzeichnisDienst for FakeVerzeichnis {
    async fn anmelden(&self, daten: &AuthCredentialsRequest) -> NetzwerkResult<AuthTokenResponse> {
        if daten.password == "geheim" {
            Ok(AuthTokenResponse {
                token: "token-123".into(),
                username: daten.username.clone(),
            })
        } else {
            Err(NetzwerkError::UngueltigeAntwort {
                domain: "dir".into(),
                status: 401,
            })
        }
    }

    async fn benutzer_liste(&self) -> NetzwerkResult<Vec<UserResponse>> {
        self.benutzer.clone().ok_or(NetzwerkError::UngueltigeAntwort {
            domain: "dir".into(),
            status: 500,
        })
    }

    async fn benutzer_laden(&self, id: &str) -> NetzwerkResult<UserResponse> {
        self.benutzer
            .iter()
            .flatten()
            .find(|u| u.name == id)
            .cloned()
            .ok_or(NetzwerkError::UngueltigeAntwort {
                domain: "dir".into(),
                status: 404,
            })
    }
}

/// Fabrik mit festem Verhalten pro Domain
#[derive(Default)]
pub struct FakeFabrik {
    pub verhalten: Mutex<HashMap<String, Verhalten>>,
    pub verzeichnis_benutzer: Mutex<Option<Vec<UserResponse>>>,
    pub protokoll: Arc<Protokoll>,
}

impl FakeFabrik {
    pub fn domain(&self, domain: &str, verhalten: Verhalten) {
        self.verhalten.lock().insert(domain.to_string(), verhalten);
    }
}

impl PeerClientFactory for FakeFabrik {
    fn peer_client(&self, domain: &str) -> NetzwerkResult<Arc<dyn PeerClient>> {
        let verhalten = self
            .verhalten
            .lock()
            .get(domain)
            .cloned()
            .unwrap_or(Verhalten::Fehler);
        Ok(Arc::new(FakePeer {
            domain: domain.to_string(),
            verhalten,
            protokoll: Arc::clone(&self.protokoll),
        }))
    }

    fn verzeichnis_client(
        &self,
        _: &str,
        _: Option<String>,
    ) -> NetzwerkResult<Arc<dyn VerzeichnisDienst>> {
        Ok(Arc::new(FakeVerzeichnis {
            benutzer: self.verzeichnis_benutzer.lock().clone(),
        }))
    }
}

/// Komplette Testumgebung: alice ist lokal angemeldet, bob ist bekannt
pub struct Umgebung {
    pub db: Arc<SqliteDb>,
    pub schluessel: Arc<KeyStore>,
    pub registry: Arc<EndpointRegistry>,
    pub fabrik: Arc<FakeFabrik>,
    pub service: Arc<ChatService>,
    pub bob: Identity,
}

impl Umgebung {
    pub async fn neu() -> Self {
        let db = Arc::new(
            SqliteDb::in_memory()
                .await
                .expect("In-Memory-DB konnte nicht geoeffnet werden"),
        );
        let schluessel = KeyStore::initialisieren(Arc::clone(&db))
            .await
            .expect("KeyStore konnte nicht initialisiert werden");
        let fabrik = Arc::new(FakeFabrik::default());
        let registry = EndpointRegistry::neu(Arc::clone(&fabrik) as Arc<dyn PeerClientFactory>);

        let sitzung = Arc::new(Sitzung::neu());
        sitzung.anmelden("alice", None);

        let service = ChatService::neu(
            Arc::clone(&db),
            Arc::clone(&schluessel),
            Arc::clone(&registry),
            sitzung,
            EreignisBus::neu(),
        );

        Self {
            db,
            schluessel,
            registry,
            fabrik,
            service,
            bob: Identity::generate(),
        }
    }

    /// Legt einen Benutzer im Cache an
    pub async fn benutzer(&self, name: &str, domains: &[&str]) {
        let domains: Vec<String> = domains.iter().map(|d| d.to_string()).collect();
        self.db
            .benutzer_synchronisieren(&[NeuerBenutzer {
                username: name,
                domains: &domains,
                online: true,
            }])
            .await
            .expect("Benutzer anlegen fehlgeschlagen");
    }

    /// Standard: alice und bob im Cache, bob mit den angegebenen Domains registriert
    pub async fn mit_bob(domains: &[(&str, Verhalten)]) -> Self {
        let u = Self::neu().await;
        u.benutzer("alice", &[]).await;
        let namen: Vec<&str> = domains.iter().map(|(d, _)| *d).collect();
        u.benutzer("bob", &namen).await;
        for (domain, verhalten) in domains {
            u.fabrik.domain(domain, verhalten.clone());
            u.registry
                .endpunkt_registrieren("bob", domain)
                .expect("Endpunkt registrieren fehlgeschlagen");
        }
        u
    }

    pub fn bob_zertifikat(&self) -> Certificate {
        Certificate {
            username: "bob".into(),
            public_key: self.bob.public_key_base64(),
        }
    }
}
