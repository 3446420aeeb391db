//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Die Methodennamen sind ueber alle Traits
//! eindeutig, damit `SqliteDb` ohne qualifizierte Aufrufe nutzbar bleibt.

use uuid::Uuid;

use crate::error::DbError;
use crate::models::{
    AbonentSchluesselRecord, BenutzerRecord, IdentitaetRecord, NachrichtRecord,
    NeueNachricht, NeuerAbonentSchluessel, NeuerBenutzer,
};

pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://fernchat.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://fernchat.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Zugriff auf die eigene Langzeit-Identitaet
#[allow(async_fn_in_trait)]
pub trait IdentityRepository: Send + Sync {
    /// Laedt die Identitaet; `None` wenn noch keine erzeugt wurde
    async fn identitaet_laden(&self) -> DbResult<Option<IdentitaetRecord>>;

    /// Speichert die Identitaet einmalig.
    /// Existiert bereits eine, schlaegt der Aufruf mit `Eindeutigkeit` fehl.
    async fn identitaet_speichern(
        &self,
        private_key: &str,
        public_key: &str,
    ) -> DbResult<IdentitaetRecord>;
}

/// Zugriff auf die abgeleiteten Shared Keys
#[allow(async_fn_in_trait)]
pub trait AbonentKeyRepository: Send + Sync {
    /// Legt den Schluessel an oder ueberschreibt den bestehenden (last writer wins)
    async fn schluessel_speichern(
        &self,
        data: NeuerAbonentSchluessel<'_>,
    ) -> DbResult<AbonentSchluesselRecord>;

    async fn schluessel_laden(&self, abonent_name: &str)
        -> DbResult<Option<AbonentSchluesselRecord>>;
}

/// Zugriff auf den Benutzer-Cache des Verzeichnisdienstes
#[allow(async_fn_in_trait)]
pub trait UserRepository: Send + Sync {
    /// Legt alle Benutzer an bzw. aktualisiert Domains und Online-Status,
    /// in einer einzigen Transaktion. Rueckgabe in Eingabe-Reihenfolge.
    async fn benutzer_synchronisieren(
        &self,
        benutzer: &[NeuerBenutzer<'_>],
    ) -> DbResult<Vec<BenutzerRecord>>;

    async fn benutzer_nach_name(&self, username: &str) -> DbResult<Option<BenutzerRecord>>;

    async fn benutzer_nach_id(&self, id: Uuid) -> DbResult<Option<BenutzerRecord>>;

    /// Alle Benutzer, alphabetisch
    async fn alle_benutzer(&self) -> DbResult<Vec<BenutzerRecord>>;

    async fn neue_nachricht_setzen(&self, username: &str, wert: bool) -> DbResult<bool>;
}

/// Zugriff auf gespeicherte Nachrichten
#[allow(async_fn_in_trait)]
pub trait MessageRepository: Send + Sync {
    async fn nachricht_erstellen(&self, data: NeueNachricht<'_>) -> DbResult<NachrichtRecord>;

    async fn nachricht_laden(&self, id: Uuid) -> DbResult<Option<NachrichtRecord>>;

    /// Loescht eine (z.B. nicht zustellbare) Nachricht endgueltig
    async fn nachricht_loeschen(&self, id: Uuid) -> DbResult<bool>;

    /// Verlauf eines Chats fuer einen Besitzer, aelteste zuerst
    async fn chat_verlauf(&self, chat_name: &str, owner_id: Uuid)
        -> DbResult<Vec<NachrichtRecord>>;

    /// Markiert alle ungelesenen Nachrichten eines Chats als gelesen
    async fn chat_gelesen(&self, chat_name: &str, owner_id: Uuid) -> DbResult<u64>;

    /// Alle Datei-Nachrichten eines Besitzers, aelteste zuerst
    async fn dateien(&self, owner_id: Uuid) -> DbResult<Vec<NachrichtRecord>>;
}
