//! Datenbankmodelle fuer fernchat
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Sie sind von den Wire-Typen getrennt und dienen als reine Datenuebertragungsobjekte.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use fernchat_core::NachrichtenTyp;

// ---------------------------------------------------------------------------
// Identitaet
// ---------------------------------------------------------------------------

/// Die eigene Langzeit-Identitaet (Schluessel Base64-kodiert)
#[derive(Clone)]
pub struct IdentitaetRecord {
    pub private_key: String,
    pub public_key: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for IdentitaetRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitaetRecord")
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .field("created_at", &self.created_at)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Abonent-Schluessel
// ---------------------------------------------------------------------------

/// Abgeleiteter Shared Key fuer einen Abonenten
#[derive(Clone)]
pub struct AbonentSchluesselRecord {
    pub id: i64,
    /// Verweis auf den Benutzer-Cache, falls der Abonent dort bekannt ist
    pub abonent_id: Option<Uuid>,
    pub abonent_name: String,
    pub abonent_public_key: String,
    /// Shared Secret, Base64
    pub shared_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for AbonentSchluesselRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbonentSchluesselRecord")
            .field("id", &self.id)
            .field("abonent_name", &self.abonent_name)
            .field("abonent_public_key", &self.abonent_public_key)
            .field("shared_key", &"[REDACTED]")
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Daten zum Anlegen oder Ueberschreiben eines Abonent-Schluessels
#[derive(Debug, Clone)]
pub struct NeuerAbonentSchluessel<'a> {
    pub abonent_name: &'a str,
    pub abonent_public_key: &'a str,
    pub shared_key: &'a str,
}

// ---------------------------------------------------------------------------
// Benutzer (Verzeichnis-Cache)
// ---------------------------------------------------------------------------

/// Benutzer-Datensatz aus dem Verzeichnis-Cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerRecord {
    pub id: Uuid,
    pub username: String,
    pub domains: Vec<String>,
    pub online: bool,
    pub has_new_message: bool,
}

/// Daten eines Benutzers aus der Verzeichnis-Antwort
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub username: &'a str,
    pub domains: &'a [String],
    pub online: bool,
}

// ---------------------------------------------------------------------------
// Nachrichten
// ---------------------------------------------------------------------------

/// Nachrichten-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NachrichtRecord {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub chat_id: Uuid,
    pub chat_name: String,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub message_type: NachrichtenTyp,
    /// Text-Chiffrat (Base64), nur bei `Text`
    pub message: Option<String>,
    /// Datei-Chiffrat (doppelt Base64), nur bei `File`
    pub file_data: Option<String>,
    pub file_name: Option<String>,
    /// IV, Base64
    pub iv: String,
    pub created_at: DateTime<Utc>,
    pub unread: bool,
}

/// Daten zum Anlegen einer Nachricht
#[derive(Debug, Clone)]
pub struct NeueNachricht<'a> {
    pub sender_id: Uuid,
    pub sender_name: &'a str,
    pub chat_id: Uuid,
    pub chat_name: &'a str,
    pub owner_id: Uuid,
    pub owner_name: &'a str,
    pub message_type: NachrichtenTyp,
    pub message: Option<&'a str>,
    pub file_data: Option<&'a str>,
    pub file_name: Option<&'a str>,
    pub iv: &'a str,
    pub unread: bool,
}
