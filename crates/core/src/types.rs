//! Wire-Typen fuer das Peer-Protokoll und den Verzeichnisdienst
//!
//! Alle Felder werden im JSON in camelCase uebertragen. Binaere Werte
//! (Schluessel, IVs, Chiffrate) sind Base64-kodierte Strings.

use serde::{Deserialize, Serialize};

/// Antwort-Body eines Peers bei erfolgreicher Annahme
pub const ERFOLGS_MARKER: &str = "OK";

/// Pfade des eingehenden Peer-Routers
pub mod pfade {
    pub const NACHRICHT: &str = "/api/message";
    pub const DATEI: &str = "/api/file";
    pub const ZERTIFIKAT: &str = "/api/cert";
}

/// Zertifikat im Sinne des Protokolls (kein X.509): Benutzername + X25519 Public Key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub username: String,
    /// Oeffentlicher Schluessel, Base64 (32 Bytes)
    pub public_key: String,
}

/// Verschluesselte Textnachricht an einen Peer (`POST /api/message`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    /// Absender
    pub username: String,
    /// Chiffrat, Base64
    pub message: String,
    /// Initialisierungsvektor, Base64
    pub iv: String,
    /// Chat-Name aus Sicht des Absenders (= Empfaenger)
    pub chat: String,
}

/// Verschluesselte Datei an einen Peer (`POST /api/file`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRequest {
    pub username: String,
    /// Doppelt Base64-kodiertes Chiffrat
    pub file_data: String,
    pub file_name: String,
    pub iv: String,
    pub chat: String,
}

/// Eintrag der Benutzerliste des Verzeichnisdienstes (`GET /user`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub name: String,
    /// Alle Domains unter denen der Benutzer erreichbar ist
    #[serde(default)]
    pub domain: Vec<String>,
    #[serde(default)]
    pub online: bool,
}

/// Login-Daten fuer `POST /token/generate-token`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Antwort des Verzeichnisdienstes auf einen erfolgreichen Login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub token: String,
    pub username: String,
}

/// Nachrichtentyp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NachrichtenTyp {
    Text,
    File,
}

impl NachrichtenTyp {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::File => "FILE",
        }
    }
}

impl std::str::FromStr for NachrichtenTyp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEXT" => Ok(Self::Text),
            "FILE" => Ok(Self::File),
            other => Err(format!("Unbekannter Nachrichtentyp: {other}")),
        }
    }
}
