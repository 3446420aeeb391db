//! Fehlertypen fuer das Netzwerk-Crate

use thiserror::Error;

/// Netzwerk-Fehlertypen
#[derive(Debug, Error)]
pub enum NetzwerkError {
    /// Abonent wurde nie registriert (nicht dasselbe wie "ohne Domains")
    #[error("Unbekannter Abonent: {0}")]
    UnbekannterAbonent(String),

    #[error("Transport-Fehler: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Ungueltige Antwort von {domain}: HTTP {status}")]
    UngueltigeAntwort { domain: String, status: u16 },

    #[error("Antwort nicht lesbar: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Kein Verzeichnisdienst angebunden")]
    KeinVerzeichnis,

    #[error("Ungueltige Client-Konfiguration: {0}")]
    Konfiguration(String),
}

pub type NetzwerkResult<T> = Result<T, NetzwerkError>;
