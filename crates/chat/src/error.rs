//! Fehlertypen fuer das Chat-Crate

use fernchat_crypto::CryptoError;
use fernchat_network::NetzwerkError;
use thiserror::Error;

/// Chat-Fehlertypen
#[derive(Debug, Error)]
pub enum ChatError {
    /// Kein Endpunkt lieferte ein brauchbares Zertifikat
    #[error("Schluesselaustausch mit {0} fehlgeschlagen")]
    SchluesselAustausch(String),

    /// Kein Endpunkt hat mit `OK` geantwortet
    #[error("Zustellung an {0} fehlgeschlagen")]
    ZustellungFehlgeschlagen(String),

    #[error("Unbekannter Abonent: {0}")]
    UnbekannterAbonent(String),

    #[error("Nicht angemeldet")]
    NichtAngemeldet,

    #[error("Nachricht nicht gefunden: {0}")]
    NachrichtNichtGefunden(String),

    #[error("Ungueltige Eingabe: {0}")]
    UngueltigeEingabe(String),

    #[error("Aufgabe abgebrochen")]
    Abgebrochen,

    #[error("Krypto-Fehler: {0}")]
    Krypto(#[from] CryptoError),

    #[error("Netzwerk-Fehler: {0}")]
    Netzwerk(NetzwerkError),

    #[error("Datenbank-Fehler: {0}")]
    DatenbankFehler(#[from] fernchat_db::DbError),
}

impl From<NetzwerkError> for ChatError {
    fn from(e: NetzwerkError) -> Self {
        match e {
            NetzwerkError::UnbekannterAbonent(name) => Self::UnbekannterAbonent(name),
            other => Self::Netzwerk(other),
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
