//! fernchat-core – Gemeinsame Typen und Ereignisse
//!
//! Dieses Crate stellt die Bausteine bereit, die von allen anderen
//! fernchat-Crates gemeinsam genutzt werden: die JSON-Wire-Typen des
//! Peer-Protokolls und des Verzeichnisdienstes sowie den Ereignis-Bus
//! fuer neue Nachrichten.

pub mod event;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use event::{EreignisBus, NachrichtenEreignis};
pub use types::{
    AuthCredentialsRequest, AuthTokenResponse, Certificate, FileRequest, MessageRequest,
    NachrichtenTyp, UserResponse, ERFOLGS_MARKER,
};
