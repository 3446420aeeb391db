//! fernchat-chat – Zustellung und Nachrichtenverwaltung
//!
//! Dieses Crate implementiert:
//! - Zustellkoordinator: Fan-out an alle Endpunkte eines Abonenten,
//!   Zertifikatsaustausch mit "letzte Antwort gewinnt"
//! - ChatService: Senden, Empfangen, Verlauf, Dateien, Login und
//!   Benutzerliste
//! - SendeDispatcher: abbrechbare Hintergrund-Tasks fuer alle
//!   Netzwerkoperationen
//! - Sitzung: der angemeldete lokale Benutzer

pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use coordinator::{Umschlag, Zustellergebnis, Zustellkoordinator};
pub use dispatcher::{AufgabeHandle, SendeDispatcher};
pub use error::{ChatError, ChatResult};
pub use service::{ChatService, VerlaufEintrag};
pub use session::Sitzung;
