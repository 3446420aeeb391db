//! fernchat-inbound – Eingehender Peer-Router
//!
//! Nimmt verschluesselte Nachrichten, Dateien und Zertifikate von Peers
//! entgegen. Nur POST ist erlaubt; alle Fehler werden als generische
//! JSON-Antwort `{"status": ...}` gemeldet, Details landen nur im Log.

pub mod empfaenger;
pub mod error;
pub mod routes;
pub mod server;

pub use empfaenger::PeerEmpfaenger;
pub use error::{InboundError, InboundResult};
pub use routes::peer_router;
pub use server::InboundServer;
