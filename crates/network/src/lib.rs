//! fernchat-network – Ausgehende Verbindungen
//!
//! Jeder Abonent ist ueber eine oder mehrere Domains erreichbar; pro
//! (Abonent, Domain) haelt die [`EndpointRegistry`] einen [`PeerClient`].
//! Der Verzeichnisdienst (Login, Benutzerliste) wird separat angebunden.
//! Die konkreten HTTP-Clients entstehen ueber eine [`PeerClientFactory`],
//! damit Tests den Transport ersetzen koennen.

pub mod client;
pub mod directory;
pub mod error;
pub mod registry;

pub use client::{
    ClientKonfiguration, HttpClientFactory, HttpPeerClient, PeerClient, PeerClientFactory,
};
pub use directory::{HttpVerzeichnisClient, VerzeichnisDienst};
pub use error::{NetzwerkError, NetzwerkResult};
pub use registry::EndpointRegistry;
