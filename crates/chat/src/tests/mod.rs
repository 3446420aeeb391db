//! Tests fuer das Chat-Crate
//!
//! Alle Tests laufen gegen eine In-Memory-Datenbank und geskriptete
//! Peer-Clients; es wird kein Netzwerk benutzt.

mod fakes;
