//! # fernchat-crypto
//!
//! Schluesselverwaltung und Payload-Verschluesselung fuer fernchat.
//!
//! ## Module
//! - `identity` - X25519 Langzeit-Identitaet und ECDH
//! - `cipher` - AES-256-CBC fuer Text und Dateien, IV-Erzeugung
//! - `key_store` - Persistente Identitaet und Shared Keys pro Abonent
//! - `types` - Gemeinsame Typen (SecretBytes)
//! - `error` - Fehlertypen

pub mod cipher;
pub mod error;
pub mod identity;
pub mod key_store;
pub mod types;

pub use error::{CryptoError, CryptoResult};
pub use identity::Identity;
pub use key_store::KeyStore;
pub use types::SecretBytes;
