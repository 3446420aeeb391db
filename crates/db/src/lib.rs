//! fernchat-db – Lokaler Speicher
//!
//! Repository-Pattern ueber SQLite: jede Tabelle hat ein Trait in
//! [`repository`], implementiert von [`SqliteDb`]. Alle Schreibzugriffe,
//! die mehrere Zeilen betreffen, laufen in einer Transaktion.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{
    AbonentKeyRepository, DatabaseConfig, DbResult, IdentityRepository, MessageRepository,
    UserRepository,
};
pub use sqlite::SqliteDb;
