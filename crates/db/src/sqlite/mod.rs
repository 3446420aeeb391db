//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod abonent_keys;
pub mod identity;
pub mod messages;
pub mod pool;
pub mod users;

pub use pool::SqliteDb;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::DbError;
use crate::repository::DbResult;

/// Zeitstempel im Speicherformat (RFC 3339, Mikrosekunden, sortierbar)
pub(crate) fn zeitstempel(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(s: String) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltige Zeitangabe '{s}': {e}")))
}

pub(crate) fn parse_uuid(feld: &str, s: &str) -> DbResult<uuid::Uuid> {
    uuid::Uuid::parse_str(s)
        .map_err(|e| DbError::intern(format!("Ungueltige {feld} UUID '{s}': {e}")))
}
