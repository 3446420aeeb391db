//! SQLite-Implementierung des IdentityRepository

use chrono::Utc;

use crate::error::DbError;
use crate::models::IdentitaetRecord;
use crate::repository::{DbResult, IdentityRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{parse_timestamp, zeitstempel};

impl IdentityRepository for SqliteDb {
    async fn identitaet_laden(&self) -> DbResult<Option<IdentitaetRecord>> {
        use sqlx::Row as _;

        let row =
            sqlx::query("SELECT private_key, public_key, created_at FROM identity WHERE id = 1")
                .fetch_optional(&self.pool)
            .await?;

        row.map(|r| -> DbResult<IdentitaetRecord> {
            Ok(IdentitaetRecord {
                private_key: r.try_get("private_key")?,
                public_key: r.try_get("public_key")?,
                created_at: parse_timestamp(r.try_get("created_at")?)?,
            })
        })
        .transpose()
    }

    async fn identitaet_speichern(
        &self,
        private_key: &str,
        public_key: &str,
    ) -> DbResult<IdentitaetRecord> {
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO identity (id, private_key, public_key, created_at) VALUES (1, ?, ?, ?)",
        )
        .bind(private_key)
        .bind(public_key)
        .bind(zeitstempel(now))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE") || msg.contains("unique") {
                DbError::Eindeutigkeit("Identitaet existiert bereits".into())
            } else {
                DbError::Sqlx(e)
            }
        })?;

        Ok(IdentitaetRecord {
            private_key: private_key.to_string(),
            public_key: public_key.to_string(),
            created_at: now,
        })
    }
}
