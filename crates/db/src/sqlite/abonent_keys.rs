//! SQLite-Implementierung des AbonentKeyRepository

use chrono::Utc;
use sqlx::Row as _;

use crate::models::{AbonentSchluesselRecord, NeuerAbonentSchluessel};
use crate::repository::{AbonentKeyRepository, DbResult};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{parse_timestamp, parse_uuid, zeitstempel};

const SPALTEN: &str = "id, abonent_id, abonent_name, abonent_public_key, shared_key, created_at, updated_at";

impl AbonentKeyRepository for SqliteDb {
    async fn schluessel_speichern(
        &self,
        data: NeuerAbonentSchluessel<'_>,
    ) -> DbResult<AbonentSchluesselRecord> {
        let now_str = zeitstempel(Utc::now());
        let mut tx = self.pool.begin().await?;

        // Verweis auf den Benutzer-Cache, sofern der Abonent bekannt ist
        let abonent_id: Option<String> =
            sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
                .bind(data.abonent_name)
                .fetch_optional(&mut *tx)
                .await?;

        // Ueberschreiben statt Zusammenfuehren: created_at bleibt, alles andere wird ersetzt
        sqlx::query(
            "INSERT INTO abonent_keys
             (abonent_id, abonent_name, abonent_public_key, shared_key, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(abonent_name) DO UPDATE SET
                abonent_id = excluded.abonent_id,
                abonent_public_key = excluded.abonent_public_key,
                shared_key = excluded.shared_key,
                updated_at = excluded.updated_at",
        )
        .bind(&abonent_id)
        .bind(data.abonent_name)
        .bind(data.abonent_public_key)
        .bind(data.shared_key)
        .bind(&now_str)
        .bind(&now_str)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM abonent_keys WHERE abonent_name = ?"
        ))
        .bind(data.abonent_name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row_to_schluessel(&row)
    }

    async fn schluessel_laden(
        &self,
        abonent_name: &str,
    ) -> DbResult<Option<AbonentSchluesselRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM abonent_keys WHERE abonent_name = ?"
        ))
        .bind(abonent_name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_schluessel(&r)).transpose()
    }
}

fn row_to_schluessel(row: &sqlx::sqlite::SqliteRow) -> DbResult<AbonentSchluesselRecord> {
    let abonent_id: Option<String> = row.try_get("abonent_id")?;
    let abonent_id = abonent_id
        .as_deref()
        .map(|s| parse_uuid("abonent_id", s))
        .transpose()?;

    Ok(AbonentSchluesselRecord {
        id: row.try_get("id")?,
        abonent_id,
        abonent_name: row.try_get("abonent_name")?,
        abonent_public_key: row.try_get("abonent_public_key")?,
        shared_key: row.try_get("shared_key")?,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
        updated_at: parse_timestamp(row.try_get("updated_at")?)?,
    })
}
