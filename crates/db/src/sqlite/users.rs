//! SQLite-Implementierung des UserRepository

use sqlx::Row as _;
use uuid::Uuid;

use crate::models::{BenutzerRecord, NeuerBenutzer};
use crate::repository::{DbResult, UserRepository};
use crate::sqlite::parse_uuid;
use crate::sqlite::pool::SqliteDb;

const SPALTEN: &str = "id, username, domains, online, has_new_message";

impl UserRepository for SqliteDb {
    async fn benutzer_synchronisieren(
        &self,
        benutzer: &[NeuerBenutzer<'_>],
    ) -> DbResult<Vec<BenutzerRecord>> {
        let mut tx = self.pool.begin().await?;
        let mut ergebnis = Vec::with_capacity(benutzer.len());

        for b in benutzer {
            let domains_json = serde_json::to_string(b.domains)?;

            sqlx::query(
                "INSERT INTO users (id, username, domains, online, has_new_message)
                 VALUES (?, ?, ?, ?, 0)
                 ON CONFLICT(username) DO UPDATE SET
                    domains = excluded.domains,
                    online = excluded.online",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(b.username)
            .bind(&domains_json)
            .bind(b.online as i64)
            .execute(&mut *tx)
            .await?;

            let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE username = ?"))
                .bind(b.username)
                .fetch_one(&mut *tx)
                .await?;
            ergebnis.push(row_to_benutzer(&row)?);
        }

        tx.commit().await?;
        Ok(ergebnis)
    }

    async fn benutzer_nach_name(&self, username: &str) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn benutzer_nach_id(&self, id: Uuid) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM users WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn alle_benutzer(&self) -> DbResult<Vec<BenutzerRecord>> {
        let rows = sqlx::query(&format!("SELECT {SPALTEN} FROM users ORDER BY username ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_benutzer).collect()
    }

    async fn neue_nachricht_setzen(&self, username: &str, wert: bool) -> DbResult<bool> {
        let affected = sqlx::query("UPDATE users SET has_new_message = ? WHERE username = ?")
            .bind(wert as i64)
            .bind(username)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}

pub(crate) fn row_to_benutzer(row: &sqlx::sqlite::SqliteRow) -> DbResult<BenutzerRecord> {
    let id_str: String = row.try_get("id")?;
    let domains_json: String = row.try_get("domains")?;
    let online: i64 = row.try_get("online")?;
    let has_new_message: i64 = row.try_get("has_new_message")?;

    Ok(BenutzerRecord {
        id: parse_uuid("Benutzer", &id_str)?,
        username: row.try_get("username")?,
        domains: serde_json::from_str(&domains_json)?,
        online: online != 0,
        has_new_message: has_new_message != 0,
    })
}
