//! SQLite-Implementierung des MessageRepository

use chrono::Utc;
use sqlx::Row as _;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NachrichtRecord, NachrichtenTyp, NeueNachricht};
use crate::repository::{DbResult, MessageRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{parse_timestamp, parse_uuid, zeitstempel};

const SPALTEN: &str = "id, sender_id, sender_name, chat_id, chat_name, owner_id, owner_name,
                       message_type, message, file_data, file_name, iv, created_at, unread";

impl MessageRepository for SqliteDb {
    async fn nachricht_erstellen(&self, data: NeueNachricht<'_>) -> DbResult<NachrichtRecord> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO messages
             (id, sender_id, sender_name, chat_id, chat_name, owner_id, owner_name,
              message_type, message, file_data, file_name, iv, created_at, unread)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.sender_id.to_string())
        .bind(data.sender_name)
        .bind(data.chat_id.to_string())
        .bind(data.chat_name)
        .bind(data.owner_id.to_string())
        .bind(data.owner_name)
        .bind(data.message_type.als_str())
        .bind(data.message)
        .bind(data.file_data)
        .bind(data.file_name)
        .bind(data.iv)
        .bind(zeitstempel(now))
        .bind(data.unread as i64)
        .execute(&self.pool)
        .await?;

        Ok(NachrichtRecord {
            id,
            sender_id: data.sender_id,
            sender_name: data.sender_name.to_string(),
            chat_id: data.chat_id,
            chat_name: data.chat_name.to_string(),
            owner_id: data.owner_id,
            owner_name: data.owner_name.to_string(),
            message_type: data.message_type,
            message: data.message.map(str::to_string),
            file_data: data.file_data.map(str::to_string),
            file_name: data.file_name.map(str::to_string),
            iv: data.iv.to_string(),
            created_at: now,
            unread: data.unread,
        })
    }

    async fn nachricht_laden(&self, id: Uuid) -> DbResult<Option<NachrichtRecord>> {
        let row = sqlx::query(&format!("SELECT {SPALTEN} FROM messages WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_nachricht(&r)).transpose()
    }

    async fn nachricht_loeschen(&self, id: Uuid) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn chat_verlauf(
        &self,
        chat_name: &str,
        owner_id: Uuid,
    ) -> DbResult<Vec<NachrichtRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM messages
             WHERE chat_name = ? AND owner_id = ?
             ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(chat_name)
        .bind(owner_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_nachricht).collect()
    }

    async fn chat_gelesen(&self, chat_name: &str, owner_id: Uuid) -> DbResult<u64> {
        let affected = sqlx::query(
            "UPDATE messages SET unread = 0 WHERE chat_name = ? AND owner_id = ? AND unread = 1",
        )
        .bind(chat_name)
        .bind(owner_id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected)
    }

    async fn dateien(&self, owner_id: Uuid) -> DbResult<Vec<NachrichtRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SPALTEN} FROM messages
             WHERE owner_id = ? AND message_type = ?
             ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(owner_id.to_string())
        .bind(NachrichtenTyp::File.als_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_nachricht).collect()
    }
}

pub(crate) fn row_to_nachricht(row: &sqlx::sqlite::SqliteRow) -> DbResult<NachrichtRecord> {
    let id_str: String = row.try_get("id")?;
    let sender_str: String = row.try_get("sender_id")?;
    let chat_str: String = row.try_get("chat_id")?;
    let owner_str: String = row.try_get("owner_id")?;

    let typ_str: String = row.try_get("message_type")?;
    let message_type = typ_str.parse::<NachrichtenTyp>().map_err(DbError::intern)?;

    let unread: i64 = row.try_get("unread")?;

    Ok(NachrichtRecord {
        id: parse_uuid("Nachrichten", &id_str)?,
        sender_id: parse_uuid("sender_id", &sender_str)?,
        sender_name: row.try_get("sender_name")?,
        chat_id: parse_uuid("chat_id", &chat_str)?,
        chat_name: row.try_get("chat_name")?,
        owner_id: parse_uuid("owner_id", &owner_str)?,
        owner_name: row.try_get("owner_name")?,
        message_type,
        message: row.try_get("message")?,
        file_data: row.try_get("file_data")?,
        file_name: row.try_get("file_name")?,
        iv: row.try_get("iv")?,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
        unread: unread != 0,
    })
}
