use crate::Database;
use crate::models::{FavoriteInsert, MessageRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

const MESSAGE_COLUMNS: &str = "m.id, m.content, m.created_at";

impl Database {
    // -- Messages --

    /// Insert a message and return the stored row with its assigned id and timestamp.
    pub fn insert_message(&self, content: &str) -> Result<MessageRow> {
        self.with_conn_mut(|conn| {
            conn.execute("INSERT INTO messages (content) VALUES (?1)", [content])?;
            let id = conn.last_insert_rowid();
            query_message(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Inserted message {} vanished", id))
        })
    }

    /// All messages, newest first.
    pub fn get_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages m ORDER BY m.created_at DESC, m.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// Delete a message together with its favorites in one transaction.
    /// Returns false when no message had that id.
    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM favorites WHERE message_id = ?1", [id])?;
            let removed = tx.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(removed > 0)
        })
    }

    // -- Favorites --

    /// Messages that have been favorited, in the order they were favorited.
    pub fn get_favorite_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM messages m
                 JOIN favorites f ON m.id = f.message_id
                 ORDER BY f.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_favorite(&self, message_id: i64) -> Result<FavoriteInsert> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let exists = tx
                .query_row("SELECT 1 FROM messages WHERE id = ?1", [message_id], |_| Ok(()))
                .optional()?
                .is_some();
            if !exists {
                return Ok(FavoriteInsert::MissingMessage);
            }

            let inserted = tx.execute(
                "INSERT INTO favorites (message_id) VALUES (?1)
                 ON CONFLICT(message_id) DO NOTHING",
                [message_id],
            )?;
            tx.commit()?;

            Ok(if inserted > 0 {
                FavoriteInsert::Added
            } else {
                FavoriteInsert::AlreadyFavorite
            })
        })
    }

    /// Remove the favorite for a message. Returns the number of rows removed,
    /// which is zero when the message was never favorited.
    pub fn delete_favorite(&self, message_id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM favorites WHERE message_id = ?1", [message_id])?;
            Ok(removed)
        })
    }
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages m WHERE m.id = ?1");
    let row = conn.query_row(&sql, [id], message_row).optional()?;
    Ok(row)
}

fn message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
    })
}
