use std::sync::Arc;

use anyhow::anyhow;
use chrono::NaiveDateTime;
use tracing::{error, info, warn};

use board_db::Database;
use board_db::models::{FavoriteInsert, MessageRow};
use board_gateway::topic::Topic;
use board_types::models::Message;

use crate::error::ApiError;

/// Read and write paths of the message board.
///
/// Every store call runs on the blocking pool; publishing a new message to
/// the topic is best-effort and never undoes the insert.
#[derive(Clone)]
pub struct Board {
    db: Arc<Database>,
    topic: Topic,
}

impl Board {
    pub fn new(db: Database, topic: Topic) -> Self {
        Self {
            db: Arc::new(db),
            topic,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    // -- Queries --

    /// All messages, newest first.
    pub async fn list_messages(&self) -> Result<Vec<Message>, ApiError> {
        let rows = self.blocking(|db| db.get_messages()).await?;
        rows.into_iter().map(to_message).collect()
    }

    /// Messages with a favorite, in the order they were favorited.
    pub async fn list_favorites(&self) -> Result<Vec<Message>, ApiError> {
        let rows = self.blocking(|db| db.get_favorite_messages()).await?;
        rows.into_iter().map(to_message).collect()
    }

    // -- Submissions --

    pub async fn create_message(&self, content: &str) -> Result<Message, ApiError> {
        if content.trim().is_empty() {
            return Err(ApiError::validation("Content cannot be empty"));
        }

        let content = content.to_string();
        let row = self.blocking(move |db| db.insert_message(&content)).await?;
        info!("Message {} created", row.id);

        if let Err(e) = self.topic.publish(&row.content).await {
            warn!("Failed to publish message {} to '{}': {}", row.id, self.topic.name(), e);
        }

        to_message(row)
    }

    pub async fn add_favorite(&self, raw_id: Option<&str>) -> Result<(), ApiError> {
        let id = parse_id(raw_id)?;

        match self.blocking(move |db| db.insert_favorite(id)).await? {
            FavoriteInsert::Added => {
                info!("Message {} added to favorites", id);
                Ok(())
            }
            FavoriteInsert::AlreadyFavorite => Ok(()),
            FavoriteInsert::MissingMessage => Err(ApiError::NotFound(format!(
                "No message found with ID {}",
                id
            ))),
        }
    }

    /// Idempotent: removing a favorite that does not exist succeeds.
    pub async fn remove_favorite(&self, raw_id: Option<&str>) -> Result<(), ApiError> {
        let id = parse_id(raw_id)?;
        let removed = self.blocking(move |db| db.delete_favorite(id)).await?;
        if removed > 0 {
            info!("Message {} removed from favorites", id);
        }
        Ok(())
    }

    /// Delete a message and every favorite pointing at it.
    pub async fn delete_message(&self, raw_id: Option<&str>) -> Result<(), ApiError> {
        let id = parse_id(raw_id)?;

        if !self.blocking(move |db| db.delete_message(id)).await? {
            return Err(ApiError::NotFound(format!("No message found with ID {}", id)));
        }

        info!("Message {} deleted", id);
        Ok(())
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Store(e.into())
            })?
            .map_err(ApiError::Store)
    }
}

/// Parse a message id taken from a query string or JSON body.
pub fn parse_id(raw: Option<&str>) -> Result<i64, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("ID parameter is required"))?;

    raw.parse::<i64>()
        .map_err(|_| ApiError::validation(format!("Invalid message ID '{}'", raw)))
}

fn to_message(row: MessageRow) -> Result<Message, ApiError> {
    // SQLite stores "YYYY-MM-DD HH:MM:SS.SSS" without a timezone; it is UTC.
    let created_at = NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| {
            ApiError::Store(anyhow!(
                "Corrupt created_at '{}' on message {}: {}",
                row.created_at,
                row.id,
                e
            ))
        })?
        .and_utc();

    Ok(Message {
        id: row.id,
        content: row.content,
        created_at,
    })
}
