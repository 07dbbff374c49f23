use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A posted message as shown on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
