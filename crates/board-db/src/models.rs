//! Database row types. These map directly to SQLite rows and are kept
//! separate from board-types so the store layer stays independent.

pub struct MessageRow {
    pub id: i64,
    pub content: String,
    pub created_at: String,
}

/// Result of marking a message as a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteInsert {
    Added,
    AlreadyFavorite,
    MissingMessage,
}
