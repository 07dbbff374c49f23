pub mod board;
pub mod error;
pub mod favorites;
pub mod messages;
pub mod notifications;
pub mod render;
pub mod router;
pub mod state;
