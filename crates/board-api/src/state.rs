use std::sync::Arc;
use std::time::Duration;

use crate::board::Board;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub board: Board,
    /// Ping interval for `/notifications` connections.
    pub keepalive: Duration,
}
