//! Tauri command handlers — the boundary between the single-page frontend
//! and the session state. Every command is one interaction cycle: the API
//! configuration status is re-derived first, the event is applied, and the
//! frontend re-renders from the returned snapshot.

mod document;
mod settings;

pub use document::*;
pub use settings::*;

use crate::session::SessionState;
use std::sync::RwLock;

pub struct AppState {
    pub session: RwLock<SessionState>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            session: RwLock::new(SessionState::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
