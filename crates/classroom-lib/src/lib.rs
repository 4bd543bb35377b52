// ============================
// crates/classroom-lib/src/lib.rs
// ============================
//! Core logic for the `CollabCode` classroom: a same-process collaborative
//! code-editing surface where teacher and student contexts share a buffer,
//! cursors, a lock flag and console output over a local broadcast relay.

pub mod config;
pub mod context;
pub mod editor;
pub mod error;
pub mod relay;
pub mod room;
pub mod runner;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use classroom_common::{Participant, Role, CURSOR_COLORS};
use rand::Rng;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::Settings;
use crate::context::{spawn_context, ContextHandle, UiEvent};
use crate::editor::TextBuffer;
use crate::error::AppError;
use crate::relay::RelayChannel;
use crate::runner::MiniScript;
use crate::session::Session;

/// Entry point for the hosting process: the defined creation point for
/// sessions. Rooms need no teardown; a context ends when its handle and
/// event stream are dropped.
pub struct ClassroomApp {
    settings: Arc<Settings>,
}

impl ClassroomApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Create a fresh room and its first context. The creator takes color
    /// index 0.
    pub fn create_room(
        &self,
        username: &str,
        role: Role,
    ) -> (ContextHandle, mpsc::UnboundedReceiver<UiEvent>) {
        let room_id = room::generate_id(room::ROOM_ID_LEN);
        info!(%room_id, "classroom created");
        self.open_context(room_id, username, role, 0)
    }

    /// Join an existing room by class code (trimmed, case-insensitive).
    /// Joiners get a random color.
    pub fn join_room(
        &self,
        code: &str,
        username: &str,
        role: Role,
    ) -> Result<(ContextHandle, mpsc::UnboundedReceiver<UiEvent>), AppError> {
        let room_id = room::normalize_room_code(code)?;
        let color_index = rand::rng().random_range(0..CURSOR_COLORS.len());
        info!(%room_id, "joining classroom");
        Ok(self.open_context(room_id, username, role, color_index))
    }

    fn open_context(
        &self,
        room_id: String,
        username: &str,
        role: Role,
        color_index: usize,
    ) -> (ContextHandle, mpsc::UnboundedReceiver<UiEvent>) {
        let username = if username.trim().is_empty() {
            "Anonymous".to_string()
        } else {
            username.trim().to_string()
        };
        let local = Participant {
            user_id: room::generate_id(room::USER_ID_LEN),
            username,
            role,
            color_index,
        };
        info!(user_id = %local.user_id, ?role, %room_id, "context opened");
        let scope = room::channel_scope(&self.settings.channel_prefix, &room_id);
        let relay = RelayChannel::open(&scope, self.settings.relay_capacity);
        let session = Session::new(room_id, local);
        spawn_context(
            session,
            Box::new(TextBuffer::new(&self.settings.default_code)),
            Arc::new(MiniScript),
            relay,
            Duration::from_millis(self.settings.debounce_ms),
        )
    }
}
