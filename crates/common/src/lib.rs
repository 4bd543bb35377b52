// ================
// crates/common/src/lib.rs
// ================
//! Common types shared by every classroom context.
//! This module defines the relay protocol messages and supporting types
//! exchanged between same-room contexts over the local broadcast relay.

use serde::{Deserialize, Serialize};

/// Opaque per-context participant identifier
pub type UserId = String;

/// Role a participant plays in the classroom
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn is_teacher(self) -> bool {
        matches!(self, Role::Teacher)
    }
}

/// A cursor coordinate inside the shared buffer.
/// Line and column are 1-based, matching the embedded editor's convention.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub line: u32,
    pub column: u32,
}

impl Default for CursorPosition {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

/// One participant as seen by a local context
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub color_index: usize,
}

/// Messages carried over the room relay channel.
///
/// The wire shape is `{"type": "<kebab-case tag>", ...camelCase fields}`;
/// every variant carries only the fields its handler reads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum RelayMessage {
    /// A participant announces itself to the room
    UserJoin {
        user_id: UserId,
        username: String,
        role: Role,
        color_index: usize,
    },
    /// Debounced full-buffer replacement from one participant
    CodeChange { user_id: UserId, content: String },
    /// Immediate cursor position report from a teaching teacher
    CursorMove {
        user_id: UserId,
        username: String,
        position: CursorPosition,
        color_index: usize,
    },
    /// The teacher has started the lesson
    ClassStart { user_id: UserId },
    /// Buffer lock toggled; applies to every context in the room
    CodeLock { locked: bool, user_id: UserId },
    /// Captured execution output, broadcast by the teacher
    RunCode { output: String },
}

/// Palette used to color participant avatars and remote cursors
pub const CURSOR_COLORS: [&str; 8] = [
    "#ff6b6b", "#4ecdc4", "#ffe66d", "#95e1d3", "#dda0dd", "#87ceeb", "#f0e68c", "#deb887",
];

/// Pick a display color for a participant; indexes wrap around the palette.
pub fn cursor_color(color_index: usize) -> &'static str {
    CURSOR_COLORS[color_index % CURSOR_COLORS.len()]
}
