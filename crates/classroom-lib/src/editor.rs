// ============================
// crates/classroom-lib/src/editor.rs
// ============================
//! Seam to the embedded editor widget.
//!
//! The real editing surface (rendering, highlighting, undo) lives outside
//! this crate; contexts drive it through [`EditorSurface`]. [`TextBuffer`]
//! is the in-memory implementation used by tests and the demo binary.
use classroom_common::CursorPosition;

pub trait EditorSurface: Send {
    fn content(&self) -> String;
    /// Programmatic replacement of the whole buffer. Not gated by the
    /// read-only flag, which only blocks user keystrokes in the widget.
    fn set_content(&mut self, text: &str);
    fn cursor(&self) -> CursorPosition;
    /// Restore a cursor coordinate as-is. The coordinate may point past the
    /// current content's bounds; implementations must tolerate that.
    fn set_cursor(&mut self, position: CursorPosition);
    fn set_read_only(&mut self, read_only: bool);
    fn is_read_only(&self) -> bool;
    /// Recenter the view on a position (cursor-follow).
    fn reveal(&mut self, position: CursorPosition);
}

/// Plain in-memory editor stand-in.
#[derive(Debug, Default)]
pub struct TextBuffer {
    content: String,
    cursor: CursorPosition,
    read_only: bool,
    last_revealed: Option<CursorPosition>,
}

impl TextBuffer {
    pub fn new(initial: &str) -> Self {
        Self {
            content: initial.to_string(),
            ..Self::default()
        }
    }

    pub fn last_revealed(&self) -> Option<CursorPosition> {
        self.last_revealed
    }
}

impl EditorSurface for TextBuffer {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn set_content(&mut self, text: &str) {
        self.content = text.to_string();
    }

    fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    fn set_cursor(&mut self, position: CursorPosition) {
        // Deliberately unclamped; see trait docs.
        self.cursor = position;
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn reveal(&mut self, position: CursorPosition) {
        self.last_revealed = Some(position);
    }
}
