// ============================
// crates/classroom-lib/src/context.rs
// ============================
//! Per-participant context actor.
//!
//! Each browser-tab equivalent is one [`ClassContext`] driven by a tokio
//! task: local UI actions arrive as commands, peer messages arrive from the
//! room relay, and a single `select!` loop runs every handler to completion.
//! UI-facing effects (toasts, roster counts, output) leave on an event
//! stream instead of touching a DOM.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use classroom_common::{CursorPosition, Participant, Role, UserId};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

use crate::editor::EditorSurface;
use crate::error::AppError;
use crate::relay::{RelayChannel, RelayReceiver};
use crate::runner::{run_capture, Evaluator};
use crate::session::Session;
use classroom_common::RelayMessage;

/// Message sent *into* the context actor
#[derive(Debug)]
pub enum ContextCmd {
    /// The local user changed the buffer content
    Edit { content: String },
    /// The local cursor moved
    CursorMoved { position: CursorPosition },
    /// Teacher action: start the lesson
    StartClass,
    /// Teacher action: toggle the shared buffer lock
    ToggleLock,
    /// Follow/unfollow a participant's cursor
    ToggleFollow { user_id: UserId },
    /// Run the buffer and reply with the formatted output
    RunCode {
        resp_tx: mpsc::UnboundedSender<String>,
    },
    /// Reply with a snapshot of the context state
    Snapshot {
        resp_tx: mpsc::UnboundedSender<ContextSnapshot>,
    },
}

/// UI-facing effect emitted by a context; the seam where a front end would
/// render toasts, counters and cursors.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Toast { message: String, kind: ToastKind },
    RosterChanged { participants: usize, students: usize },
    RemoteCursorMoved { user_id: UserId, position: CursorPosition },
    OutputShown(String),
    LockChanged(bool),
    TeachingChanged(bool),
    FollowChanged(Option<UserId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// Last known cursor of one remote participant, created lazily on first
/// sighting.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCursor {
    pub username: String,
    pub color_index: usize,
    pub position: CursorPosition,
}

/// Point-in-time copy of a context's observable state.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    pub room_id: String,
    pub user_id: UserId,
    pub role: Role,
    pub content: String,
    pub cursor: CursorPosition,
    pub roster: Vec<Participant>,
    pub students: usize,
    pub following: Option<UserId>,
    pub is_teaching: bool,
    pub code_locked: bool,
    pub last_output: Option<String>,
    pub remote_cursors: HashMap<UserId, RemoteCursor>,
}

/// Handle that the embedding UI keeps; methods post commands to the actor.
#[derive(Clone)]
pub struct ContextHandle {
    pub room_id: String,
    pub user_id: UserId,
    cmd_tx: mpsc::UnboundedSender<ContextCmd>,
}

impl ContextHandle {
    pub fn edit(&self, content: impl Into<String>) -> Result<(), AppError> {
        self.cmd_tx.send(ContextCmd::Edit {
            content: content.into(),
        })?;
        Ok(())
    }

    pub fn cursor_moved(&self, position: CursorPosition) -> Result<(), AppError> {
        self.cmd_tx.send(ContextCmd::CursorMoved { position })?;
        Ok(())
    }

    pub fn start_class(&self) -> Result<(), AppError> {
        self.cmd_tx.send(ContextCmd::StartClass)?;
        Ok(())
    }

    pub fn toggle_lock(&self) -> Result<(), AppError> {
        self.cmd_tx.send(ContextCmd::ToggleLock)?;
        Ok(())
    }

    pub fn toggle_follow(&self, user_id: impl Into<UserId>) -> Result<(), AppError> {
        self.cmd_tx.send(ContextCmd::ToggleFollow {
            user_id: user_id.into(),
        })?;
        Ok(())
    }

    pub async fn run_code(&self) -> Result<String, AppError> {
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        self.cmd_tx.send(ContextCmd::RunCode { resp_tx })?;
        resp_rx
            .recv()
            .await
            .ok_or_else(|| AppError::ContextClosed("Failed to receive response".to_string()))
    }

    pub async fn snapshot(&self) -> Result<ContextSnapshot, AppError> {
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        self.cmd_tx.send(ContextCmd::Snapshot { resp_tx })?;
        resp_rx
            .recv()
            .await
            .ok_or_else(|| AppError::ContextClosed("Failed to receive response".to_string()))
    }
}

pub struct ClassContext {
    session: Session,
    is_teaching: bool,
    code_locked: bool,
    editor: Box<dyn EditorSurface>,
    evaluator: Arc<dyn Evaluator>,
    remote_cursors: HashMap<UserId, RemoteCursor>,
    last_output: Option<String>,
    relay: RelayChannel,
    events: mpsc::UnboundedSender<UiEvent>,
    debounce: Duration,
    pending_edit: Option<String>,
    debounce_deadline: Option<Instant>,
}

impl ClassContext {
    pub fn new(
        session: Session,
        editor: Box<dyn EditorSurface>,
        evaluator: Arc<dyn Evaluator>,
        relay: RelayChannel,
        debounce: Duration,
        events: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        Self {
            session,
            is_teaching: false,
            code_locked: false,
            editor,
            evaluator,
            remote_cursors: HashMap::new(),
            last_output: None,
            relay,
            events,
            debounce,
            pending_edit: None,
            debounce_deadline: None,
        }
    }

    pub async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<ContextCmd>,
        mut relay_rx: RelayReceiver,
    ) {
        self.announce();
        let mut relay_open = self.relay.is_connected();
        loop {
            let flush_at = self.debounce_deadline;
            tokio::select! {
                maybe_cmd = cmd_rx.recv() => match maybe_cmd {
                    Some(cmd) => self.handle_cmd(cmd),
                    None => break,
                },
                inbound = relay_rx.recv(), if relay_open => match inbound {
                    Some(msg) => self.route(msg),
                    None => relay_open = false,
                },
                () = sleep_until(flush_at.unwrap_or_else(Instant::now)), if flush_at.is_some() => {
                    self.flush_pending_edit();
                },
            }
        }
        debug!(user_id = %self.session.local.user_id, "context closed");
    }

    /// First thing on the wire: tell the room who we are.
    fn announce(&self) {
        let local = &self.session.local;
        self.relay.send(RelayMessage::UserJoin {
            user_id: local.user_id.clone(),
            username: local.username.clone(),
            role: local.role,
            color_index: local.color_index,
        });
    }

    fn handle_cmd(&mut self, cmd: ContextCmd) {
        match cmd {
            ContextCmd::Edit { content } => self.local_edit(content),
            ContextCmd::CursorMoved { position } => self.local_cursor_moved(position),
            ContextCmd::StartClass => self.start_class(),
            ContextCmd::ToggleLock => self.toggle_lock(),
            ContextCmd::ToggleFollow { user_id } => self.toggle_follow(&user_id),
            ContextCmd::RunCode { resp_tx } => {
                let output = self.run_code();
                let _ = resp_tx.send(output);
            },
            ContextCmd::Snapshot { resp_tx } => {
                let _ = resp_tx.send(self.snapshot());
            },
        }
    }

    /// Route one inbound relay message to its handler. Dispatch is a pure
    /// lookup by tag; every variant has exactly one handler.
    fn route(&mut self, msg: RelayMessage) {
        match msg {
            RelayMessage::UserJoin {
                user_id,
                username,
                role,
                color_index,
            } => self.on_user_join(Participant {
                user_id,
                username,
                role,
                color_index,
            }),
            RelayMessage::CodeChange { user_id, content } => {
                // A teacher holding the lock keeps its own buffer frozen too.
                if self.session.local.role == Role::Student || !self.code_locked {
                    self.on_remote_change(&user_id, content);
                }
            },
            RelayMessage::CursorMove {
                user_id,
                username,
                position,
                color_index,
            } => self.on_cursor_move(&user_id, username, position, color_index),
            RelayMessage::ClassStart { user_id } => self.on_class_start(&user_id),
            RelayMessage::CodeLock { locked, user_id } => self.on_code_lock(locked, &user_id),
            RelayMessage::RunCode { output } => self.on_run_output(output),
        }
    }

    // ---- local UI actions ----

    /// Apply a local buffer change and arm the debounced emission. While the
    /// teacher's lock is set, a student context never emits, whatever the
    /// edit sequence.
    fn local_edit(&mut self, content: String) {
        self.editor.set_content(&content);
        if self.session.local.role == Role::Student && self.code_locked {
            return;
        }
        self.pending_edit = Some(content);
        self.debounce_deadline = Some(Instant::now() + self.debounce);
    }

    /// Emit the most recent edit of the quiescence window; intermediate
    /// states within the window were dropped, not queued.
    fn flush_pending_edit(&mut self) {
        self.debounce_deadline = None;
        if let Some(content) = self.pending_edit.take() {
            trace!(len = content.len(), "emitting debounced code change");
            self.relay.send(RelayMessage::CodeChange {
                user_id: self.session.local.user_id.clone(),
                content,
            });
        }
    }

    /// Cursor moves are broadcast immediately, but only while a teacher is
    /// actively teaching.
    fn local_cursor_moved(&mut self, position: CursorPosition) {
        self.editor.set_cursor(position);
        if self.session.local.role.is_teacher() && self.is_teaching {
            let local = &self.session.local;
            self.relay.send(RelayMessage::CursorMove {
                user_id: local.user_id.clone(),
                username: local.username.clone(),
                position,
                color_index: local.color_index,
            });
        }
    }

    fn start_class(&mut self) {
        self.is_teaching = true;
        self.emit(UiEvent::TeachingChanged(true));
        self.toast("Class started!", ToastKind::Success);
        self.relay.send(RelayMessage::ClassStart {
            user_id: self.session.local.user_id.clone(),
        });
    }

    /// Flip the lock locally and tell the room. Not role-gated: the UI only
    /// offers the control to teachers, the logic trusts its caller.
    fn toggle_lock(&mut self) {
        let locked = !self.code_locked;
        let user_id = self.session.local.user_id.clone();
        self.on_code_lock(locked, &user_id);
        self.relay.send(RelayMessage::CodeLock { locked, user_id });
        self.toast(
            if locked { "Code locked" } else { "Code unlocked" },
            ToastKind::Info,
        );
    }

    fn toggle_follow(&mut self, user_id: &str) {
        let target = self.session.toggle_follow(user_id).cloned();
        match &target {
            Some(id) => {
                let name = self
                    .session
                    .roster
                    .get(id)
                    .map(|p| p.username.clone())
                    .unwrap_or_else(|| id.clone());
                self.toast(format!("Following {name}"), ToastKind::Info);
            },
            None => self.toast("Unfollowed student", ToastKind::Info),
        }
        self.emit(UiEvent::FollowChanged(target));
    }

    /// Evaluate the buffer, record the output locally, and share it with the
    /// room when a teacher runs it. Peers only display; they never execute.
    fn run_code(&mut self) -> String {
        let output = run_capture(self.evaluator.as_ref(), &self.editor.content());
        self.last_output = Some(output.clone());
        self.emit(UiEvent::OutputShown(output.clone()));
        if self.session.local.role.is_teacher() {
            self.relay.send(RelayMessage::RunCode {
                output: output.clone(),
            });
        }
        output
    }

    // ---- inbound relay handlers ----

    fn on_user_join(&mut self, participant: Participant) {
        let username = participant.username.clone();
        if !self.session.roster.insert(participant) {
            return;
        }
        // Late joiners only hear announcements made after they subscribed, so
        // answer a first sighting with our own announcement. Rosters are
        // idempotent, which bounds the echo to one round.
        self.announce();
        self.emit(UiEvent::RosterChanged {
            participants: self.session.roster.len(),
            students: self.session.roster.student_count(),
        });
        if self.session.local.role.is_teacher() {
            self.toast(format!("{username} joined the class"), ToastKind::Success);
        }
    }

    /// Wholesale buffer replacement from a peer, own echoes ignored. The
    /// previous cursor coordinate is restored as-is even when it now points
    /// past the new content.
    fn on_remote_change(&mut self, sender_id: &str, content: String) {
        if self.session.is_local(sender_id) {
            return;
        }
        let position = self.editor.cursor();
        self.editor.set_content(&content);
        self.editor.set_cursor(position);
    }

    fn on_cursor_move(
        &mut self,
        sender_id: &str,
        username: String,
        position: CursorPosition,
        color_index: usize,
    ) {
        if self.session.is_local(sender_id) {
            return;
        }
        self.remote_cursors
            .entry(sender_id.to_string())
            .and_modify(|cursor| cursor.position = position)
            .or_insert(RemoteCursor {
                username,
                color_index,
                position,
            });
        self.emit(UiEvent::RemoteCursorMoved {
            user_id: sender_id.to_string(),
            position,
        });
        if self.session.following.as_deref() == Some(sender_id) {
            self.editor.reveal(position);
            self.editor.set_cursor(position);
        }
    }

    fn on_class_start(&mut self, _sender_id: &str) {
        if self.session.local.role == Role::Student {
            self.toast("Class has started!", ToastKind::Success);
        }
        self.is_teaching = true;
        self.emit(UiEvent::TeachingChanged(true));
    }

    /// Applied regardless of the claimed sender's role; peers are trusted.
    fn on_code_lock(&mut self, locked: bool, _sender_id: &str) {
        self.code_locked = locked;
        self.editor.set_read_only(locked);
        self.emit(UiEvent::LockChanged(locked));
    }

    fn on_run_output(&mut self, output: String) {
        self.last_output = Some(output.clone());
        self.emit(UiEvent::OutputShown(output));
    }

    // ---- plumbing ----

    fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            room_id: self.session.room_id.clone(),
            user_id: self.session.local.user_id.clone(),
            role: self.session.local.role,
            content: self.editor.content(),
            cursor: self.editor.cursor(),
            roster: self.session.roster.iter().cloned().collect(),
            students: self.session.roster.student_count(),
            following: self.session.following.clone(),
            is_teaching: self.is_teaching,
            code_locked: self.code_locked,
            last_output: self.last_output.clone(),
            remote_cursors: self.remote_cursors.clone(),
        }
    }

    fn toast(&self, message: impl Into<String>, kind: ToastKind) {
        self.emit(UiEvent::Toast {
            message: message.into(),
            kind,
        });
    }

    fn emit(&self, event: UiEvent) {
        // Nobody listening is fine; events are presentation-only.
        let _ = self.events.send(event);
    }
}

/// Spawn a context actor and return its handle plus the UI event stream.
pub fn spawn_context(
    session: Session,
    editor: Box<dyn EditorSurface>,
    evaluator: Arc<dyn Evaluator>,
    relay: RelayChannel,
    debounce: Duration,
) -> (ContextHandle, mpsc::UnboundedReceiver<UiEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let room_id = session.room_id.clone();
    let user_id = session.local.user_id.clone();
    let relay_rx = relay.subscribe();
    let ctx = ClassContext::new(session, editor, evaluator, relay, debounce, event_tx);
    tokio::spawn(ctx.run(cmd_rx, relay_rx));
    (
        ContextHandle {
            room_id,
            user_id,
            cmd_tx,
        },
        event_rx,
    )
}
