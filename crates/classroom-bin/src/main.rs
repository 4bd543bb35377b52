// ============================
// crates/classroom-bin/src/main.rs
// ============================
//! Scripted demo: a teacher and a student context in one process, talking
//! over the local relay like two tabs of the same browser would.
use std::time::Duration;

use anyhow::Result;
use classroom_common::{CursorPosition, Role};
use classroom_lib::config::Settings;
use classroom_lib::context::UiEvent;
use classroom_lib::room::share_url;
use classroom_lib::ClassroomApp;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().unwrap_or_else(|_| Settings::default());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone())),
        )
        .init();

    let debounce = Duration::from_millis(settings.debounce_ms);
    let app = ClassroomApp::new(settings);

    let (teacher, teacher_events) = app.create_room("Ada", Role::Teacher);
    info!(
        room_id = %teacher.room_id,
        link = %share_url("https://classroom.local/app", &teacher.room_id),
        "share this class link"
    );
    watch_events("teacher", teacher_events);

    let (student, student_events) = app.join_room(&teacher.room_id, "Sam", Role::Student)?;
    watch_events("student", student_events);

    // Give the join announcements a beat to cross the relay.
    tokio::time::sleep(debounce).await;

    teacher.start_class()?;
    teacher.cursor_moved(CursorPosition { line: 1, column: 1 })?;
    teacher.edit(
        "console.log(\"Welcome, class!\");\nconsole.log(\"Today: functions\");\n",
    )?;

    // Wait out the debounce window so the edit reaches the student.
    tokio::time::sleep(debounce * 3).await;

    let output = teacher.run_code().await?;
    info!(%output, "teacher ran the buffer");

    tokio::time::sleep(debounce).await;

    let student_view = student.snapshot().await?;
    info!(
        roster = student_view.roster.len(),
        students = student_view.students,
        output = student_view.last_output.as_deref().unwrap_or(""),
        "student view after the lesson"
    );
    println!("--- student buffer ---\n{}", student_view.content);
    println!(
        "--- student output ---\n{}",
        student_view.last_output.unwrap_or_default()
    );

    Ok(())
}

fn watch_events(who: &'static str, mut events: mpsc::UnboundedReceiver<UiEvent>) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                UiEvent::Toast { message, .. } => info!(who, %message, "toast"),
                UiEvent::RosterChanged {
                    participants,
                    students,
                } => info!(who, participants, students, "roster changed"),
                UiEvent::OutputShown(output) => info!(who, %output, "output shown"),
                UiEvent::LockChanged(locked) => info!(who, locked, "lock changed"),
                UiEvent::TeachingChanged(teaching) => info!(who, teaching, "teaching"),
                UiEvent::RemoteCursorMoved { user_id, position } => {
                    info!(who, %user_id, line = position.line, column = position.column, "remote cursor")
                },
                UiEvent::FollowChanged(target) => {
                    info!(who, target = target.as_deref().unwrap_or("-"), "follow changed")
                },
            }
        }
    });
}
