// ============================
// crates/classroom-lib/src/room.rs
// ============================
//! Room codes, identifiers and shareable links.
use crate::error::AppError;
use rand::Rng;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub const ROOM_ID_LEN: usize = 8;
pub const USER_ID_LEN: usize = 6;
/// Shorter codes are rejected before a join is attempted.
pub const MIN_ROOM_CODE_LEN: usize = 4;

/// Random lowercase-alphanumeric token.
pub fn generate_id(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Normalize a user-entered class code: trimmed, case-insensitive.
/// Too-short codes are rejected with a user-visible error.
pub fn normalize_room_code(input: &str) -> Result<String, AppError> {
    let code = input.trim().to_lowercase();
    if code.len() < MIN_ROOM_CODE_LEN {
        return Err(AppError::InvalidRoomCode);
    }
    Ok(code)
}

/// Relay scope name for a room.
pub fn channel_scope(prefix: &str, room_id: &str) -> String {
    format!("{prefix}{room_id}")
}

/// Append the room token to a shareable URL as the `room` query parameter.
pub fn share_url(base: &str, room_id: &str) -> String {
    if base.contains('?') {
        format!("{base}&room={room_id}")
    } else {
        format!("{base}?room={room_id}")
    }
}

/// Extract a pre-filled room token from a URL's `room` query parameter.
pub fn room_from_url(url: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("room="))
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}
