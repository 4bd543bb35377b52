// ============================
// crates/classroom-lib/src/session.rs
// ============================
//! Identity and session state for one local context.
use classroom_common::{Participant, Role, UserId};

/// Known participants, in join order.
#[derive(Debug, Default)]
pub struct Roster {
    entries: Vec<Participant>,
}

impl Roster {
    /// Add a participant if its id is new. Duplicate joins for a known id
    /// are ignored; returns whether the roster changed.
    pub fn insert(&mut self, participant: Participant) -> bool {
        if self.contains(&participant.user_id) {
            return false;
        }
        self.entries.push(participant);
        true
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.entries.iter().any(|p| p.user_id == user_id)
    }

    pub fn get(&self, user_id: &str) -> Option<&Participant> {
        self.entries.iter().find(|p| p.user_id == user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visible student count; teachers are not counted.
    pub fn student_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|p| p.role == Role::Student)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.entries.iter()
    }
}

/// Everything one context knows about its room.
#[derive(Debug)]
pub struct Session {
    pub room_id: String,
    pub local: Participant,
    pub roster: Roster,
    /// At most one followed participant at a time. May go stale if the
    /// target leaves; stale targets are tolerated silently.
    pub following: Option<UserId>,
}

impl Session {
    /// A session starts with its own participant already on the roster.
    pub fn new(room_id: String, local: Participant) -> Self {
        let mut roster = Roster::default();
        roster.insert(local.clone());
        Self {
            room_id,
            local,
            roster,
            following: None,
        }
    }

    pub fn is_local(&self, user_id: &str) -> bool {
        self.local.user_id == user_id
    }

    /// Follow/unfollow toggle: toggling the current target clears it,
    /// any other target silently replaces the previous one. Returns the
    /// new follow target.
    pub fn toggle_follow(&mut self, user_id: &str) -> Option<&UserId> {
        if self.following.as_deref() == Some(user_id) {
            self.following = None;
        } else {
            self.following = Some(user_id.to_string());
        }
        self.following.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str, role: Role) -> Participant {
        Participant {
            user_id: id.to_string(),
            username: format!("user-{id}"),
            role,
            color_index: 1,
        }
    }

    #[test]
    fn test_roster_dedupes_by_id() {
        let mut roster = Roster::default();
        assert!(roster.insert(participant("a", Role::Student)));
        assert!(roster.insert(participant("b", Role::Student)));
        assert!(!roster.insert(participant("a", Role::Student)));
        assert!(!roster.insert(participant("a", Role::Teacher)));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_roster_size_tracks_distinct_ids() {
        let mut roster = Roster::default();
        for id in ["a", "b", "a", "c", "b", "a"] {
            roster.insert(participant(id, Role::Student));
        }
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn test_roster_preserves_join_order() {
        let mut roster = Roster::default();
        roster.insert(participant("z", Role::Teacher));
        roster.insert(participant("a", Role::Student));
        roster.insert(participant("m", Role::Student));
        let order: Vec<&str> = roster.iter().map(|p| p.user_id.as_str()).collect();
        assert_eq!(order, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_student_count_excludes_teacher() {
        let mut roster = Roster::default();
        roster.insert(participant("t", Role::Teacher));
        roster.insert(participant("s1", Role::Student));
        roster.insert(participant("s2", Role::Student));
        assert_eq!(roster.student_count(), 2);
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn test_session_seeds_roster_with_local() {
        let session = Session::new("room1234".to_string(), participant("me", Role::Teacher));
        assert_eq!(session.roster.len(), 1);
        assert!(session.roster.contains("me"));
        assert!(session.is_local("me"));
    }

    #[test]
    fn test_toggle_follow_twice_unfollows() {
        let mut session = Session::new("room1234".to_string(), participant("me", Role::Teacher));
        assert_eq!(session.toggle_follow("s1").map(String::as_str), Some("s1"));
        assert_eq!(session.toggle_follow("s1"), None);
    }

    #[test]
    fn test_toggle_follow_replaces_target() {
        let mut session = Session::new("room1234".to_string(), participant("me", Role::Teacher));
        session.toggle_follow("s1");
        assert_eq!(session.toggle_follow("s2").map(String::as_str), Some("s2"));
    }
}
