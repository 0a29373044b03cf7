use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a participant within a session.
///
/// Id `0` is reserved for the host, who is synthesized when the session
/// is built and never appears in the dataset's participant list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    /// The reserved id of the session host.
    pub const HOST: Self = Self(0);

    /// Whether this id belongs to the host.
    pub fn is_host(self) -> bool {
        self == Self::HOST
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Presence state of a participant over the session's lifetime.
///
/// Transitions only move forward: `Absent -> Present -> Ready`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    /// Invited but not yet in the lobby.
    #[default]
    Absent,
    /// Arrived in the lobby.
    Present,
    /// Present and done with every action asked of them.
    Ready,
}

impl PresenceStatus {
    /// Whether the participant has arrived (present or ready).
    pub fn is_present(self) -> bool {
        matches!(self, Self::Present | Self::Ready)
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Present => write!(f, "present"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// A person at the table. Identity is stable; only `status` ever changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique id within the session.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Emoji avatar shown next to the name.
    #[serde(default)]
    pub avatar: String,
    /// Current presence state.
    #[serde(default)]
    pub status: PresenceStatus,
}

impl Participant {
    /// Create a participant in the `Absent` state.
    pub fn new(id: ParticipantId, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: avatar.into(),
            status: PresenceStatus::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_id_is_reserved_zero() {
        assert_eq!(ParticipantId::HOST, ParticipantId(0));
        assert!(ParticipantId::HOST.is_host());
        assert!(!ParticipantId(3).is_host());
    }

    #[test]
    fn status_is_present() {
        assert!(!PresenceStatus::Absent.is_present());
        assert!(PresenceStatus::Present.is_present());
        assert!(PresenceStatus::Ready.is_present());
    }

    #[test]
    fn participant_starts_absent() {
        let p = Participant::new(ParticipantId(1), "Aditya", "🦊");
        assert_eq!(p.status, PresenceStatus::Absent);
        assert_eq!(p.id.to_string(), "#1");
    }

    #[test]
    fn status_serde_uses_snake_case() {
        let json = serde_json::to_string(&PresenceStatus::Present).unwrap();
        assert_eq!(json, "\"present\"");
        let parsed: PresenceStatus = serde_json::from_str("\"ready\"").unwrap();
        assert_eq!(parsed, PresenceStatus::Ready);
    }
}
