use serde::{Deserialize, Serialize};

use crate::error::{TrError, TrResult};
use crate::participant::{Participant, ParticipantId, PresenceStatus};

/// A dining session: the host plus the invited participants.
///
/// Built once from the dataset and immutable for the session's lifetime,
/// except for participant presence which only ever moves forward. The
/// host sits at index 0 with the reserved id and is present from the
/// start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: String,
    host_name: String,
    participants: Vec<Participant>,
}

impl Session {
    /// Build a session from its dataset parts. The host is synthesized
    /// with the reserved id and starts `Ready`; invited participants
    /// start `Absent`.
    pub fn new(
        id: impl Into<String>,
        host_name: impl Into<String>,
        invited: Vec<Participant>,
    ) -> Self {
        let host_name = host_name.into();
        let mut host = Participant::new(ParticipantId::HOST, host_name.clone(), "👑");
        host.status = PresenceStatus::Ready;

        let mut participants = Vec::with_capacity(invited.len() + 1);
        participants.push(host);
        participants.extend(invited);

        Self {
            id: id.into(),
            host_name,
            participants,
        }
    }

    /// The session id from the dataset.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The host's display name.
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    /// All participants, host first, in invitation order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// The invited participants, excluding the host.
    pub fn invited(&self) -> &[Participant] {
        &self.participants[1..]
    }

    /// Total headcount, host included.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Look up a participant by id.
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Display name for a participant id, or `"?"` if unknown.
    pub fn participant_name(&self, id: ParticipantId) -> &str {
        self.participant(id).map_or("?", |p| p.name.as_str())
    }

    /// How many participants are currently in the lobby (host included).
    pub fn present_count(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.status.is_present())
            .count()
    }

    /// Mark a participant as arrived. Forward-only: participants already
    /// `Present` or `Ready` are left untouched.
    pub fn mark_present(&mut self, id: ParticipantId) -> TrResult<()> {
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(TrError::ParticipantNotFound(id))?;
        if participant.status == PresenceStatus::Absent {
            participant.status = PresenceStatus::Present;
        }
        Ok(())
    }
}
