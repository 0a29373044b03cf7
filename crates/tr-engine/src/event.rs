use tr_core::ParticipantId;

use crate::stage::Stage;

/// Timer payloads: everything the scripted simulation does on its own,
/// without a local action triggering it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledEvent {
    /// The shared invite has landed with every guest.
    InviteDelivered,
    /// A guest walks into the lobby.
    Arrival(ParticipantId),
    /// A remote guest's preference form comes in.
    PreferenceArrival(ParticipantId),
    /// The grace period after the last preference form has elapsed.
    PreferenceGraceOver,
    /// A remote guest's ballot lands.
    Ballot {
        /// Who cast the ballot.
        voter: ParticipantId,
        /// The recommendation id the ballot names.
        recommendation: String,
    },
    /// A remote guest's payment clears.
    PaymentClears(ParticipantId),
}

/// What kind of outbound signal occurred.
///
/// Signals are the engine's entire outbound surface: the presentation
/// layer renders them and never reaches into engine internals.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalKind {
    /// The session moved to the next stage.
    StageChanged {
        /// The stage being left.
        from: Stage,
        /// The stage being entered.
        to: Stage,
    },
    /// A participant arrived in the lobby.
    ParticipantJoined {
        /// The participant who arrived.
        participant: ParticipantId,
    },
    /// A preference form was submitted.
    PreferenceSubmitted {
        /// Whose form came in.
        participant: ParticipantId,
        /// Remote submissions received so far.
        submitted: usize,
        /// Remote submissions expected in total.
        expected: usize,
    },
    /// The venue candidates were ranked.
    RecommendationsRanked {
        /// The id of the top-ranked candidate.
        best_bet: String,
    },
    /// A ballot landed and the tally moved.
    TallyUpdated {
        /// The recommendation whose count changed.
        recommendation: String,
        /// Its new vote count.
        votes: u32,
    },
    /// Voting closed with a winner.
    WinnerDeclared {
        /// The winning recommendation id.
        recommendation: String,
    },
    /// The split was recomputed from the current category totals.
    SplitRecomputed {
        /// Sum of all category totals before division.
        computed_total: f64,
    },
    /// A participant's payment cleared.
    PaymentReceived {
        /// Who paid.
        participant: ParticipantId,
        /// Total collected so far, in whole currency units.
        collected: i64,
    },
}

impl SignalKind {
    /// Check whether a given participant is involved in this signal.
    pub fn involves(&self, id: ParticipantId) -> bool {
        match self {
            Self::ParticipantJoined { participant }
            | Self::PreferenceSubmitted { participant, .. }
            | Self::PaymentReceived { participant, .. } => *participant == id,
            Self::StageChanged { .. }
            | Self::RecommendationsRanked { .. }
            | Self::TallyUpdated { .. }
            | Self::WinnerDeclared { .. }
            | Self::SplitRecomputed { .. } => false,
        }
    }
}

/// A record of something the engine announced.
#[derive(Debug, Clone)]
pub struct Signal {
    /// Virtual time when the signal was emitted, in milliseconds.
    pub at_ms: u64,
    /// The specific kind of signal.
    pub kind: SignalKind,
    /// A human-readable description.
    pub description: String,
}

impl Signal {
    /// Create a new signal.
    pub fn new(at_ms: u64, kind: SignalKind, description: impl Into<String>) -> Self {
        Self {
            at_ms,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates outbound signals over a session run.
#[derive(Debug, Default)]
pub struct SignalLog {
    signals: Vec<Signal>,
}

impl SignalLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a signal.
    pub fn push(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    /// Return a slice of all recorded signals.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Return all signals involving the given participant.
    pub fn involving(&self, id: ParticipantId) -> Vec<&Signal> {
        self.signals
            .iter()
            .filter(|signal| signal.kind.involves(id))
            .collect()
    }

    /// Return the number of recorded signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Return `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Remove all recorded signals.
    pub fn clear(&mut self) {
        self.signals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_push_and_query() {
        let mut log = SignalLog::new();
        log.push(Signal::new(
            1500,
            SignalKind::ParticipantJoined {
                participant: ParticipantId(1),
            },
            "Aditya joined the lobby",
        ));
        log.push(Signal::new(
            1500,
            SignalKind::StageChanged {
                from: Stage::Invitation,
                to: Stage::Lobby,
            },
            "stage: invitation -> lobby",
        ));

        assert_eq!(log.len(), 2);
        assert_eq!(log.involving(ParticipantId(1)).len(), 1);
        assert!(log.involving(ParticipantId(2)).is_empty());
    }

    #[test]
    fn kind_involves_only_its_participant() {
        let kind = SignalKind::PaymentReceived {
            participant: ParticipantId(2),
            collected: 450,
        };
        assert!(kind.involves(ParticipantId(2)));
        assert!(!kind.involves(ParticipantId(1)));

        let kind = SignalKind::WinnerDeclared {
            recommendation: "r2".into(),
        };
        assert!(!kind.involves(ParticipantId(2)));
    }

    #[test]
    fn log_clear() {
        let mut log = SignalLog::new();
        log.push(Signal::new(
            0,
            SignalKind::RecommendationsRanked {
                best_bet: "r2".into(),
            },
            "ranked",
        ));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }
}
