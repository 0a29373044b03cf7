use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The six phases of a session, in fixed forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The host picks a vibe and shares the invite.
    Invitation,
    /// Guests trickle into the lobby.
    Lobby,
    /// Everyone submits their dining preferences.
    Preference,
    /// The ranked venue candidates are revealed.
    Revelation,
    /// The table votes on where to eat.
    Voting,
    /// The bill is split and settled. Terminal.
    Settlement,
}

impl Stage {
    /// Every stage in visiting order.
    pub const ORDER: [Self; 6] = [
        Self::Invitation,
        Self::Lobby,
        Self::Preference,
        Self::Revelation,
        Self::Voting,
        Self::Settlement,
    ];

    /// The immediate successor, or `None` at the terminal stage.
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::Invitation => Some(Self::Lobby),
            Self::Lobby => Some(Self::Preference),
            Self::Preference => Some(Self::Revelation),
            Self::Revelation => Some(Self::Voting),
            Self::Voting => Some(Self::Settlement),
            Self::Settlement => None,
        }
    }

    /// Whether this is the terminal stage.
    pub fn is_terminal(self) -> bool {
        self.successor().is_none()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invitation => write!(f, "invitation"),
            Self::Lobby => write!(f, "lobby"),
            Self::Preference => write!(f, "preference"),
            Self::Revelation => write!(f, "revelation"),
            Self::Voting => write!(f, "voting"),
            Self::Settlement => write!(f, "settlement"),
        }
    }
}

/// Forward-only sequencer over the stage chain.
///
/// There is no operation to move backward or skip; `advance` must be
/// invoked on behalf of the currently active stage, which keeps the
/// one-owner-per-stage discipline honest.
#[derive(Debug, Clone)]
pub struct StageController {
    current: Stage,
    visited: Vec<Stage>,
}

impl StageController {
    /// Start a fresh controller at `Invitation`.
    pub fn new() -> Self {
        Self {
            current: Stage::Invitation,
            visited: vec![Stage::Invitation],
        }
    }

    /// The currently active stage.
    pub fn current(&self) -> Stage {
        self.current
    }

    /// Every stage visited so far, in order.
    pub fn visited(&self) -> &[Stage] {
        &self.visited
    }

    /// Move to the immediate successor. `origin` must be the active
    /// stage; anything else is a programming error. At the terminal
    /// stage this is a no-op returning the current stage.
    pub fn advance(&mut self, origin: Stage) -> EngineResult<Stage> {
        if origin != self.current {
            return Err(EngineError::StageViolation {
                expected: self.current,
                found: origin,
            });
        }
        if let Some(next) = self.current.successor() {
            self.current = next;
            self.visited.push(next);
        }
        Ok(self.current)
    }
}

impl Default for StageController {
    fn default() -> Self {
        Self::new()
    }
}
