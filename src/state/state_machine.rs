use std::fmt;

use thiserror::Error;

/// Lifecycle phases a room moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Zero or one player present.
    Waiting,
    /// Both players present, arranging their boards.
    Setup,
    /// Players alternate calling numbers.
    Playing,
    /// A line has been completed; rematch requests are accepted.
    Finished,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Waiting => "waiting",
            SessionPhase::Setup => "setup",
            SessionPhase::Playing => "playing",
            SessionPhase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Events that move a room between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The second player joined the room.
    OpponentJoined,
    /// Both players submitted a complete board.
    BoardsReady,
    /// A call completed a line for one of the players.
    LineCompleted,
    /// Both players asked for a rematch.
    RematchAgreed,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: SessionPhase,
    /// The event that cannot be applied from this phase.
    pub event: SessionEvent,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: SessionPhase,
    /// Version number of the state machine (increments on each transition).
    pub version: usize,
}

/// Transition table for a single room.
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    phase: SessionPhase,
    version: usize,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Waiting,
            version: 0,
        }
    }
}

impl SessionStateMachine {
    /// Create a new state machine initialised in the waiting state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            version: self.version,
        }
    }

    /// Apply `event`, returning the new phase. The phase is unchanged on error.
    pub fn apply(&mut self, event: SessionEvent) -> Result<SessionPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: SessionEvent) -> Result<SessionPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (SessionPhase::Waiting, SessionEvent::OpponentJoined) => SessionPhase::Setup,
            (SessionPhase::Setup, SessionEvent::BoardsReady) => SessionPhase::Playing,
            (SessionPhase::Playing, SessionEvent::LineCompleted) => SessionPhase::Finished,
            (SessionPhase::Finished, SessionEvent::RematchAgreed) => SessionPhase::Setup,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
