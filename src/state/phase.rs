use thiserror::Error;

/// Which side of the room this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    /// Created the room; owns the `player1` field.
    Host,
    /// Joined by token; owns `player2` and raises both readiness flags.
    Joiner,
}

/// Why a match ended without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// A wait ran out of budget.
    TimedOut,
    /// The local player picked something that is not a move.
    InvalidMove,
    /// The room was gone when we looked at it.
    RoomVanished,
    /// The store stopped answering.
    StoreFailure,
    /// Our move field had already been filled.
    SeatTaken,
    /// The local player walked away.
    Abandoned,
}

/// Local view of where a match stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Room created or joined; waiting on the readiness barrier.
    WaitingForPlayers,
    /// Both readiness flags observed; local move not sent yet.
    Ready,
    /// Local move written; waiting for the opponent's.
    AwaitingMoves,
    /// Both moves revealed and the room released.
    Resolved,
    /// Terminated early. The room is deleted unless another player holds the seat.
    Aborted(AbortReason),
}

impl MatchPhase {
    /// Returns `true` once no further events are accepted.
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchPhase::Resolved | MatchPhase::Aborted(_))
    }
}

/// Events that drive the local match forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    /// The readiness barrier completed.
    BothReady,
    /// Our move landed in the store.
    MoveSubmitted,
    /// Both moves were read back.
    MovesRevealed,
    /// The match is over early.
    Abort(AbortReason),
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the match was in when the invalid event was received.
    pub from: MatchPhase,
    /// The event that cannot be applied from this phase.
    pub event: MatchEvent,
}

/// State machine tracking one local match from admission to teardown.
#[derive(Debug, Clone)]
pub struct MatchStateMachine {
    seat: Seat,
    phase: MatchPhase,
}

impl MatchStateMachine {
    /// Start a match right after the room was created or joined.
    pub fn new(seat: Seat) -> Self {
        Self {
            seat,
            phase: MatchPhase::WaitingForPlayers,
        }
    }

    /// Seat this match is played from.
    pub fn seat(&self) -> Seat {
        self.seat
    }

    /// Current phase.
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Apply an event, returning the new phase.
    pub fn apply(&mut self, event: MatchEvent) -> Result<MatchPhase, InvalidTransition> {
        self.phase = self.compute_transition(event)?;
        Ok(self.phase)
    }

    fn compute_transition(&self, event: MatchEvent) -> Result<MatchPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (MatchPhase::WaitingForPlayers, MatchEvent::BothReady) => MatchPhase::Ready,
            (MatchPhase::Ready, MatchEvent::MoveSubmitted) => MatchPhase::AwaitingMoves,
            (MatchPhase::AwaitingMoves, MatchEvent::MovesRevealed) => MatchPhase::Resolved,
            (from, MatchEvent::Abort(reason)) if !from.is_terminal() => {
                MatchPhase::Aborted(reason)
            }
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_reaches_resolved() {
        let mut sm = MatchStateMachine::new(Seat::Host);
        assert_eq!(sm.phase(), MatchPhase::WaitingForPlayers);
        assert_eq!(sm.apply(MatchEvent::BothReady).unwrap(), MatchPhase::Ready);
        assert_eq!(
            sm.apply(MatchEvent::MoveSubmitted).unwrap(),
            MatchPhase::AwaitingMoves
        );
        assert_eq!(
            sm.apply(MatchEvent::MovesRevealed).unwrap(),
            MatchPhase::Resolved
        );
        assert!(sm.phase().is_terminal());
    }

    #[test]
    fn moves_cannot_be_submitted_before_readiness() {
        let mut sm = MatchStateMachine::new(Seat::Joiner);
        let err = sm.apply(MatchEvent::MoveSubmitted).unwrap_err();
        assert_eq!(err.from, MatchPhase::WaitingForPlayers);
        assert_eq!(err.event, MatchEvent::MoveSubmitted);
        assert_eq!(sm.phase(), MatchPhase::WaitingForPlayers);
    }

    #[test]
    fn abort_from_any_live_phase() {
        let mut sm = MatchStateMachine::new(Seat::Host);
        sm.apply(MatchEvent::BothReady).unwrap();
        assert_eq!(
            sm.apply(MatchEvent::Abort(AbortReason::InvalidMove)).unwrap(),
            MatchPhase::Aborted(AbortReason::InvalidMove)
        );
    }

    #[test]
    fn terminal_phases_reject_everything() {
        let mut sm = MatchStateMachine::new(Seat::Host);
        sm.apply(MatchEvent::Abort(AbortReason::TimedOut)).unwrap();
        assert!(sm.apply(MatchEvent::Abort(AbortReason::StoreFailure)).is_err());
        assert!(sm.apply(MatchEvent::BothReady).is_err());
        assert_eq!(sm.phase(), MatchPhase::Aborted(AbortReason::TimedOut));
    }
}
