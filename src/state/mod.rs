/// Local match phases and the transitions between them.
pub mod phase;

pub use self::phase::{
    AbortReason, InvalidTransition, MatchEvent, MatchPhase, MatchStateMachine, Seat,
};
