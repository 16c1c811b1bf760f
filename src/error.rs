use thiserror::Error;

use crate::{
    dao::{models::RoomKey, storage::StorageError},
    services::poll::WaitPhase,
};

/// Errors surfaced to the presentation layer by match operations.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The shared store could not be reached; the session is over.
    #[error("room store unavailable")]
    StoreUnavailable(#[source] StorageError),
    /// No room exists under the requested key.
    #[error("room `{0}` does not exist")]
    RoomNotFound(RoomKey),
    /// The room already has a second player.
    #[error("room `{0}` already has two players")]
    RoomFull(RoomKey),
    /// A wait exceeded its budget; the room has been deleted.
    #[error("timed out waiting for {phase} in room `{room}`")]
    TimedOut {
        /// Which synchronisation step gave up.
        phase: WaitPhase,
        /// Room that was torn down.
        room: RoomKey,
    },
    /// Move outside of rock, paper and scissors.
    #[error("invalid move: {0}")]
    InvalidMove(String),
    /// Every generated room id was already in use.
    #[error("could not allocate a free room id after {attempts} attempt(s)")]
    RoomIdCollision {
        /// Number of ids generated before giving up.
        attempts: u32,
    },
    /// The room disappeared mid-match: the opponent left, timed out, or the TTL expired.
    #[error("match aborted: room `{0}` no longer exists")]
    MatchAborted(RoomKey),
    /// This seat's move field was already filled.
    #[error("a move was already submitted for this seat in room `{0}`")]
    MoveAlreadySubmitted(RoomKey),
    /// Operation cannot be performed in the current phase.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl From<StorageError> for MatchError {
    fn from(err: StorageError) -> Self {
        MatchError::StoreUnavailable(err)
    }
}
