//! Per-match handle used by the presentation layer.
//!
//! A [`MatchSession`] owns the store handle, the room key and the local phase for one
//! match. Every terminal path tears the room down before returning: aborts delete it at
//! once, a resolved match shortens its expiry to a short grace window so the opponent's
//! next poll still finds both moves. The one exception is losing the race for the joiner
//! seat: the room then belongs to two other players and is left alone.
//!
//! While a match is live the expiry is re-armed to `room_ttl` at the readiness handshake
//! and after each move, so the TTL only ever reaps rooms whose players are gone.

use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use crate::{
    config::MatchSettings,
    dao::{models::RoomKey, room::RoomRepository, room_store::RoomStore},
    error::MatchError,
    services::{
        barrier, exchange,
        lobby::{self, delete_room},
        outcome::{Move, Outcome, resolve},
        poll::{PollOutcome, PollPolicy, WaitPhase},
    },
    state::{AbortReason, MatchEvent, MatchPhase, MatchStateMachine, Seat},
};

/// Number of poll intervals a resolved room is kept around for the opponent.
const RESOLVED_GRACE_INTERVALS: u32 = 3;

/// What the presentation layer needs to render a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchReport {
    /// Seat this process played.
    pub seat: Seat,
    /// Host's move.
    pub player1: Move,
    /// Joiner's move.
    pub player2: Move,
    /// Result for [`MatchReport::seat`].
    pub outcome: Outcome,
}

impl MatchReport {
    /// Move played by this process.
    pub fn own_move(&self) -> Move {
        match self.seat {
            Seat::Host => self.player1,
            Seat::Joiner => self.player2,
        }
    }

    /// Move played by the opponent.
    pub fn opponent_move(&self) -> Move {
        match self.seat {
            Seat::Host => self.player2,
            Seat::Joiner => self.player1,
        }
    }
}

/// One side of one match, from admission to teardown.
pub struct MatchSession {
    rooms: RoomRepository,
    settings: MatchSettings,
    key: RoomKey,
    machine: MatchStateMachine,
}

impl MatchSession {
    /// Create a new room and take the host seat.
    pub async fn host(
        store: Arc<dyn RoomStore>,
        settings: MatchSettings,
    ) -> Result<Self, MatchError> {
        let rooms = RoomRepository::new(store);
        rooms.health_check().await?;
        let key = lobby::create_room(&rooms, &settings).await?;
        Ok(Self::new(rooms, settings, key, Seat::Host))
    }

    /// Join an existing room by bare token or full key, then run the readiness handshake.
    ///
    /// Admission failures leave the room untouched.
    pub async fn join(
        store: Arc<dyn RoomStore>,
        settings: MatchSettings,
        input: &str,
    ) -> Result<Self, MatchError> {
        let rooms = RoomRepository::new(store);
        rooms.health_check().await?;
        let key = lobby::join_room(&rooms, input).await?;
        let mut session = Self::new(rooms, settings, key, Seat::Joiner);

        let ttl = session.settings.room_ttl;
        if let Err(err) = barrier::mark_both_ready(&session.rooms, &session.key, ttl).await {
            return Err(session.abort(err).await);
        }
        Ok(session)
    }

    fn new(rooms: RoomRepository, settings: MatchSettings, key: RoomKey, seat: Seat) -> Self {
        info!(room = %key, ?seat, "match session started");
        Self {
            rooms,
            settings,
            key,
            machine: MatchStateMachine::new(seat),
        }
    }

    /// Key of the room this session plays in.
    pub fn room(&self) -> &RoomKey {
        &self.key
    }

    /// Seat this process holds.
    pub fn seat(&self) -> Seat {
        self.machine.seat()
    }

    /// Current local phase.
    pub fn phase(&self) -> MatchPhase {
        self.machine.phase()
    }

    /// Readiness barrier. On timeout the room is deleted.
    pub async fn wait_for_opponent(&mut self) -> Result<(), MatchError> {
        self.ensure_phase(MatchPhase::WaitingForPlayers)?;
        let policy = self.policy(self.settings.ready_timeout);

        match barrier::wait_for_both_ready(&self.rooms, &self.key, policy).await {
            Ok(PollOutcome::Done(())) => {
                self.transition(MatchEvent::BothReady)?;
                info!(room = %self.key, "both players ready");
                Ok(())
            }
            Ok(PollOutcome::TimedOut) => {
                let err = self.timed_out(WaitPhase::Readiness);
                Err(self.abort(err).await)
            }
            Err(err) => Err(self.abort(err).await),
        }
    }

    /// Submit the local player's raw choice, wait for the opponent's, and resolve.
    ///
    /// Input that is not a move ends the match and deletes the room before any write.
    pub async fn play(&mut self, choice: &str) -> Result<MatchReport, MatchError> {
        self.ensure_phase(MatchPhase::Ready)?;

        let choice = match choice.parse::<Move>() {
            Ok(choice) => choice,
            Err(err) => return Err(self.abort(err).await),
        };
        if let Err(err) = exchange::submit_move(&self.rooms, &self.key, self.seat(), choice).await
        {
            return Err(self.abort(err).await);
        }
        if let Err(err) = self.rooms.expire(&self.key, self.settings.room_ttl).await {
            return Err(self.abort(err.into()).await);
        }
        self.transition(MatchEvent::MoveSubmitted)?;

        let policy = self.policy(self.settings.move_timeout);
        let moves = match exchange::wait_for_moves(&self.rooms, &self.key, policy).await {
            Ok(PollOutcome::Done(moves)) => moves,
            Ok(PollOutcome::TimedOut) => {
                let err = self.timed_out(WaitPhase::Moves);
                return Err(self.abort(err).await);
            }
            Err(err) => return Err(self.abort(err).await),
        };

        let report = MatchReport {
            seat: self.seat(),
            player1: moves.player1,
            player2: moves.player2,
            outcome: resolve(moves.player1, moves.player2, self.seat()),
        };
        self.transition(MatchEvent::MovesRevealed)?;
        self.release_resolved_room().await;
        info!(room = %self.key, outcome = ?report.outcome, "match resolved");
        Ok(report)
    }

    /// Give up on the match and delete the room. No-op once the match is over.
    pub async fn abandon(&mut self) -> Result<(), MatchError> {
        if self.phase().is_terminal() {
            return Ok(());
        }
        self.transition(MatchEvent::Abort(AbortReason::Abandoned))?;
        delete_room(&self.rooms, &self.key).await
    }

    fn policy(&self, timeout: Duration) -> PollPolicy {
        PollPolicy {
            interval: self.settings.poll_interval,
            timeout,
        }
    }

    fn timed_out(&self, phase: WaitPhase) -> MatchError {
        MatchError::TimedOut {
            phase,
            room: self.key.clone(),
        }
    }

    fn ensure_phase(&self, expected: MatchPhase) -> Result<(), MatchError> {
        let current = self.phase();
        if current != expected {
            return Err(MatchError::InvalidState(format!(
                "expected {expected:?} but match is {current:?}"
            )));
        }
        Ok(())
    }

    fn transition(&mut self, event: MatchEvent) -> Result<MatchPhase, MatchError> {
        self.machine
            .apply(event)
            .map_err(|err| MatchError::InvalidState(err.to_string()))
    }

    /// Mark the match aborted, delete the room, and hand the error back.
    ///
    /// A session that lost its seat leaves the room to whoever holds it.
    async fn abort(&mut self, err: MatchError) -> MatchError {
        let reason = abort_reason(&err);
        if let Err(invalid) = self.machine.apply(MatchEvent::Abort(reason)) {
            warn!(room = %self.key, error = %invalid, "match already finished");
        }
        warn!(room = %self.key, ?reason, error = %err, "match aborted");

        if reason == AbortReason::SeatTaken {
            info!(room = %self.key, "seat held by another player; leaving the room in place");
            return err;
        }

        if let Err(delete_err) = delete_room(&self.rooms, &self.key).await {
            warn!(room = %self.key, error = %delete_err, "failed to delete room after abort");
        }
        err
    }

    async fn release_resolved_room(&self) {
        let grace = self
            .settings
            .poll_interval
            .checked_mul(RESOLVED_GRACE_INTERVALS)
            .unwrap_or(self.settings.room_ttl);
        if let Err(err) = self.rooms.expire(&self.key, grace).await {
            warn!(room = %self.key, error = %err, "failed to shorten resolved room expiry; deleting");
            if let Err(err) = delete_room(&self.rooms, &self.key).await {
                warn!(room = %self.key, error = %err, "failed to delete resolved room");
            }
        }
    }
}

fn abort_reason(err: &MatchError) -> AbortReason {
    match err {
        MatchError::TimedOut { .. } => AbortReason::TimedOut,
        MatchError::InvalidMove(_) => AbortReason::InvalidMove,
        MatchError::StoreUnavailable(_) => AbortReason::StoreFailure,
        MatchError::MoveAlreadySubmitted(_) => AbortReason::SeatTaken,
        MatchError::MatchAborted(_) | MatchError::RoomNotFound(_) => AbortReason::RoomVanished,
        MatchError::RoomFull(_)
        | MatchError::RoomIdCollision { .. }
        | MatchError::InvalidState(_) => AbortReason::Abandoned,
    }
}
