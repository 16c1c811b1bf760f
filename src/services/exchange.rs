//! Simultaneous move exchange over the `player1`/`player2` fields.

use tracing::info;

use crate::{
    dao::{
        models::{RoomField, RoomKey},
        room::RoomRepository,
    },
    error::MatchError,
    services::{
        outcome::Move,
        poll::{PollOutcome, PollPolicy, poll_until},
    },
    state::Seat,
};

/// Both moves once they are visible to everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealedMoves {
    /// Host's move.
    pub player1: Move,
    /// Joiner's move.
    pub player2: Move,
}

/// Field a seat writes its move into.
pub fn move_field(seat: Seat) -> RoomField {
    match seat {
        Seat::Host => RoomField::Player1,
        Seat::Joiner => RoomField::Player2,
    }
}

/// Write this seat's move. A seat's field can only be filled once.
pub async fn submit_move(
    rooms: &RoomRepository,
    key: &RoomKey,
    seat: Seat,
    choice: Move,
) -> Result<(), MatchError> {
    let field = move_field(seat);
    if rooms
        .claim_move(key, field, choice.code().to_string())
        .await?
    {
        info!(room = %key, ?seat, "move submitted");
        return Ok(());
    }

    match rooms.field(key, field).await? {
        None => Err(MatchError::MatchAborted(key.clone())),
        Some(_) => Err(MatchError::MoveAlreadySubmitted(key.clone())),
    }
}

/// Block until both move fields are filled, then parse and reveal them.
///
/// Presence is decided on the raw field: missing means the room is gone, an empty
/// string means "not yet". Values are only interpreted once both are present.
pub async fn wait_for_moves(
    rooms: &RoomRepository,
    key: &RoomKey,
    policy: PollPolicy,
) -> Result<PollOutcome<RevealedMoves>, MatchError> {
    poll_until(policy, move || both_moves(rooms, key)).await
}

async fn both_moves(
    rooms: &RoomRepository,
    key: &RoomKey,
) -> Result<Option<RevealedMoves>, MatchError> {
    let player1 = rooms.field(key, RoomField::Player1).await?;
    let player2 = rooms.field(key, RoomField::Player2).await?;
    let (Some(player1), Some(player2)) = (player1, player2) else {
        return Err(MatchError::MatchAborted(key.clone()));
    };
    if player1.is_empty() || player2.is_empty() {
        return Ok(None);
    }

    Ok(Some(RevealedMoves {
        player1: player1.parse()?,
        player2: player2.parse()?,
    }))
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::time::Instant;

    use super::*;
    use crate::{
        config::MatchSettings,
        dao::room_store::{RoomStore, memory::MemoryRoomStore},
        services::lobby::create_room,
    };

    fn policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(15),
        }
    }

    async fn room() -> (MemoryRoomStore, RoomRepository, RoomKey) {
        let store = MemoryRoomStore::new();
        let rooms = RoomRepository::new(Arc::new(store.clone()));
        let key = create_room(&rooms, &MatchSettings::default()).await.unwrap();
        (store, rooms, key)
    }

    #[tokio::test(start_paused = true)]
    async fn reveals_both_moves() {
        let (_store, rooms, key) = room().await;
        submit_move(&rooms, &key, Seat::Host, Move::Rock).await.unwrap();
        submit_move(&rooms, &key, Seat::Joiner, Move::Scissors)
            .await
            .unwrap();

        let outcome = wait_for_moves(&rooms, &key, policy()).await.unwrap();
        assert_eq!(
            outcome,
            PollOutcome::Done(RevealedMoves {
                player1: Move::Rock,
                player2: Move::Scissors,
            })
        );
    }

    #[tokio::test]
    async fn a_seat_moves_only_once() {
        let (store, rooms, key) = room().await;
        submit_move(&rooms, &key, Seat::Host, Move::Paper).await.unwrap();
        let err = submit_move(&rooms, &key, Seat::Host, Move::Rock)
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::MoveAlreadySubmitted(_)));
        assert_eq!(
            store.get_field(key, RoomField::Player1).await.unwrap(),
            Some("2".into())
        );
    }

    #[tokio::test]
    async fn submitting_into_a_vanished_room_aborts() {
        let (_store, rooms, key) = room().await;
        rooms.delete(&key).await.unwrap();
        let err = submit_move(&rooms, &key, Seat::Joiner, Move::Paper)
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::MatchAborted(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn single_move_times_out_after_budget() {
        let (_store, rooms, key) = room().await;
        submit_move(&rooms, &key, Seat::Host, Move::Rock).await.unwrap();

        let start = Instant::now();
        let outcome = wait_for_moves(&rooms, &key, policy()).await.unwrap();
        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_counts_as_present_and_invalid() {
        let (store, rooms, key) = room().await;
        submit_move(&rooms, &key, Seat::Host, Move::Rock).await.unwrap();
        store
            .set_field(key.clone(), RoomField::Player2, "0".into())
            .await
            .unwrap();

        let err = wait_for_moves(&rooms, &key, policy()).await.unwrap_err();
        assert!(matches!(err, MatchError::InvalidMove(_)));
    }
}
