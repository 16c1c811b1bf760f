//! Two-party readiness barrier over the `ready1`/`ready2` flags.
//!
//! The joiner raises both flags once admitted: its own, and the host's on the host's
//! behalf. The host never raises a flag itself, so "host ready" means "somebody joined".
//! The handshake also re-arms the room's expiry, so the match gets a full `room_ttl` no
//! matter how late in the host's readiness window the joiner shows up.

use std::time::Duration;

use tracing::info;

use crate::{
    dao::{
        models::{RoomField, RoomKey},
        room::RoomRepository,
    },
    error::MatchError,
    services::poll::{PollOutcome, PollPolicy, poll_until},
};

/// Joiner handshake run right after a successful admission.
pub async fn mark_both_ready(
    rooms: &RoomRepository,
    key: &RoomKey,
    ttl: Duration,
) -> Result<(), MatchError> {
    rooms.raise_flag(key, RoomField::Ready2).await?;
    rooms.raise_flag(key, RoomField::Ready1).await?;
    rooms.expire(key, ttl).await?;
    info!(room = %key, "readiness flags raised");
    Ok(())
}

/// Block until both flags are raised or the budget runs out.
///
/// A room that disappears while waiting fails with [`MatchError::MatchAborted`].
pub async fn wait_for_both_ready(
    rooms: &RoomRepository,
    key: &RoomKey,
    policy: PollPolicy,
) -> Result<PollOutcome<()>, MatchError> {
    poll_until(policy, move || both_ready(rooms, key)).await
}

async fn both_ready(rooms: &RoomRepository, key: &RoomKey) -> Result<Option<()>, MatchError> {
    let ready1 = rooms.flag(key, RoomField::Ready1).await?;
    let ready2 = rooms.flag(key, RoomField::Ready2).await?;
    match (ready1, ready2) {
        (Some(true), Some(true)) => Ok(Some(())),
        (Some(_), Some(_)) => Ok(None),
        _ => Err(MatchError::MatchAborted(key.clone())),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::time::Instant;

    use super::*;
    use crate::{
        config::MatchSettings,
        dao::room_store::memory::MemoryRoomStore,
        services::lobby::{create_room, delete_room},
    };

    fn policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(20),
        }
    }

    const TTL: Duration = Duration::from_secs(300);

    async fn room() -> (RoomRepository, RoomKey) {
        let rooms = RoomRepository::new(Arc::new(MemoryRoomStore::new()));
        let key = create_room(&rooms, &MatchSettings::default()).await.unwrap();
        (rooms, key)
    }

    #[tokio::test(start_paused = true)]
    async fn already_ready_returns_without_sleeping() {
        let (rooms, key) = room().await;
        mark_both_ready(&rooms, &key, TTL).await.unwrap();

        let start = Instant::now();
        let outcome = wait_for_both_ready(&rooms, &key, policy()).await.unwrap();
        assert_eq!(outcome, PollOutcome::Done(()));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn host_flag_alone_is_not_enough() {
        let (rooms, key) = room().await;
        rooms.raise_flag(&key, RoomField::Ready1).await.unwrap();

        let outcome = wait_for_both_ready(&rooms, &key, policy()).await.unwrap();
        assert_eq!(outcome, PollOutcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn unblocks_when_joiner_arrives() {
        let (rooms, key) = room().await;
        let joiner_rooms = rooms.clone();
        let joiner_key = key.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(4)).await;
            mark_both_ready(&joiner_rooms, &joiner_key, TTL).await.unwrap();
        });

        let start = Instant::now();
        let outcome = wait_for_both_ready(&rooms, &key, policy()).await.unwrap();
        assert_eq!(outcome, PollOutcome::Done(()));
        assert!(start.elapsed() <= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn vanished_room_aborts() {
        let (rooms, key) = room().await;
        delete_room(&rooms, &key).await.unwrap();

        let err = wait_for_both_ready(&rooms, &key, policy())
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::MatchAborted(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn handshake_extends_room_lifetime() {
        let (rooms, key) = room().await;
        tokio::time::advance(Duration::from_secs(280)).await;
        mark_both_ready(&rooms, &key, TTL).await.unwrap();

        tokio::time::advance(Duration::from_secs(100)).await;
        assert!(rooms.exists(&key).await.unwrap());
        assert_eq!(rooms.flag(&key, RoomField::Ready1).await.unwrap(), Some(true));
    }
}
