//! Room identity, creation, admission and teardown.

use rand::{Rng, rng};
use tracing::{info, warn};

use crate::{
    config::MatchSettings,
    dao::{
        models::{RoomField, RoomKey},
        room::RoomRepository,
    },
    error::MatchError,
};

/// Characters a room token is drawn from.
const ROOM_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Draw `length` characters uniformly from the lowercase alphanumeric alphabet.
pub fn generate_room_id(length: usize) -> String {
    let mut rng = rng();
    (0..length)
        .map(|_| ROOM_ID_ALPHABET[rng.random_range(0..ROOM_ID_ALPHABET.len())] as char)
        .collect()
}

/// Allocate a fresh room with default fields and an expiry, returning its canonical key.
///
/// Tokens that already name a live room are discarded and redrawn, up to
/// `max_room_id_attempts` times.
pub async fn create_room(
    rooms: &RoomRepository,
    settings: &MatchSettings,
) -> Result<RoomKey, MatchError> {
    let attempts = settings.max_room_id_attempts.max(1);

    for attempt in 1..=attempts {
        let key = RoomKey::normalize(&generate_room_id(settings.room_id_length));
        if rooms.exists(&key).await? {
            warn!(room = %key, attempt, "generated room id already in use; retrying");
            continue;
        }

        rooms.create(&key, settings.room_ttl).await?;
        info!(room = %key, ttl_secs = settings.room_ttl.as_secs(), "room created");
        return Ok(key);
    }

    Err(MatchError::RoomIdCollision { attempts })
}

/// Check that `input` names a room with a free second seat and return its canonical key.
///
/// Admission only reads the room. Raising the readiness flags is the caller's next step.
pub async fn join_room(rooms: &RoomRepository, input: &str) -> Result<RoomKey, MatchError> {
    let key = RoomKey::normalize(input);

    if !rooms.exists(&key).await? {
        return Err(MatchError::RoomNotFound(key));
    }

    match rooms.field(&key, RoomField::Player2).await? {
        Some(current) if !current.is_empty() => Err(MatchError::RoomFull(key)),
        // expired between the two reads
        None => Err(MatchError::RoomNotFound(key)),
        Some(_) => {
            info!(room = %key, "room admission granted");
            Ok(key)
        }
    }
}

/// Remove the room from the store. Deleting a missing room is not an error.
pub async fn delete_room(rooms: &RoomRepository, key: &RoomKey) -> Result<(), MatchError> {
    rooms.delete(key).await?;
    info!(room = %key, "room deleted");
    Ok(())
}
