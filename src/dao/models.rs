use std::fmt;

/// Namespace prefix shared by every room key in the store.
pub const ROOM_PREFIX: &str = "room:";
/// Stored value of a readiness flag that has not been raised yet.
pub const FLAG_DOWN: &str = "0";
/// Stored value of a raised readiness flag.
pub const FLAG_UP: &str = "1";
/// Stored value of a move field nobody has written yet.
pub const EMPTY_MOVE: &str = "";

/// Canonical, prefixed key of a room record (`room:<token>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomKey(String);

impl RoomKey {
    /// Build the canonical key from either a bare token or an already prefixed key.
    ///
    /// Surrounding whitespace is ignored; applying it to its own output is a no-op.
    pub fn normalize(input: &str) -> Self {
        let input = input.trim();
        if input.starts_with(ROOM_PREFIX) {
            Self(input.to_owned())
        } else {
            Self(format!("{ROOM_PREFIX}{input}"))
        }
    }

    /// Token part of the key, without the namespace prefix.
    pub fn token(&self) -> &str {
        self.0.strip_prefix(ROOM_PREFIX).unwrap_or(&self.0)
    }

    /// Full key as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash fields of a room record. Each field has exactly one writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomField {
    /// Host's move, written by the host.
    Player1,
    /// Joiner's move, written by the joiner.
    Player2,
    /// Host readiness, raised by the joiner on admission.
    Ready1,
    /// Joiner readiness, raised by the joiner on admission.
    Ready2,
}

impl RoomField {
    /// All fields in the order they are written when a room is created.
    pub const ALL: [RoomField; 4] = [
        RoomField::Player1,
        RoomField::Player2,
        RoomField::Ready1,
        RoomField::Ready2,
    ];

    /// Field name inside the stored hash.
    pub fn as_str(self) -> &'static str {
        match self {
            RoomField::Player1 => "player1",
            RoomField::Player2 => "player2",
            RoomField::Ready1 => "ready1",
            RoomField::Ready2 => "ready2",
        }
    }

    /// Value the field holds right after room creation.
    pub fn default_value(self) -> &'static str {
        match self {
            RoomField::Player1 | RoomField::Player2 => EMPTY_MOVE,
            RoomField::Ready1 | RoomField::Ready2 => FLAG_DOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_prefix_to_bare_token() {
        assert_eq!(RoomKey::normalize("ab12cd").as_str(), "room:ab12cd");
    }

    #[test]
    fn normalize_keeps_prefixed_key() {
        assert_eq!(RoomKey::normalize("room:ab12cd").as_str(), "room:ab12cd");
        assert_eq!(RoomKey::normalize("  room:ab12cd\n").as_str(), "room:ab12cd");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["ab12cd", "room:ab12cd", " zz9 ", "", "room:"] {
            let once = RoomKey::normalize(input);
            let twice = RoomKey::normalize(once.as_str());
            assert_eq!(once, twice, "input {input:?}");
        }
    }

    #[test]
    fn token_strips_prefix() {
        assert_eq!(RoomKey::normalize("room:xy98zz").token(), "xy98zz");
    }

    #[test]
    fn defaults_match_wire_format() {
        assert_eq!(RoomField::Player1.default_value(), "");
        assert_eq!(RoomField::Ready2.default_value(), "0");
        assert_eq!(RoomField::Ready1.as_str(), "ready1");
    }
}
