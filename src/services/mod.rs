/// Two-party readiness barrier.
pub mod barrier;
/// Simultaneous move submission and reveal.
pub mod exchange;
/// Room identity, creation, admission and deletion.
pub mod lobby;
/// Move domain and win/lose/draw resolution.
pub mod outcome;
/// Bounded fixed-interval polling shared by the waits.
pub mod poll;
/// Scoped per-match handle driving the whole protocol.
pub mod session;
