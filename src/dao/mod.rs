/// Room store field and key definitions.
pub mod models;
/// Typed room record operations on top of a room store.
pub mod room;
/// Key-value store abstraction and its backends.
pub mod room_store;
/// Storage abstraction layer for store failures.
pub mod storage;
