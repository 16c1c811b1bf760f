//! Library crate for jokenpo, a two-player rock-paper-scissors matchmaker coordinated
//! through a shared key-value store.

pub mod config;
pub mod dao;
pub mod error;
pub mod services;
pub mod state;

pub use config::{AppConfig, MatchSettings};
pub use error::MatchError;
pub use services::{
    outcome::{Move, Outcome, resolve},
    session::{MatchReport, MatchSession},
};
pub use state::Seat;
