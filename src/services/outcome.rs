use std::{fmt, str::FromStr};

use crate::{error::MatchError, state::Seat};

/// One of the three hand shapes, with the numeric code used in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// Beats scissors.
    Rock = 1,
    /// Beats rock.
    Paper = 2,
    /// Beats paper.
    Scissors = 3,
}

impl Move {
    /// All moves in code order.
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// Numeric code written to the store.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// The move this one defeats.
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Paper => Move::Rock,
            Move::Scissors => Move::Paper,
        }
    }
}

impl TryFrom<i64> for Move {
    type Error = MatchError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Move::Rock),
            2 => Ok(Move::Paper),
            3 => Ok(Move::Scissors),
            other => Err(MatchError::InvalidMove(format!(
                "{other} is not one of 1 (rock), 2 (paper) or 3 (scissors)"
            ))),
        }
    }
}

impl FromStr for Move {
    type Err = MatchError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let code = input
            .parse::<i64>()
            .map_err(|_| MatchError::InvalidMove(format!("`{input}` is not a number")))?;
        Move::try_from(code)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Rock => "rock",
            Move::Paper => "paper",
            Move::Scissors => "scissors",
        };
        f.write_str(name)
    }
}

/// Result of a match from one seat's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// This seat won.
    Win,
    /// The opponent won.
    Lose,
    /// Both played the same move.
    Draw,
}

impl Outcome {
    /// The same result seen from the other seat.
    pub fn flipped(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Lose,
            Outcome::Lose => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }
}

/// Decide the match for `perspective` given both seats' moves.
pub fn resolve(player1: Move, player2: Move, perspective: Seat) -> Outcome {
    let for_host = if player1 == player2 {
        Outcome::Draw
    } else if player1.beats() == player2 {
        Outcome::Win
    } else {
        Outcome::Lose
    };

    match perspective {
        Seat::Host => for_host,
        Seat::Joiner => for_host.flipped(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rock_beats_scissors() {
        assert_eq!(resolve(Move::Rock, Move::Scissors, Seat::Host), Outcome::Win);
        assert_eq!(
            resolve(Move::Rock, Move::Scissors, Seat::Joiner),
            Outcome::Lose
        );
    }

    #[test]
    fn equal_moves_draw() {
        assert_eq!(resolve(Move::Paper, Move::Paper, Seat::Host), Outcome::Draw);
        assert_eq!(
            resolve(Move::Paper, Move::Paper, Seat::Joiner),
            Outcome::Draw
        );
    }

    #[test]
    fn perspectives_are_opposite_for_every_pair() {
        for a in Move::ALL {
            for b in Move::ALL {
                let host = resolve(a, b, Seat::Host);
                let joiner = resolve(a, b, Seat::Joiner);
                if a == b {
                    assert_eq!((host, joiner), (Outcome::Draw, Outcome::Draw));
                } else {
                    assert_ne!(host, Outcome::Draw);
                    assert_eq!(joiner, host.flipped(), "{a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn dominance_is_cyclic() {
        assert_eq!(resolve(Move::Paper, Move::Rock, Seat::Host), Outcome::Win);
        assert_eq!(
            resolve(Move::Scissors, Move::Paper, Seat::Host),
            Outcome::Win
        );
        assert_eq!(resolve(Move::Scissors, Move::Rock, Seat::Host), Outcome::Lose);
    }

    #[test]
    fn parses_store_codes() {
        assert_eq!("1".parse::<Move>().unwrap(), Move::Rock);
        assert_eq!(" 3\n".parse::<Move>().unwrap(), Move::Scissors);
        assert_eq!(Move::Paper.code(), 2);
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        for input in ["0", "4", "-1", "", "rock"] {
            assert!(
                matches!(input.parse::<Move>(), Err(MatchError::InvalidMove(_))),
                "input {input:?}"
            );
        }
    }
}
