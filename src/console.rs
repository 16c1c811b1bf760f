//! Text front-end: menus, prompts and the result reveal. Holds no match logic.

use std::time::Duration;

use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin, stdin},
    time::sleep,
};
use tracing::warn;

use jokenpo::{MatchError, MatchReport, MatchSession, Move, Outcome, Seat};

/// Top-level menu selection.
pub enum MenuChoice {
    Host,
    Join,
    Invalid,
}

pub struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(stdin()).lines(),
        }
    }

    pub fn banner(&self) {
        println!("==============================================");
        println!("   ✊ ROCK  🖐 PAPER  ✌ SCISSORS - Multiplayer ");
        println!("==============================================");
    }

    pub fn connected(&self) {
        println!("Connected to the room store.\n");
    }

    pub async fn menu(&mut self) -> MenuChoice {
        println!("1 - Create a room (player 1)");
        println!("2 - Join a room (player 2)");
        match self.prompt("Choice: ").await.trim() {
            "1" => MenuChoice::Host,
            "2" => MenuChoice::Join,
            _ => MenuChoice::Invalid,
        }
    }

    pub async fn room_token(&mut self) -> String {
        self.prompt("Room id (e.g. ab12cd or room:ab12cd): ").await
    }

    pub fn invalid_option(&self) {
        println!("Invalid option.");
    }

    pub fn room_ready(&self, session: &MatchSession) {
        match session.seat() {
            Seat::Host => {
                println!("\nRoom created: {}", session.room());
                println!("Share the id `{}` with your opponent.", session.room().token());
            }
            Seat::Joiner => println!("\nJoined room {}.", session.room()),
        }
    }

    pub fn waiting_for_opponent(&self, budget: Duration) {
        println!(
            "Waiting for both players (up to {}s)...",
            budget.as_secs()
        );
    }

    pub async fn move_choice(&mut self) -> String {
        println!("\nBoth players are ready!");
        println!("\nPick your move:");
        for choice in Move::ALL {
            println!("{} - {}  {}", choice.code(), glyph(choice), title(choice));
        }
        self.prompt("Your move: ").await
    }

    pub fn waiting_for_move(&self) {
        println!("Move sent. Waiting for the other player...");
    }

    pub async fn reveal(&self, report: &MatchReport) {
        println!("\nJo...");
        sleep(Duration::from_millis(400)).await;
        println!("Ken...");
        sleep(Duration::from_millis(400)).await;
        println!("Po!\n");
        sleep(Duration::from_millis(300)).await;

        println!(
            "Player 1: {}  |  Player 2: {}",
            glyph(report.player1),
            glyph(report.player2)
        );
        println!("-----------------------------------------");
        println!(
            "You played {}, your opponent played {}.",
            report.own_move(),
            report.opponent_move()
        );
        match report.outcome {
            Outcome::Win => println!("You win!"),
            Outcome::Lose => println!("You lose!"),
            Outcome::Draw => println!("Draw!"),
        }
        println!("\nMatch over. Room closed.");
    }

    pub fn abandoned(&self) {
        println!("\nMatch abandoned. Room closed.");
    }

    pub fn failure(&self, err: &MatchError) {
        let message = match err {
            MatchError::RoomNotFound(_) => "that room does not exist.".to_owned(),
            MatchError::RoomFull(_) => "that room already has two players.".to_owned(),
            MatchError::TimedOut { .. } => "time is up. Room closed.".to_owned(),
            MatchError::MatchAborted(_) => "the other player left. Room closed.".to_owned(),
            MatchError::InvalidMove(_) => "invalid move. Room closed.".to_owned(),
            other => other.to_string(),
        };
        println!("\nError: {message}");
    }

    /// Read one line; end of input or a read error count as an empty answer.
    async fn prompt(&mut self, label: &str) -> String {
        use std::io::Write;

        print!("{label}");
        let _ = std::io::stdout().flush();
        match self.lines.next_line().await {
            Ok(Some(line)) => line.trim().to_owned(),
            Ok(None) => String::new(),
            Err(err) => {
                warn!(error = %err, "failed to read from stdin");
                String::new()
            }
        }
    }
}

fn glyph(choice: Move) -> &'static str {
    match choice {
        Move::Rock => "👊",
        Move::Paper => "🖐",
        Move::Scissors => "✌",
    }
}

fn title(choice: Move) -> &'static str {
    match choice {
        Move::Rock => "Rock",
        Move::Paper => "Paper",
        Move::Scissors => "Scissors",
    }
}
