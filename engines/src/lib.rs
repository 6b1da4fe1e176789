//! Concrete game engines, one module per type, wrapped by the tagged-variant
//! [`Engine`] enum so the room layer dispatches through a single `match`
//! instead of a `dyn GameEngine` trait object (§9 redesign note).

mod battleship;
mod checkers;
mod connect_four;
mod dots_and_boxes;
mod hangman;
mod jeopardy;
mod mafia;
mod memory;
mod rps;
mod tictactoe;
mod trivia;
mod uno;
mod util;

use battleship::Battleship;
use checkers::Checkers;
use connect_four::ConnectFour;
use dots_and_boxes::DotsAndBoxes;
use engine_core::{GameEngine, Outcome, TimerCommand};
use hangman::Hangman;
use jeopardy::Jeopardy;
use mafia::Mafia;
use memory::Memory;
use protocol::{GameType, PlayerId};
use rps::Rps;
use serde_json::Value;
use tictactoe::TicTacToe;
use trivia::Trivia;
use uno::Uno;

/// One variant per [`GameType`], each wrapping its concrete engine. This is
/// the only place in the workspace that names all twelve engines at once.
pub enum Engine {
    TicTacToe(TicTacToe),
    Jeopardy(Jeopardy),
    Hangman(Hangman),
    Memory(Memory),
    Battleship(Battleship),
    Trivia(Trivia),
    Rps(Rps),
    ConnectFour(ConnectFour),
    Checkers(Checkers),
    DotsAndBoxes(DotsAndBoxes),
    Uno(Uno),
    Mafia(Mafia),
}

impl Engine {
    pub fn new(game_type: GameType, players: &[PlayerId], mode: &str) -> Self {
        match game_type {
            GameType::TicTacToe => Engine::TicTacToe(TicTacToe::init(players, mode)),
            GameType::Jeopardy => Engine::Jeopardy(Jeopardy::init(players, mode)),
            GameType::Hangman => Engine::Hangman(Hangman::init(players, mode)),
            GameType::Memory => Engine::Memory(Memory::init(players, mode)),
            GameType::Battleship => Engine::Battleship(Battleship::init(players, mode)),
            GameType::Trivia => Engine::Trivia(Trivia::init(players, mode)),
            GameType::Rps => Engine::Rps(Rps::init(players, mode)),
            GameType::ConnectFour => Engine::ConnectFour(ConnectFour::init(players, mode)),
            GameType::Checkers => Engine::Checkers(Checkers::init(players, mode)),
            GameType::DotsAndBoxes => Engine::DotsAndBoxes(DotsAndBoxes::init(players, mode)),
            GameType::Uno => Engine::Uno(Uno::init(players, mode)),
            GameType::Mafia => Engine::Mafia(Mafia::init(players, mode)),
        }
    }

    pub fn game_type(&self) -> GameType {
        match self {
            Engine::TicTacToe(_) => GameType::TicTacToe,
            Engine::Jeopardy(_) => GameType::Jeopardy,
            Engine::Hangman(_) => GameType::Hangman,
            Engine::Memory(_) => GameType::Memory,
            Engine::Battleship(_) => GameType::Battleship,
            Engine::Trivia(_) => GameType::Trivia,
            Engine::Rps(_) => GameType::Rps,
            Engine::ConnectFour(_) => GameType::ConnectFour,
            Engine::Checkers(_) => GameType::Checkers,
            Engine::DotsAndBoxes(_) => GameType::DotsAndBoxes,
            Engine::Uno(_) => GameType::Uno,
            Engine::Mafia(_) => GameType::Mafia,
        }
    }

    pub fn apply_move(&mut self, player_id: &str, payload: Value) -> Outcome {
        match self {
            Engine::TicTacToe(e) => e.apply_move(player_id, payload),
            Engine::Jeopardy(e) => e.apply_move(player_id, payload),
            Engine::Hangman(e) => e.apply_move(player_id, payload),
            Engine::Memory(e) => e.apply_move(player_id, payload),
            Engine::Battleship(e) => e.apply_move(player_id, payload),
            Engine::Trivia(e) => e.apply_move(player_id, payload),
            Engine::Rps(e) => e.apply_move(player_id, payload),
            Engine::ConnectFour(e) => e.apply_move(player_id, payload),
            Engine::Checkers(e) => e.apply_move(player_id, payload),
            Engine::DotsAndBoxes(e) => e.apply_move(player_id, payload),
            Engine::Uno(e) => e.apply_move(player_id, payload),
            Engine::Mafia(e) => e.apply_move(player_id, payload),
        }
    }

    pub fn on_timer(&mut self, timer_id: u32) -> Outcome {
        match self {
            Engine::TicTacToe(e) => e.on_timer(timer_id),
            Engine::Jeopardy(e) => e.on_timer(timer_id),
            Engine::Hangman(e) => e.on_timer(timer_id),
            Engine::Memory(e) => e.on_timer(timer_id),
            Engine::Battleship(e) => e.on_timer(timer_id),
            Engine::Trivia(e) => e.on_timer(timer_id),
            Engine::Rps(e) => e.on_timer(timer_id),
            Engine::ConnectFour(e) => e.on_timer(timer_id),
            Engine::Checkers(e) => e.on_timer(timer_id),
            Engine::DotsAndBoxes(e) => e.on_timer(timer_id),
            Engine::Uno(e) => e.on_timer(timer_id),
            Engine::Mafia(e) => e.on_timer(timer_id),
        }
    }

    pub fn snapshot(&self) -> Value {
        match self {
            Engine::TicTacToe(e) => e.snapshot(),
            Engine::Jeopardy(e) => e.snapshot(),
            Engine::Hangman(e) => e.snapshot(),
            Engine::Memory(e) => e.snapshot(),
            Engine::Battleship(e) => e.snapshot(),
            Engine::Trivia(e) => e.snapshot(),
            Engine::Rps(e) => e.snapshot(),
            Engine::ConnectFour(e) => e.snapshot(),
            Engine::Checkers(e) => e.snapshot(),
            Engine::DotsAndBoxes(e) => e.snapshot(),
            Engine::Uno(e) => e.snapshot(),
            Engine::Mafia(e) => e.snapshot(),
        }
    }

    pub fn is_over(&self) -> bool {
        match self {
            Engine::TicTacToe(e) => e.is_over(),
            Engine::Jeopardy(e) => e.is_over(),
            Engine::Hangman(e) => e.is_over(),
            Engine::Memory(e) => e.is_over(),
            Engine::Battleship(e) => e.is_over(),
            Engine::Trivia(e) => e.is_over(),
            Engine::Rps(e) => e.is_over(),
            Engine::ConnectFour(e) => e.is_over(),
            Engine::Checkers(e) => e.is_over(),
            Engine::DotsAndBoxes(e) => e.is_over(),
            Engine::Uno(e) => e.is_over(),
            Engine::Mafia(e) => e.is_over(),
        }
    }

    pub fn winner(&self) -> Option<String> {
        match self {
            Engine::TicTacToe(e) => e.winner(),
            Engine::Jeopardy(e) => e.winner(),
            Engine::Hangman(e) => e.winner(),
            Engine::Memory(e) => e.winner(),
            Engine::Battleship(e) => e.winner(),
            Engine::Trivia(e) => e.winner(),
            Engine::Rps(e) => e.winner(),
            Engine::ConnectFour(e) => e.winner(),
            Engine::Checkers(e) => e.winner(),
            Engine::DotsAndBoxes(e) => e.winner(),
            Engine::Uno(e) => e.winner(),
            Engine::Mafia(e) => e.winner(),
        }
    }

    /// Timers to arm the moment this engine was created (§9 redesign note),
    /// e.g. a speed-mode's first question/turn deadline.
    pub fn initial_timers(&self) -> Vec<TimerCommand> {
        match self {
            Engine::TicTacToe(e) => e.initial_timers(),
            Engine::Jeopardy(e) => e.initial_timers(),
            Engine::Hangman(e) => e.initial_timers(),
            Engine::Memory(e) => e.initial_timers(),
            Engine::Battleship(e) => e.initial_timers(),
            Engine::Trivia(e) => e.initial_timers(),
            Engine::Rps(e) => e.initial_timers(),
            Engine::ConnectFour(e) => e.initial_timers(),
            Engine::Checkers(e) => e.initial_timers(),
            Engine::DotsAndBoxes(e) => e.initial_timers(),
            Engine::Uno(e) => e.initial_timers(),
            Engine::Mafia(e) => e.initial_timers(),
        }
    }

    pub fn min_players(game_type: GameType) -> u8 {
        match game_type {
            GameType::TicTacToe => TicTacToe::min_players(),
            GameType::Jeopardy => Jeopardy::min_players(),
            GameType::Hangman => Hangman::min_players(),
            GameType::Memory => Memory::min_players(),
            GameType::Battleship => Battleship::min_players(),
            GameType::Trivia => Trivia::min_players(),
            GameType::Rps => Rps::min_players(),
            GameType::ConnectFour => ConnectFour::min_players(),
            GameType::Checkers => Checkers::min_players(),
            GameType::DotsAndBoxes => DotsAndBoxes::min_players(),
            GameType::Uno => Uno::min_players(),
            GameType::Mafia => Mafia::min_players(),
        }
    }

    pub fn max_players(game_type: GameType) -> u8 {
        match game_type {
            GameType::TicTacToe => TicTacToe::max_players(),
            GameType::Jeopardy => Jeopardy::max_players(),
            GameType::Hangman => Hangman::max_players(),
            GameType::Memory => Memory::max_players(),
            GameType::Battleship => Battleship::max_players(),
            GameType::Trivia => Trivia::max_players(),
            GameType::Rps => Rps::max_players(),
            GameType::ConnectFour => ConnectFour::max_players(),
            GameType::Checkers => Checkers::max_players(),
            GameType::DotsAndBoxes => DotsAndBoxes::max_players(),
            GameType::Uno => Uno::max_players(),
            GameType::Mafia => Mafia::max_players(),
        }
    }

    pub fn joinable_mid_game(game_type: GameType) -> bool {
        match game_type {
            GameType::TicTacToe => TicTacToe::joinable_mid_game(),
            GameType::Jeopardy => Jeopardy::joinable_mid_game(),
            GameType::Hangman => Hangman::joinable_mid_game(),
            GameType::Memory => Memory::joinable_mid_game(),
            GameType::Battleship => Battleship::joinable_mid_game(),
            GameType::Trivia => Trivia::joinable_mid_game(),
            GameType::Rps => Rps::joinable_mid_game(),
            GameType::ConnectFour => ConnectFour::joinable_mid_game(),
            GameType::Checkers => Checkers::joinable_mid_game(),
            GameType::DotsAndBoxes => DotsAndBoxes::joinable_mid_game(),
            GameType::Uno => Uno::joinable_mid_game(),
            GameType::Mafia => Mafia::joinable_mid_game(),
        }
    }
}
