//! Hangman (§4.5). Two players alternate guessing letters of a shared secret
//! word; six wrong guesses reveals the word and the round is lost.

use crate::util::{parse_move, seat_of};
use engine_core::{now_millis, GameEngine, Outcome};
use protocol::{ErrorKind, PlayerId};
use rand::seq::IndexedRandom;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;

const MAX_WRONG: u32 = 6;
const WORD_BANK: &[&str] = &["RUST", "KEYBOARD", "MULTIPLAYER", "GALAXY", "PUZZLE", "COMPILER"];

#[derive(Deserialize)]
struct MoveInput {
    letter: String,
}

pub struct Hangman {
    players: Vec<PlayerId>,
    mode: String,
    word: String,
    guessed: HashSet<char>,
    wrong_count: u32,
    turn: usize,
    over: bool,
    winner: Option<String>,
    game_start_time: u64,
}

impl Hangman {
    fn display_word(&self) -> String {
        self.word
            .chars()
            .map(|c| if self.guessed.contains(&c) { c } else { '_' })
            .collect()
    }

    fn fully_revealed(&self) -> bool {
        self.word.chars().all(|c| self.guessed.contains(&c))
    }
}

impl GameEngine for Hangman {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        let word = WORD_BANK
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or("RUST")
            .to_string();
        Hangman {
            players: players.to_vec(),
            mode: mode.to_string(),
            word,
            guessed: HashSet::new(),
            wrong_count: 0,
            turn: 0,
            over: false,
            winner: None,
            game_start_time: now_millis(),
        }
    }

    fn apply_move(&mut self, player_id: &str, payload: Value) -> Outcome {
        if self.over {
            return Outcome::reject(ErrorKind::AlreadyOver);
        }
        let Some(seat) = seat_of(&self.players, player_id) else {
            return Outcome::reject(ErrorKind::NotYourTurn);
        };
        if seat != self.turn {
            return Outcome::reject(ErrorKind::NotYourTurn);
        }
        let input: MoveInput = match parse_move(payload.as_object().cloned().unwrap_or_default()) {
            Ok(v) => v,
            Err(e) => return Outcome::reject(e),
        };
        let Some(raw) = input.letter.chars().next() else {
            return Outcome::reject(ErrorKind::ValidationFailed("empty letter".into()));
        };
        let letter = raw.to_ascii_uppercase();
        if !letter.is_ascii_alphabetic() {
            return Outcome::reject(ErrorKind::ValidationFailed("letter must be A-Z".into()));
        }
        if self.guessed.contains(&letter) {
            return Outcome::reject(ErrorKind::Duplicate("letter already guessed".into()));
        }

        self.guessed.insert(letter);
        let correct = self.word.contains(letter);
        if !correct {
            self.wrong_count += 1;
        }

        if self.wrong_count >= MAX_WRONG {
            self.over = true;
            self.winner = Some("lose".to_string());
        } else if self.fully_revealed() {
            self.over = true;
            self.winner = Some(player_id.to_string());
        } else {
            self.turn = 1 - self.turn;
        }

        if self.over {
            Outcome::changed_game_over()
        } else {
            Outcome::changed()
        }
    }

    fn snapshot(&self) -> Value {
        json!({
            "players": self.players,
            "game_mode": self.mode,
            "display_word": self.display_word(),
            "word": if self.over { Some(self.word.clone()) } else { None },
            "wrong_count": self.wrong_count,
            "max_wrong": MAX_WRONG,
            "next_turn": self.players.get(self.turn),
            "game_over": self.over,
            "winner": self.winner.clone(),
            "game_start_time": self.game_start_time,
        })
    }

    fn is_over(&self) -> bool {
        self.over
    }

    fn winner(&self) -> Option<String> {
        self.winner.clone()
    }

    fn min_players() -> u8 {
        2
    }

    fn max_players() -> u8 {
        2
    }

    fn joinable_mid_game() -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make() -> Hangman {
        let mut game = Hangman::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.word = "CAT".to_string();
        game
    }

    #[test]
    fn duplicate_letter_rejected() {
        let mut game = make();
        game.apply_move("p1", json!({"letter": "c"}));
        let outcome = game.apply_move("p2", json!({"letter": "C"}));
        assert!(matches!(outcome, Outcome::Rejected(ErrorKind::Duplicate(_))));
    }

    #[test]
    fn out_of_turn_rejected() {
        let mut game = make();
        let outcome = game.apply_move("p2", json!({"letter": "a"}));
        assert!(matches!(outcome, Outcome::Rejected(ErrorKind::NotYourTurn)));
    }

    #[test]
    fn six_wrong_guesses_reveals_word_and_loses() {
        let mut game = make();
        for (player, letter) in [("p1", "x"), ("p2", "y"), ("p1", "z"), ("p2", "q"), ("p1", "w"), ("p2", "v")] {
            game.apply_move(player, json!({"letter": letter}));
        }
        assert!(game.is_over());
        assert_eq!(game.winner(), Some("lose".to_string()));
    }

    #[test]
    fn full_reveal_wins() {
        let mut game = make();
        game.apply_move("p1", json!({"letter": "c"}));
        game.apply_move("p2", json!({"letter": "a"}));
        game.apply_move("p1", json!({"letter": "t"}));
        assert!(game.is_over());
        assert_eq!(game.winner(), Some("p1".to_string()), "the player who guessed the last letter wins");
    }

    #[test]
    fn turn_only_advances_on_non_terminal_guess() {
        let mut game = make();
        game.apply_move("p1", json!({"letter": "c"}));
        assert_eq!(game.turn, 1);
    }
}
