//! Memory (§4.5). Flip two cards; matches keep the turn and score a point,
//! mismatches hide again after a short delay handled by a server timer.

use crate::util::{parse_move, seat_of};
use engine_core::{now_millis, GameEngine, Outcome, TimerCommand};
use protocol::{ErrorKind, PlayerId};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

const HIDE_TIMER: u32 = 0;
const HIDE_DELAY_MS: u64 = 1_000;
const PAIR_COUNT: usize = 8;

#[derive(Deserialize)]
struct MoveInput {
    card_idx: usize,
}

struct Card {
    value: u8,
    matched: bool,
}

pub struct Memory {
    players: Vec<PlayerId>,
    mode: String,
    cards: Vec<Card>,
    first_flip: Option<usize>,
    revealed_temp: Vec<usize>,
    scores: HashMap<PlayerId, u64>,
    turn: usize,
    over: bool,
    game_start_time: u64,
}

impl GameEngine for Memory {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        let mut values: Vec<u8> = (0..PAIR_COUNT as u8).flat_map(|v| [v, v]).collect();
        values.shuffle(&mut rand::rng());
        let cards = values.into_iter().map(|value| Card { value, matched: false }).collect();
        let mut scores = HashMap::new();
        for p in players {
            scores.insert(p.clone(), 0);
        }
        Memory {
            players: players.to_vec(),
            mode: mode.to_string(),
            cards,
            first_flip: None,
            revealed_temp: Vec::new(),
            scores,
            turn: 0,
            over: false,
            game_start_time: now_millis(),
        }
    }

    fn apply_move(&mut self, player_id: &str, payload: Value) -> Outcome {
        if self.over {
            return Outcome::reject(ErrorKind::AlreadyOver);
        }
        if !self.revealed_temp.is_empty() {
            return Outcome::reject(ErrorKind::IllegalMove("cards still revealed".into()));
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
        if input.card_idx >= self.cards.len() || self.cards[input.card_idx].matched {
            return Outcome::reject(ErrorKind::IllegalMove("invalid card".into()));
        }
        if self.first_flip == Some(input.card_idx) {
            return Outcome::reject(ErrorKind::IllegalMove("card already flipped".into()));
        }

        let Some(first) = self.first_flip else {
            self.first_flip = Some(input.card_idx);
            return Outcome::changed();
        };

        if self.cards[first].value == self.cards[input.card_idx].value {
            self.cards[first].matched = true;
            self.cards[input.card_idx].matched = true;
            *self.scores.entry(player_id.to_string()).or_insert(0) += 1;
            self.first_flip = None;
            self.over = self.cards.iter().all(|c| c.matched);
            if self.over {
                Outcome::changed_game_over()
            } else {
                Outcome::changed()
            }
        } else {
            self.revealed_temp = vec![first, input.card_idx];
            self.first_flip = None;
            Outcome::changed().with_timer(TimerCommand::Set { timer_id: HIDE_TIMER, duration_ms: HIDE_DELAY_MS })
        }
    }

    fn snapshot(&self) -> Value {
        let faces: Vec<Value> = self
            .cards
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let visible = c.matched || self.first_flip == Some(i) || self.revealed_temp.contains(&i);
                if visible {
                    json!(c.value)
                } else {
                    Value::Null
                }
            })
            .collect();
        json!({
            "players": self.players,
            "game_mode": self.mode,
            "faces": faces,
            "matched": self.cards.iter().map(|c| c.matched).collect::<Vec<_>>(),
            "scores": self.scores,
            "next_turn": self.players.get(self.turn),
            "game_over": self.over,
            "game_start_time": self.game_start_time,
        })
    }

    fn is_over(&self) -> bool {
        self.over
    }

    fn winner(&self) -> Option<String> {
        if !self.over {
            return None;
        }
        self.scores.iter().max_by_key(|(_, s)| **s).map(|(p, _)| p.clone())
    }

    fn min_players() -> u8 {
        1
    }

    fn max_players() -> u8 {
        8
    }

    fn joinable_mid_game() -> bool {
        true
    }

    fn on_timer(&mut self, timer_id: u32) -> Outcome {
        if timer_id != HIDE_TIMER || self.revealed_temp.is_empty() {
            return Outcome::changed();
        }
        self.revealed_temp.clear();
        self.turn = (self.turn + 1) % self.players.len();
        Outcome::changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(values: Vec<u8>) -> Memory {
        let mut game = Memory::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.cards = values.into_iter().map(|value| Card { value, matched: false }).collect();
        game
    }

    #[test]
    fn i8_matched_never_unmatches_and_scores_are_monotonic() {
        let mut game = make(vec![1, 1, 2, 2]);
        game.apply_move("p1", json!({"card_idx": 0}));
        game.apply_move("p1", json!({"card_idx": 1}));
        assert!(game.cards[0].matched && game.cards[1].matched);
        assert_eq!(game.scores["p1"], 1);
        assert_eq!(game.turn, 0, "matching pair keeps the turn");
    }

    #[test]
    fn mismatch_schedules_hide_and_locks_further_moves() {
        let mut game = make(vec![1, 2, 1, 2]);
        game.apply_move("p1", json!({"card_idx": 0}));
        let outcome = game.apply_move("p1", json!({"card_idx": 1}));
        assert!(matches!(outcome, Outcome::Changed { .. }));
        let blocked = game.apply_move("p2", json!({"card_idx": 2}));
        assert!(matches!(blocked, Outcome::Rejected(ErrorKind::IllegalMove(_))));
    }

    #[test]
    fn hide_timer_advances_turn() {
        let mut game = make(vec![1, 2, 1, 2]);
        game.apply_move("p1", json!({"card_idx": 0}));
        game.apply_move("p1", json!({"card_idx": 1}));
        game.on_timer(HIDE_TIMER);
        assert!(game.revealed_temp.is_empty());
        assert_eq!(game.turn, 1);
    }

    #[test]
    fn game_over_once_all_pairs_matched() {
        let mut game = make(vec![1, 1, 2, 2]);
        game.apply_move("p1", json!({"card_idx": 0}));
        game.apply_move("p1", json!({"card_idx": 1}));
        game.apply_move("p1", json!({"card_idx": 2}));
        game.apply_move("p1", json!({"card_idx": 3}));
        assert!(game.is_over());
    }
}
