//! Trivia (§4.5). Simpler cousin of Jeopardy: fixed +100 per correct
//! answer, no team or speed variants.

use engine_core::{now_millis, GameEngine, Outcome};
use protocol::{ErrorKind, PlayerId};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

struct Question {
    prompt: &'static str,
    options: [&'static str; 4],
    correct_idx: usize,
}

const BANK: &[Question] = &[
    Question { prompt: "Fastest land animal", options: ["Lion", "Cheetah", "Horse", "Ostrich"], correct_idx: 1 },
    Question { prompt: "Smallest prime number", options: ["0", "1", "2", "3"], correct_idx: 2 },
    Question { prompt: "Capital of Japan", options: ["Osaka", "Kyoto", "Tokyo", "Nagoya"], correct_idx: 2 },
    Question { prompt: "Number of continents", options: ["5", "6", "7", "8"], correct_idx: 2 },
];

#[derive(Deserialize)]
struct AnswerInput {
    idx: usize,
}

pub struct Trivia {
    players: Vec<PlayerId>,
    mode: String,
    scores: HashMap<PlayerId, u64>,
    current_q: usize,
    over: bool,
    game_start_time: u64,
}

impl GameEngine for Trivia {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        let mut scores = HashMap::new();
        for p in players {
            scores.insert(p.clone(), 0);
        }
        Trivia { players: players.to_vec(), mode: mode.to_string(), scores, current_q: 0, over: false, game_start_time: now_millis() }
    }

    fn apply_move(&mut self, player_id: &str, payload: Value) -> Outcome {
        if self.over {
            return Outcome::reject(ErrorKind::AlreadyOver);
        }
        if !self.players.iter().any(|p| p == player_id) {
            return Outcome::reject(ErrorKind::Forbidden("not seated in this game".into()));
        }
        let input: AnswerInput = match serde_json::from_value(payload) {
            Ok(v) => v,
            Err(e) => return Outcome::reject(ErrorKind::ValidationFailed(format!("{e}"))),
        };
        let question = &BANK[self.current_q];
        if input.idx >= question.options.len() {
            return Outcome::reject(ErrorKind::ValidationFailed("option index out of range".into()));
        }
        if input.idx == question.correct_idx {
            *self.scores.entry(player_id.to_string()).or_insert(0) += 100;
        }
        self.current_q += 1;
        if self.current_q >= BANK.len() {
            self.over = true;
            Outcome::changed_game_over()
        } else {
            Outcome::changed()
        }
    }

    fn snapshot(&self) -> Value {
        let question = BANK.get(self.current_q);
        json!({
            "players": self.players,
            "game_mode": self.mode,
            "current_q": self.current_q,
            "prompt": question.map(|q| q.prompt),
            "options": question.map(|q| q.options),
            "scores": self.scores,
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_answer_scores_100() {
        let mut game = Trivia::init(&["p1".to_string()], "classic");
        game.apply_move("p1", json!({"idx": 1}));
        assert_eq!(game.scores["p1"], 100);
    }

    #[test]
    fn always_advances_regardless_of_correctness() {
        let mut game = Trivia::init(&["p1".to_string()], "classic");
        game.apply_move("p1", json!({"idx": 0}));
        assert_eq!(game.current_q, 1);
    }

    #[test]
    fn ends_at_question_exhaustion() {
        let mut game = Trivia::init(&["p1".to_string()], "classic");
        for _ in 0..BANK.len() {
            game.apply_move("p1", json!({"idx": 0}));
        }
        assert!(game.is_over());
    }
}
