//! Jeopardy (§4.5). Any seated player may answer the active question;
//! whoever answers first advances the board regardless of correctness.

use engine_core::{now_millis, GameEngine, Outcome, TimerCommand};
use protocol::{ErrorKind, PlayerId};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

const SPEED_TIMER: u32 = 0;
const SPEED_QUESTION_MS: u64 = 10_000;

struct Question {
    category: &'static str,
    value: u32,
    prompt: &'static str,
    answer: &'static str,
}

const BANK: &[Question] = &[
    Question { category: "Geography", value: 100, prompt: "Largest ocean on Earth", answer: "pacific" },
    Question { category: "Science", value: 200, prompt: "Chemical symbol for gold", answer: "au" },
    Question { category: "History", value: 300, prompt: "Year the Berlin Wall fell", answer: "1989" },
    Question { category: "Literature", value: 400, prompt: "Author of 'Hamlet'", answer: "shakespeare" },
    Question { category: "Sports", value: 500, prompt: "Number of players on a soccer team", answer: "11" },
];

#[derive(Deserialize)]
struct AnswerInput {
    #[serde(default)]
    answer: Option<String>,
}

pub struct Jeopardy {
    players: Vec<PlayerId>,
    mode: String,
    scores: HashMap<PlayerId, u64>,
    teams: HashMap<PlayerId, u8>,
    current_q: usize,
    over: bool,
    game_start_time: u64,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

impl Jeopardy {
    fn finish_if_exhausted(&mut self) {
        if self.current_q >= BANK.len() {
            self.over = true;
        }
    }

    fn team_totals(&self) -> Value {
        let mut t1 = 0u64;
        let mut t2 = 0u64;
        for (player, score) in &self.scores {
            match self.teams.get(player) {
                Some(1) => t1 += score,
                Some(2) => t2 += score,
                _ => {}
            }
        }
        json!({ "team1": t1, "team2": t2 })
    }
}

impl GameEngine for Jeopardy {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        let mut scores = HashMap::new();
        let mut teams = HashMap::new();
        for (i, p) in players.iter().enumerate() {
            scores.insert(p.clone(), 0);
            if mode == "teams" {
                teams.insert(p.clone(), if i % 2 == 0 { 1 } else { 2 });
            }
        }
        Jeopardy {
            players: players.to_vec(),
            mode: mode.to_string(),
            scores,
            teams,
            current_q: 0,
            over: false,
            game_start_time: now_millis(),
        }
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
        let Some(given) = input.answer else {
            return Outcome::reject(ErrorKind::ValidationFailed("missing answer".into()));
        };

        let question = &BANK[self.current_q];
        if normalize(&given) == normalize(question.answer) {
            *self.scores.entry(player_id.to_string()).or_insert(0) += question.value as u64;
        }
        self.current_q += 1;
        self.finish_if_exhausted();

        let mut outcome = if self.over { Outcome::changed_game_over() } else { Outcome::changed() };
        if self.mode == "speed" && !self.over {
            outcome = outcome.with_timer(TimerCommand::Set { timer_id: SPEED_TIMER, duration_ms: SPEED_QUESTION_MS });
        }
        outcome
    }

    fn initial_timers(&self) -> Vec<TimerCommand> {
        if self.mode == "speed" && !self.over {
            vec![TimerCommand::Set { timer_id: SPEED_TIMER, duration_ms: SPEED_QUESTION_MS }]
        } else {
            Vec::new()
        }
    }

    fn snapshot(&self) -> Value {
        let question = BANK.get(self.current_q);
        json!({
            "players": self.players,
            "game_mode": self.mode,
            "game_over": self.over,
            "current_q": self.current_q,
            "category": question.map(|q| q.category),
            "prompt": question.map(|q| q.prompt),
            "value": question.map(|q| q.value),
            "scores": self.scores,
            "teams": if self.mode == "teams" { Some(self.team_totals()) } else { None },
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
        self.scores
            .iter()
            .max_by_key(|(_, score)| **score)
            .map(|(player, _)| player.clone())
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
        if timer_id != SPEED_TIMER || self.over || self.mode != "speed" {
            return Outcome::changed();
        }
        self.current_q += 1;
        self.finish_if_exhausted();
        let mut outcome = Outcome::timeout("question timer expired", self.over);
        if !self.over {
            outcome = outcome.with_timer(TimerCommand::Set { timer_id: SPEED_TIMER, duration_ms: SPEED_QUESTION_MS });
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_answer_scores_and_advances() {
        let mut game = Jeopardy::init(&["p1".to_string()], "classic");
        let outcome = game.apply_move("p1", json!({"answer": " Pacific "}));
        assert!(matches!(outcome, Outcome::Changed { .. }));
        assert_eq!(game.scores["p1"], 100);
        assert_eq!(game.current_q, 1);
    }

    #[test]
    fn wrong_answer_still_advances_without_scoring() {
        let mut game = Jeopardy::init(&["p1".to_string()], "classic");
        game.apply_move("p1", json!({"answer": "Atlantic"}));
        assert_eq!(game.scores["p1"], 0);
        assert_eq!(game.current_q, 1);
    }

    #[test]
    fn s3_speed_timeout_advances_question() {
        let mut game = Jeopardy::init(&["p1".to_string()], "speed");
        let outcome = game.on_timer(SPEED_TIMER);
        assert_eq!(game.current_q, 1);
        assert!(matches!(outcome, Outcome::Changed { timeout_note: Some(_), .. }));
    }

    #[test]
    fn game_ends_when_questions_exhausted() {
        let mut game = Jeopardy::init(&["p1".to_string()], "classic");
        for _ in 0..BANK.len() {
            game.apply_move("p1", json!({"answer": "nope"}));
        }
        assert!(game.is_over());
    }

    #[test]
    fn teams_mode_splits_round_robin_and_totals_by_team() {
        let players = vec!["p1".to_string(), "p2".to_string(), "p3".to_string(), "p4".to_string()];
        let mut game = Jeopardy::init(&players, "teams");
        game.apply_move("p1", json!({"answer": "pacific"}));
        game.apply_move("p2", json!({"answer": "au"}));
        let totals = game.team_totals();
        assert_eq!(totals["team1"], 100);
        assert_eq!(totals["team2"], 200);
    }
}
