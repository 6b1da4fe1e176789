//! Rock-paper-scissors (§4.5). Simultaneous moves; a round resolves once
//! both players have committed a choice.

use crate::util::seat_of;
use engine_core::{now_millis, GameEngine, Outcome};
use protocol::{ErrorKind, PlayerId};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    fn beats(self, other: Choice) -> bool {
        matches!(
            (self, other),
            (Choice::Rock, Choice::Scissors) | (Choice::Scissors, Choice::Paper) | (Choice::Paper, Choice::Rock)
        )
    }

    fn as_str(self) -> &'static str {
        match self {
            Choice::Rock => "rock",
            Choice::Paper => "paper",
            Choice::Scissors => "scissors",
        }
    }
}

#[derive(Deserialize)]
struct MoveInput {
    choice: Choice,
}

pub struct Rps {
    players: Vec<PlayerId>,
    mode: String,
    best_of: u32,
    target: u32,
    wins: [u32; 2],
    pending: [Option<Choice>; 2],
    last_round: Option<(Choice, Choice, Option<usize>)>,
    over: bool,
    winner: Option<String>,
    game_start_time: u64,
}

fn parse_best_of(mode: &str) -> u32 {
    mode.strip_prefix("bo").and_then(|n| n.parse().ok()).unwrap_or(3)
}

impl GameEngine for Rps {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        let best_of = parse_best_of(mode);
        let target = best_of.div_ceil(2) + 1;
        Rps {
            players: players.to_vec(),
            mode: mode.to_string(),
            best_of,
            target,
            wins: [0, 0],
            pending: [None, None],
            last_round: None,
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
        if self.pending[seat].is_some() {
            return Outcome::reject(ErrorKind::Duplicate("already moved this round".into()));
        }
        let input: MoveInput = match serde_json::from_value(payload) {
            Ok(v) => v,
            Err(e) => return Outcome::reject(ErrorKind::ValidationFailed(format!("{e}"))),
        };
        self.pending[seat] = Some(input.choice);

        let (Some(a), Some(b)) = (self.pending[0], self.pending[1]) else {
            return Outcome::changed();
        };

        let round_winner = if a == b {
            None
        } else if a.beats(b) {
            Some(0)
        } else {
            Some(1)
        };
        self.last_round = Some((a, b, round_winner));
        self.pending = [None, None];

        if let Some(w) = round_winner {
            self.wins[w] += 1;
            if self.wins[w] >= self.target {
                self.over = true;
                self.winner = Some(self.players[w].clone());
                return Outcome::changed_game_over();
            }
        }
        Outcome::changed()
    }

    fn snapshot(&self) -> Value {
        json!({
            "players": self.players,
            "game_mode": self.mode,
            "best_of": self.best_of,
            "target_wins": self.target,
            "wins": self.wins,
            "has_moved": [self.pending[0].is_some(), self.pending[1].is_some()],
            "last_round": self.last_round.map(|(a, b, w)| json!({
                "p1": a.as_str(),
                "p2": b.as_str(),
                "winner": w.map(|i| self.players[i].clone()),
            })),
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

    #[test]
    fn rock_beats_scissors() {
        let mut game = Rps::init(&["p1".to_string(), "p2".to_string()], "bo3");
        game.apply_move("p1", json!({"choice": "rock"}));
        game.apply_move("p2", json!({"choice": "scissors"}));
        assert_eq!(game.wins[0], 1);
    }

    #[test]
    fn tie_replays_without_scoring() {
        let mut game = Rps::init(&["p1".to_string(), "p2".to_string()], "bo3");
        game.apply_move("p1", json!({"choice": "rock"}));
        game.apply_move("p2", json!({"choice": "rock"}));
        assert_eq!(game.wins, [0, 0]);
        assert!(!game.is_over());
    }

    #[test]
    fn duplicate_move_in_same_round_rejected() {
        let mut game = Rps::init(&["p1".to_string(), "p2".to_string()], "bo3");
        game.apply_move("p1", json!({"choice": "rock"}));
        let outcome = game.apply_move("p1", json!({"choice": "paper"}));
        assert!(matches!(outcome, Outcome::Rejected(ErrorKind::Duplicate(_))));
    }

    #[test]
    fn default_best_of_three_needs_three_round_wins() {
        let mut game = Rps::init(&["p1".to_string(), "p2".to_string()], "classic");
        assert_eq!(game.target, 3);
        for _ in 0..2 {
            game.apply_move("p1", json!({"choice": "rock"}));
            game.apply_move("p2", json!({"choice": "scissors"}));
        }
        assert!(!game.is_over());
        game.apply_move("p1", json!({"choice": "rock"}));
        game.apply_move("p2", json!({"choice": "scissors"}));
        assert!(game.is_over());
        assert_eq!(game.winner(), Some("p1".to_string()));
    }
}
