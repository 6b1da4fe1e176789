//! Dots & Boxes (§4.5). 6x6 box grid (7 dots per side). Completing a box
//! grants an extra turn; completing none passes it.

use engine_core::{now_millis, GameEngine, Outcome};
use protocol::{ErrorKind, PlayerId};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

const BOXES: usize = 6;

#[derive(Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum LineType {
    Horizontal,
    Vertical,
}

#[derive(Deserialize)]
struct MoveInput {
    #[serde(rename = "type")]
    kind: LineType,
    row: usize,
    col: usize,
}

pub struct DotsAndBoxes {
    players: Vec<PlayerId>,
    mode: String,
    h_lines: [[bool; BOXES]; BOXES + 1],
    v_lines: [[bool; BOXES + 1]; BOXES],
    claimed: [[Option<usize>; BOXES]; BOXES],
    scores: HashMap<PlayerId, u64>,
    turn: usize,
    claimed_count: usize,
    over: bool,
    game_start_time: u64,
}

impl DotsAndBoxes {
    fn box_complete(&self, br: usize, bc: usize) -> bool {
        self.h_lines[br][bc] && self.h_lines[br + 1][bc] && self.v_lines[br][bc] && self.v_lines[br][bc + 1]
    }

    fn try_claim(&mut self, br: usize, bc: usize, seat: usize) -> bool {
        if self.claimed[br][bc].is_none() && self.box_complete(br, bc) {
            self.claimed[br][bc] = Some(seat);
            self.claimed_count += 1;
            true
        } else {
            false
        }
    }
}

impl GameEngine for DotsAndBoxes {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        let mut scores = HashMap::new();
        for p in players {
            scores.insert(p.clone(), 0);
        }
        DotsAndBoxes {
            players: players.to_vec(),
            mode: mode.to_string(),
            h_lines: [[false; BOXES]; BOXES + 1],
            v_lines: [[false; BOXES + 1]; BOXES],
            claimed: [[None; BOXES]; BOXES],
            scores,
            turn: 0,
            claimed_count: 0,
            over: false,
            game_start_time: now_millis(),
        }
    }

    fn apply_move(&mut self, player_id: &str, payload: Value) -> Outcome {
        if self.over {
            return Outcome::reject(ErrorKind::AlreadyOver);
        }
        let Some(seat) = self.players.iter().position(|p| p == player_id) else {
            return Outcome::reject(ErrorKind::NotYourTurn);
        };
        if seat != self.turn {
            return Outcome::reject(ErrorKind::NotYourTurn);
        }
        let input: MoveInput = match serde_json::from_value(payload) {
            Ok(v) => v,
            Err(e) => return Outcome::reject(ErrorKind::ValidationFailed(format!("{e}"))),
        };

        let mut boxes_touched = Vec::new();
        match input.kind {
            LineType::Horizontal => {
                if input.row > BOXES || input.col >= BOXES {
                    return Outcome::reject(ErrorKind::IllegalMove("line out of range".into()));
                }
                if self.h_lines[input.row][input.col] {
                    return Outcome::reject(ErrorKind::IllegalMove("line already drawn".into()));
                }
                self.h_lines[input.row][input.col] = true;
                if input.row > 0 {
                    boxes_touched.push((input.row - 1, input.col));
                }
                if input.row < BOXES {
                    boxes_touched.push((input.row, input.col));
                }
            }
            LineType::Vertical => {
                if input.row >= BOXES || input.col > BOXES {
                    return Outcome::reject(ErrorKind::IllegalMove("line out of range".into()));
                }
                if self.v_lines[input.row][input.col] {
                    return Outcome::reject(ErrorKind::IllegalMove("line already drawn".into()));
                }
                self.v_lines[input.row][input.col] = true;
                if input.col > 0 {
                    boxes_touched.push((input.row, input.col - 1));
                }
                if input.col < BOXES {
                    boxes_touched.push((input.row, input.col));
                }
            }
        }

        let mut completed = 0u64;
        for (br, bc) in boxes_touched {
            if self.try_claim(br, bc, seat) {
                completed += 1;
            }
        }
        if completed > 0 {
            *self.scores.entry(player_id.to_string()).or_insert(0) += completed;
        } else {
            self.turn = 1 - self.turn;
        }

        if self.claimed_count == BOXES * BOXES {
            self.over = true;
            Outcome::changed_game_over()
        } else {
            Outcome::changed()
        }
    }

    fn snapshot(&self) -> Value {
        json!({
            "players": self.players,
            "game_mode": self.mode,
            "h_lines": self.h_lines,
            "v_lines": self.v_lines,
            "claimed": self.claimed.iter().map(|row| row.iter().map(|c| c.map(|s| &self.players[s])).collect::<Vec<_>>()).collect::<Vec<_>>(),
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
    fn completing_a_box_grants_extra_turn_and_score() {
        let mut game = DotsAndBoxes::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.apply_move("p1", json!({"type": "horizontal", "row": 0, "col": 0}));
        game.apply_move("p2", json!({"type": "horizontal", "row": 1, "col": 0}));
        game.apply_move("p1", json!({"type": "vertical", "row": 0, "col": 0}));
        assert_eq!(game.turn, 1, "no box completed yet, turn passed back and forth");
        let outcome = game.apply_move("p2", json!({"type": "vertical", "row": 0, "col": 1}));
        assert!(matches!(outcome, Outcome::Changed { .. }));
        assert_eq!(game.scores["p2"], 1);
        assert_eq!(game.turn, 1, "completing a box keeps the turn");
    }

    #[test]
    fn redrawing_a_line_rejected() {
        let mut game = DotsAndBoxes::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.apply_move("p1", json!({"type": "horizontal", "row": 0, "col": 0}));
        let outcome = game.apply_move("p2", json!({"type": "horizontal", "row": 0, "col": 0}));
        assert!(matches!(outcome, Outcome::Rejected(ErrorKind::IllegalMove(_))));
    }

    #[test]
    fn no_box_completed_passes_turn() {
        let mut game = DotsAndBoxes::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.apply_move("p1", json!({"type": "horizontal", "row": 0, "col": 0}));
        assert_eq!(game.turn, 1);
    }
}
