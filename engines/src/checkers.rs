//! Checkers (§4.5). Mandatory captures are not enforced — a move is legal
//! on its own merits regardless of whether a capture was available
//! elsewhere on the board (policy choice recorded alongside this engine).

use crate::util::seat_of;
use engine_core::{now_millis, GameEngine, Outcome};
use protocol::{ErrorKind, PlayerId};
use serde::Deserialize;
use serde_json::{json, Value};

const SIZE: i32 = 8;

#[derive(Deserialize)]
struct MoveInput {
    from_row: i32,
    from_col: i32,
    to_row: i32,
    to_col: i32,
}

#[derive(Clone, Copy)]
struct Piece {
    seat: usize,
    king: bool,
}

pub struct Checkers {
    players: Vec<PlayerId>,
    mode: String,
    board: [[Option<Piece>; 8]; 8],
    turn: usize,
    over: bool,
    winner: Option<String>,
    game_start_time: u64,
}

fn forward_dir(seat: usize) -> i32 {
    if seat == 0 {
        -1
    } else {
        1
    }
}

fn far_row(seat: usize) -> i32 {
    if seat == 0 {
        0
    } else {
        SIZE - 1
    }
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..SIZE).contains(&row) && (0..SIZE).contains(&col)
}

impl Checkers {
    fn piece_count(&self, seat: usize) -> usize {
        self.board.iter().flatten().filter(|p| matches!(p, Some(piece) if piece.seat == seat)).count()
    }
}

impl GameEngine for Checkers {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        let mut board: [[Option<Piece>; 8]; 8] = [[None; 8]; 8];
        for row in 0..8usize {
            for col in 0..8usize {
                if (row + col) % 2 == 1 {
                    if row <= 2 {
                        board[row][col] = Some(Piece { seat: 1, king: false });
                    } else if row >= 5 {
                        board[row][col] = Some(Piece { seat: 0, king: false });
                    }
                }
            }
        }
        Checkers { players: players.to_vec(), mode: mode.to_string(), board, turn: 0, over: false, winner: None, game_start_time: now_millis() }
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
        let input: MoveInput = match serde_json::from_value(payload) {
            Ok(v) => v,
            Err(e) => return Outcome::reject(ErrorKind::ValidationFailed(format!("{e}"))),
        };
        if !in_bounds(input.from_row, input.from_col) || !in_bounds(input.to_row, input.to_col) {
            return Outcome::reject(ErrorKind::IllegalMove("coordinates out of range".into()));
        }
        let Some(piece) = self.board[input.from_row as usize][input.from_col as usize] else {
            return Outcome::reject(ErrorKind::IllegalMove("no piece at source".into()));
        };
        if piece.seat != seat {
            return Outcome::reject(ErrorKind::IllegalMove("piece does not belong to mover".into()));
        }
        if self.board[input.to_row as usize][input.to_col as usize].is_some() {
            return Outcome::reject(ErrorKind::IllegalMove("destination occupied".into()));
        }
        let dr = input.to_row - input.from_row;
        let dc = input.to_col - input.from_col;
        if dr.abs() != dc.abs() || dr == 0 {
            return Outcome::reject(ErrorKind::IllegalMove("move must be diagonal".into()));
        }
        if !piece.king {
            let expected = forward_dir(seat);
            if dr.signum() != expected {
                return Outcome::reject(ErrorKind::IllegalMove("non-king pieces may not move backward".into()));
            }
        }

        match dr.abs() {
            1 => {}
            2 => {
                let mid_row = (input.from_row + input.to_row) / 2;
                let mid_col = (input.from_col + input.to_col) / 2;
                match self.board[mid_row as usize][mid_col as usize] {
                    Some(mid_piece) if mid_piece.seat != seat => {
                        self.board[mid_row as usize][mid_col as usize] = None;
                    }
                    _ => return Outcome::reject(ErrorKind::IllegalMove("no opponent piece to capture".into())),
                }
            }
            _ => return Outcome::reject(ErrorKind::IllegalMove("move must be one or two diagonal steps".into())),
        }

        self.board[input.from_row as usize][input.from_col as usize] = None;
        let mut moved = piece;
        if input.to_row == far_row(seat) {
            moved.king = true;
        }
        self.board[input.to_row as usize][input.to_col as usize] = Some(moved);

        let opponent = 1 - seat;
        if self.piece_count(opponent) == 0 {
            self.over = true;
            self.winner = Some(self.players[seat].clone());
            return Outcome::changed_game_over();
        }
        self.turn = opponent;
        Outcome::changed()
    }

    fn snapshot(&self) -> Value {
        let board: Vec<Vec<Option<Value>>> = self
            .board
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map(|p| json!({"player": self.players[p.seat], "king": p.king})))
                    .collect()
            })
            .collect();
        json!({
            "players": self.players,
            "game_mode": self.mode,
            "board": board,
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

    #[test]
    fn backward_move_rejected_for_non_king() {
        let mut game = Checkers::init(&["p1".to_string(), "p2".to_string()], "classic");
        // p1 pieces occupy rows 5-7 and move toward row 0; row 7 -> row... wait
        // let's move a row-5 piece backward to row 6 (toward p1's own back rank).
        let outcome = game.apply_move("p1", json!({"from_row": 5, "from_col": 0, "to_row": 6, "to_col": 1}));
        assert!(matches!(outcome, Outcome::Rejected(ErrorKind::IllegalMove(_))));
    }

    #[test]
    fn simple_forward_step_onto_empty_square() {
        let mut game = Checkers::init(&["p1".to_string(), "p2".to_string()], "classic");
        let outcome = game.apply_move("p1", json!({"from_row": 5, "from_col": 0, "to_row": 4, "to_col": 1}));
        assert!(matches!(outcome, Outcome::Changed { .. }));
        assert!(game.board[4][1].is_some());
        assert!(game.board[5][0].is_none());
    }

    #[test]
    fn jump_captures_opponent_piece() {
        let mut game = Checkers::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.board = [[None; 8]; 8];
        game.board[5][2] = Some(Piece { seat: 0, king: false });
        game.board[4][3] = Some(Piece { seat: 1, king: false });
        let outcome = game.apply_move("p1", json!({"from_row": 5, "from_col": 2, "to_row": 3, "to_col": 4}));
        assert!(matches!(outcome, Outcome::Changed { .. }));
        assert!(game.board[4][3].is_none());
        assert!(game.board[3][4].is_some());
    }

    #[test]
    fn reaching_far_row_crowns_the_piece() {
        let mut game = Checkers::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.board = [[None; 8]; 8];
        game.board[1][2] = Some(Piece { seat: 0, king: false });
        game.apply_move("p1", json!({"from_row": 1, "from_col": 2, "to_row": 0, "to_col": 1}));
        assert!(game.board[0][1].unwrap().king);
    }
}
