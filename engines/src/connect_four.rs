//! Connect Four (§4.5). 7 columns by 6 rows; a win is checked only around
//! the cell that was just placed.

use crate::util::{parse_move, seat_of};
use engine_core::{now_millis, GameEngine, Outcome};
use protocol::{ErrorKind, PlayerId};
use serde::Deserialize;
use serde_json::{json, Value};

const COLS: usize = 7;
const ROWS: usize = 6;

#[derive(Deserialize)]
struct MoveInput {
    column: usize,
}

pub struct ConnectFour {
    players: Vec<PlayerId>,
    mode: String,
    grid: [[Option<usize>; ROWS]; COLS],
    turn: usize,
    over: bool,
    winner: Option<String>,
    game_start_time: u64,
}

impl ConnectFour {
    fn lowest_empty_row(&self, col: usize) -> Option<usize> {
        (0..ROWS).find(|&row| self.grid[col][row].is_none())
    }

    fn count_direction(&self, col: usize, row: usize, dcol: i32, drow: i32, seat: usize) -> usize {
        let mut count = 0;
        let mut c = col as i32 + dcol;
        let mut r = row as i32 + drow;
        while c >= 0 && c < COLS as i32 && r >= 0 && r < ROWS as i32 {
            if self.grid[c as usize][r as usize] == Some(seat) {
                count += 1;
                c += dcol;
                r += drow;
            } else {
                break;
            }
        }
        count
    }

    fn wins_at(&self, col: usize, row: usize, seat: usize) -> bool {
        let directions = [(1, 0), (0, 1), (1, 1), (1, -1)];
        directions.iter().any(|&(dc, dr)| {
            1 + self.count_direction(col, row, dc, dr, seat) + self.count_direction(col, row, -dc, -dr, seat) >= 4
        })
    }

    fn board_full(&self) -> bool {
        self.grid.iter().all(|col| col[ROWS - 1].is_some())
    }
}

impl GameEngine for ConnectFour {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        ConnectFour {
            players: players.to_vec(),
            mode: mode.to_string(),
            grid: [[None; ROWS]; COLS],
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
        if input.column >= COLS {
            return Outcome::reject(ErrorKind::IllegalMove("column out of range".into()));
        }
        let Some(row) = self.lowest_empty_row(input.column) else {
            return Outcome::reject(ErrorKind::IllegalMove("column full".into()));
        };

        self.grid[input.column][row] = Some(seat);
        if self.wins_at(input.column, row, seat) {
            self.over = true;
            self.winner = Some(self.players[seat].clone());
            return Outcome::changed_game_over();
        }
        if self.board_full() {
            self.over = true;
            self.winner = Some("draw".to_string());
            return Outcome::changed_game_over();
        }
        self.turn = 1 - self.turn;
        Outcome::changed()
    }

    fn snapshot(&self) -> Value {
        let board: Vec<Vec<Option<&PlayerId>>> = self
            .grid
            .iter()
            .map(|col| col.iter().map(|cell| cell.map(|seat| &self.players[seat])).collect())
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

    fn make() -> ConnectFour {
        ConnectFour::init(&["p1".to_string(), "p2".to_string()], "classic")
    }

    #[test]
    fn disc_falls_to_lowest_empty_row() {
        let mut game = make();
        game.apply_move("p1", json!({"column": 0}));
        game.apply_move("p2", json!({"column": 0}));
        assert_eq!(game.grid[0][0], Some(0));
        assert_eq!(game.grid[0][1], Some(1));
    }

    #[test]
    fn horizontal_four_in_a_row_wins() {
        let mut game = make();
        for col in 0..3 {
            game.apply_move("p1", json!({"column": col}));
            game.apply_move("p2", json!({"column": col}));
        }
        game.apply_move("p1", json!({"column": 3}));
        assert!(game.is_over());
        assert_eq!(game.winner(), Some("p1".to_string()));
    }

    #[test]
    fn full_column_rejected() {
        let mut game = make();
        for i in 0..ROWS {
            let player = if i % 2 == 0 { "p1" } else { "p2" };
            game.apply_move(player, json!({"column": 0}));
        }
        let outcome = game.apply_move("p1", json!({"column": 0}));
        assert!(matches!(outcome, Outcome::Rejected(ErrorKind::IllegalMove(_))));
    }
}
