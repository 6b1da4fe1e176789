//! Battleship (§4.5). Ship placement is engine-internal and randomized at
//! `init`; this spec only standardizes the firing phase.

use crate::util::{parse_move, seat_of};
use engine_core::{now_millis, GameEngine, Outcome};
use protocol::{ErrorKind, PlayerId};
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;

const SHIP_LENGTHS: [u8; 5] = [5, 4, 3, 3, 2];
const GRID: u8 = 10;

#[derive(Deserialize)]
struct MoveInput {
    x: i32,
    y: i32,
}

struct Board {
    ships: HashSet<(u8, u8)>,
    hits: HashSet<(u8, u8)>,
    misses: HashSet<(u8, u8)>,
}

impl Board {
    fn random() -> Self {
        let mut rng = rand::rng();
        let mut ships = HashSet::new();
        for &len in SHIP_LENGTHS.iter() {
            loop {
                let horizontal: bool = rng.random();
                let (max_x, max_y) = if horizontal { (GRID - len, GRID - 1) } else { (GRID - 1, GRID - len) };
                let ox = rng.random_range(0..=max_x);
                let oy = rng.random_range(0..=max_y);
                let cells: Vec<(u8, u8)> = (0..len)
                    .map(|i| if horizontal { (ox + i, oy) } else { (ox, oy + i) })
                    .collect();
                if cells.iter().all(|c| !ships.contains(c)) {
                    ships.extend(cells);
                    break;
                }
            }
        }
        Board { ships, hits: HashSet::new(), misses: HashSet::new() }
    }

    fn all_sunk(&self) -> bool {
        self.ships.iter().all(|c| self.hits.contains(c))
    }
}

pub struct Battleship {
    players: Vec<PlayerId>,
    mode: String,
    boards: [Board; 2],
    turn: usize,
    over: bool,
    winner: Option<String>,
    game_start_time: u64,
}

impl GameEngine for Battleship {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        Battleship {
            players: players.to_vec(),
            mode: mode.to_string(),
            boards: [Board::random(), Board::random()],
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
        if !(0..GRID as i32).contains(&input.x) || !(0..GRID as i32).contains(&input.y) {
            return Outcome::reject(ErrorKind::IllegalMove("shot out of bounds".into()));
        }
        let cell = (input.x as u8, input.y as u8);
        let opponent = 1 - seat;
        let board = &mut self.boards[opponent];
        if board.hits.contains(&cell) || board.misses.contains(&cell) {
            return Outcome::reject(ErrorKind::IllegalMove("cell already resolved".into()));
        }

        if board.ships.contains(&cell) {
            board.hits.insert(cell);
        } else {
            board.misses.insert(cell);
        }

        let sunk = self.boards[opponent].all_sunk();
        self.turn = opponent;
        if sunk {
            self.over = true;
            self.winner = Some(self.players[seat].clone());
            Outcome::changed_game_over()
        } else {
            Outcome::changed()
        }
    }

    fn snapshot(&self) -> Value {
        let board_view = |b: &Board| {
            json!({
                "ships": b.ships.iter().collect::<Vec<_>>(),
                "hits": b.hits.iter().collect::<Vec<_>>(),
                "misses": b.misses.iter().collect::<Vec<_>>(),
            })
        };
        json!({
            "players": self.players,
            "game_mode": self.mode,
            "boards": [board_view(&self.boards[0]), board_view(&self.boards[1])],
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
    fn shot_outside_grid_rejected() {
        let mut game = Battleship::init(&["p1".to_string(), "p2".to_string()], "classic");
        let outcome = game.apply_move("p1", json!({"x": 10, "y": 0}));
        assert!(matches!(outcome, Outcome::Rejected(ErrorKind::IllegalMove(_))));
    }

    #[test]
    fn repeat_shot_on_resolved_cell_rejected() {
        let mut game = Battleship::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.apply_move("p1", json!({"x": 0, "y": 0}));
        game.apply_move("p2", json!({"x": 0, "y": 0}));
        let outcome = game.apply_move("p1", json!({"x": 0, "y": 0}));
        assert!(matches!(outcome, Outcome::Rejected(ErrorKind::IllegalMove(_))));
    }

    #[test]
    fn sinking_every_ship_cell_wins() {
        let mut game = Battleship::init(&["p1".to_string(), "p2".to_string()], "classic");
        let targets: Vec<(u8, u8)> = game.boards[1].ships.iter().copied().collect();
        let mut filler_shots = (0..GRID).flat_map(|y| (0..GRID).map(move |x| (x, y)));
        for cell in targets {
            game.apply_move("p1", json!({"x": cell.0, "y": cell.1}));
            if !game.is_over() {
                let filler = filler_shots.next().expect("grid has enough cells for fillers");
                game.apply_move("p2", json!({"x": filler.0, "y": filler.1}));
            }
        }
        assert!(game.is_over());
        assert_eq!(game.winner(), Some("p1".to_string()));
    }

    #[test]
    fn turn_passes_regardless_of_hit_or_miss() {
        let mut game = Battleship::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.apply_move("p1", json!({"x": 0, "y": 0}));
        assert_eq!(game.turn, 1);
    }
}
