//! TicTacToe (§4.5). Two players, classic/fading/speed/infinite modes.

use crate::util::{parse_move, seat_of};
use engine_core::{now_millis, GameEngine, Outcome, TimerCommand};
use protocol::{ErrorKind, PlayerId};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::VecDeque;

const SPEED_TURN_TIMER: u32 = 0;
const SPEED_TURN_MS: u64 = 5_000;
const FADING_CAP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    X,
    O,
}

#[derive(Deserialize)]
struct MoveInput {
    cell: usize,
}

pub struct TicTacToe {
    players: Vec<PlayerId>,
    mode: String,
    board: [Cell; 9],
    turn: usize,
    winner: Option<String>,
    over: bool,
    fifo: [VecDeque<usize>; 2],
    game_start_time: u64,
}

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

impl TicTacToe {
    fn symbol(seat: usize) -> Cell {
        if seat == 0 { Cell::X } else { Cell::O }
    }

    fn symbol_str(cell: Cell) -> &'static str {
        match cell {
            Cell::Empty => "",
            Cell::X => "X",
            Cell::O => "O",
        }
    }

    fn line_winner(&self) -> Option<usize> {
        LINES.iter().find_map(|line| {
            let [a, b, c] = *line;
            if self.board[a] != Cell::Empty && self.board[a] == self.board[b] && self.board[b] == self.board[c] {
                Some(if self.board[a] == Cell::X { 0 } else { 1 })
            } else {
                None
            }
        })
    }

    fn board_full(&self) -> bool {
        self.board.iter().all(|c| *c != Cell::Empty)
    }

    fn recompute_terminal(&mut self) {
        if let Some(seat) = self.line_winner() {
            self.winner = Some(self.players[seat].clone());
            self.over = true;
            return;
        }
        if self.mode != "infinite" && self.board_full() {
            self.winner = Some("draw".to_string());
            self.over = true;
        }
    }

    fn apply_fading(&mut self, seat: usize, cell: usize) {
        let fifo = &mut self.fifo[seat];
        fifo.push_back(cell);
        if fifo.len() > FADING_CAP {
            if let Some(oldest) = fifo.pop_front() {
                self.board[oldest] = Cell::Empty;
            }
        }
    }
}

impl GameEngine for TicTacToe {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        TicTacToe {
            players: players.to_vec(),
            mode: mode.to_string(),
            board: [Cell::Empty; 9],
            turn: 0,
            winner: None,
            over: false,
            fifo: [VecDeque::new(), VecDeque::new()],
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
        if input.cell >= 9 {
            return Outcome::reject(ErrorKind::IllegalMove("cell out of range".into()));
        }
        if self.board[input.cell] != Cell::Empty {
            return Outcome::reject(ErrorKind::IllegalMove("cell already taken".into()));
        }

        self.board[input.cell] = Self::symbol(seat);
        if self.mode == "fading" {
            self.apply_fading(seat, input.cell);
        }
        self.turn = 1 - self.turn;
        self.recompute_terminal();

        let mut outcome = Outcome::changed_game_over_if(self.over);
        if self.mode == "speed" && !self.over {
            outcome = outcome.with_timer(TimerCommand::Set {
                timer_id: SPEED_TURN_TIMER,
                duration_ms: SPEED_TURN_MS,
            });
        } else if self.mode == "speed" {
            outcome = outcome.with_timer(TimerCommand::Cancel {
                timer_id: SPEED_TURN_TIMER,
            });
        }
        outcome
    }

    fn snapshot(&self) -> Value {
        json!({
            "players": self.players,
            "game_mode": self.mode,
            "winner": self.winner.clone().unwrap_or_default(),
            "game_over": self.over,
            "board": self.board.iter().map(|c| Self::symbol_str(*c)).collect::<Vec<_>>(),
            "next_turn": self.players.get(self.turn),
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

    fn initial_timers(&self) -> Vec<TimerCommand> {
        if self.mode == "speed" && !self.over {
            vec![TimerCommand::Set { timer_id: SPEED_TURN_TIMER, duration_ms: SPEED_TURN_MS }]
        } else {
            Vec::new()
        }
    }

    fn on_timer(&mut self, timer_id: u32) -> Outcome {
        if timer_id != SPEED_TURN_TIMER || self.over || self.mode != "speed" {
            return Outcome::changed();
        }
        // The active player failed to move in time; the opponent wins.
        let opponent = 1 - self.turn;
        self.winner = Some(self.players[opponent].clone());
        self.over = true;
        Outcome::timeout("turn timer expired", true)
    }
}

// A tiny extension so the two call sites above read naturally.
trait OutcomeExt {
    fn changed_game_over_if(over: bool) -> Outcome;
}
impl OutcomeExt for Outcome {
    fn changed_game_over_if(over: bool) -> Outcome {
        if over {
            Outcome::changed_game_over()
        } else {
            Outcome::changed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(mode: &str) -> TicTacToe {
        TicTacToe::init(&["p1".to_string(), "p2".to_string()], mode)
    }

    fn mv(engine: &mut TicTacToe, player: &str, cell: usize) -> Outcome {
        engine.apply_move(player, json!({"cell": cell}))
    }

    #[test]
    fn s1_happy_path_p1_wins() {
        let mut game = make("classic");
        mv(&mut game, "p1", 4);
        mv(&mut game, "p2", 0);
        mv(&mut game, "p1", 1);
        mv(&mut game, "p2", 3);
        mv(&mut game, "p1", 7);
        assert!(game.is_over());
        assert_eq!(game.winner(), Some("p1".to_string()));
        let snap = game.snapshot();
        let expected = ["O", "X", "", "O", "X", "", "", "X", ""];
        for (i, sym) in expected.iter().enumerate() {
            assert_eq!(snap["board"][i], *sym);
        }
    }

    #[test]
    fn rejects_out_of_turn_move() {
        let mut game = make("classic");
        let outcome = mv(&mut game, "p2", 0);
        assert!(matches!(outcome, Outcome::Rejected(ErrorKind::NotYourTurn)));
    }

    #[test]
    fn rejects_occupied_cell_without_mutating_state() {
        let mut game = make("classic");
        mv(&mut game, "p1", 0);
        let before = game.snapshot();
        let outcome = mv(&mut game, "p2", 0);
        assert!(matches!(outcome, Outcome::Rejected(ErrorKind::IllegalMove(_))));
        assert_eq!(before, game.snapshot());
    }

    #[test]
    fn draw_fills_board_with_no_line() {
        let mut game = make("classic");
        // X O X / X O O / O X X -> full board, no 3-in-a-row.
        for (p, c) in [
            ("p1", 0),
            ("p2", 1),
            ("p1", 2),
            ("p2", 4),
            ("p1", 3),
            ("p2", 5),
            ("p1", 7),
            ("p2", 6),
            ("p1", 8),
        ] {
            mv(&mut game, p, c);
        }
        assert!(game.is_over());
        assert_eq!(game.winner(), Some("draw".to_string()));
    }

    #[test]
    fn fading_mode_clears_oldest_placement_on_fifth_mark() {
        let mut game = make("fading");
        // p1 plays 5 times at 0,2,4,6,8 (p2 fills between to keep turns valid).
        mv(&mut game, "p1", 0);
        mv(&mut game, "p2", 1);
        mv(&mut game, "p1", 2);
        mv(&mut game, "p2", 3);
        mv(&mut game, "p1", 4);
        mv(&mut game, "p2", 5);
        mv(&mut game, "p1", 6);
        mv(&mut game, "p2", 7);
        // p1's fifth placement; cell 0 (oldest of p1's four) should clear.
        mv(&mut game, "p1", 8);
        assert_eq!(game.board[0], Cell::Empty);
        assert_eq!(game.fifo[0].len(), FADING_CAP);
    }

    #[test]
    fn speed_mode_timeout_awards_opponent() {
        let mut game = make("speed");
        mv(&mut game, "p1", 0);
        let outcome = game.on_timer(SPEED_TURN_TIMER);
        assert!(game.is_over());
        assert_eq!(game.winner(), Some("p1".to_string()));
        assert!(matches!(outcome, Outcome::Changed { timeout_note: Some(_), .. }));
    }

    #[test]
    fn infinite_mode_never_draws() {
        let mut game = make("infinite");
        for (p, c) in [
            ("p1", 0),
            ("p2", 1),
            ("p1", 2),
            ("p2", 4),
            ("p1", 3),
            ("p2", 5),
            ("p1", 7),
            ("p2", 6),
            ("p1", 8),
        ] {
            mv(&mut game, p, c);
        }
        assert!(!game.is_over());
    }
}
