//! Mafia (§4.5). Phases cycle night -> day -> lynch -> night. Day has no
//! required action; it is a timed discussion window that transitions to
//! lynch on its own once the clock runs out.

use engine_core::{now_millis, GameEngine, Outcome, TimerCommand};
use protocol::{ErrorKind, PlayerId};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

const DAY_TIMER: u32 = 0;
const DAY_DURATION_MS: u64 = 30_000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Role {
    Mafia,
    Doctor,
    Detective,
    Villager,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    Night,
    Day,
    Lynch,
}

#[derive(Deserialize)]
struct MoveInput {
    action: String,
    #[serde(default)]
    target: Option<PlayerId>,
}

fn mafia_count_for(players: usize) -> usize {
    match players {
        0..=5 => 1,
        6..=8 => 2,
        _ => 3,
    }
}

pub struct Mafia {
    players: Vec<PlayerId>,
    mode: String,
    roles: Vec<Role>,
    alive: Vec<bool>,
    phase: Phase,
    day_count: u32,
    mafia_kill_votes: HashMap<usize, usize>,
    doctor_save: Option<usize>,
    detective_investigate: Option<usize>,
    detective_result: Option<(PlayerId, bool)>,
    lynch_votes: HashMap<usize, usize>,
    over: bool,
    winner: Option<String>,
    game_start_time: u64,
}

impl Mafia {
    fn seat_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p == player_id)
    }

    fn living_with_role(&self, role: Role) -> Vec<usize> {
        (0..self.players.len()).filter(|&i| self.alive[i] && self.roles[i] == role).collect()
    }

    fn living_count(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    fn check_win(&mut self) {
        let mafia_alive = self.living_with_role(Role::Mafia).len();
        let total_alive = self.living_count();
        if mafia_alive == 0 {
            self.over = true;
            self.winner = Some("villagers".to_string());
        } else if mafia_alive * 2 >= total_alive {
            self.over = true;
            self.winner = Some("mafia".to_string());
        }
    }

    fn resolve_night_if_ready(&mut self) -> Option<TimerCommand> {
        let mafia_alive = self.living_with_role(Role::Mafia);
        let doctor_alive = !self.living_with_role(Role::Doctor).is_empty();
        let detective_alive = !self.living_with_role(Role::Detective).is_empty();
        if self.mafia_kill_votes.len() < mafia_alive.len() {
            return None;
        }
        if doctor_alive && self.doctor_save.is_none() {
            return None;
        }
        if detective_alive && self.detective_investigate.is_none() {
            return None;
        }

        let mut tally: HashMap<usize, u32> = HashMap::new();
        for &target in self.mafia_kill_votes.values() {
            *tally.entry(target).or_insert(0) += 1;
        }
        let kill_target = tally.into_iter().max_by_key(|(_, count)| *count).map(|(seat, _)| seat);

        if let Some(target) = kill_target {
            if self.doctor_save != Some(target) {
                self.alive[target] = false;
            }
        }

        self.mafia_kill_votes.clear();
        self.doctor_save = None;
        self.detective_investigate = None;
        self.check_win();
        if self.over {
            return None;
        }
        self.phase = Phase::Day;
        self.day_count += 1;
        Some(TimerCommand::Set { timer_id: DAY_TIMER, duration_ms: DAY_DURATION_MS })
    }

    fn resolve_lynch_if_ready(&mut self) {
        if self.lynch_votes.len() < self.living_count() {
            return;
        }
        let mut tally: HashMap<usize, u32> = HashMap::new();
        for &target in self.lynch_votes.values() {
            *tally.entry(target).or_insert(0) += 1;
        }
        if let Some(max) = tally.values().copied().max() {
            let leaders: Vec<usize> = tally.iter().filter(|(_, c)| **c == max).map(|(s, _)| *s).collect();
            if leaders.len() == 1 {
                self.alive[leaders[0]] = false;
            }
        }
        self.lynch_votes.clear();
        self.check_win();
        if !self.over {
            self.phase = Phase::Night;
        }
    }
}

impl GameEngine for Mafia {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        let mut roles = vec![Role::Villager; players.len()];
        let mut seats: Vec<usize> = (0..players.len()).collect();
        seats.shuffle(&mut rand::rng());
        let mafia_needed = mafia_count_for(players.len());
        let mut cursor = 0;
        for _ in 0..mafia_needed {
            roles[seats[cursor]] = Role::Mafia;
            cursor += 1;
        }
        if cursor < seats.len() {
            roles[seats[cursor]] = Role::Doctor;
            cursor += 1;
        }
        if cursor < seats.len() {
            roles[seats[cursor]] = Role::Detective;
        }
        Mafia {
            players: players.to_vec(),
            mode: mode.to_string(),
            roles,
            alive: vec![true; players.len()],
            phase: Phase::Night,
            day_count: 0,
            mafia_kill_votes: HashMap::new(),
            doctor_save: None,
            detective_investigate: None,
            detective_result: None,
            lynch_votes: HashMap::new(),
            over: false,
            winner: None,
            game_start_time: now_millis(),
        }
    }

    fn apply_move(&mut self, player_id: &str, payload: Value) -> Outcome {
        if self.over {
            return Outcome::reject(ErrorKind::AlreadyOver);
        }
        let Some(seat) = self.seat_of(player_id) else {
            return Outcome::reject(ErrorKind::Forbidden("not seated in this game".into()));
        };
        if !self.alive[seat] {
            return Outcome::reject(ErrorKind::Forbidden("eliminated players cannot act".into()));
        }
        let input: MoveInput = match serde_json::from_value(payload) {
            Ok(v) => v,
            Err(e) => return Outcome::reject(ErrorKind::ValidationFailed(format!("{e}"))),
        };
        let target_seat = match &input.target {
            Some(t) => match self.seat_of(t) {
                Some(s) => Some(s),
                None => return Outcome::reject(ErrorKind::ValidationFailed("unknown target".into())),
            },
            None => None,
        };

        match (self.phase, input.action.as_str()) {
            (Phase::Night, "kill") => {
                if self.roles[seat] != Role::Mafia {
                    return Outcome::reject(ErrorKind::Forbidden("only mafia may submit a kill vote".into()));
                }
                let Some(target) = target_seat else {
                    return Outcome::reject(ErrorKind::ValidationFailed("kill requires a target".into()));
                };
                self.mafia_kill_votes.insert(seat, target);
            }
            (Phase::Night, "save") => {
                if self.roles[seat] != Role::Doctor {
                    return Outcome::reject(ErrorKind::Forbidden("only the doctor may save".into()));
                }
                self.doctor_save = target_seat;
            }
            (Phase::Night, "investigate") => {
                if self.roles[seat] != Role::Detective {
                    return Outcome::reject(ErrorKind::Forbidden("only the detective may investigate".into()));
                }
                let Some(target) = target_seat else {
                    return Outcome::reject(ErrorKind::ValidationFailed("investigate requires a target".into()));
                };
                self.detective_investigate = Some(target);
                self.detective_result = Some((self.players[target].clone(), self.roles[target] == Role::Mafia));
            }
            (Phase::Lynch, "vote") => {
                let Some(target) = target_seat else {
                    return Outcome::reject(ErrorKind::ValidationFailed("vote requires a target".into()));
                };
                self.lynch_votes.insert(seat, target);
            }
            _ => return Outcome::reject(ErrorKind::IllegalMove("action not valid in the current phase".into())),
        }

        let mut outcome = if self.over { Outcome::changed_game_over() } else { Outcome::changed() };
        if self.phase == Phase::Night {
            if let Some(timer) = self.resolve_night_if_ready() {
                outcome = (if self.over { Outcome::changed_game_over() } else { Outcome::changed() }).with_timer(timer);
            }
        } else if self.phase == Phase::Lynch {
            self.resolve_lynch_if_ready();
            outcome = if self.over { Outcome::changed_game_over() } else { Outcome::changed() };
        }
        outcome
    }

    fn snapshot(&self) -> Value {
        json!({
            "players": self.players,
            "game_mode": self.mode,
            "phase": match self.phase { Phase::Night => "night", Phase::Day => "day", Phase::Lynch => "lynch" },
            "day_count": self.day_count,
            "alive": self.alive,
            "roles": self.roles.iter().map(|r| match r {
                Role::Mafia => "mafia",
                Role::Doctor => "doctor",
                Role::Detective => "detective",
                Role::Villager => "villager",
            }).collect::<Vec<_>>(),
            "detective_result": self.detective_result.clone(),
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
        3
    }

    fn max_players() -> u8 {
        16
    }

    fn joinable_mid_game() -> bool {
        true
    }

    fn on_timer(&mut self, timer_id: u32) -> Outcome {
        if timer_id != DAY_TIMER || self.phase != Phase::Day {
            return Outcome::changed();
        }
        self.phase = Phase::Lynch;
        self.lynch_votes.clear();
        Outcome::timeout("day discussion window closed", false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(n: usize) -> Mafia {
        let players: Vec<PlayerId> = (0..n).map(|i| format!("p{i}")).collect();
        Mafia::init(&players, "classic")
    }

    #[test]
    fn role_counts_scale_with_player_count() {
        let game5 = make(5);
        assert_eq!(game5.roles.iter().filter(|r| **r == Role::Mafia).count(), 1);
        let game7 = make(7);
        assert_eq!(game7.roles.iter().filter(|r| **r == Role::Mafia).count(), 2);
        let game9 = make(9);
        assert_eq!(game9.roles.iter().filter(|r| **r == Role::Mafia).count(), 3);
    }

    #[test]
    fn doctor_save_matching_kill_target_prevents_death() {
        let mut game = make(5);
        let mafia_seat = game.living_with_role(Role::Mafia)[0];
        let doctor_seat = game.living_with_role(Role::Doctor)[0];
        let victim_seat = (0..5).find(|&s| s != mafia_seat && s != doctor_seat).unwrap();

        game.apply_move(&game.players[mafia_seat].clone(), json!({"action": "kill", "target": game.players[victim_seat]}));
        game.apply_move(&game.players[doctor_seat].clone(), json!({"action": "save", "target": game.players[victim_seat]}));
        if let Some(detective_seat) = game.living_with_role(Role::Detective).first().copied() {
            game.apply_move(&game.players[detective_seat].clone(), json!({"action": "investigate", "target": game.players[victim_seat]}));
        }
        assert!(game.alive[victim_seat]);
        assert_eq!(game.phase, Phase::Day);
    }

    #[test]
    fn day_timer_expiry_moves_to_lynch() {
        let mut game = make(5);
        game.phase = Phase::Day;
        let outcome = game.on_timer(DAY_TIMER);
        assert_eq!(game.phase, Phase::Lynch);
        assert!(matches!(outcome, Outcome::Changed { timeout_note: Some(_), .. }));
    }

    #[test]
    fn lynch_tie_eliminates_nobody() {
        let mut game = make(4);
        game.phase = Phase::Lynch;
        let players = game.players.clone();
        game.apply_move(&players[0], json!({"action": "vote", "target": players[1]}));
        game.apply_move(&players[1], json!({"action": "vote", "target": players[0]}));
        game.apply_move(&players[2], json!({"action": "vote", "target": players[1]}));
        game.apply_move(&players[3], json!({"action": "vote", "target": players[0]}));
        assert!(game.alive.iter().all(|a| *a));
    }
}
