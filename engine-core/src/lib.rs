//! The uniform game-engine contract (§4.4 of the design spec).
//!
//! Every game type implements [`GameEngine`] as a plain, network-ignorant
//! state machine: it receives a move, validates it against its own rules and
//! the universal turn discipline, and either mutates its state or rejects
//! the move without touching it. The `engines` crate wraps each concrete
//! engine in a single tagged-variant `Engine` enum so the room layer never
//! needs dynamic dispatch.

mod timer;

pub use timer::TimerCommand;

use protocol::{ErrorKind, PlayerId};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, used by engines that need to stamp
/// `game_start_time` or compute a turn/question deadline (§4.4-1).
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// The result of a single [`GameEngine::apply_move`] or
/// [`GameEngine::on_timer`] call.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The move was legal and applied. `timers` are declarative requests for
    /// the room layer's `TimerRegistry` to schedule or cancel (§5, §9); the
    /// engine never touches a clock itself. `game_over` mirrors
    /// `is_over()` immediately after the move, as a convenience for the
    /// dispatcher. `timeout_note`, when set, means this particular change
    /// was itself the result of a deadline expiring (Speed TicTacToe,
    /// Speed Jeopardy) and should be reported via the `timeout` outbound
    /// type rather than a plain `game_state` broadcast.
    Changed {
        timers: Vec<TimerCommand>,
        game_over: bool,
        timeout_note: Option<String>,
    },
    /// The move was illegal or otherwise rejected; engine state is
    /// byte-identical to before the call (§8 I4).
    Rejected(ErrorKind),
}

impl Outcome {
    pub fn changed() -> Self {
        Outcome::Changed {
            timers: Vec::new(),
            game_over: false,
            timeout_note: None,
        }
    }

    pub fn changed_game_over() -> Self {
        Outcome::Changed {
            timers: Vec::new(),
            game_over: true,
            timeout_note: None,
        }
    }

    pub fn with_timer(mut self, cmd: TimerCommand) -> Self {
        if let Outcome::Changed { timers, .. } = &mut self {
            timers.push(cmd);
        }
        self
    }

    pub fn timeout(note: impl Into<String>, game_over: bool) -> Self {
        Outcome::Changed {
            timers: Vec::new(),
            game_over,
            timeout_note: Some(note.into()),
        }
    }

    pub fn reject(kind: ErrorKind) -> Self {
        Outcome::Rejected(kind)
    }
}

/// The uniform five-operation contract every engine implements (§4.4).
pub trait GameEngine: Sized {
    /// Deterministic from `players`/`mode` except for documented randomness
    /// (deck shuffle, word pick, role assignment).
    fn init(players: &[PlayerId], mode: &str) -> Self;

    /// Validates authority and legality; mutates on success, leaves state
    /// untouched on rejection (§8 I4).
    fn apply_move(&mut self, player_id: &str, payload: Value) -> Outcome;

    /// A JSON-safe projection of the full engine state, suitable for
    /// broadcast (§4.4-3). Must be a pure function of engine state (§8).
    fn snapshot(&self) -> Value;

    fn is_over(&self) -> bool;

    /// Empty, a `player_id`, or a sentinel (`"draw"`, `"lose"`, a faction
    /// name).
    fn winner(&self) -> Option<String>;

    fn min_players() -> u8;
    fn max_players() -> u8;
    fn joinable_mid_game() -> bool;

    /// Re-enters the engine when a previously requested timer fires. The
    /// default no-ops for engines that never request timers.
    fn on_timer(&mut self, _timer_id: u32) -> Outcome {
        Outcome::changed()
    }

    /// Timers to arm the moment the engine is created, before any move has
    /// been applied (e.g. a speed-mode's first question/turn deadline). The
    /// default is none, for engines with no at-creation deadline.
    fn initial_timers(&self) -> Vec<TimerCommand> {
        Vec::new()
    }
}
