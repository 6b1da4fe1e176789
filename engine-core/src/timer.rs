//! Declarative timer requests an engine can hand back to the room layer.
//!
//! Ported from the teacher's `backbone-lib::timer` idea of engine-requested,
//! id-keyed timers, but engines here never drive the clock themselves —
//! they only ever *describe* what they want scheduled. The server's
//! `TimerRegistry` (see the `server` crate) is the only thing that ever
//! calls `tokio::time::sleep`.

/// A timer request emitted alongside an [`crate::Outcome::Changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Schedule (or replace, if `timer_id` is already pending) a callback
    /// `duration_ms` from now. When it fires, the room layer calls
    /// `GameEngine::on_timer(timer_id)`.
    Set { timer_id: u32, duration_ms: u64 },
    /// Cancel a previously scheduled timer. A no-op if it already fired or
    /// was never set.
    Cancel { timer_id: u32 },
}
