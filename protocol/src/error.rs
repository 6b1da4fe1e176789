use thiserror::Error;

/// The closed taxonomy of rejection reasons (§7). Every variant's `Display`
/// is the verbatim, human-readable string sent back to the originating
/// session as an `error` outbound message payload.
#[derive(Debug, Clone, Error)]
pub enum ErrorKind {
    /// Missing/empty required field, malformed room code, bad payload shape.
    #[error("{0}")]
    ValidationFailed(String),

    /// Room code or game id does not refer to anything live.
    #[error("{0}")]
    NotFound(String),

    /// Caller is not the host, or supplied the wrong password.
    #[error("{0}")]
    Forbidden(String),

    /// Room already holds the maximum number of players.
    #[error("room is full")]
    Full,

    /// A move was submitted out of turn.
    #[error("it is not your turn")]
    NotYourTurn,

    /// The move itself is not a legal game action (cell taken, card
    /// unplayable, coordinates off-board, ...).
    #[error("{0}")]
    IllegalMove(String),

    /// The same action (letter, guess, vote) was already recorded.
    #[error("{0}")]
    Duplicate(String),

    /// A move arrived after the game already ended.
    #[error("the game is already over")]
    AlreadyOver,

    /// The requested operation conflicts with existing state (e.g. already
    /// queued for quick-match).
    #[error("{0}")]
    Conflict(String),
}

impl ErrorKind {
    /// The message shown to the user, verbatim (§7: "a short human-readable
    /// string").
    pub fn message(&self) -> String {
        self.to_string()
    }
}
