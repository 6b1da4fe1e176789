use serde::{Deserialize, Serialize};

/// The closed enumeration of game rulesets the server can host (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    TicTacToe,
    Jeopardy,
    Hangman,
    Memory,
    Battleship,
    Trivia,
    Rps,
    ConnectFour,
    Checkers,
    DotsAndBoxes,
    Uno,
    Mafia,
}

impl GameType {
    /// All twelve engines, in table order from spec §4.5.
    pub const ALL: [GameType; 12] = [
        GameType::TicTacToe,
        GameType::Jeopardy,
        GameType::Hangman,
        GameType::Memory,
        GameType::Battleship,
        GameType::Trivia,
        GameType::Rps,
        GameType::ConnectFour,
        GameType::Checkers,
        GameType::DotsAndBoxes,
        GameType::Uno,
        GameType::Mafia,
    ];

    /// Lowercase, snake_case wire name, matching the `serde` representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::TicTacToe => "tic_tac_toe",
            GameType::Jeopardy => "jeopardy",
            GameType::Hangman => "hangman",
            GameType::Memory => "memory",
            GameType::Battleship => "battleship",
            GameType::Trivia => "trivia",
            GameType::Rps => "rps",
            GameType::ConnectFour => "connect_four",
            GameType::Checkers => "checkers",
            GameType::DotsAndBoxes => "dots_and_boxes",
            GameType::Uno => "uno",
            GameType::Mafia => "mafia",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        for gt in GameType::ALL {
            let json = serde_json::to_string(&gt).unwrap();
            let back: GameType = serde_json::from_str(&json).unwrap();
            assert_eq!(gt, back);
        }
    }

    #[test]
    fn rejects_unknown_game_type() {
        let result: Result<GameType, _> = serde_json::from_str("\"checkers2\"");
        assert!(result.is_err());
    }
}
