//! Uno (§4.5). `card_idx: null` is treated as a draw — the source this was
//! distilled from left the no-playable-card case as a client-side decision,
//! engines here model it explicitly so a player is never stuck.
//!
//! Deck-low reshuffle policy (resolved open question): when the draw pile
//! drops below 5 cards, the discard pile (excluding its top card) is
//! shuffled back into a fresh draw pile.

use crate::util::seat_of;
use engine_core::{now_millis, GameEngine, Outcome};
use protocol::{ErrorKind, PlayerId};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::{json, Value};

const RESHUFFLE_THRESHOLD: usize = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Color {
    Red,
    Yellow,
    Green,
    Blue,
}

impl Color {
    const ALL: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

    fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Kind {
    Number(u8),
    Skip,
    Reverse,
    Draw2,
    Wild,
    Wild4,
}

#[derive(Clone, Copy, Debug)]
struct Card {
    color: Option<Color>,
    kind: Kind,
}

impl Card {
    fn is_wild(&self) -> bool {
        matches!(self.kind, Kind::Wild | Kind::Wild4)
    }

    fn matches(&self, current_color: Color, current_kind: Kind) -> bool {
        if self.is_wild() {
            return true;
        }
        if self.color == Some(current_color) {
            return true;
        }
        matches!(
            (self.kind, current_kind),
            (Kind::Number(a), Kind::Number(b)) if a == b
        ) || matches!(
            (self.kind, current_kind),
            (Kind::Skip, Kind::Skip) | (Kind::Reverse, Kind::Reverse) | (Kind::Draw2, Kind::Draw2)
        )
    }

    fn to_code(self) -> String {
        let kind = match self.kind {
            Kind::Number(n) => n.to_string(),
            Kind::Skip => "skip".to_string(),
            Kind::Reverse => "reverse".to_string(),
            Kind::Draw2 => "draw2".to_string(),
            Kind::Wild => "wild".to_string(),
            Kind::Wild4 => "wild4".to_string(),
        };
        match self.color {
            Some(c) => format!("{}_{}", c.as_str(), kind),
            None => kind,
        }
    }
}

#[derive(Deserialize)]
struct MoveInput {
    #[serde(default)]
    card_idx: Option<usize>,
    #[serde(default)]
    chosen_color: Option<Color>,
}

fn build_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(108);
    for &color in Color::ALL.iter() {
        deck.push(Card { color: Some(color), kind: Kind::Number(0) });
        for n in 1..=9u8 {
            deck.push(Card { color: Some(color), kind: Kind::Number(n) });
            deck.push(Card { color: Some(color), kind: Kind::Number(n) });
        }
        for _ in 0..2 {
            deck.push(Card { color: Some(color), kind: Kind::Skip });
            deck.push(Card { color: Some(color), kind: Kind::Reverse });
            deck.push(Card { color: Some(color), kind: Kind::Draw2 });
        }
    }
    for _ in 0..4 {
        deck.push(Card { color: None, kind: Kind::Wild });
        deck.push(Card { color: None, kind: Kind::Wild4 });
    }
    deck
}

pub struct Uno {
    players: Vec<PlayerId>,
    mode: String,
    hands: Vec<Vec<Card>>,
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
    current_color: Color,
    current_kind: Kind,
    direction: i32,
    turn: usize,
    over: bool,
    winner: Option<String>,
    game_start_time: u64,
}

impl Uno {
    fn draw_into(&mut self, seat: usize) {
        if let Some(card) = self.draw_card() {
            self.hands[seat].push(card);
        }
    }

    fn draw_card(&mut self) -> Option<Card> {
        if self.draw_pile.len() < RESHUFFLE_THRESHOLD && self.discard_pile.len() > 1 {
            let top = self.discard_pile.pop();
            self.draw_pile.append(&mut self.discard_pile);
            self.draw_pile.shuffle(&mut rand::rng());
            if let Some(top) = top {
                self.discard_pile.push(top);
            }
        }
        self.draw_pile.pop()
    }

    fn advance(&mut self, steps: i32) {
        let len = self.players.len() as i32;
        self.turn = (self.turn as i32 + self.direction * steps).rem_euclid(len) as usize;
    }
}

impl GameEngine for Uno {
    fn init(players: &[PlayerId], mode: &str) -> Self {
        let mut deck = build_deck();
        deck.shuffle(&mut rand::rng());
        let mut hands = vec![Vec::new(); players.len()];
        for hand in hands.iter_mut() {
            for _ in 0..7 {
                if let Some(card) = deck.pop() {
                    hand.push(card);
                }
            }
        }
        let mut discard_pile = Vec::new();
        loop {
            match deck.pop() {
                Some(card) if !card.is_wild() => {
                    discard_pile.push(card);
                    break;
                }
                Some(wild) => deck.insert(0, wild),
                None => break,
            }
        }
        let top = discard_pile.last().copied().unwrap_or(Card { color: Some(Color::Red), kind: Kind::Number(0) });
        Uno {
            players: players.to_vec(),
            mode: mode.to_string(),
            hands,
            draw_pile: deck,
            discard_pile,
            current_color: top.color.unwrap_or(Color::Red),
            current_kind: top.kind,
            direction: 1,
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
        let input: MoveInput = match serde_json::from_value(payload) {
            Ok(v) => v,
            Err(e) => return Outcome::reject(ErrorKind::ValidationFailed(format!("{e}"))),
        };

        let Some(idx) = input.card_idx else {
            self.draw_into(seat);
            self.advance(1);
            return Outcome::changed();
        };
        if idx >= self.hands[seat].len() {
            return Outcome::reject(ErrorKind::IllegalMove("card index out of range".into()));
        }
        let card = self.hands[seat][idx];
        if !card.matches(self.current_color, self.current_kind) {
            return Outcome::reject(ErrorKind::IllegalMove("card does not match color or value".into()));
        }

        self.hands[seat].remove(idx);
        self.discard_pile.push(card);
        self.current_kind = card.kind;
        self.current_color = if card.is_wild() { input.chosen_color.unwrap_or(Color::Red) } else { card.color.unwrap() };

        if self.hands[seat].is_empty() {
            self.over = true;
            self.winner = Some(self.players[seat].clone());
            return Outcome::changed_game_over();
        }

        let steps = match card.kind {
            Kind::Skip => 2,
            Kind::Reverse => {
                if self.players.len() == 2 {
                    2
                } else {
                    self.direction = -self.direction;
                    1
                }
            }
            Kind::Draw2 => {
                let next = (self.turn as i32 + self.direction).rem_euclid(self.players.len() as i32) as usize;
                self.draw_into(next);
                self.draw_into(next);
                2
            }
            Kind::Wild4 => {
                let next = (self.turn as i32 + self.direction).rem_euclid(self.players.len() as i32) as usize;
                for _ in 0..4 {
                    self.draw_into(next);
                }
                2
            }
            _ => 1,
        };
        self.advance(steps);
        Outcome::changed()
    }

    fn snapshot(&self) -> Value {
        json!({
            "players": self.players,
            "game_mode": self.mode,
            "hands": self.hands.iter().map(|h| h.iter().map(|c| c.to_code()).collect::<Vec<_>>()).collect::<Vec<_>>(),
            "hand_sizes": self.hands.iter().map(|h| h.len()).collect::<Vec<_>>(),
            "draw_pile_size": self.draw_pile.len(),
            "top_card": self.discard_pile.last().map(|c| c.to_code()),
            "current_color": self.current_color.as_str(),
            "direction": self.direction,
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
        8
    }

    fn joinable_mid_game() -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_cards(game: &Uno) -> usize {
        game.hands.iter().map(|h| h.len()).sum::<usize>() + game.draw_pile.len() + game.discard_pile.len()
    }

    #[test]
    fn i9_deck_conserves_card_count() {
        let game = Uno::init(&["p1".to_string(), "p2".to_string(), "p3".to_string()], "classic");
        assert_eq!(total_cards(&game), 108);
    }

    #[test]
    fn card_idx_null_draws_and_passes_turn() {
        let mut game = Uno::init(&["p1".to_string(), "p2".to_string()], "classic");
        let before = game.hands[0].len();
        game.apply_move("p1", json!({"card_idx": null}));
        assert_eq!(game.hands[0].len(), before + 1);
        assert_eq!(game.turn, 1);
        assert_eq!(total_cards(&game), 108);
    }

    #[test]
    fn non_matching_card_rejected() {
        let mut game = Uno::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.hands[0] = vec![Card { color: Some(Color::Red), kind: Kind::Number(1) }];
        game.current_color = Color::Blue;
        game.current_kind = Kind::Number(9);
        let outcome = game.apply_move("p1", json!({"card_idx": 0}));
        assert!(matches!(outcome, Outcome::Rejected(ErrorKind::IllegalMove(_))));
    }

    #[test]
    fn skip_card_advances_turn_by_two() {
        let mut game = Uno::init(&["p1".to_string(), "p2".to_string(), "p3".to_string()], "classic");
        game.hands[0] = vec![Card { color: Some(Color::Red), kind: Kind::Skip }, Card { color: Some(Color::Red), kind: Kind::Number(2) }];
        game.current_color = Color::Red;
        game.current_kind = Kind::Number(5);
        game.apply_move("p1", json!({"card_idx": 0}));
        assert_eq!(game.turn, 2);
    }

    #[test]
    fn emptying_hand_wins_the_game() {
        let mut game = Uno::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.hands[0] = vec![Card { color: Some(Color::Red), kind: Kind::Number(2) }];
        game.current_color = Color::Red;
        game.current_kind = Kind::Number(5);
        let outcome = game.apply_move("p1", json!({"card_idx": 0}));
        assert!(game.is_over());
        assert_eq!(game.winner(), Some("p1".to_string()));
        assert!(matches!(outcome, Outcome::Changed { game_over: true, .. }));
    }

    #[test]
    fn wild_card_defaults_to_red_without_chosen_color() {
        let mut game = Uno::init(&["p1".to_string(), "p2".to_string()], "classic");
        game.hands[0] = vec![Card { color: None, kind: Kind::Wild }, Card { color: Some(Color::Green), kind: Kind::Number(1) }];
        game.current_color = Color::Blue;
        game.current_kind = Kind::Number(5);
        game.apply_move("p1", json!({"card_idx": 0}));
        assert_eq!(game.current_color, Color::Red);
    }
}
