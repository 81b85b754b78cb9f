//! Area scoring (Chinese rules).
//!
//! Stones on the board count for their owner. Each empty region counts for
//! a color when only that color's stones border it; regions touching both
//! colors, or neither, are neutral.

use crate::board::{Color, empty_regions, neighbors};
use crate::position::Position;

/// Result of a finished game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Winner(Color),
    Draw,
}

impl Outcome {
    /// Game value from `color`'s point of view: `1.0`, `-1.0` or `0.0`.
    pub fn value_for(self, color: Color) -> f64 {
        match self {
            Outcome::Draw => 0.0,
            Outcome::Winner(w) if w == color => 1.0,
            Outcome::Winner(_) => -1.0,
        }
    }
}

/// Compute `(black_area, white_area)`.
pub fn areas(pos: &Position) -> (usize, usize) {
    let size = pos.size();
    let occupied = pos.occupied();
    let black = pos.black();
    let white = pos.white();

    let mut black_area = pos.stone_count(Color::Black);
    let mut white_area = pos.stone_count(Color::White);

    for region in empty_regions(&occupied, size) {
        let mut black_claim = false;
        let mut white_claim = false;
        for &pt in &region {
            for n in neighbors(pt, size) {
                black_claim |= black[n];
                white_claim |= white[n];
            }
        }
        match (black_claim, white_claim) {
            (true, false) => black_area += region.len(),
            (false, true) => white_area += region.len(),
            _ => {}
        }
    }

    (black_area, white_area)
}

/// Sign of `black_area - white_area - komi`: `1` black wins, `-1` white
/// wins, `0` tie.
pub fn winning(pos: &Position, komi: f32) -> i8 {
    let (black, white) = areas(pos);
    let margin = black as f32 - white as f32 - komi;
    if margin > 0.0 {
        1
    } else if margin < 0.0 {
        -1
    } else {
        0
    }
}

/// Outcome of the position under the given komi.
pub fn outcome(pos: &Position, komi: f32) -> Outcome {
    match winning(pos, komi) {
        1 => Outcome::Winner(Color::Black),
        -1 => Outcome::Winner(Color::White),
        _ => Outcome::Draw,
    }
}

/// The winning color, or `None` for a tie.
pub fn winner(pos: &Position, komi: f32) -> Option<Color> {
    match outcome(pos, komi) {
        Outcome::Winner(color) => Some(color),
        Outcome::Draw => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_is_neutral() {
        let pos = Position::new(9).unwrap();
        assert_eq!(areas(&pos), (0, 0));
        assert_eq!(winning(&pos, 0.0), 0);
        assert_eq!(winner(&pos, 7.5), Some(Color::White));
    }

    #[test]
    fn test_single_stone_owns_board() {
        let pos = Position::new(5).unwrap().play(12).unwrap();
        assert_eq!(areas(&pos), (25, 0));
        assert_eq!(outcome(&pos, 7.5), Outcome::Winner(Color::Black));
    }

    #[test]
    fn test_wall_splits_territory() {
        // Black wall on column 1, white wall on column 3 of a 5x5 board.
        let black: Vec<_> = (0..5).map(|r| r * 5 + 1).collect();
        let white: Vec<_> = (0..5).map(|r| r * 5 + 3).collect();
        let pos = Position::setup(5, &black, &white, Color::Black).unwrap();

        // Column 0 is black's, column 4 white's, column 2 is shared.
        assert_eq!(areas(&pos), (10, 10));
        assert_eq!(winning(&pos, 0.5), -1);
        assert_eq!(winning(&pos, -0.5), 1);
        assert_eq!(outcome(&pos, 0.0), Outcome::Draw);
    }

    #[test]
    fn test_outcome_value() {
        assert_eq!(Outcome::Draw.value_for(Color::Black), 0.0);
        assert_eq!(Outcome::Winner(Color::White).value_for(Color::White), 1.0);
        assert_eq!(Outcome::Winner(Color::White).value_for(Color::Black), -1.0);
    }
}
