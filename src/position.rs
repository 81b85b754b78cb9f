//! Go position representation and move execution.
//!
//! This module provides the core game logic for Go, including:
//! - Board state as parallel stone planes plus turn, pass and game-over flags
//! - Stone placement and capture detection
//! - Ko rule enforcement
//! - The legality mask for the player to move (suicide and ko)
//! - Eye detection for rollout move filtering
//!
//! A [`Position`] is never changed after construction: [`apply`] returns a
//! new position, so positions may be cloned, cached and shared freely.

use std::fmt;

use crate::board::{
    self, Action, Color, Point, action_size, check_size, diagonal_neighbors, group_at, groups,
    is_edge, neighbors, pass_action, to_point,
};
use crate::error::{Error, MoveError, Result};

/// A Go position (board state).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    size: usize,
    /// Stone planes, indexed by [`Color::index`]
    stones: [Vec<bool>; 2],
    /// Color to move next
    turn: Color,
    /// Points the player to move may not play
    invalid: Vec<bool>,
    /// The last move was a pass
    previous_pass: bool,
    /// Two consecutive passes were played
    terminal: bool,
    /// Point forbidden to the player to move by the ko rule
    ko: Option<Point>,
}

impl Position {
    /// An empty board with black to move.
    pub fn new(size: usize) -> Result<Self> {
        let size = check_size(size)?;
        let area = size * size;
        Ok(Position {
            size,
            stones: [vec![false; area], vec![false; area]],
            turn: Color::Black,
            invalid: vec![false; area],
            previous_pass: false,
            terminal: false,
            ko: None,
        })
    }

    /// Build a position from stone lists.
    ///
    /// Groups without liberties are not removed; callers are expected to
    /// describe a position that could occur in play.
    pub fn setup(size: usize, black: &[Point], white: &[Point], turn: Color) -> Result<Self> {
        let mut pos = Position::new(size)?;
        let area = size * size;

        for (color, points) in [(Color::Black, black), (Color::White, white)] {
            for &pt in points {
                if pt >= area {
                    return Err(Error::InvalidSetup(format!("point {pt} is off the board")));
                }
                if pos.color_at(pt).is_some() {
                    return Err(Error::InvalidSetup(format!("point {pt} is given twice")));
                }
                pos.stones[color.index()][pt] = true;
            }
        }

        pos.turn = turn;
        pos.invalid = compute_invalid(&pos.stones, size, turn, None);
        Ok(pos)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn black(&self) -> &[bool] {
        &self.stones[Color::Black.index()]
    }

    #[inline]
    pub fn white(&self) -> &[bool] {
        &self.stones[Color::White.index()]
    }

    #[inline]
    pub fn stones(&self, color: Color) -> &[bool] {
        &self.stones[color.index()]
    }

    /// The color whose turn it is.
    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Legality mask over points for the player to move.
    #[inline]
    pub fn invalid(&self) -> &[bool] {
        &self.invalid
    }

    #[inline]
    pub fn previous_pass(&self) -> bool {
        self.previous_pass
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    #[inline]
    pub fn ko_point(&self) -> Option<Point> {
        self.ko
    }

    #[inline]
    pub fn pass_action(&self) -> Action {
        pass_action(self.size)
    }

    #[inline]
    pub fn action_size(&self) -> usize {
        action_size(self.size)
    }

    pub fn color_at(&self, pt: Point) -> Option<Color> {
        if self.stones[0][pt] {
            Some(Color::Black)
        } else if self.stones[1][pt] {
            Some(Color::White)
        } else {
            None
        }
    }

    /// Points holding a stone of either color.
    pub fn occupied(&self) -> Vec<bool> {
        occupied(&self.stones)
    }

    pub fn stone_count(&self, color: Color) -> usize {
        self.stones(color).iter().filter(|&&s| s).count()
    }

    /// Action-space mask of legal moves (pass included).
    ///
    /// Every entry is `false` once the game is over.
    pub fn valid_moves(&self) -> Vec<bool> {
        if self.terminal {
            return vec![false; self.action_size()];
        }
        let mut valid: Vec<bool> = self.invalid.iter().map(|&i| !i).collect();
        valid.push(true);
        valid
    }

    /// Legal actions in increasing order, pass last.
    pub fn legal_actions(&self) -> Vec<Action> {
        mask_to_actions(&self.valid_moves())
    }

    pub fn is_legal(&self, action: Action) -> bool {
        !self.terminal
            && (action == self.pass_action()
                || (action < self.pass_action() && !self.invalid[action]))
    }

    /// True eyes of `color`.
    ///
    /// An empty first-line point is an eye if every in-bounds point of its
    /// 3x3 neighborhood is a stone of `color`. An empty interior point needs
    /// all four orthogonal neighbors and at least three diagonal neighbors.
    pub fn eyes(&self, color: Color) -> Vec<bool> {
        let own = self.stones(color);
        let occupied = self.occupied();

        (0..self.size * self.size)
            .map(|pt| {
                if occupied[pt] || !neighbors(pt, self.size).all(|n| own[n]) {
                    return false;
                }
                let own_diagonals = diagonal_neighbors(pt, self.size).filter(|&d| own[d]).count();
                if is_edge(pt, self.size) {
                    own_diagonals == diagonal_neighbors(pt, self.size).count()
                } else {
                    own_diagonals >= 3
                }
            })
            .collect()
    }

    /// Legal moves that do not fill one of the mover's own true eyes.
    ///
    /// Passing stays legal in this view whenever the game is still running.
    pub fn advanced_valid_moves(&self) -> Vec<bool> {
        let mut valid = self.valid_moves();
        if self.terminal {
            return valid;
        }
        for (v, eye) in valid.iter_mut().zip(self.eyes(self.turn)) {
            if eye {
                *v = false;
            }
        }
        valid
    }

    pub fn advanced_legal_actions(&self) -> Vec<Action> {
        mask_to_actions(&self.advanced_valid_moves())
    }

    /// Shorthand for [`apply`].
    pub fn play(&self, action: Action) -> Result<Position> {
        apply(self, action)
    }

    /// Play at `(row, col)`.
    pub fn play_at(&self, row: usize, col: usize) -> Result<Position> {
        if row >= self.size || col >= self.size {
            return Err(Error::IllegalMove {
                action: self.action_size(),
                reason: MoveError::OutOfRange,
            });
        }
        apply(self, to_point(row, col, self.size))
    }

    pub fn pass(&self) -> Result<Position> {
        apply(self, self.pass_action())
    }
}

fn occupied(stones: &[Vec<bool>; 2]) -> Vec<bool> {
    stones[0].iter().zip(&stones[1]).map(|(&b, &w)| b || w).collect()
}

fn mask_to_actions(mask: &[bool]) -> Vec<Action> {
    mask.iter()
        .enumerate()
        .filter_map(|(a, &ok)| ok.then_some(a))
        .collect()
}

/// Play an action and return the resulting position.
///
/// A pass sets the pass flag; a second consecutive pass ends the game.
/// A stone placement removes every adjacent opponent group left without
/// liberties, sets the ko point when exactly one single stone was taken by
/// a stone played into an opponent eye, and recomputes the legality mask
/// for the next player.
///
/// # Errors
/// - [`Error::IllegalCall`] if the game is already over
/// - [`Error::IllegalMove`] if the action is out of range or marked invalid
pub fn apply(pos: &Position, action: Action) -> Result<Position> {
    if pos.terminal {
        return Err(Error::IllegalCall("apply on a finished game"));
    }
    let size = pos.size;
    let pass = pass_action(size);
    if action > pass {
        return Err(Error::IllegalMove {
            action,
            reason: MoveError::OutOfRange,
        });
    }

    let player = pos.turn;
    let mut next = pos.clone();
    next.ko = None;

    if action == pass {
        next.previous_pass = true;
        if pos.previous_pass {
            next.terminal = true;
        }
    } else {
        if pos.invalid[action] {
            return Err(Error::IllegalMove {
                action,
                reason: invalid_reason(pos, action),
            });
        }
        next.previous_pass = false;
        next.stones[player.index()][action] = true;

        // Checked against opponent stones only, before any capture.
        let opponent_plane = &next.stones[player.opponent().index()];
        let surrounded = neighbors(action, size).all(|n| opponent_plane[n]);

        let captured = remove_dead_neighbors(&mut next.stones, action, size, player);
        if surrounded && captured.len() == 1 && captured[0].len() == 1 {
            next.ko = Some(captured[0][0]);
        }
    }

    next.turn = player.opponent();
    next.invalid = compute_invalid(&next.stones, size, next.turn, next.ko);
    Ok(next)
}

/// Remove opponent groups adjacent to `pt` that have no liberties.
///
/// Returns the stones of each captured group.
fn remove_dead_neighbors(
    stones: &mut [Vec<bool>; 2],
    pt: Point,
    size: usize,
    player: Color,
) -> Vec<Vec<Point>> {
    let opp = player.opponent().index();
    let occupied = occupied(stones);
    let mut seen = vec![false; size * size];
    let mut captured = Vec::new();

    for n in neighbors(pt, size) {
        if !stones[opp][n] || seen[n] {
            continue;
        }
        let group = group_at(&stones[opp], &occupied, n, size);
        for &s in &group.stones {
            seen[s] = true;
        }
        if group.liberties.is_empty() {
            captured.push(group.stones);
        }
    }

    for group in &captured {
        for &s in group {
            stones[opp][s] = false;
        }
    }
    captured
}

/// Compute the points `to_move` may not play.
///
/// An empty point is forbidden when all of its in-bounds neighbors are
/// stones and playing there neither captures (no adjacent opponent group
/// is in atari) nor connects to a friendly group with another liberty.
/// Occupied points and the ko point are always forbidden.
fn compute_invalid(
    stones: &[Vec<bool>; 2],
    size: usize,
    to_move: Color,
    ko: Option<Point>,
) -> Vec<bool> {
    let area = size * size;
    let occupied = occupied(stones);
    let mut possible_invalid = vec![false; area];
    let mut definite_valid = vec![false; area];

    // Own group in atari: filling its last liberty is suicide unless something
    // else saves it. Own group with more liberties: connecting is safe.
    for group in groups(&stones[to_move.index()], &occupied, size) {
        let target = if group.liberties.len() == 1 {
            &mut possible_invalid
        } else {
            &mut definite_valid
        };
        for &l in &group.liberties {
            target[l] = true;
        }
    }

    // Opponent group in atari: playing its last liberty captures.
    for group in groups(&stones[to_move.opponent().index()], &occupied, size) {
        let target = if group.liberties.len() == 1 {
            &mut definite_valid
        } else {
            &mut possible_invalid
        };
        for &l in &group.liberties {
            target[l] = true;
        }
    }

    let mut invalid: Vec<bool> = (0..area)
        .map(|pt| {
            occupied[pt]
                || (possible_invalid[pt]
                    && !definite_valid[pt]
                    && neighbors(pt, size).all(|n| occupied[n]))
        })
        .collect();

    if let Some(ko) = ko {
        invalid[ko] = true;
    }
    invalid
}

fn invalid_reason(pos: &Position, pt: Point) -> MoveError {
    if pos.color_at(pt).is_some() {
        MoveError::Occupied
    } else if pos.ko == Some(pt) {
        MoveError::Ko
    } else {
        MoveError::Suicide
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            write!(f, "{:>2} ", self.size - row)?;
            for col in 0..self.size {
                let pt = to_point(row, col, self.size);
                let ch = match self.color_at(pt) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for col in 0..self.size {
            let vertex = board::vertex_string(to_point(self.size - 1, col, self.size), self.size);
            write!(f, "{} ", &vertex[..1])?;
        }
        writeln!(f)?;
        write!(
            f,
            "{} to play, last move passed: {}, game over: {}",
            self.turn, self.previous_pass, self.terminal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(size: usize, moves: &[Action]) -> Position {
        let mut pos = Position::new(size).unwrap();
        for &mv in moves {
            pos = apply(&pos, mv).unwrap();
        }
        pos
    }

    #[test]
    fn test_empty_position() {
        let pos = Position::new(9).unwrap();
        assert_eq!(pos.turn(), Color::Black);
        assert!(!pos.previous_pass());
        assert!(!pos.is_terminal());
        assert_eq!(pos.ko_point(), None);
        assert!(pos.invalid().iter().all(|&i| !i));
        assert_eq!(pos.legal_actions().len(), 82);
    }

    #[test]
    fn test_play_move_basic() {
        let pos = Position::new(9).unwrap();
        let next = pos.play(40).unwrap();
        assert_eq!(next.color_at(40), Some(Color::Black));
        assert_eq!(next.turn(), Color::White);
        assert!(next.invalid()[40]);
        // The input position is untouched.
        assert_eq!(pos.color_at(40), None);
    }

    #[test]
    fn test_play_occupied() {
        let pos = play_all(5, &[12]);
        let err = pos.play(12).unwrap_err();
        assert_eq!(
            err,
            Error::IllegalMove {
                action: 12,
                reason: MoveError::Occupied
            }
        );
    }

    #[test]
    fn test_out_of_range() {
        let pos = Position::new(5).unwrap();
        assert!(matches!(
            pos.play(26),
            Err(Error::IllegalMove {
                reason: MoveError::OutOfRange,
                ..
            })
        ));
        assert!(pos.play_at(5, 0).is_err());
    }

    #[test]
    fn test_play_move_suicide() {
        // Black at B1 and A2 (points 1 and 5), white tries the corner.
        let pos = play_all(5, &[1, 24, 5]);
        assert_eq!(pos.turn(), Color::White);
        assert!(pos.invalid()[0]);
        let err = pos.play(0).unwrap_err();
        assert_eq!(
            err,
            Error::IllegalMove {
                action: 0,
                reason: MoveError::Suicide
            }
        );
    }

    #[test]
    fn test_filling_own_last_liberty_is_suicide() {
        // Black stones at 0 and 2 share the liberty 1 with a white wall.
        let pos = Position::setup(5, &[0, 2], &[5, 6, 7, 3], Color::Black).unwrap();
        // Black at 1 would join 0 and 2 into a group with no liberties.
        assert!(pos.invalid()[1]);
        // White at 1 captures both black stones.
        let pos = Position::setup(5, &[0, 2], &[5, 6, 7, 3], Color::White).unwrap();
        assert!(!pos.invalid()[1]);
        let next = pos.play(1).unwrap();
        assert_eq!(next.stone_count(Color::Black), 0);
    }

    #[test]
    fn test_capture_is_not_suicide() {
        // White at A1 in atari, black plays the last liberty inside white's wall.
        let pos = Position::setup(5, &[1], &[0, 6, 10], Color::Black).unwrap();
        // Point 5 touches white 0 (one liberty: 5) and white 6/10.
        assert!(!pos.invalid()[5]);
        let next = pos.play(5).unwrap();
        assert_eq!(next.color_at(0), None, "corner stone should be captured");
    }

    #[test]
    fn test_pass_flags() {
        let pos = Position::new(5).unwrap();
        let once = pos.pass().unwrap();
        assert!(once.previous_pass());
        assert!(!once.is_terminal());
        assert_eq!(once.turn(), Color::White);

        let twice = once.pass().unwrap();
        assert!(twice.is_terminal());
        assert_eq!(twice.pass(), Err(Error::IllegalCall("apply on a finished game")));
        assert!(twice.valid_moves().iter().all(|&v| !v));
    }

    #[test]
    fn test_stone_clears_pass_flag() {
        let pos = play_all(5, &[25, 12]);
        assert!(!pos.previous_pass());
        let pos = pos.pass().unwrap();
        assert!(!pos.is_terminal(), "pass after a stone does not end the game");
    }

    #[test]
    fn test_eye_detection() {
        // Black eye in the corner at 0, walls at 1, 5, 6.
        let pos = Position::setup(5, &[1, 5, 6], &[], Color::Black).unwrap();
        let eyes = pos.eyes(Color::Black);
        assert!(eyes[0]);
        assert_eq!(eyes.iter().filter(|&&e| e).count(), 1);
        assert!(!pos.eyes(Color::White)[0]);

        // Without the diagonal, the corner is not a true eye.
        let pos = Position::setup(5, &[1, 5], &[], Color::Black).unwrap();
        assert!(!pos.eyes(Color::Black)[0]);
    }

    #[test]
    fn test_interior_eye_tolerates_one_diagonal() {
        // Eye at 12 with orthogonals 7, 11, 13, 17 and three diagonals.
        let black = [7, 11, 13, 17, 6, 8, 16];
        let pos = Position::setup(5, &black, &[18], Color::Black).unwrap();
        assert!(pos.eyes(Color::Black)[12]);

        let pos = Position::setup(5, &[7, 11, 13, 17, 6, 8], &[16, 18], Color::Black).unwrap();
        assert!(!pos.eyes(Color::Black)[12]);
    }

    #[test]
    fn test_advanced_moves_skip_eyes_keep_pass() {
        let pos = Position::setup(5, &[1, 5, 6], &[], Color::Black).unwrap();
        let advanced = pos.advanced_valid_moves();
        assert!(!advanced[0]);
        assert!(advanced[25], "pass stays available");
        assert!(pos.valid_moves()[0]);
    }

    #[test]
    fn test_setup_rejects_overlap() {
        assert!(matches!(
            Position::setup(5, &[3], &[3], Color::Black),
            Err(Error::InvalidSetup(_))
        ));
        assert!(Position::setup(5, &[30], &[], Color::Black).is_err());
    }

    #[test]
    fn test_display() {
        let pos = play_all(5, &[0]);
        let text = pos.to_string();
        assert!(text.starts_with(" 5 X . . . ."));
        assert!(text.contains("A B C D E"));
        assert!(text.contains("white to play"));
    }
}
