//! Board geometry and connected-group analysis.
//!
//! Points are indices into a row-major `size * size` grid (row 0 is the top
//! edge). Actions use the same indices, plus one extra value, `size * size`,
//! for a pass.

use std::fmt;

use crate::constants::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::{Error, Result};

/// A cell on the board, `row * size + col`.
pub type Point = usize;

/// A move: a [`Point`] or the pass value `size * size`.
pub type Action = usize;

/// Column letters used by GTP vertices ('I' is skipped).
const COLUMNS: &[u8; MAX_BOARD_SIZE] = b"ABCDEFGHJKLMNOPQRST";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Plane index: 0 for black, 1 for white.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// `+1` for black, `-1` for white.
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Color::Black => 1,
            Color::White => -1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// Validate a board side length.
pub fn check_size(size: usize) -> Result<usize> {
    if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(Error::UnsupportedBoardSize(size))
    }
}

/// The pass action for a board of the given size.
#[inline]
pub fn pass_action(size: usize) -> Action {
    size * size
}

/// Number of actions (every point plus pass).
#[inline]
pub fn action_size(size: usize) -> usize {
    size * size + 1
}

#[inline]
pub fn to_point(row: usize, col: usize, size: usize) -> Point {
    row * size + col
}

#[inline]
pub fn to_row_col(pt: Point, size: usize) -> (usize, usize) {
    (pt / size, pt % size)
}

/// Whether the point lies on the first line.
#[inline]
pub fn is_edge(pt: Point, size: usize) -> bool {
    let (row, col) = to_row_col(pt, size);
    row == 0 || col == 0 || row + 1 == size || col + 1 == size
}

/// The in-bounds orthogonal neighbors (N, E, S, W) of a point.
#[inline]
pub fn neighbors(pt: Point, size: usize) -> impl Iterator<Item = Point> {
    let (row, col) = to_row_col(pt, size);
    [
        (row > 0).then(|| pt - size),
        (col + 1 < size).then(|| pt + 1),
        (row + 1 < size).then(|| pt + size),
        (col > 0).then(|| pt - 1),
    ]
    .into_iter()
    .flatten()
}

/// The in-bounds diagonal neighbors (NE, SE, SW, NW) of a point.
#[inline]
pub fn diagonal_neighbors(pt: Point, size: usize) -> impl Iterator<Item = Point> {
    let (row, col) = to_row_col(pt, size);
    let up = row > 0;
    let down = row + 1 < size;
    let left = col > 0;
    let right = col + 1 < size;
    [
        (up && right).then(|| pt + 1 - size),
        (down && right).then(|| pt + size + 1),
        (down && left).then(|| pt + size - 1),
        (up && left).then(|| pt - size - 1),
    ]
    .into_iter()
    .flatten()
}

/// A maximal 4-connected set of same-colored stones and its liberties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub stones: Vec<Point>,
    pub liberties: Vec<Point>,
}

/// Flood-fill the 4-connected component of `start` among points where
/// `member` holds, marking them in `visited`.
fn flood_fill(
    member: impl Fn(Point) -> bool,
    start: Point,
    size: usize,
    visited: &mut [bool],
) -> Vec<Point> {
    let mut stack = vec![start];
    let mut out = Vec::new();
    visited[start] = true;

    while let Some(pt) = stack.pop() {
        out.push(pt);
        for n in neighbors(pt, size) {
            if !visited[n] && member(n) {
                visited[n] = true;
                stack.push(n);
            }
        }
    }
    out
}

/// Collect the group containing `start` and its distinct liberties.
///
/// `stones` is the plane of the group's color, `occupied` marks every stone
/// of either color.
pub fn group_at(stones: &[bool], occupied: &[bool], start: Point, size: usize) -> Group {
    let mut visited = vec![false; size * size];
    collect_group(stones, occupied, start, size, &mut visited)
}

fn collect_group(
    stones: &[bool],
    occupied: &[bool],
    start: Point,
    size: usize,
    visited: &mut [bool],
) -> Group {
    let group = flood_fill(|p| stones[p], start, size, visited);

    let mut liberty_seen = vec![false; size * size];
    let mut liberties = Vec::new();
    for &pt in &group {
        for n in neighbors(pt, size) {
            if !occupied[n] && !liberty_seen[n] {
                liberty_seen[n] = true;
                liberties.push(n);
            }
        }
    }

    Group {
        stones: group,
        liberties,
    }
}

/// Label every group of one color.
pub fn groups(stones: &[bool], occupied: &[bool], size: usize) -> Vec<Group> {
    let mut visited = vec![false; size * size];
    let mut out = Vec::new();
    for pt in 0..size * size {
        if stones[pt] && !visited[pt] {
            out.push(collect_group(stones, occupied, pt, size, &mut visited));
        }
    }
    out
}

/// The 4-connected regions of empty points.
pub fn empty_regions(occupied: &[bool], size: usize) -> Vec<Vec<Point>> {
    let mut visited = vec![false; size * size];
    let mut out = Vec::new();
    for pt in 0..size * size {
        if !occupied[pt] && !visited[pt] {
            out.push(flood_fill(|p| !occupied[p], pt, size, &mut visited));
        }
    }
    out
}

/// Parse a GTP vertex (e.g. "D4", "pass") into an action.
///
/// Columns use letters A-T skipping I; rows count up from the bottom edge.
/// Returns `None` for text that is not a vertex on this board.
pub fn parse_vertex(s: &str, size: usize) -> Option<Action> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("pass") {
        return Some(pass_action(size));
    }

    let bytes = s.as_bytes();
    if bytes.len() < 2 {
        return None;
    }

    let col_char = bytes[0].to_ascii_uppercase();
    let col = COLUMNS[..size].iter().position(|&c| c == col_char)?;
    let row_number: usize = s[1..].parse().ok()?;
    if row_number == 0 || row_number > size {
        return None;
    }

    Some(to_point(size - row_number, col, size))
}

/// Convert an action to a GTP vertex (e.g. "D4"), or "pass".
pub fn vertex_string(action: Action, size: usize) -> String {
    if action >= pass_action(size) {
        return "pass".into();
    }
    let (row, col) = to_row_col(action, size);
    format!("{}{}", COLUMNS[col] as char, size - row)
}
