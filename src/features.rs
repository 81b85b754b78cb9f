//! Tensor encodings of positions for an external evaluator.
//!
//! All tensors are flat `f32` vectors of `size * size` planes, row-major,
//! in the channel order documented on each function.

use crate::board::{Action, Color, pass_action};
use crate::constants::{HISTORY_STEPS, NUM_STATE_PLANES};
use crate::position::Position;

/// How stone history is laid out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StateFormat {
    /// Black and white history in separate planes.
    Separated,
    /// One plane per step: black `1.0`, white `-1.0`.
    Merged,
}

/// Shape of the history features.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FeatureConfig {
    pub history: usize,
    pub format: StateFormat,
    /// Append a one-hot plane of the last stone played.
    pub record_last: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            history: HISTORY_STEPS,
            format: StateFormat::Separated,
            record_last: true,
        }
    }
}

impl FeatureConfig {
    pub fn num_planes(&self) -> usize {
        let stone_planes = match self.format {
            StateFormat::Separated => 2 * self.history,
            StateFormat::Merged => self.history,
        };
        stone_planes + 1 + usize::from(self.record_last)
    }
}

fn bool_plane(values: &[bool]) -> impl Iterator<Item = f32> + '_ {
    values.iter().map(|&v| if v { 1.0 } else { 0.0 })
}

fn filled(area: usize, on: bool) -> impl Iterator<Item = f32> {
    std::iter::repeat_n(if on { 1.0 } else { 0.0 }, area)
}

/// The raw state: black, white, turn (`1.0` = white), invalid, previous
/// pass, game over.
pub fn state_planes(pos: &Position) -> Vec<f32> {
    let area = pos.size() * pos.size();
    let planes: Vec<f32> = bool_plane(pos.black())
        .chain(bool_plane(pos.white()))
        .chain(filled(area, pos.turn() == Color::White))
        .chain(bool_plane(pos.invalid()))
        .chain(filled(area, pos.previous_pass()))
        .chain(filled(area, pos.is_terminal()))
        .collect();
    debug_assert_eq!(planes.len(), NUM_STATE_PLANES * area);
    planes
}

/// [`state_planes`] with colors swapped so the player to move is shown as
/// black (turn plane always `0.0`).
pub fn canonical_planes(pos: &Position) -> Vec<f32> {
    let area = pos.size() * pos.size();
    let mover = pos.turn();
    bool_plane(pos.stones(mover))
        .chain(bool_plane(pos.stones(mover.opponent())))
        .chain(filled(area, false))
        .chain(bool_plane(pos.invalid()))
        .chain(filled(area, pos.previous_pass()))
        .chain(filled(area, pos.is_terminal()))
        .collect()
}

/// Stacked history features.
///
/// `record` holds each played move together with the position it was
/// played in, oldest first; `current` is the position after the last move.
///
/// Separated layout: `history` black planes (the black stones after each
/// of black's last moves, oldest first, zero padded), then the same for
/// white, then the turn plane, then the optional last-move plane.
/// Merged layout: the last `history` positions as `black - white`, then
/// turn and last move.
pub fn encode_history(
    config: &FeatureConfig,
    record: &[(Position, Action)],
    current: &Position,
) -> Vec<f32> {
    let size = current.size();
    let area = size * size;
    let h = config.history;

    // (mover, position after the move)
    let after: Vec<(Color, &Position)> = record
        .iter()
        .enumerate()
        .map(|(i, (before, _))| {
            let next = record.get(i + 1).map_or(current, |(p, _)| p);
            (before.turn(), next)
        })
        .collect();

    let mut out = Vec::with_capacity(config.num_planes() * area);

    match config.format {
        StateFormat::Separated => {
            for color in [Color::Black, Color::White] {
                let planes: Vec<&Position> = after
                    .iter()
                    .filter(|(mover, _)| *mover == color)
                    .map(|&(_, p)| p)
                    .collect();
                let start = planes.len().saturating_sub(h);
                let padding = h - (planes.len() - start);
                out.extend(filled(padding * area, false));
                for p in &planes[start..] {
                    out.extend(bool_plane(p.stones(color)));
                }
            }
        }
        StateFormat::Merged => {
            let start = after.len().saturating_sub(h);
            let padding = h - (after.len() - start);
            out.extend(filled(padding * area, false));
            for (_, p) in &after[start..] {
                out.extend(
                    p.black()
                        .iter()
                        .zip(p.white())
                        .map(|(&b, &w)| f32::from(u8::from(b)) - f32::from(u8::from(w))),
                );
            }
        }
    }

    out.extend(filled(area, current.turn() == Color::White));

    if config.record_last {
        let mut last = vec![0.0; area];
        if let Some(&(_, action)) = record.last() {
            if action != pass_action(size) {
                last[action] = 1.0;
            }
        }
        out.extend(last);
    }

    out
}
