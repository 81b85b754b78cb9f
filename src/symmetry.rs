//! The eight symmetries of the square board (the dihedral group D4).
//!
//! A symmetry is encoded in three bits, applied in order: horizontal flip
//! (bit 0), vertical flip (bit 1), then a 90 degree counter-clockwise
//! rotation (bit 2). Tensors are flat, row-major, and may hold several
//! `size * size` planes back to back; every plane is transformed the same
//! way. Policy vectors carry one trailing pass entry, which never moves.

use crate::board::{Point, to_point, to_row_col};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Symmetry(u8);

impl Symmetry {
    pub const IDENTITY: Symmetry = Symmetry(0);

    pub const ALL: [Symmetry; 8] = [
        Symmetry(0),
        Symmetry(1),
        Symmetry(2),
        Symmetry(3),
        Symmetry(4),
        Symmetry(5),
        Symmetry(6),
        Symmetry(7),
    ];

    /// Symmetry number `index % 8`.
    pub fn from_index(index: usize) -> Symmetry {
        Symmetry((index % 8) as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn random(rng: &mut fastrand::Rng) -> Symmetry {
        Symmetry(rng.u8(..8))
    }

    #[inline]
    fn flips_horizontally(self) -> bool {
        self.0 & 1 != 0
    }

    #[inline]
    fn flips_vertically(self) -> bool {
        self.0 & 2 != 0
    }

    #[inline]
    fn rotates(self) -> bool {
        self.0 & 4 != 0
    }

    /// Where the stone at `pt` ends up.
    pub fn map_point(self, pt: Point, size: usize) -> Point {
        let last = size - 1;
        let (mut row, mut col) = to_row_col(pt, size);
        if self.flips_horizontally() {
            col = last - col;
        }
        if self.flips_vertically() {
            row = last - row;
        }
        if self.rotates() {
            (row, col) = (last - col, row);
        }
        to_point(row, col, size)
    }

    /// The symmetry that undoes this one.
    ///
    /// Flips and the two transpositions are their own inverse; the quarter
    /// turns (4 and 7) invert each other.
    pub fn inverse(self) -> Symmetry {
        match self.0 {
            4 => Symmetry(7),
            7 => Symmetry(4),
            _ => self,
        }
    }

    /// Transform a single `size * size` plane.
    pub fn apply_plane<T: Copy>(self, plane: &[T], size: usize) -> Vec<T> {
        let mut out = plane.to_vec();
        for (pt, &value) in plane.iter().enumerate().take(size * size) {
            out[self.map_point(pt, size)] = value;
        }
        out
    }

    /// Transform every plane of a stacked tensor.
    pub fn apply<T: Copy>(self, tensor: &[T], size: usize) -> Vec<T> {
        debug_assert_eq!(tensor.len() % (size * size), 0);
        tensor
            .chunks(size * size)
            .flat_map(|plane| self.apply_plane(plane, size))
            .collect()
    }

    /// Transform a policy vector of `size * size + 1` entries.
    pub fn apply_policy<T: Copy>(self, probs: &[T], size: usize) -> Vec<T> {
        let area = size * size;
        debug_assert_eq!(probs.len(), area + 1);
        let mut out = self.apply_plane(&probs[..area], size);
        out.extend_from_slice(&probs[area..]);
        out
    }

    /// Map an action; pass is fixed.
    pub fn map_action(self, action: usize, size: usize) -> usize {
        if action >= size * size {
            action
        } else {
            self.map_point(action, size)
        }
    }
}

/// All eight orientations of a tensor, indexed by symmetry number.
pub fn all_symmetries<T: Copy>(tensor: &[T], size: usize) -> Vec<Vec<T>> {
    Symmetry::ALL
        .iter()
        .map(|s| s.apply(tensor, size))
        .collect()
}

/// One randomly chosen orientation of a tensor, with the symmetry used.
pub fn random_symmetry<T: Copy>(
    tensor: &[T],
    size: usize,
    rng: &mut fastrand::Rng,
) -> (Symmetry, Vec<T>) {
    let symmetry = Symmetry::random(rng);
    (symmetry, symmetry.apply(tensor, size))
}
