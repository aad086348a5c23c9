//! Shared primitives: point indexing, color, board geometry, gridcular distance.
//!
//! These are the few things every component needs, so they live below the
//! spatial dictionary in the dependency order of `spec.md` §2 rather than
//! inside any one component. Nothing here depends on `board`, `tactics`,
//! `patterns`, or `spatial`.

use std::sync::Arc;

/// Index into the padded board array. `0` is reserved (used as the pass
/// marker by callers), matching the teacher's convention.
pub type Point = usize;

/// Pass move marker.
pub const PASS: Point = 0;

/// Absolute stone color. Unlike the teacher's move-relative `X`/`x`
/// encoding, colors here never change meaning: a black stone is `Black`
/// whether or not it is black's turn. See `SPEC_FULL.md` §3.
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

    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Color::Black => 1,
            Color::White => -1,
        }
    }
}

/// 2-bit point occupancy code, shared between the board's stone map and the
/// per-point 3x3 neighbor pattern codes (`spec.md` §4.1): a neighbor's
/// occupancy *is* the 2-bit value the pattern code stores for it, so no
/// separate encoding step is needed when a 3x3 code is recomputed.
pub mod occ {
    pub const EMPTY: u8 = 0;
    pub const BLACK: u8 = 1;
    pub const WHITE: u8 = 2;
    pub const OFFBOARD: u8 = 3;

    #[inline]
    pub fn of(color: super::Color) -> u8 {
        match color {
            super::Color::Black => BLACK,
            super::Color::White => WHITE,
        }
    }

    #[inline]
    pub fn color(code: u8) -> Option<super::Color> {
        match code {
            BLACK => Some(super::Color::Black),
            WHITE => Some(super::Color::White),
            _ => None,
        }
    }
}

/// The 8 neighbor offsets, in a fixed canonical order used throughout the
/// crate: N, E, S, W, NE, SE, SW, NW. `spec.md` §9 calls for replacing the
/// C preprocessor's `foreach_neighbor` macro with an inline loop over a
/// fixed small array; this is that array, computed per board size.
#[derive(Clone, Debug)]
pub struct BoardGeometry {
    /// Side length (playable points per row/column).
    pub size: usize,
    /// Row stride including one column of left padding.
    pub stride: usize,
    /// Total size of the padded 1D array.
    pub board_area: usize,
    /// First in-bounds index.
    pub imin: usize,
    /// One past the last in-bounds index.
    pub imax: usize,
    /// Offsets to the 8 neighbors, order N,E,S,W,NE,SE,SW,NW.
    pub delta: [isize; 8],
}

impl BoardGeometry {
    pub fn new(size: usize) -> Arc<Self> {
        assert!((1..=19).contains(&size), "board size must be in 1..=19");
        let stride = size + 1;
        // Rows 0..=size+1: row 0 and row size+1 are the top/bottom padding
        // rows (needed so every real row has an off-board neighbor on both
        // sides), each of width `stride`; +1 slack so the south-east
        // diagonal neighbor of the bottom-right real point stays in bounds.
        let board_area = (size + 2) * stride + 1;
        let imin = stride;
        // One past the last real point (row = size, col = size); covers the
        // entire last real row, unlike a bound derived from `board_area`
        // alone.
        let imax = (size + 1) * stride;
        let n = size as isize;
        let w = (size + 2) as isize;
        let delta = [
            -(n + 1), // N
            1,        // E
            n + 1,    // S
            -1,       // W
            -n,       // NE
            w,        // SE
            n,        // SW
            -w,       // NW
        ];
        Arc::new(BoardGeometry {
            size,
            stride,
            board_area,
            imin,
            imax,
            delta,
        })
    }

    #[inline]
    pub fn neighbors(&self, pt: Point) -> [Point; 4] {
        std::array::from_fn(|i| (pt as isize + self.delta[i]) as usize)
    }

    #[inline]
    pub fn diagonal_neighbors(&self, pt: Point) -> [Point; 4] {
        std::array::from_fn(|i| (pt as isize + self.delta[4 + i]) as usize)
    }

    #[inline]
    pub fn all_neighbors(&self, pt: Point) -> [Point; 8] {
        std::array::from_fn(|i| (pt as isize + self.delta[i]) as usize)
    }

    /// Row/column of a point, 1-indexed over the playable area.
    #[inline]
    pub fn row_col(&self, pt: Point) -> (usize, usize) {
        (pt / self.stride, pt % self.stride)
    }

    /// Distance from `pt` to the nearest edge of the board (0 = first line).
    #[inline]
    pub fn edge_distance(&self, pt: Point) -> i32 {
        let (row, col) = self.row_col(pt);
        let n = self.size as i32;
        let (row, col) = (row as i32, col as i32);
        let from_left = col - 1;
        let from_right = n - col;
        let from_top = row - 1;
        let from_bottom = n - row;
        from_left.min(from_right).min(from_top).min(from_bottom)
    }
}

/// Gridcular distance: `dx + dy + max(dx, dy)`. Defines the circular
/// neighborhoods used by the spatial dictionary and by the `distance` /
/// `distance2` pattern features.
#[inline]
pub fn gridcular_distance(geo: &BoardGeometry, a: Point, b: Point) -> i32 {
    let (ra, ca) = geo.row_col(a);
    let (rb, cb) = geo.row_col(b);
    let dx = (ca as i32 - cb as i32).abs();
    let dy = (ra as i32 - rb as i32).abs();
    dx + dy + dx.max(dy)
}
