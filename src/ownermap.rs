//! Monte Carlo ownermap: samples many light playouts from one position and
//! tallies, per point, which color ends up owning it (`spec.md` §4.4
//! "MC ownermap" and §5 "Shared MC ownermap").
//!
//! Grounded on `original_source/playout/playout.c`'s ownermap accumulation
//! and on `spec.md` §5's explicit design choice: shared counters behind
//! `Vec<AtomicU32>`, races tolerated, merged only by the caller reading
//! them once sampling is judged sufficient (`GJ_MINGAMES ≈ 500`).

use crate::board::Board;
use crate::config::PlayoutConfig;
use crate::patterns::Pat3Table;
use crate::playout;
use crate::types::{Color, Point};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Minimum sample count before final-status ownermap queries are
/// considered trustworthy (`spec.md` §5).
pub const GJ_MINGAMES: usize = 500;

/// Shared, racy-but-uncorrupted per-point color counters. One playout
/// increments exactly one counter per point per sample; lost updates under
/// contention are an accepted tradeoff (`spec.md` §9 design note), not a
/// correctness bug.
pub struct OwnerMap {
    board_area: usize,
    black: Vec<AtomicU32>,
    white: Vec<AtomicU32>,
    samples: AtomicU32,
}

impl OwnerMap {
    pub fn new(board_area: usize) -> Self {
        OwnerMap {
            board_area,
            black: (0..board_area).map(|_| AtomicU32::new(0)).collect(),
            white: (0..board_area).map(|_| AtomicU32::new(0)).collect(),
            samples: AtomicU32::new(0),
        }
    }

    pub fn samples(&self) -> u32 {
        self.samples.load(Ordering::Relaxed)
    }

    fn record_one(&self, board: &Board) {
        for pt in 0..self.board_area {
            let owner = match board.color_at(pt) {
                Some(c) => Some(c),
                None => board.is_eyeish(pt),
            };
            match owner {
                Some(Color::Black) => {
                    self.black[pt].fetch_add(1, Ordering::Relaxed);
                }
                Some(Color::White) => {
                    self.white[pt].fetch_add(1, Ordering::Relaxed);
                }
                None => {}
            }
        }
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Bucketed ownership frequency for `color` at `pt`, the `mcowner`
    /// feature payload: `min(8, counter * 8 / playouts)` (`spec.md` §4.4).
    pub fn bucket(&self, pt: Point, color: Color) -> u8 {
        let n = self.samples();
        if n == 0 {
            return 0;
        }
        let count = match color {
            Color::Black => self.black[pt].load(Ordering::Relaxed),
            Color::White => self.white[pt].load(Ordering::Relaxed),
        };
        ((count as u64 * 8 / n as u64).min(8)) as u8
    }
}

/// Run `playouts` light playouts from `source` (each on a private clone, as
/// `spec.md` §5 requires) and accumulate the results into a fresh
/// `OwnerMap`. Uses `rayon`'s work-stealing pool for the embarrassingly
/// parallel batch, consistent with the rest of the pack's use of `rayon`
/// for Monte Carlo / CFR-style sampling loops.
pub fn estimate(
    source: &Board,
    cfg: &PlayoutConfig,
    pat3: &Pat3Table,
    seed: u64,
    playouts: usize,
) -> Arc<OwnerMap> {
    let map = Arc::new(OwnerMap::new(source.geo.board_area));
    use rayon::prelude::*;
    (0..playouts).into_par_iter().for_each(|i| {
        let mut board = source.clone();
        let mut rng = fastrand::Rng::with_seed(seed ^ (i as u64).wrapping_mul(0x9E3779B97F4A7C15));
        playout::mc_playout(&mut board, cfg, pat3, &mut rng);
        map.record_one(&board);
    });
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardConfig;
    use crate::spatial::SpatialContext;
    use crate::types::BoardGeometry;

    #[test]
    fn bucket_is_zero_before_any_samples() {
        let geo = BoardGeometry::new(5);
        let map = OwnerMap::new(geo.board_area);
        assert_eq!(map.bucket(geo.imin, Color::Black), 0);
    }

    #[test]
    fn estimate_accumulates_samples_on_a_small_board() {
        let geo = BoardGeometry::new(5);
        let spatial = SpatialContext::new(&geo, 7);
        let board = Board::new(5, BoardConfig::default(), spatial);
        let cfg = PlayoutConfig {
            gamelen: 60,
            ..PlayoutConfig::default()
        };
        let pat3 = Pat3Table::new();
        let map = estimate(&board, &cfg, &pat3, 7, 8);
        assert_eq!(map.samples(), 8);
    }
}
