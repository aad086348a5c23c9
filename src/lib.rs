//! gocore: a Go board/rules engine with tactical reading, a 3x3/gamma
//! pattern-weighted prior, a shared Monte Carlo ownermap, and a "moggy"
//! playout policy, reimplemented in Rust from the Michi/Pachi lineage.
//!
//! ## Modules
//!
//! - [`types`] - board geometry, color/point primitives, gridcular distance
//! - [`constants`] - engine tuning constants not exposed through [`config`]
//! - [`config`] - runtime-tunable knobs for the board's liberty cache and
//!   the playout policy
//! - [`error`] - move legality error type
//! - [`spatial`] - Zobrist hashing and the large-pattern spatial dictionary
//! - [`board`] - incremental board/group/liberty state, scoring, ko/superko
//! - [`tactics`] - self-atari, ladders, nakade, dragons, snapback detection
//! - [`patterns`] - 3x3 shape matching, feature extraction, gamma dictionary
//! - [`ownermap`] - shared Monte Carlo ownership estimation
//! - [`playout`] - the "moggy" playout policy cascade and scoring
//!
//! ## Example
//!
//! ```
//! use gocore::board::{Board, BoardConfig};
//! use gocore::types::BoardGeometry;
//! use gocore::spatial::SpatialContext;
//!
//! let geo = BoardGeometry::new(9);
//! let spatial = SpatialContext::new(&geo, 1);
//! let mut board = Board::new(9, BoardConfig::default(), spatial);
//!
//! let pt = geo.stride + 1; // first real corner, not the off-board padding
//! board.play(pt).unwrap();
//! assert_eq!(board.move_num(), 1);
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod ownermap;
pub mod patterns;
pub mod playout;
pub mod spatial;
pub mod tactics;
pub mod types;
