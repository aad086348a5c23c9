//! Tuning constants that aren't promoted to `config::PlayoutConfig` /
//! `config::EngineConfig`.
//!
//! Board geometry is a runtime value (`types::BoardGeometry`) rather than a
//! Cargo feature here, so nothing in this file is board-size-dependent
//! anymore; see `SPEC_FULL.md` §3.

/// Maximum plies for a single game/playout, sized for the largest supported
/// board (19x19) with slack for captures and replays. Per-call playout
/// length is governed by `config::PlayoutConfig::gamelen`, which defaults
/// to this.
pub const MAX_GAME_LEN: usize = 19 * 19 * 3;

// =============================================================================
// Playout Heuristic Probabilities
// =============================================================================

/// Probability of using capture heuristic in playouts.
pub const PROB_HEURISTIC_CAPTURE: f64 = 0.9;

/// Probability of using 3x3 pattern heuristic in playouts.
pub const PROB_HEURISTIC_PAT3: f64 = 0.95;

/// Probability of rejecting self-atari in playouts.
pub const PROB_SSAREJECT: f64 = 0.9;
