//! Runtime-tunable knobs for the playout policy and the board's liberty
//! cache, replacing the teacher's compile-time `Cargo` feature / `const`
//! approach (`constants.rs`) with ordinary values a caller can vary between
//! calls (`SPEC_FULL.md` §6).
//!
//! The teacher picks its board size and tuning constants at compile time via
//! `#[cfg(feature = "board9x9")]`; this rewrite needs two distinct tunings
//! live at once (e.g. a caller running cheap exploratory playouts alongside
//! a full-accuracy ownermap sample), which a `const` can't express, so these
//! became runtime structs instead.

/// Cap on tracked liberties per group and the refill threshold, exposed here
/// as the runtime counterpart of `board::GROUP_KEEP_LIBS`/`GROUP_REFILL_LIBS`
/// so callers can see what they're getting without importing `board`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LibertyCacheConfig {
    pub keep: usize,
    pub refill: usize,
}

impl Default for LibertyCacheConfig {
    fn default() -> Self {
        LibertyCacheConfig {
            keep: crate::board::GROUP_KEEP_LIBS,
            refill: crate::board::GROUP_REFILL_LIBS,
        }
    }
}

/// Tunable probabilities and thresholds for the "moggy" playout policy
/// cascade (`SPEC_FULL.md` §4.5). Defaults are carried over from the
/// teacher's `constants.rs` heuristic probabilities
/// (`PROB_HEURISTIC_CAPTURE`, `PROB_HEURISTIC_PAT3`, `PROB_SSAREJECT`),
/// generalized to the full named-probability set
/// `original_source/playout/moggy.c`'s policy exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayoutConfig {
    /// Probability of contesting a ko fight rather than playing elsewhere.
    pub p_ko: u8,
    /// Probability of taking a local (last-move-adjacent) capture.
    pub p_lcap: u8,
    /// Probability of responding to a local atari by extending/capturing.
    pub p_atari: u8,
    /// Probability of playing a 3x3 pattern match.
    pub p_pat: u8,
    /// Probability of taking any capture (not just local).
    pub p_cap: u8,
    /// Probability of filling a simple eye-adjacent endgame point rather
    /// than passing once territory is settled.
    pub p_fill: u8,
    /// Probability of rejecting a move flagged by `tactics::is_bad_selfatari`.
    pub p_sa_selfatari: u8,
    /// Stone-count difference beyond which a playout is stopped early and
    /// scored as a win for whoever is ahead (mercy rule).
    pub mercy_threshold: u32,
    /// Maximum plies per playout before forcing a score.
    pub gamelen: usize,
    pub liberty_cache: LibertyCacheConfig,
}

/// Percent-scale probability, matching the teacher's and `moggy.c`'s
/// convention of small integer "out of 100" rates rather than floats.
fn pct(p: f64) -> u8 {
    (p * 100.0).round().clamp(0.0, 100.0) as u8
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        PlayoutConfig {
            p_ko: 90,
            p_lcap: pct(crate::constants::PROB_HEURISTIC_CAPTURE),
            p_atari: pct(crate::constants::PROB_HEURISTIC_CAPTURE),
            p_pat: pct(crate::constants::PROB_HEURISTIC_PAT3),
            p_cap: pct(crate::constants::PROB_HEURISTIC_CAPTURE),
            p_fill: 30,
            p_sa_selfatari: pct(crate::constants::PROB_SSAREJECT),
            mercy_threshold: 25,
            gamelen: crate::constants::MAX_GAME_LEN,
            liberty_cache: LibertyCacheConfig::default(),
        }
    }
}

/// Top-level configuration a caller assembles once and threads through
/// board construction, tactics, and playouts (`SPEC_FULL.md` §6).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub board: crate::board::BoardConfig,
    pub playout: PlayoutConfig,
    /// Random-number seed for `fastrand`-driven playout/ownermap sampling.
    pub seed: u64,
    /// Number of playouts to run per `ownermap::estimate` call.
    pub ownermap_playouts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            board: crate::board::BoardConfig::default(),
            playout: PlayoutConfig::default(),
            seed: 1,
            ownermap_playouts: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_probabilities_are_in_percent_range() {
        let p = PlayoutConfig::default();
        for v in [p.p_ko, p.p_lcap, p.p_atari, p.p_pat, p.p_cap, p.p_fill, p.p_sa_selfatari] {
            assert!(v <= 100);
        }
    }
}
