//! Typed error outcomes for the board and dictionary-loading subsystems.
//!
//! Moves never panic on illegal input: `Board::play` returns a `MoveError`
//! and leaves the board untouched. Dictionary loading can fail for I/O or
//! format reasons and is reported via `anyhow::Error` to the caller, which
//! decides whether a missing file is fatal (see `spatial::SpatialDict::load`
//! and `patterns::GammaDict::load`).

use std::fmt;

/// Why a move was rejected. The board is left unchanged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// Target point is not empty.
    Occupied,
    /// Move would be suicide and the ruleset forbids it.
    Suicide,
    /// Move retakes the ko point.
    Ko,
    /// Move would repeat a prior whole-board position (positional superko).
    Superko,
    /// Target point is off the board.
    OffBoard,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            MoveError::Occupied => "point is not empty",
            MoveError::Suicide => "suicide",
            MoveError::Ko => "retakes ko",
            MoveError::Superko => "repeats a prior position (superko)",
            MoveError::OffBoard => "point is off the board",
        };
        write!(f, "illegal move: {msg}")
    }
}

impl std::error::Error for MoveError {}
