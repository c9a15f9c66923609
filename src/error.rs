//! Error types

use thiserror::Error;

/// Errors surfaced by board construction, configuration and the tick loop
#[derive(Debug, Error)]
pub enum MatchError {
    /// No team could be found for a cell that avoids an immediate match.
    /// The board has too few teams for its size.
    #[error("could not fill cell ({col}, {row}) without a match after {attempts} attempts")]
    FillExhausted { col: i32, row: i32, attempts: u32 },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("unknown game mode '{0}' (expected \"endless\" or \"x\")")]
    UnknownMode(String),

    #[error("failed to parse settings: {0}")]
    Config(#[from] serde_json::Error),
}
