//! Board and game-mode settings
//!
//! Chosen once when a field is built and fixed for its lifetime. Never
//! persisted; the host builds them from the canvas size and query string.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::MatchError;

/// How player input maps to match attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Drag a block onto a neighbour to swap them; board refills forever
    #[default]
    Endless,
    /// Click a cluster to clear it; game ends when no cluster is left
    #[serde(rename = "x", alias = "matchx")]
    MatchX,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Endless => "endless",
            GameMode::MatchX => "x",
        }
    }

}

impl FromStr for GameMode {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "endless" => Ok(GameMode::Endless),
            "x" | "matchx" => Ok(GameMode::MatchX),
            _ => Err(MatchError::UnknownMode(s.to_string())),
        }
    }
}

/// Field configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board width in blocks
    pub cols: i32,
    /// Board height in blocks
    pub rows: i32,
    /// Block edge length in pixels
    pub block_size: f32,
    /// Number of teams rolled for new blocks
    pub num_teams: u8,
    /// Minimum region size that clears
    pub match_threshold: usize,
    pub mode: GameMode,
    /// How long the game-over banner stays up before the board restarts
    pub game_over_ticks: u32,
    /// RNG seed for board generation and refills
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cols: 8,
            rows: 8,
            block_size: BLOCK_SIZE,
            num_teams: NUM_TEAMS,
            match_threshold: MATCH_THRESHOLD,
            mode: GameMode::Endless,
            game_over_ticks: GAME_OVER_TICKS,
            seed: 0,
        }
    }
}

impl Settings {
    /// Settings for a given board size and mode (defaults elsewhere)
    pub fn with_board(cols: i32, rows: i32, mode: GameMode) -> Self {
        Self {
            cols,
            rows,
            mode,
            ..Self::default()
        }
    }

    /// Fit as many whole blocks as the canvas allows
    pub fn for_canvas(width: f32, height: f32, mode: GameMode) -> Self {
        let cols = (width / BLOCK_SIZE).floor() as i32;
        let rows = (height / BLOCK_SIZE).floor() as i32;
        Self::with_board(cols, rows, mode)
    }

    /// Parse settings from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, MatchError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.cols <= 0 || self.rows <= 0 {
            return Err(MatchError::InvalidSettings(format!(
                "board must be at least 1x1, got {}x{}",
                self.cols, self.rows
            )));
        }
        if self.num_teams == 0 {
            return Err(MatchError::InvalidSettings("num_teams must be > 0".into()));
        }
        if self.match_threshold < 2 {
            return Err(MatchError::InvalidSettings(format!(
                "match_threshold must be >= 2, got {}",
                self.match_threshold
            )));
        }
        if !(self.block_size > 0.0) {
            return Err(MatchError::InvalidSettings(format!(
                "block_size must be positive, got {}",
                self.block_size
            )));
        }
        Ok(())
    }

    /// Board width in pixels
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.block_size
    }

    /// Board height in pixels
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.block_size
    }
}
