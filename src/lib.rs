//! Chroma Match - A falling-block match-3 puzzle game
//!
//! Core modules:
//! - `sim`: Deterministic game core (grid, matching, settling, animations, modes)
//! - `renderer`: 2D drawing surface abstraction and the field draw pass
//! - `settings`: Board/mode configuration
//! - `color`: Team colours

pub mod color;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::MatchError;
pub use settings::{GameMode, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per display frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Edge length of a block in pixels
    pub const BLOCK_SIZE: f32 = 64.0;
    /// Number of distinct teams (colours)
    pub const NUM_TEAMS: u8 = 5;
    /// Minimum region size that counts as a match
    pub const MATCH_THRESHOLD: usize = 3;

    /// Downward acceleration (pixels/tick²)
    pub const GRAVITY: f32 = 0.6;
    /// Velocity damping applied every tick
    pub const FRICTION: f32 = 0.99;

    /// Fraction of the remaining distance a swapping block covers per tick
    pub const SWAP_EASE: f32 = 0.2;
    /// Swap is done once the summed per-tick movement drops below this (pixels)
    pub const SWAP_DONE_EPSILON: f32 = 0.1;
    /// Outline alpha gained per tick by blocks about to be removed (0-255 scale)
    pub const KILL_ALPHA_STEP: f32 = 10.0;
    /// Alpha lost per tick by floating score text (0-255 scale)
    pub const SCORE_TEXT_FADE: f32 = 3.0;
    /// Fraction of the missing size a spawning block grows per tick
    pub const POP_IN_EASE: f32 = 0.1;
    /// Game-over banner duration (5 seconds)
    pub const GAME_OVER_TICKS: u32 = 5 * 60;
}

/// Half-open rectangle test: `top_left <= point < bottom_right`
#[inline]
pub fn rect_contains(top_left: Vec2, bottom_right: Vec2, point: Vec2) -> bool {
    point.x >= top_left.x
        && point.x < bottom_right.x
        && point.y >= top_left.y
        && point.y < bottom_right.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_half_open() {
        let tl = Vec2::new(0.0, 0.0);
        let br = Vec2::new(64.0, 64.0);
        assert!(rect_contains(tl, br, Vec2::new(0.0, 0.0)));
        assert!(rect_contains(tl, br, Vec2::new(63.9, 63.9)));
        assert!(!rect_contains(tl, br, Vec2::new(64.0, 10.0)));
        assert!(!rect_contains(tl, br, Vec2::new(10.0, 64.0)));
        assert!(!rect_contains(tl, br, Vec2::new(-0.1, 10.0)));
    }
}
