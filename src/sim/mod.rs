//! Deterministic game core
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (block list order, column-major grid scans)
//! - No rendering or platform dependencies

pub mod animation;
pub mod block;
pub mod field;
pub mod grid;
pub mod matching;
pub mod mode;
pub mod settle;
pub mod tick;

pub use animation::{Animation, AnimationQueue, Effect, FinishAction};
pub use block::{Block, BlockId, Team, step_blocks};
pub use field::{Field, GameEvent, MovePhase};
pub use grid::SpatialGrid;
pub use matching::{
    BlockGrid, Bounds, GridEntry, MatchScan, Region, dedup_by_identity, find_matches, region_at,
};
pub use mode::{Endless, GameModeStrategy, MatchX, strategy_for};
pub use settle::{is_airborne, is_settled};
pub use tick::{PointerEvent, TickInput, handle_pointer, tick};
