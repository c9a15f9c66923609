//! Game modes
//!
//! A mode decides what pointer input means, how many points a clear is
//! worth, and what happens each time the field comes to rest. The mode is
//! picked once when the field is built.

use glam::Vec2;

use super::field::Field;
use crate::error::MatchError;
use crate::settings::GameMode;

pub trait GameModeStrategy: std::fmt::Debug + Sync {
    fn mode(&self) -> GameMode;

    /// Whether board fills must avoid creating a ready-made match
    fn forbids_fill_matches(&self) -> bool;

    fn pointer_down(&self, field: &mut Field, pos: Vec2);

    fn pointer_up(&self, field: &mut Field, pos: Vec2);

    /// Runs once each time the field stops moving
    fn after_settle(&self, field: &mut Field) -> Result<(), MatchError>;

    /// Points for clearing `removed` blocks
    fn points_for(&self, removed: usize, threshold: usize) -> u64;

    /// Called when a clear's blocks are gone, with the points they were worth
    fn on_blocks_removed(&self, field: &mut Field, points: u64);
}

/// Swap neighbours by dragging; the board refills forever.
#[derive(Debug)]
pub struct Endless;

/// Click a cluster to clear it; the board only shrinks.
#[derive(Debug)]
pub struct MatchX;

pub fn strategy_for(mode: GameMode) -> &'static dyn GameModeStrategy {
    match mode {
        GameMode::Endless => &Endless,
        GameMode::MatchX => &MatchX,
    }
}

impl GameModeStrategy for Endless {
    fn mode(&self) -> GameMode {
        GameMode::Endless
    }

    fn forbids_fill_matches(&self) -> bool {
        true
    }

    fn pointer_down(&self, field: &mut Field, pos: Vec2) {
        field.cancel_drag();
        if field.input_blocked() {
            return;
        }
        if let Some(id) = field.block_at_point(pos) {
            field.begin_drag(id);
        }
    }

    fn pointer_up(&self, field: &mut Field, pos: Vec2) {
        let Some(start) = field.take_drag() else {
            return;
        };
        if field.input_blocked() {
            return;
        }
        let Some(target) = field.drag_target(start, pos) else {
            return;
        };
        let (Some(a), Some(b)) = (field.block(start), field.block(target)) else {
            return;
        };
        if a.team() == b.team() {
            log::warn!("Ignoring swap of two team-{} blocks", a.team());
            return;
        }
        field.start_swap(start, target);
    }

    /// Clear cascades first, then refill, and only when nothing is left to do
    /// hand the move's points to the score.
    fn after_settle(&self, field: &mut Field) -> Result<(), MatchError> {
        if field.clear_matches() {
            return Ok(());
        }
        if field.has_empty_cells() {
            return field.refill();
        }
        field.commit_pending_score();
        Ok(())
    }

    fn points_for(&self, removed: usize, _threshold: usize) -> u64 {
        removed as u64
    }

    fn on_blocks_removed(&self, field: &mut Field, points: u64) {
        field.add_pending_score(points);
    }
}

impl MatchX {
    /// Clear the region under `pos` if it is big enough
    fn match_at(&self, field: &mut Field, pos: Vec2) {
        let cell = field.cell_at_point(pos);
        field.rebuild_grid();
        let Some(region) = field.region_at(cell) else {
            return;
        };
        let threshold = field.settings().match_threshold;
        if region.len() < threshold {
            return;
        }
        field.add_score(self.points_for(region.len(), threshold));
        field.start_clear(region.blocks);
    }
}

impl GameModeStrategy for MatchX {
    fn mode(&self) -> GameMode {
        GameMode::MatchX
    }

    fn forbids_fill_matches(&self) -> bool {
        false
    }

    fn pointer_down(&self, field: &mut Field, pos: Vec2) {
        if field.input_blocked() {
            return;
        }
        self.match_at(field, pos);
    }

    fn pointer_up(&self, _field: &mut Field, _pos: Vec2) {}

    /// The game ends when no cluster big enough is left anywhere
    fn after_settle(&self, field: &mut Field) -> Result<(), MatchError> {
        field.rebuild_grid();
        if !field.find_matches(false).found {
            field.enter_game_over();
        }
        Ok(())
    }

    /// `(1 + removed - threshold)²`: bigger clusters are worth much more
    fn points_for(&self, removed: usize, threshold: usize) -> u64 {
        let extra = (1 + removed).saturating_sub(threshold) as u64;
        extra * extra
    }

    /// Scored at click time
    fn on_blocks_removed(&self, _field: &mut Field, _points: u64) {}
}
