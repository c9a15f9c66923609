//! Block entity and per-tick physics
//!
//! Pixel position is authoritative; the grid cell is derived from it.
//! Collision is a single-axis downward check: a falling block lands on
//! whatever is directly below it in its column, or on the floor.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::color::{Rgba, team_color};
use crate::consts::*;
use crate::rect_contains;

/// Stable identity of a block for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// Match-compatibility class of a block
pub type Team = u8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Top-left corner in field pixels
    pub pos: Vec2,
    /// Draw-only displacement (swap animation); never affects physics
    pub offset: Vec2,
    pub vel: Vec2,
    /// Drawn edge length, grows from 0 to `size` when the block spawns
    pub shown_size: f32,
    size: f32,
    team: Team,
    color: Rgba,
}

impl Block {
    pub fn new(id: BlockId, pos: Vec2, size: f32, team: Team, num_teams: u8) -> Self {
        Self {
            id,
            pos,
            offset: Vec2::ZERO,
            vel: Vec2::ZERO,
            shown_size: 0.0,
            size,
            team,
            color: team_color(team, num_teams),
        }
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    /// The only way to change a block's team; keeps the colour in sync
    pub fn set_team(&mut self, team: Team, num_teams: u8) {
        self.team = team;
        self.color = team_color(team, num_teams);
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn top_left(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn bottom_right(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        rect_contains(self.top_left(), self.bottom_right(), point)
    }

    /// Grid cell of the block's centre
    pub fn cell(&self) -> IVec2 {
        (self.center() / self.size).floor().as_ivec2()
    }

    #[inline]
    fn next_pos(&self) -> Vec2 {
        self.pos + self.vel
    }

    fn apply_acceleration(&mut self) {
        self.vel.y += GRAVITY;
        self.vel *= FRICTION;
    }

    /// Land on any block directly below in the same column
    fn resolve_stacking<'a>(&mut self, others: impl Iterator<Item = &'a Block>) {
        for other in others {
            if (self.pos.x - other.pos.x).abs() < self.size
                && self.pos.y < other.pos.y
                && (self.next_pos().y - other.pos.y).abs() < self.size
            {
                self.pos.y = other.pos.y - self.size;
                self.vel.y = 0.0;
            }
        }
    }

    /// Keep the block inside the field rectangle `[0, extent)`
    fn resolve_boundaries(&mut self, extent: Vec2) {
        let next = self.next_pos();
        if next.x + self.size > extent.x {
            self.pos.x = extent.x - self.size;
            self.vel.x = 0.0;
        } else if next.x < 0.0 {
            self.pos.x = 0.0;
            self.vel.x = 0.0;
        }

        if next.y + self.size > extent.y {
            self.pos.y = extent.y - self.size;
            self.vel.y = 0.0;
        } else if next.y < 0.0 {
            self.pos.y = 0.0;
            self.vel.y = 0.0;
        }
    }

    fn apply_velocity(&mut self) {
        self.pos = self.next_pos();
    }

    fn animate(&mut self) {
        self.shown_size += (self.size - self.shown_size) * POP_IN_EASE;
    }
}

/// Advance every block by one tick.
///
/// Blocks update in list order and each sees the already-updated positions
/// of the blocks before it.
pub fn step_blocks(blocks: &mut [Block], extent: Vec2) {
    for i in 0..blocks.len() {
        let mut block = blocks[i].clone();
        block.apply_acceleration();
        block.resolve_stacking(
            blocks
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, b)| b),
        );
        block.resolve_boundaries(extent);
        block.apply_velocity();
        block.animate();
        blocks[i] = block;
    }
}
