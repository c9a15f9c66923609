//! Cooperative animation queues
//!
//! Each entry is an [`Effect`] polled once per tick plus an optional
//! [`FinishAction`]. When an effect reports completion the entry is pruned and
//! its action handed back to the caller in the same tick, in queue order.
//! The action is where the real state change happens (commit a swap, remove
//! blocks, restart), so chaining a multi-step move means returning an action
//! that queues the next effect.

use glam::Vec2;

use super::block::{Block, BlockId};
use crate::consts::*;

/// A transient visual effect
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Two blocks glide toward each other's position (draw offset only)
    Swap { a: BlockId, b: BlockId },
    /// Outline fades in around blocks that are about to go
    Kill { blocks: Vec<BlockId>, alpha: f32 },
    /// Score text drifting up and fading out
    FadingText {
        text: String,
        pos: Vec2,
        alpha: f32,
        wiggle: f32,
        fade_speed: f32,
    },
    /// Message in the middle of the board for a fixed time
    TextBox { text: String, ticks_left: u32 },
}

impl Effect {
    pub fn kill(blocks: Vec<BlockId>) -> Self {
        Effect::Kill { blocks, alpha: 0.0 }
    }

    pub fn fading_text(text: impl Into<String>, pos: Vec2, wiggle: f32) -> Self {
        Effect::FadingText {
            text: text.into(),
            pos,
            alpha: 1.0,
            wiggle,
            fade_speed: SCORE_TEXT_FADE,
        }
    }

    pub fn text_box(text: impl Into<String>, ticks: u32) -> Self {
        Effect::TextBox {
            text: text.into(),
            ticks_left: ticks,
        }
    }

    /// Advance one tick; `true` once finished
    pub fn step(&mut self, blocks: &mut [Block]) -> bool {
        match self {
            Effect::Swap { a, b } => step_swap(blocks, *a, *b),
            Effect::Kill { alpha, .. } => {
                *alpha += KILL_ALPHA_STEP;
                *alpha > 255.0
            }
            Effect::FadingText {
                pos,
                alpha,
                wiggle,
                fade_speed,
                ..
            } => {
                *pos += Vec2::new((*alpha * *wiggle).cos(), -1.0);
                *alpha -= *fade_speed / 255.0;
                *alpha <= 0.0
            }
            Effect::TextBox { ticks_left, .. } => {
                *ticks_left = ticks_left.saturating_sub(1);
                *ticks_left == 0
            }
        }
    }
}

/// Move both draw offsets a fraction of the way to the partner's position
fn step_swap(blocks: &mut [Block], a: BlockId, b: BlockId) -> bool {
    let (Some(ia), Some(ib)) = (
        blocks.iter().position(|blk| blk.id == a),
        blocks.iter().position(|blk| blk.id == b),
    ) else {
        log::warn!("swap animation lost a block ({:?} / {:?})", a, b);
        return true;
    };

    let mut moved = 0.0;
    for (cur, other) in [(ia, ib), (ib, ia)] {
        let target = blocks[other].pos;
        let shown = blocks[cur].pos + blocks[cur].offset;
        let step = (target - shown) * SWAP_EASE;
        moved += step.length();
        blocks[cur].offset += step;
    }
    moved < SWAP_DONE_EPSILON
}

/// State change applied when an effect finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishAction {
    /// Swap the two teams, then look for matches
    CommitSwap { a: BlockId, b: BlockId },
    /// Swap the teams back after a swap that matched nothing
    RevertSwap { a: BlockId, b: BlockId },
    /// Remove the blocks, score them, wait for the field to settle
    RemoveBlocks { blocks: Vec<BlockId> },
    /// Regenerate the board
    Restart,
}

/// A queued effect and what to do when it ends
#[derive(Debug, Clone)]
pub struct Animation {
    pub effect: Effect,
    pub on_finish: Option<FinishAction>,
}

/// Independent animations advanced together once per tick
#[derive(Debug, Clone, Default)]
pub struct AnimationQueue {
    active: Vec<Animation>,
}

impl AnimationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, effect: Effect, on_finish: Option<FinishAction>) {
        self.active.push(Animation { effect, on_finish });
    }

    pub fn is_active(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Animation> {
        self.active.iter()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Step every entry once; returns the finish actions of entries that
    /// completed this tick
    pub fn update(&mut self, blocks: &mut [Block]) -> Vec<FinishAction> {
        let mut finished = Vec::new();
        let mut still_active = Vec::with_capacity(self.active.len());

        for mut animation in self.active.drain(..) {
            if animation.effect.step(blocks) {
                if let Some(action) = animation.on_finish {
                    finished.push(action);
                }
            } else {
                still_active.push(animation);
            }
        }

        self.active = still_active;
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_at(id: u32, col: f32, row: f32) -> Block {
        Block::new(
            BlockId(id),
            Vec2::new(col * BLOCK_SIZE, row * BLOCK_SIZE),
            BLOCK_SIZE,
            0,
            NUM_TEAMS,
        )
    }

    #[test]
    fn test_text_box_runs_for_its_ticks() {
        let mut queue = AnimationQueue::new();
        queue.start(Effect::text_box("hi", 3), Some(FinishAction::Restart));
        let mut blocks: Vec<Block> = Vec::new();

        assert!(queue.update(&mut blocks).is_empty());
        assert!(queue.update(&mut blocks).is_empty());
        assert_eq!(queue.update(&mut blocks), vec![FinishAction::Restart]);
        assert!(!queue.is_active());
    }

    #[test]
    fn test_kill_finishes_after_alpha_passes_255() {
        let mut effect = Effect::kill(vec![BlockId(1)]);
        let mut blocks: Vec<Block> = Vec::new();
        let mut ticks = 0;
        while !effect.step(&mut blocks) {
            ticks += 1;
        }
        // 26 steps of 10 to exceed 255
        assert_eq!(ticks + 1, 26);
    }

    #[test]
    fn test_swap_converges_on_partner_position() {
        let mut blocks = vec![block_at(1, 0.0, 0.0), block_at(2, 1.0, 0.0)];
        let mut effect = Effect::Swap {
            a: BlockId(1),
            b: BlockId(2),
        };
        let mut ticks = 0;
        while !effect.step(&mut blocks) {
            ticks += 1;
            assert!(ticks < 100);
        }
        let shown_a = blocks[0].pos + blocks[0].offset;
        let shown_b = blocks[1].pos + blocks[1].offset;
        assert!((shown_a - blocks[1].pos).length() < 0.5);
        assert!((shown_b - blocks[0].pos).length() < 0.5);
        // Physics position untouched
        assert_eq!(blocks[0].pos, Vec2::ZERO);
    }

    #[test]
    fn test_swap_with_missing_block_finishes() {
        let mut blocks = vec![block_at(1, 0.0, 0.0)];
        let mut effect = Effect::Swap {
            a: BlockId(1),
            b: BlockId(9),
        };
        assert!(effect.step(&mut blocks));
    }

    #[test]
    fn test_fading_text_rises_and_fades() {
        let mut effect = Effect::fading_text("+3", Vec2::new(10.0, 100.0), 20.0);
        let mut blocks: Vec<Block> = Vec::new();
        let mut ticks = 0;
        while !effect.step(&mut blocks) {
            ticks += 1;
        }
        // 1.0 alpha at 3/255 per tick, give or take float drift
        assert!((85..=86).contains(&(ticks + 1)));
        if let Effect::FadingText { pos, .. } = effect {
            assert!(pos.y < 100.0 - 80.0);
        }
    }

    #[test]
    fn test_finished_entries_pruned_in_queue_order() {
        let mut queue = AnimationQueue::new();
        queue.start(Effect::text_box("long", 5), None);
        queue.start(
            Effect::text_box("a", 1),
            Some(FinishAction::RemoveBlocks {
                blocks: vec![BlockId(1)],
            }),
        );
        queue.start(Effect::text_box("b", 1), Some(FinishAction::Restart));
        let mut blocks: Vec<Block> = Vec::new();

        let actions = queue.update(&mut blocks);
        assert_eq!(
            actions,
            vec![
                FinishAction::RemoveBlocks {
                    blocks: vec![BlockId(1)]
                },
                FinishAction::Restart
            ]
        );
        assert_eq!(queue.len(), 1);
    }
}
