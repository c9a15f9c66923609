//! Settle detection
//!
//! A block is at rest when it has no vertical speed and sits flush on the
//! floor or on the top face of the block under its centre. Every block is
//! tested against every other, which is fine at puzzle-board sizes. A block
//! resting on something that is still moving is not flush for long, so the
//! whole field only reads as settled once every column has stopped.

use glam::Vec2;

use super::block::Block;

/// Contact tolerance in pixels
const CONTACT_EPSILON: f32 = 0.01;

/// Whether `block` is still falling or has nothing flush under it yet
pub fn is_airborne(block: &Block, blocks: &[Block], floor_y: f32) -> bool {
    if block.vel.y != 0.0 {
        return true;
    }
    let bottom = block.bottom_right().y;
    if bottom >= floor_y - CONTACT_EPSILON {
        return false;
    }
    let probe = block.center() + Vec2::new(0.0, block.size());
    !blocks.iter().any(|other| {
        other.id != block.id
            && other.contains(probe)
            && (other.top_left().y - bottom).abs() < CONTACT_EPSILON
    })
}

/// True once no block is still falling
pub fn is_settled(blocks: &[Block], floor_y: f32) -> bool {
    !blocks.iter().any(|block| is_airborne(block, blocks, floor_y))
}
