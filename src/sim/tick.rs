//! Fixed timestep simulation tick
//!
//! One tick: apply queued pointer input, move blocks, check whether the
//! field has settled, then poll the animation queues. Waiting is always a
//! flag or a queue looked at once per tick, never a blocking call.

use glam::Vec2;

use super::field::Field;
use crate::error::MatchError;

/// A pointer press or release in field pixels (mouse or touch alike)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pos: Vec2,
    pub pressed: bool,
}

impl PointerEvent {
    pub fn down(pos: Vec2) -> Self {
        Self { pos, pressed: true }
    }

    pub fn up(pos: Vec2) -> Self {
        Self {
            pos,
            pressed: false,
        }
    }
}

/// Input gathered since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest hover position (`None` when the pointer left the canvas)
    pub pointer: Option<Vec2>,
    /// Presses and releases in the order they happened
    pub events: Vec<PointerEvent>,
}

/// Route one pointer event to the field's game mode
pub fn handle_pointer(field: &mut Field, event: PointerEvent) {
    field.set_pointer(Some(event.pos));
    let strategy = field.strategy();
    if event.pressed {
        strategy.pointer_down(field, event.pos);
    } else {
        strategy.pointer_up(field, event.pos);
    }
}

/// Advance the field by one tick
pub fn tick(field: &mut Field, input: &TickInput) -> Result<(), MatchError> {
    field.advance_clock();

    for event in &input.events {
        handle_pointer(field, *event);
    }
    let hover = input.pointer.or_else(|| input.events.last().map(|e| e.pos));
    field.set_pointer(hover);

    field.step_physics();
    field.check_settled()?;
    field.advance_animations()
}
