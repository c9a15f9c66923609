//! 2D rendering
//!
//! The game only needs rectangles, outlines and text, so drawing goes through
//! the small [`Surface`] trait. On the web it is backed by a canvas 2D context.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use glam::Vec2;

use crate::color::Rgba;
use crate::sim::{Block, Effect, Field};

/// Drawing primitives the game needs from its host
pub trait Surface {
    fn clear(&mut self, size: Vec2);
    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Rgba);
    fn stroke_rect(&mut self, pos: Vec2, size: Vec2, color: Rgba, line_width: f32);
    /// Text centred horizontally on `pos`, baseline at `pos.y`
    fn fill_text(&mut self, text: &str, pos: Vec2, px: f32, color: Rgba);
}

const HIGHLIGHT: Rgba = Rgba::new(255.0, 255.0, 255.0, 0.35);
const BANNER_BG: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.75);

/// Draw the whole field: blocks, highlights, then animation overlays
pub fn draw_field(field: &Field, surface: &mut impl Surface) {
    surface.clear(field.extent());

    for block in field.blocks() {
        draw_block(block, surface);
    }
    draw_highlights(field, surface);

    let blocks = field.blocks();
    for animation in field
        .cosmetic_animations()
        .iter()
        .chain(field.blocking_animations().iter())
    {
        draw_effect(&animation.effect, blocks, field, surface);
    }
}

/// Block at its physics position plus draw offset, shrunk around its centre
/// while it pops in
fn draw_block(block: &Block, surface: &mut impl Surface) {
    let inset = (block.size() - block.shown_size) / 2.0;
    let pos = block.pos + block.offset + Vec2::splat(inset);
    surface.fill_rect(pos, Vec2::splat(block.shown_size), block.color());
}

fn draw_highlights(field: &Field, surface: &mut impl Surface) {
    let start = field.drag_start();
    let hovered = field.pointer().and_then(|p| field.block_at_point(p));

    for block in field.blocks() {
        let dragging_from = start == Some(block.id);
        let hovered_while_dragging = start.is_some() && hovered == Some(block.id);
        if dragging_from || hovered_while_dragging {
            surface.fill_rect(block.pos, Vec2::splat(block.size()), HIGHLIGHT);
        }
    }
}

fn draw_effect(effect: &Effect, blocks: &[Block], field: &Field, surface: &mut impl Surface) {
    match effect {
        // Swaps are visible through the blocks' draw offsets
        Effect::Swap { .. } => {}
        Effect::Kill { blocks: ids, alpha } => {
            let color = Rgba::WHITE.with_alpha((alpha / 255.0).min(1.0));
            for block in blocks.iter().filter(|b| ids.contains(&b.id)) {
                surface.stroke_rect(block.pos, Vec2::splat(block.size()), color, 3.0);
            }
        }
        Effect::FadingText {
            text, pos, alpha, ..
        } => {
            let px = field.settings().block_size;
            surface.fill_text(text, *pos, px, Rgba::BLACK.with_alpha(alpha.max(0.0)));
        }
        Effect::TextBox { text, .. } => {
            let extent = field.extent();
            let height = field.settings().block_size * 1.5;
            let top = (extent.y - height) / 2.0;
            surface.fill_rect(Vec2::new(0.0, top), Vec2::new(extent.x, height), BANNER_BG);
            let px = field.settings().block_size * 0.5;
            surface.fill_text(
                text,
                Vec2::new(extent.x / 2.0, top + height / 2.0 + px / 3.0),
                px,
                Rgba::WHITE,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{GameMode, Settings};

    #[derive(Default)]
    struct Recorder {
        clears: usize,
        fills: Vec<(Vec2, Vec2, Rgba)>,
        strokes: usize,
        texts: Vec<String>,
    }

    impl Surface for Recorder {
        fn clear(&mut self, _size: Vec2) {
            self.clears += 1;
        }
        fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Rgba) {
            self.fills.push((pos, size, color));
        }
        fn stroke_rect(&mut self, _pos: Vec2, _size: Vec2, _color: Rgba, _line_width: f32) {
            self.strokes += 1;
        }
        fn fill_text(&mut self, text: &str, _pos: Vec2, _px: f32, _color: Rgba) {
            self.texts.push(text.to_string());
        }
    }

    #[test]
    fn test_draws_every_block_once() {
        let field = Field::new(Settings::with_board(4, 3, GameMode::Endless)).unwrap();
        let mut surface = Recorder::default();
        draw_field(&field, &mut surface);
        assert_eq!(surface.clears, 1);
        assert_eq!(surface.fills.len(), 12);
        assert_eq!(surface.strokes, 0);
    }

    #[test]
    fn test_new_blocks_start_small() {
        let field = Field::new(Settings::with_board(1, 1, GameMode::Endless)).unwrap();
        let mut surface = Recorder::default();
        draw_field(&field, &mut surface);
        let (pos, size, _) = surface.fills[0];
        assert_eq!(size, Vec2::ZERO);
        assert_eq!(pos, Vec2::splat(field.settings().block_size / 2.0));
    }

    #[test]
    fn test_game_over_banner_drawn() {
        let mut field = Field::from_teams(
            Settings::with_board(0, 0, GameMode::MatchX),
            &[vec![0, 1, 2]],
        )
        .unwrap();
        field.enter_game_over();
        let mut surface = Recorder::default();
        draw_field(&field, &mut surface);
        assert_eq!(surface.texts, vec!["Game over! Score: 0".to_string()]);
    }
}
