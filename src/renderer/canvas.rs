//! Canvas 2D backend

use glam::Vec2;
use web_sys::CanvasRenderingContext2d;

use super::Surface;
use crate::color::Rgba;

impl Surface for CanvasRenderingContext2d {
    fn clear(&mut self, size: Vec2) {
        self.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Rgba) {
        self.set_fill_style_str(&color.css());
        CanvasRenderingContext2d::fill_rect(
            self,
            pos.x as f64,
            pos.y as f64,
            size.x as f64,
            size.y as f64,
        );
    }

    fn stroke_rect(&mut self, pos: Vec2, size: Vec2, color: Rgba, line_width: f32) {
        self.set_stroke_style_str(&color.css());
        self.set_line_width(line_width as f64);
        CanvasRenderingContext2d::stroke_rect(
            self,
            pos.x as f64,
            pos.y as f64,
            size.x as f64,
            size.y as f64,
        );
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, px: f32, color: Rgba) {
        self.set_fill_style_str(&color.css());
        self.set_font(&format!("{}px Monospace", px.round() as i32));
        self.set_text_align("center");
        if let Err(e) = CanvasRenderingContext2d::fill_text(self, text, pos.x as f64, pos.y as f64)
        {
            log::warn!("fill_text failed: {:?}", e);
        }
    }
}
