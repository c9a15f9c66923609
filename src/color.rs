//! Team colours
//!
//! Every team maps to one hue spread evenly around the colour wheel; odd
//! teams are drawn a little darker so neighbouring hues stay distinguishable.

use serde::{Deserialize, Serialize};

/// RGBA colour, channels 0-255 with alpha 0-1 (canvas convention)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255.0, 255.0, 255.0, 1.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba(...)` string for canvas fill/stroke styles
    pub fn css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r.round() as i32,
            self.g.round() as i32,
            self.b.round() as i32,
            self.a
        )
    }

    /// Convert HSV (all components 0-1) to RGB
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let i = (h * 6.0).floor();
        let f = h * 6.0 - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - f * s);
        let t = v * (1.0 - (1.0 - f) * s);

        let (r, g, b) = match (i as i32).rem_euclid(6) {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::new(r * 255.0, g * 255.0, b * 255.0, 1.0)
    }
}

/// Colour for a team out of `num_teams`
pub fn team_color(team: u8, num_teams: u8) -> Rgba {
    let hue = team as f32 / num_teams.max(1) as f32;
    let value = (255.0 - 80.0 * (team % 2) as f32) / 255.0;
    Rgba::from_hsv(hue, 1.0, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_zero_is_red() {
        let c = team_color(0, 5);
        assert!((c.r - 255.0).abs() < 0.01);
        assert!(c.g.abs() < 0.01);
        assert!(c.b.abs() < 0.01);
    }

    #[test]
    fn test_teams_have_distinct_colors() {
        let colors: Vec<_> = (0..5).map(|t| team_color(t, 5)).collect();
        for i in 0..colors.len() {
            for j in (i + 1)..colors.len() {
                assert_ne!(colors[i], colors[j]);
            }
        }
    }

    #[test]
    fn test_odd_teams_are_darker() {
        let c = team_color(1, 2);
        // hue 0.5 = cyan, value dimmed to 175/255
        assert!(c.r.abs() < 0.01);
        assert!((c.g - 175.0).abs() < 0.01);
        assert!((c.b - 175.0).abs() < 0.01);
    }

    #[test]
    fn test_css_string() {
        assert_eq!(Rgba::WHITE.with_alpha(0.5).css(), "rgba(255, 255, 255, 0.5)");
    }
}
