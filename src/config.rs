use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::text::glyph_map::{GlyphMap, LETTER_TILES};

pub const DEFAULT_MESSAGE: &str = "just some random babbling to show on screen since we dont have dots or commas typing and reading will be a challenge \n";

/// Every tunable of the scroller demo. Distances are in world units, which line up
/// with window pixels on the glyph line's plane.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollerConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
    pub slot_count: usize,
    pub step: f32,
    pub launch_interval: u32,
    pub glyph_scale: f32,
    pub baseline_y: f32,
    pub glyph_depth: f32,
    pub fov_y: f32,
    pub frame_rate: f32,
    pub clear_color: [f64; 4],
    pub font_path: PathBuf,
    pub message: String,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        let tile_width = 54;
        Self {
            screen_width: 1600,
            screen_height: 1100,
            tile_width,
            tile_height: 71,
            tile_count: 27,
            slot_count: 48 - 14,
            step: 1.5,
            launch_interval: tile_width - 20,
            glyph_scale: 50.0,
            baseline_y: 300.0,
            glyph_depth: 230.0,
            fov_y: 90f32.to_radians(),
            frame_rate: 60.0,
            clear_color: [0.2, 0.3, 0.3, 1.0],
            font_path: PathBuf::from("font.png"),
            message: DEFAULT_MESSAGE.into(),
        }
    }
}

impl ScrollerConfig {
    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    pub fn with_tile_count(mut self, tile_count: u32) -> Self {
        self.tile_count = tile_count;
        self
    }

    pub fn with_slot_count(mut self, slot_count: usize) -> Self {
        self.slot_count = slot_count;
        self
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    pub fn with_launch_interval(mut self, frames: u32) -> Self {
        self.launch_interval = frames;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_font_path<P: Into<PathBuf>>(mut self, font_path: P) -> Self {
        self.font_path = font_path.into();
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = message.into();
        self
    }

    /// Slots are recycled once they are a whole tile past the left window edge.
    pub fn left_bound(&self) -> f32 {
        -(self.tile_width as f32)
    }

    /// Recycled and waiting slots park one tile past the right window edge.
    pub fn right_edge(&self) -> f32 {
        self.screen_width as f32 + self.tile_width as f32
    }

    /// Distance from the z = 0 plane at which the camera sees exactly `screen_width`
    /// units across for a square aspect.
    pub fn camera_distance(&self) -> f32 {
        (self.screen_width as f32 / 2.0) / (self.fov_y / 2.0).tan()
    }

    pub fn far_plane(&self) -> f32 {
        self.camera_distance() + 10.0
    }

    /// The space tile is the last one on the sheet.
    pub fn glyph_map(&self) -> GlyphMap {
        GlyphMap::new(self.tile_count.saturating_sub(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.slot_count == 0 {
            return Err(anyhow!("Slot count must be at least one."));
        }
        if self.launch_interval == 0 {
            return Err(anyhow!("Launch interval must be at least one frame."));
        }
        if !(self.step > 0.0) {
            return Err(anyhow!("Scroll step must be positive, got {}.", self.step));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(anyhow!(
                "Tile size must be non-zero, got {}x{}.",
                self.tile_width,
                self.tile_height
            ));
        }
        if self.tile_count < LETTER_TILES + 1 {
            return Err(anyhow!(
                "Font sheet needs {} letter tiles and a space tile, got {} tiles.",
                LETTER_TILES,
                self.tile_count
            ));
        }
        if self.glyph_map().encode(&self.message).is_empty() {
            return Err(anyhow!("Message {:?} has nothing to draw.", self.message));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::ScrollerConfig;

    #[test]
    fn defaults_are_valid() {
        let config = ScrollerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.slot_count, 34);
        assert_eq!(config.launch_interval, 34);
    }

    #[test]
    fn edges_are_one_tile_outside_the_screen() {
        let config = ScrollerConfig::default();
        assert_relative_eq!(config.left_bound(), -54.0);
        assert_relative_eq!(config.right_edge(), 1654.0);
    }

    #[test]
    fn camera_distance_follows_field_of_view() {
        let config = ScrollerConfig::default();
        // tan(45 deg) == 1
        assert_relative_eq!(config.camera_distance(), 800.0, epsilon = 1e-3);
        assert_relative_eq!(config.far_plane(), 810.0, epsilon = 1e-3);
    }

    #[test]
    fn space_is_the_last_tile() {
        let config = ScrollerConfig::default().with_tile_count(30);
        assert_eq!(config.glyph_map().space_layer(), 29);
    }

    #[test]
    fn validate_rejects_degenerate_settings() {
        assert!(ScrollerConfig::default().with_slot_count(0).validate().is_err());
        assert!(ScrollerConfig::default().with_step(0.0).validate().is_err());
        assert!(ScrollerConfig::default().with_step(f32::NAN).validate().is_err());
        assert!(ScrollerConfig::default().with_launch_interval(0).validate().is_err());
        assert!(ScrollerConfig::default().with_tile_size(0, 71).validate().is_err());
        assert!(ScrollerConfig::default().with_tile_count(26).validate().is_err());
        assert!(ScrollerConfig::default().with_message("\n\n").validate().is_err());
    }
}
