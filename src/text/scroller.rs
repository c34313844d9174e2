use anyhow::{anyhow, Result};

use crate::config::ScrollerConfig;

/// One on-screen glyph: its horizontal position and the font layer it shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphSlot {
    pub x: f32,
    pub glyph: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollLayout {
    pub left_bound: f32,
    pub right_edge: f32,
    pub step: f32,
    pub launch_interval: u32,
}

impl From<&ScrollerConfig> for ScrollLayout {
    fn from(config: &ScrollerConfig) -> Self {
        Self {
            left_bound: config.left_bound(),
            right_edge: config.right_edge(),
            step: config.step,
            launch_interval: config.launch_interval,
        }
    }
}

/// Fixed pool of glyph slots scrolling right to left. Slots are launched one by one
/// from the right edge, and whenever one leaves the screen on the left it goes back
/// to the right edge carrying the next glyph of the message.
#[derive(Debug, Clone)]
pub struct Scroller {
    slots: Vec<GlyphSlot>,
    glyphs: Vec<u32>,
    cursor: usize,
    in_flight: usize,
    launch_frame: u32,
    layout: ScrollLayout,
}

impl Scroller {
    pub fn new(glyphs: Vec<u32>, capacity: usize, layout: ScrollLayout) -> Result<Self> {
        if glyphs.is_empty() {
            return Err(anyhow!("Can't scroll an empty message."));
        }
        if capacity == 0 {
            return Err(anyhow!("Scroller needs at least one slot."));
        }
        if layout.launch_interval == 0 {
            return Err(anyhow!("Launch interval must be at least one frame."));
        }
        if !(layout.step > 0.0) {
            return Err(anyhow!("Scroll step must be positive, got {}.", layout.step));
        }
        let slots = vec![
            GlyphSlot {
                x: layout.right_edge,
                glyph: glyphs[0],
            };
            capacity
        ];
        Ok(Self {
            slots,
            glyphs,
            cursor: 0,
            in_flight: 0,
            launch_frame: 0,
            layout,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Slots currently travelling across the screen, in launch order.
    pub fn active(&self) -> &[GlyphSlot] {
        &self.slots[..self.in_flight]
    }

    fn next_glyph(&mut self) -> u32 {
        let glyph = self.glyphs[self.cursor];
        self.cursor = (self.cursor + 1) % self.glyphs.len();
        glyph
    }

    /// Moves the line on by one frame.
    pub fn advance(&mut self) {
        if self.in_flight < self.slots.len() {
            if self.launch_frame % self.layout.launch_interval == 0 {
                let glyph = self.next_glyph();
                self.slots[self.in_flight].glyph = glyph;
                self.in_flight += 1;
            }
            self.launch_frame += 1;
        }

        for idx in 0..self.in_flight {
            self.slots[idx].x -= self.layout.step;
            if self.slots[idx].x < self.layout.left_bound {
                let glyph = self.next_glyph();
                let slot = &mut self.slots[idx];
                slot.x = self.layout.right_edge;
                slot.glyph = glyph;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{ScrollLayout, Scroller};
    use crate::{config::ScrollerConfig, text::glyph_map::GlyphMap};

    fn layout(launch_interval: u32) -> ScrollLayout {
        ScrollLayout {
            left_bound: -10.0,
            right_edge: 100.0,
            step: 10.0,
            launch_interval,
        }
    }

    #[test]
    fn rejects_empty_message_and_zero_capacity() {
        assert!(Scroller::new(vec![], 4, layout(1)).is_err());
        assert!(Scroller::new(vec![1], 0, layout(1)).is_err());
    }

    #[test]
    fn rejects_layouts_that_cannot_scroll() {
        assert!(Scroller::new(vec![0, 1], 2, layout(0)).is_err());
        for step in [0.0, -1.0, f32::NAN] {
            let bad = ScrollLayout { step, ..layout(1) };
            assert!(Scroller::new(vec![0, 1], 2, bad).is_err());
        }
    }

    #[test]
    fn nothing_is_active_before_the_first_frame() {
        let scroller = Scroller::new(vec![0, 1, 2], 3, layout(1)).unwrap();
        assert_eq!(scroller.capacity(), 3);
        assert!(scroller.active().is_empty());
    }

    #[test]
    fn slots_launch_every_interval() {
        let mut scroller = Scroller::new(vec![0, 1, 2, 3], 3, layout(5)).unwrap();
        scroller.advance();
        assert_eq!(scroller.in_flight(), 1);
        for _ in 1..5 {
            scroller.advance();
        }
        assert_eq!(scroller.in_flight(), 1);
        scroller.advance();
        assert_eq!(scroller.in_flight(), 2);
        for _ in 0..20 {
            scroller.advance();
        }
        assert_eq!(scroller.in_flight(), 3);
    }

    #[test]
    fn launched_slots_take_message_in_order() {
        let mut scroller = Scroller::new(vec![7, 8, 9], 3, layout(1)).unwrap();
        for _ in 0..3 {
            scroller.advance();
        }
        let glyphs: Vec<u32> = scroller.active().iter().map(|slot| slot.glyph).collect();
        assert_eq!(glyphs, vec![7, 8, 9]);
    }

    #[test]
    fn only_active_slots_move() {
        let mut scroller = Scroller::new(vec![0], 2, layout(3)).unwrap();
        scroller.advance();
        scroller.advance();
        assert_eq!(scroller.active().len(), 1);
        assert_relative_eq!(scroller.active()[0].x, 80.0);
        assert_relative_eq!(scroller.slots[1].x, 100.0);
    }

    #[test]
    fn slot_past_left_bound_returns_to_right_edge_with_next_glyph() {
        let mut scroller = Scroller::new(vec![0, 1, 2], 1, layout(1)).unwrap();
        // 100 -> 0 takes 10 frames, -10 is still on the bound, -20 crosses it
        for _ in 0..11 {
            scroller.advance();
        }
        assert_relative_eq!(scroller.active()[0].x, -10.0);
        assert_eq!(scroller.active()[0].glyph, 0);

        scroller.advance();
        assert_relative_eq!(scroller.active()[0].x, 100.0);
        assert_eq!(scroller.active()[0].glyph, 1);
    }

    #[test]
    fn message_wraps_around() {
        let mut scroller = Scroller::new(vec![4, 5], 1, layout(1)).unwrap();
        scroller.advance();
        let mut shown = vec![scroller.active()[0].glyph];
        // one lap is twelve frames
        for _ in 0..12 * 3 {
            scroller.advance();
            if scroller.active()[0].x == 100.0 {
                shown.push(scroller.active()[0].glyph);
            }
        }
        assert_eq!(shown, vec![4, 5, 4, 5]);
    }

    #[test]
    fn positions_stay_within_bounds() {
        let config = ScrollerConfig::default();
        let glyphs = GlyphMap::default().encode(&config.message);
        let mut scroller =
            Scroller::new(glyphs, config.slot_count, ScrollLayout::from(&config)).unwrap();
        for _ in 0..5000 {
            scroller.advance();
            for slot in scroller.active() {
                assert!(slot.x >= config.left_bound() - config.step);
                assert!(slot.x <= config.right_edge());
                assert!(slot.glyph < config.tile_count);
            }
        }
        assert_eq!(scroller.in_flight(), config.slot_count);
    }
}
