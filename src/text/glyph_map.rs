pub const LETTER_TILES: u32 = 26;

/// Maps characters onto layers of the font sheet: `a`..`z` first, then a space tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMap {
    space_layer: u32,
}

impl Default for GlyphMap {
    fn default() -> Self {
        Self {
            space_layer: LETTER_TILES,
        }
    }
}

impl GlyphMap {
    pub fn new(space_layer: u32) -> Self {
        Self { space_layer }
    }

    pub fn space_layer(&self) -> u32 {
        self.space_layer
    }

    /// `None` for line breaks, which take no slot. Anything the sheet has no tile for
    /// is drawn as a space.
    pub fn layer(&self, character: char) -> Option<u32> {
        match character {
            '\n' | '\r' => None,
            'a'..='z' => Some(character as u32 - 'a' as u32),
            'A'..='Z' => Some(character as u32 - 'A' as u32),
            _ => Some(self.space_layer),
        }
    }

    pub fn encode(&self, message: &str) -> Vec<u32> {
        message.chars().filter_map(|c| self.layer(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::GlyphMap;

    #[test]
    fn letters_map_in_alphabet_order() {
        let map = GlyphMap::default();
        assert_eq!(map.layer('a'), Some(0));
        assert_eq!(map.layer('m'), Some(12));
        assert_eq!(map.layer('z'), Some(25));
        assert_eq!(map.layer('Q'), map.layer('q'));
    }

    #[test]
    fn space_uses_last_tile() {
        assert_eq!(GlyphMap::default().layer(' '), Some(26));
        assert_eq!(GlyphMap::new(30).layer(' '), Some(30));
    }

    #[test]
    fn unknown_characters_fall_back_to_space() {
        let map = GlyphMap::default();
        assert_eq!(map.layer('.'), Some(26));
        assert_eq!(map.layer('7'), Some(26));
        assert_eq!(map.layer('é'), Some(26));
    }

    #[test]
    fn encode_skips_line_breaks() {
        let map = GlyphMap::default();
        assert_eq!(map.encode("ab c\r\n"), vec![0, 1, 26, 2]);
        assert!(map.encode("\n").is_empty());
    }
}
