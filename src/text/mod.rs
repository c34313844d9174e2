// a fixed bitmap font, one texture array layer per character
// - slice the sprite sheet into layers
// - map message characters onto layers
// - scroll a pool of instanced quads across the screen

pub mod font_sheet;
pub mod glyph_map;
pub mod pipeline;
pub mod scroller;
