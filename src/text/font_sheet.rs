use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::{imageops, RgbaImage};
use wgpu::{Extent3d, ImageDataLayout};

use crate::{bind::BindHandle, render::Render};

/// A bitmap font cut into equally sized tiles, one texture layer per tile.
/// `data` is rgba8, layer after layer, rows top to bottom.
#[derive(Debug, Clone)]
pub struct FontSheet {
    pub tile_width: u32,
    pub tile_height: u32,
    pub layers: u32,
    pub data: Vec<u8>,
}

impl FontSheet {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        tile_width: u32,
        tile_height: u32,
        layers: u32,
    ) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("Couldn't load font sheet {}", path.display()))?;
        log::info!(
            "loaded font sheet {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Self::from_image(&img.to_rgba8(), tile_width, tile_height, layers)
    }

    pub fn from_image(
        img: &RgbaImage,
        tile_width: u32,
        tile_height: u32,
        layers: u32,
    ) -> Result<Self> {
        if tile_width == 0 || tile_height == 0 {
            return Err(anyhow!("Tile size must be non-zero."));
        }
        let columns = img.width() / tile_width;
        let rows = img.height() / tile_height;
        if columns * rows < layers {
            return Err(anyhow!(
                "Font sheet of {}x{} holds {} tiles of {}x{}, {} needed.",
                img.width(),
                img.height(),
                columns * rows,
                tile_width,
                tile_height,
                layers
            ));
        }

        let mut data = Vec::with_capacity((layers * tile_width * tile_height * 4) as usize);
        for layer in 0..layers {
            let x = layer % columns * tile_width;
            let y = layer / columns * tile_height;
            let tile = imageops::crop_imm(img, x, y, tile_width, tile_height).to_image();
            data.extend_from_slice(tile.as_raw());
        }

        Ok(Self {
            tile_width,
            tile_height,
            layers,
            data,
        })
    }

    #[cfg(test)]
    fn layer_bytes(&self, layer: u32) -> Option<&[u8]> {
        let len = (self.tile_width * self.tile_height * 4) as usize;
        let start = layer as usize * len;
        self.data.get(start..start + len)
    }

    /// Copies every layer into the array texture at `binding` of `handle`.
    pub fn upload(&self, render: &Render, handle: BindHandle, binding: u32) -> Result<()> {
        render.write_texture(
            &self.data,
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.tile_width),
                rows_per_image: Some(self.tile_height),
            },
            Extent3d {
                width: self.tile_width,
                height: self.tile_height,
                depth_or_array_layers: self.layers,
            },
            handle,
            binding,
        )
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::FontSheet;

    // every pixel of tile n is filled with n
    fn sheet(columns: u32, rows: u32, tile_w: u32, tile_h: u32) -> RgbaImage {
        RgbaImage::from_fn(columns * tile_w, rows * tile_h, |x, y| {
            let n = (y / tile_h * columns + x / tile_w) as u8;
            Rgba([n, n, n, 255])
        })
    }

    #[test]
    fn single_row_sheet_slices_left_to_right() {
        let sheet = FontSheet::from_image(&sheet(27, 1, 4, 3), 4, 3, 27).unwrap();
        assert_eq!(sheet.data.len(), 27 * 4 * 3 * 4);
        for layer in 0..27 {
            let bytes = sheet.layer_bytes(layer).unwrap();
            assert!(bytes.chunks(4).all(|px| px == [layer as u8, layer as u8, layer as u8, 255]));
        }
        assert!(sheet.layer_bytes(27).is_none());
    }

    #[test]
    fn grid_sheet_wraps_to_next_row() {
        let sheet = FontSheet::from_image(&sheet(4, 7, 2, 2), 2, 2, 27).unwrap();
        assert_eq!(sheet.layer_bytes(5).unwrap()[0], 5);
        assert_eq!(sheet.layer_bytes(26).unwrap()[0], 26);
    }

    #[test]
    fn partial_tiles_are_ignored() {
        // 3.5 tiles wide: only three usable
        let img = RgbaImage::new(7, 2);
        assert!(FontSheet::from_image(&img, 2, 2, 3).is_ok());
        assert!(FontSheet::from_image(&img, 2, 2, 4).is_err());
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let img = RgbaImage::new(8, 8);
        assert!(FontSheet::from_image(&img, 0, 2, 1).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = FontSheet::from_path("does/not/exist.png", 2, 2, 1).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.png"));
    }
}
