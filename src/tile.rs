use std::io::{self, Cursor};

use crate::catalog::{Scale, TileSpec};

/// A square raster image produced for one `(size, scale)` pair.  The
/// payload is an encoded PNG file, kept verbatim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RasterTile {
    spec: TileSpec,
    pixel_width: u32,
    pixel_height: u32,
    data: Vec<u8>,
}

impl RasterTile {
    /// Creates a tile whose dimensions are derived from `spec`.
    pub fn new(spec: TileSpec, data: Vec<u8>) -> RasterTile {
        let dimension = spec.pixel_dimension();
        RasterTile {
            spec,
            pixel_width: dimension,
            pixel_height: dimension,
            data,
        }
    }

    /// Creates a tile whose dimensions are read from the header of the
    /// given PNG data rather than derived from `size` and `scale`.
    pub fn from_png(size: u32, scale: Scale, data: Vec<u8>) -> io::Result<RasterTile> {
        let (pixel_width, pixel_height) = png_dimensions(&data)?;
        Ok(RasterTile {
            spec: TileSpec { size, scale },
            pixel_width,
            pixel_height,
            data,
        })
    }

    /// Returns the catalog entry this tile was produced for.
    pub fn spec(&self) -> TileSpec {
        self.spec
    }

    /// Returns the width of the tile, in pixels.
    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    /// Returns the height of the tile, in pixels.
    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    /// Returns the encoded image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the length of the encoded image, in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Reads the pixel dimensions from a PNG header without decoding pixels.
pub fn png_dimensions(data: &[u8]) -> io::Result<(u32, u32)> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    let info = decoder.read_header_info()?;
    Ok((info.width, info.height))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encodes a solid RGBA square as PNG.
    pub(crate) fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let mut output = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut output, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            let len = (width * height * 4) as usize;
            let pixels: Vec<u8> = rgba.iter().copied().cycle().take(len).collect();
            writer.write_image_data(&pixels).unwrap();
        }
        output
    }

    #[test]
    fn new_derives_dimensions_from_spec() {
        let tile = RasterTile::new(TileSpec { size: 64, scale: Scale::Two }, vec![1, 2, 3]);
        assert_eq!(tile.pixel_width(), 128);
        assert_eq!(tile.pixel_height(), 128);
        assert_eq!(tile.byte_len(), 3);
    }

    #[test]
    fn from_png_reads_header() {
        let data = solid_png(24, 12, [255, 0, 0, 255]);
        let tile = RasterTile::from_png(16, Scale::One, data).expect("from_png failed");
        assert_eq!((tile.pixel_width(), tile.pixel_height()), (24, 12));
        assert_eq!(tile.spec().size, 16);
    }

    #[test]
    fn from_png_rejects_garbage() {
        assert!(RasterTile::from_png(16, Scale::One, b"not a png".to_vec()).is_err());
    }
}
