use std::io::{self, Cursor, Error, ErrorKind};

/// A decoded image with 8-bit RGBA pixels.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RgbaImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA data, four bytes per pixel.
    pub data: Vec<u8>,
}

/// Decodes PNG data into RGBA pixels, whatever the PNG's color type.
pub fn decode_png_rgba(input: &[u8]) -> io::Result<RgbaImage> {
    let mut decoder = png::Decoder::new(Cursor::new(input));
    decoder.set_transformations(png::Transformations::STRIP_16 | png::Transformations::EXPAND);
    let mut reader = decoder.read_info()?;

    let (color_type, bit_depth) = reader.output_color_type();
    if bit_depth != png::BitDepth::Eight {
        let msg = format!("unexpected PNG bit depth {:?}", bit_depth);
        return Err(Error::new(ErrorKind::InvalidData, msg));
    }
    let buffer_size = reader
        .output_buffer_size()
        .ok_or_else(|| Error::new(ErrorKind::InvalidData, "PNG image is too large"))?;
    let mut buffer = vec![0u8; buffer_size];
    let frame = reader.next_frame(&mut buffer)?;
    buffer.truncate(frame.buffer_size());

    let data = match color_type {
        png::ColorType::Rgba => buffer,
        png::ColorType::Rgb => expand(&buffer, 3, |px| [px[0], px[1], px[2], u8::MAX]),
        png::ColorType::GrayscaleAlpha => expand(&buffer, 2, |px| [px[0], px[0], px[0], px[1]]),
        png::ColorType::Grayscale => expand(&buffer, 1, |px| [px[0], px[0], px[0], u8::MAX]),
        png::ColorType::Indexed => {
            return Err(Error::new(ErrorKind::InvalidData, "PNG palette was not expanded"));
        }
    };
    Ok(RgbaImage {
        width: frame.width,
        height: frame.height,
        data,
    })
}

fn expand<F>(input: &[u8], channels: usize, to_rgba: F) -> Vec<u8>
where
    F: Fn(&[u8]) -> [u8; 4],
{
    let mut rgba = Vec::with_capacity(input.len() / channels * 4);
    for pixel in input.chunks_exact(channels) {
        rgba.extend_from_slice(&to_rgba(pixel));
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::tests::solid_png;

    fn encode(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut output = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut output, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        output
    }

    #[test]
    fn decode_rgba() {
        let image = decode_png_rgba(&solid_png(4, 2, [10, 20, 30, 40])).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.data.len(), 32);
        assert_eq!(&image.data[..4], &[10, 20, 30, 40]);
    }

    #[test]
    fn decode_rgb_adds_opaque_alpha() {
        let png = encode(1, 2, png::ColorType::Rgb, &[1, 2, 3, 4, 5, 6]);
        let image = decode_png_rgba(&png).unwrap();
        assert_eq!(image.data, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn decode_gray_alpha() {
        let png = encode(2, 1, png::ColorType::GrayscaleAlpha, &[7, 100, 9, 0]);
        let image = decode_png_rgba(&png).unwrap();
        assert_eq!(image.data, vec![7, 7, 7, 100, 9, 9, 9, 0]);
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(decode_png_rgba(b"\x89PNG but not really").is_err());
    }
}
