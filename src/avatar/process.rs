use std::io::Cursor;

use image::{ImageError, ImageFormat, RgbaImage};

use super::error::ProcessingFailure;

/// RGBA raster whose alpha channel is 255 inside the inscribed circle and 0 outside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircularImage {
    pixels: RgbaImage,
}

impl CircularImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, ImageError> {
        let mut encoded = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)?;
        Ok(encoded)
    }
}

pub fn make_circular(bytes: &[u8]) -> Result<CircularImage, ProcessingFailure> {
    let mut pixels = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = pixels.dimensions();
    if width == 0 || height == 0 {
        return Err(ProcessingFailure::Empty);
    }

    let radius = width.min(height) as f32 / 2.0;
    let radius_sq = radius * radius;
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    for (x, y, pixel) in pixels.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - center_x;
        let dy = y as f32 + 0.5 - center_y;
        pixel.0[3] = if (dx * dx) + (dy * dy) <= radius_sq {
            u8::MAX
        } else {
            0
        };
    }

    Ok(CircularImage { pixels })
}
