//! Pixel buffer helpers

use crate::{CaptureError, CaptureResult, Rect};
use image::{imageops, RgbaImage};

/// Build an RGBA image from top-down 32-bit BGRA rows
pub fn from_bgra(width: u32, height: u32, mut data: Vec<u8>) -> CaptureResult<RgbaImage> {
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(CaptureError::BufferSize {
            width,
            height,
            len: data.len(),
        });
    }

    for chunk in data.chunks_exact_mut(4) {
        chunk.swap(0, 2);
        // GDI leaves the alpha byte of screen pixels undefined
        chunk[3] = 0xFF;
    }

    RgbaImage::from_raw(width, height, data).ok_or(CaptureError::BufferSize {
        width,
        height,
        len: expected,
    })
}

/// Copy `rect` (image coordinates) out of `image`, clipped to the image
pub fn crop(image: &RgbaImage, rect: Rect) -> RgbaImage {
    let bounds = Rect::new(0, 0, image.width(), image.height());
    match rect.intersection(&bounds) {
        Some(clip) => {
            imageops::crop_imm(image, clip.x as u32, clip.y as u32, clip.width, clip.height)
                .to_image()
        }
        None => RgbaImage::new(0, 0),
    }
}
