//! Drawing surface of the overlay

use crate::OverlayResult;
use capture::Rect;
use image::{Rgba, RgbaImage};

/// Pixel surface the renderer paints on, in window-local coordinates.
///
/// Operations clip to the surface; nothing outside it is touched.
pub trait Canvas {
    fn size(&self) -> (u32, u32);

    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>);

    /// Copy `rect` from `source` (same coordinate space) onto the canvas
    fn restore_rect(&mut self, rect: Rect, source: &RgbaImage);

    /// Push damaged regions to the screen. In-memory canvases have nothing to do.
    fn present(&mut self, _damage: &[Rect]) -> OverlayResult<()> {
        Ok(())
    }

    fn bounds(&self) -> Rect {
        let (width, height) = self.size();
        Rect::new(0, 0, width, height)
    }
}

impl Canvas for RgbaImage {
    fn size(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        let Some(clip) = rect.intersection(&Canvas::bounds(self)) else {
            return;
        };
        for y in clip.y as u32..clip.bottom() as u32 {
            for x in clip.x as u32..clip.right() as u32 {
                self.put_pixel(x, y, color);
            }
        }
    }

    fn restore_rect(&mut self, rect: Rect, source: &RgbaImage) {
        let shared = Rect::new(
            0,
            0,
            self.width().min(source.width()),
            self.height().min(source.height()),
        );
        let Some(clip) = rect.intersection(&shared) else {
            return;
        };

        let dst_stride = self.width() as usize * 4;
        let src_stride = source.width() as usize * 4;
        let x0 = clip.x as usize * 4;
        let len = clip.width as usize * 4;
        let src: &[u8] = source.as_raw();
        let dst: &mut [u8] = &mut **self;

        for y in clip.y as usize..clip.bottom() as usize {
            let from = y * src_stride + x0;
            let to = y * dst_stride + x0;
            dst[to..to + len].copy_from_slice(&src[from..from + len]);
        }
    }
}
