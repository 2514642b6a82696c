//! In-memory screen source

use crate::{bitmap, CaptureError, CaptureResult, DesktopBounds, Rect, ScreenSource};
use image::RgbaImage;

/// A virtual desktop backed by a still image.
///
/// Used headless and in tests. Every call to [`ScreenSource::capture`] is
/// counted so callers can check how often the screen was read.
#[derive(Debug, Clone)]
pub struct StaticScreen {
    image: RgbaImage,
    bounds: DesktopBounds,
    captures: usize,
}

impl StaticScreen {
    /// Desktop whose top-left corner sits at (0, 0)
    pub fn new(image: RgbaImage) -> Self {
        Self::with_origin(image, 0, 0)
    }

    /// Desktop whose top-left corner sits at (left, top), as with a monitor
    /// arranged left of or above the primary one
    pub fn with_origin(image: RgbaImage, left: i32, top: i32) -> Self {
        let bounds = DesktopBounds::new(
            left,
            top,
            left.saturating_add_unsigned(image.width()),
            top.saturating_add_unsigned(image.height()),
        );
        Self {
            image,
            bounds,
            captures: 0,
        }
    }

    /// Number of capture calls served so far
    pub fn capture_count(&self) -> usize {
        self.captures
    }

    /// Replace the desktop content, e.g. to emulate a changing live screen
    pub fn set_image(&mut self, image: RgbaImage) {
        *self = Self {
            captures: self.captures,
            ..Self::with_origin(image, self.bounds.left, self.bounds.top)
        };
    }
}

impl ScreenSource for StaticScreen {
    fn desktop_bounds(&self) -> DesktopBounds {
        self.bounds
    }

    fn capture(&mut self, rect: Rect) -> CaptureResult<RgbaImage> {
        self.captures += 1;

        let desktop = self.bounds.to_rect();
        if rect.is_empty() || rect.intersection(&desktop) != Some(rect) {
            return Err(CaptureError::OutOfBounds(rect));
        }

        let local = rect.offset(-self.bounds.left, -self.bounds.top);
        Ok(bitmap::crop(&self.image, local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn captures_in_desktop_coordinates() {
        let mut screen = StaticScreen::with_origin(gradient(20, 10), -10, 5);
        assert_eq!(screen.desktop_bounds(), DesktopBounds::new(-10, 5, 10, 15));

        let part = screen.capture(Rect::new(-8, 6, 3, 2)).unwrap();
        assert_eq!(part.dimensions(), (3, 2));
        assert_eq!(part.get_pixel(0, 0), &Rgba([2, 1, 0, 255]));
        assert_eq!(screen.capture_count(), 1);
    }

    #[test]
    fn whole_desktop_capture() {
        let mut screen = StaticScreen::with_origin(gradient(6, 4), 100, 100);
        let full = screen.capture_desktop().unwrap();
        assert_eq!(full, gradient(6, 4));
    }

    #[test]
    fn outside_region_is_an_error() {
        let mut screen = StaticScreen::new(gradient(6, 4));
        let err = screen.capture(Rect::new(4, 0, 4, 4)).unwrap_err();
        assert!(matches!(err, CaptureError::OutOfBounds(_)));
        assert!(screen.capture(Rect::new(0, 0, 0, 4)).is_err());
        assert_eq!(screen.capture_count(), 2);
    }

    #[test]
    fn set_image_keeps_origin_and_count() {
        let mut screen = StaticScreen::with_origin(gradient(6, 4), -6, 0);
        screen.capture_desktop().unwrap();
        screen.set_image(gradient(8, 8));
        assert_eq!(screen.desktop_bounds(), DesktopBounds::new(-6, 0, 2, 8));
        assert_eq!(screen.capture_count(), 1);
    }
}
