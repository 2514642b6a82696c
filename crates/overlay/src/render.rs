//! Incremental selection rendering
//!
//! Only the regions touched by the previous outline are repainted on each
//! move. Erasing is a dirty-region restore: pixels come back from the frozen
//! backdrop, or the live overlay's background colour is filled in again.

use crate::canvas::Canvas;
use crate::config::OverlayConfig;
use crate::geometry::{borders, normalize, BorderSet};
use capture::{Point, Rect};
use image::{Rgba, RgbaImage};

/// A selection as drawn on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub rect: Rect,
    pub borders: BorderSet,
}

impl Selection {
    pub fn new(rect: Rect, thickness: u32) -> Self {
        Self {
            rect,
            borders: borders(rect, thickness),
        }
    }

    pub fn from_points(start: Point, end: Point, thickness: u32) -> Self {
        Self::new(normalize(start, end), thickness)
    }
}

/// Where erased pixels come from
#[derive(Debug, Clone)]
enum EraseSource {
    Backdrop(RgbaImage),
    Background(Rgba<u8>),
}

/// Draws and erases selection outlines, reporting the damaged regions
#[derive(Debug, Clone)]
pub struct IncrementalRenderer {
    color: Rgba<u8>,
    thickness: u32,
    background: Rgba<u8>,
    source: EraseSource,
}

impl IncrementalRenderer {
    /// Renderer erasing from a frozen desktop image
    pub fn frozen(config: &OverlayConfig, backdrop: RgbaImage) -> Self {
        Self::with_source(config, EraseSource::Backdrop(backdrop))
    }

    /// Renderer erasing with the background colour of a live overlay
    pub fn live(config: &OverlayConfig) -> Self {
        Self::with_source(config, EraseSource::Background(config.background_rgba()))
    }

    fn with_source(config: &OverlayConfig, source: EraseSource) -> Self {
        Self {
            color: config.border.rgba(),
            thickness: config.border.thickness,
            background: config.background_rgba(),
            source,
        }
    }

    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.source, EraseSource::Backdrop(_))
    }

    pub fn backdrop(&self) -> Option<&RgbaImage> {
        match &self.source {
            EraseSource::Backdrop(image) => Some(image),
            EraseSource::Background(_) => None,
        }
    }

    /// Move the backdrop out; later erases fall back to the background colour
    pub fn take_backdrop(&mut self) -> Option<RgbaImage> {
        match std::mem::replace(&mut self.source, EraseSource::Background(self.background)) {
            EraseSource::Backdrop(image) => Some(image),
            source @ EraseSource::Background(_) => {
                self.source = source;
                None
            }
        }
    }

    /// Paint the whole canvas from the erase source
    pub fn paint_background<C: Canvas>(&self, canvas: &mut C) -> Vec<Rect> {
        let all = canvas.bounds();
        self.erase_region(canvas, all);
        vec![all]
    }

    /// Draw the outline of `selection`
    pub fn draw<C: Canvas>(&self, canvas: &mut C, selection: &Selection) -> Vec<Rect> {
        let strips = selection.borders.rects();
        for strip in strips {
            canvas.fill_rect(*strip, self.color);
        }
        strips.to_vec()
    }

    /// Remove a previously drawn `selection`.
    ///
    /// With a backdrop the whole selection rectangle is restored as well, so
    /// nothing drawn inside it survives.
    pub fn erase<C: Canvas>(&self, canvas: &mut C, selection: &Selection) -> Vec<Rect> {
        let damage = match self.source {
            EraseSource::Backdrop(_) => vec![selection.rect.union(&selection.borders.bounds())],
            EraseSource::Background(_) => selection.borders.rects().to_vec(),
        };
        for rect in &damage {
            self.erase_region(canvas, *rect);
        }
        damage
    }

    /// Erase `previous` (if any) and draw `next`
    pub fn redraw<C: Canvas>(
        &self,
        canvas: &mut C,
        previous: Option<&Selection>,
        next: &Selection,
    ) -> Vec<Rect> {
        let mut damage = match previous {
            Some(previous) => self.erase(canvas, previous),
            None => Vec::new(),
        };
        damage.extend(self.draw(canvas, next));
        damage
    }

    /// Burn the outline of `selection` into `image`
    pub fn stamp(&self, image: &mut RgbaImage, selection: &Selection) {
        self.draw(image, selection);
    }

    fn erase_region<C: Canvas>(&self, canvas: &mut C, rect: Rect) {
        match &self.source {
            EraseSource::Backdrop(image) => canvas.restore_rect(rect, image),
            EraseSource::Background(color) => canvas.fill_rect(rect, *color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 + y) as u8, (y * 13) as u8, (x ^ y) as u8, 255])
        })
    }

    fn frozen_setup() -> (IncrementalRenderer, RgbaImage) {
        let backdrop = noise(64, 48);
        let renderer = IncrementalRenderer::frozen(&OverlayConfig::default(), backdrop.clone());
        (renderer, backdrop)
    }

    #[test]
    fn draw_then_erase_restores_backdrop() {
        let (renderer, backdrop) = frozen_setup();
        let mut canvas = RgbaImage::new(64, 48);
        renderer.paint_background(&mut canvas);
        assert_eq!(canvas, backdrop);

        for selection in [
            Selection::from_points(Point::new(5, 5), Point::new(40, 30), 2),
            Selection::from_points(Point::new(60, 40), Point::new(50, 44), 2),
            Selection::from_points(Point::new(-10, -10), Point::new(30, 20), 3),
        ] {
            renderer.draw(&mut canvas, &selection);
            assert_ne!(canvas, backdrop);
            renderer.erase(&mut canvas, &selection);
            assert_eq!(canvas, backdrop);
        }
    }

    #[test]
    fn redraw_leaves_single_outline() {
        let (renderer, backdrop) = frozen_setup();
        let mut canvas = backdrop.clone();

        let first = Selection::from_points(Point::new(2, 2), Point::new(30, 30), 2);
        let second = Selection::from_points(Point::new(2, 2), Point::new(20, 40), 2);
        renderer.redraw(&mut canvas, None, &first);
        let damage = renderer.redraw(&mut canvas, Some(&first), &second);

        let mut expected = backdrop.clone();
        renderer.draw(&mut expected, &second);
        assert_eq!(canvas, expected);
        assert_eq!(damage[0], first.rect);
        assert_eq!(&damage[1..], second.borders.rects());
    }

    #[test]
    fn live_erase_fills_background_over_strips_only() {
        let config = OverlayConfig {
            frozen: false,
            ..OverlayConfig::default()
        };
        let renderer = IncrementalRenderer::live(&config);
        let mut canvas = RgbaImage::from_pixel(32, 32, Rgba([1, 2, 3, 255]));

        let selection = Selection::from_points(Point::new(4, 4), Point::new(20, 20), 2);
        renderer.draw(&mut canvas, &selection);
        let damage = renderer.erase(&mut canvas, &selection);

        assert_eq!(damage, selection.borders.rects());
        assert_eq!(canvas.get_pixel(4, 4), &config.background_rgba());
        // interior untouched by a live erase
        assert_eq!(canvas.get_pixel(10, 10), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn take_backdrop_moves_image_once() {
        let (mut renderer, backdrop) = frozen_setup();
        assert!(renderer.is_frozen());
        assert_eq!(renderer.take_backdrop(), Some(backdrop));
        assert!(!renderer.is_frozen());
        assert_eq!(renderer.take_backdrop(), None);
    }

    #[test]
    fn stamp_draws_outline_into_image() {
        let (renderer, backdrop) = frozen_setup();
        let mut image = backdrop.clone();
        let selection = Selection::from_points(Point::new(10, 10), Point::new(30, 30), 2);
        renderer.stamp(&mut image, &selection);

        let red = OverlayConfig::default().border.rgba();
        assert_eq!(image.get_pixel(10, 10), &red);
        assert_eq!(image.get_pixel(29, 29), &red);
        assert_eq!(image.get_pixel(20, 20), backdrop.get_pixel(20, 20));
    }
}
