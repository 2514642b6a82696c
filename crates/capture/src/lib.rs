//! Screen capture module for SnapRegion
//!
//! Provides the geometry primitives shared by every crate, the
//! [`ScreenSource`] capture primitive and its implementations.

pub mod bitmap;
#[cfg(windows)]
pub mod gdi;
pub mod memory;

pub use bitmap::{crop, from_bgra};
#[cfg(windows)]
pub use gdi::GdiScreen;
pub use memory::StaticScreen;

use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Platform API error: {0}")]
    Platform(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    #[error("Region {0:?} lies outside the virtual desktop")]
    OutOfBounds(Rect),

    #[error("Pixel buffer of {len} bytes does not match {width}x{height}")]
    BufferSize { width: u32, height: u32, len: usize },
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Integer point in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rectangle in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add_unsigned(self.height)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x &&
        self.y < other.bottom() && self.bottom() > other.y
    }

    /// Overlapping part of two rectangles, `None` when they do not touch
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if self.is_empty() || other.is_empty() || !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(x, y, x.abs_diff(right), y.abs_diff(bottom)))
    }

    /// Smallest rectangle enclosing both
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, x.abs_diff(right), y.abs_diff(bottom))
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }
}

/// Bounding box of all attached displays, right/bottom exclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DesktopBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl DesktopBounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    /// The whole desktop in desktop coordinates
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width(), self.height())
    }

    /// Convert a window-local rectangle (window placed at the desktop origin)
    /// into desktop coordinates
    pub fn local_to_desktop(&self, rect: Rect) -> Rect {
        rect.offset(self.left, self.top)
    }
}

/// Screen-capture primitive used by the overlay.
pub trait ScreenSource {
    /// Rectangle spanning every attached display
    fn desktop_bounds(&self) -> DesktopBounds;

    /// Copy the pixels of a desktop-coordinate rectangle
    fn capture(&mut self, rect: Rect) -> CaptureResult<RgbaImage>;

    /// Copy the whole virtual desktop
    fn capture_desktop(&mut self) -> CaptureResult<RgbaImage> {
        let rect = self.desktop_bounds().to_rect();
        self.capture(rect)
    }
}

impl<S: ScreenSource + ?Sized> ScreenSource for &mut S {
    fn desktop_bounds(&self) -> DesktopBounds {
        (**self).desktop_bounds()
    }

    fn capture(&mut self, rect: Rect) -> CaptureResult<RgbaImage> {
        (**self).capture(rect)
    }
}
