//! Overlay module for SnapRegion
//!
//! Provides the selection geometry, the incremental border renderer and the
//! overlay session state machine, plus the Win32 window that hosts it.

pub mod canvas;
pub mod config;
pub mod geometry;
pub mod input;
pub mod render;
pub mod session;
#[cfg(windows)]
pub mod window;

pub use canvas::Canvas;
pub use config::{BorderStyle, OverlayConfig};
pub use geometry::{borders, normalize, BorderSet};
pub use input::{InputEvent, KeyAction, PointerButton};
pub use render::{IncrementalRenderer, Selection};
pub use session::{OverlaySession, SessionState};
#[cfg(windows)]
pub use window::OverlayWindow;

use capture::CaptureError;
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Screen capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Invalid overlay configuration: {0}")]
    InvalidConfig(String),

    #[error("Virtual desktop is empty")]
    EmptyDesktop,

    #[error("Overlay window error: {0}")]
    Window(String),

    #[error("Session aborted after a capture failure")]
    Aborted,
}

pub type OverlayResult<T> = Result<T, OverlayError>;

/// How an overlay session ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The selected pixels; the caller owns them from here on
    Captured(RgbaImage),
    /// User cancelled
    Cancelled,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Captured(_))
    }

    pub fn into_image(self) -> Option<RgbaImage> {
        match self {
            Outcome::Captured(image) => Some(image),
            Outcome::Cancelled => None,
        }
    }
}
