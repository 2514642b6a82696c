//! Overlay configuration

use crate::{OverlayError, OverlayResult};
use image::Rgba;
use serde::{Deserialize, Serialize};

/// Selection outline appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderStyle {
    /// Frame thickness in physical pixels
    pub thickness: u32,
    /// RGBA
    pub color: [u8; 4],
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            thickness: 2,
            color: [255, 0, 0, 255],
        }
    }
}

impl BorderStyle {
    pub fn rgba(&self) -> Rgba<u8> {
        Rgba(self.color)
    }
}

/// Overlay session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Capture the desktop once at start and select on the still image
    pub frozen: bool,
    pub border: BorderStyle,
    /// Erase colour of the live overlay
    pub background: [u8; 4],
    /// Opacity of the live overlay window (0 = invisible, 255 = opaque)
    pub live_opacity: u8,
    /// Full-desktop capture keeps the drawn outline in the image
    pub keep_selection_on_full_capture: bool,
    /// Focus loss does not cancel the session
    pub debug: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            frozen: true,
            border: BorderStyle::default(),
            background: [0, 0, 0, 255],
            live_opacity: 96,
            keep_selection_on_full_capture: false,
            debug: false,
        }
    }
}

impl OverlayConfig {
    pub fn validate(&self) -> OverlayResult<()> {
        if self.border.thickness == 0 {
            return Err(OverlayError::InvalidConfig(
                "border thickness must be at least 1".into(),
            ));
        }
        if !self.frozen && self.live_opacity == 0 {
            return Err(OverlayError::InvalidConfig(
                "live overlay opacity 0 would hide the selection".into(),
            ));
        }
        Ok(())
    }

    pub fn background_rgba(&self) -> Rgba<u8> {
        Rgba(self.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = OverlayConfig::default();
        assert!(config.frozen);
        assert_eq!(config.border.thickness, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_thickness_is_rejected() {
        let config = OverlayConfig {
            border: BorderStyle {
                thickness: 0,
                ..BorderStyle::default()
            },
            ..OverlayConfig::default()
        };
        assert!(matches!(config.validate(), Err(OverlayError::InvalidConfig(_))));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: OverlayConfig =
            serde_json::from_str(r#"{ "frozen": false, "border": { "thickness": 4 } }"#).unwrap();
        assert!(!config.frozen);
        assert_eq!(config.border.thickness, 4);
        assert_eq!(config.border.color, BorderStyle::default().color);
        assert_eq!(config.live_opacity, 96);
    }
}
