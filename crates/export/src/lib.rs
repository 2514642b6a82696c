//! Export module for SnapRegion
//!
//! Saves captured images to disk or places them on the clipboard.

mod clipboard;
mod file;

pub use clipboard::copy_to_clipboard;
pub use file::{default_file_name, save_image};

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("Nothing to export: image is empty")]
    EmptyImage,
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Image file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Bmp];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Bmp => "bmp",
        }
    }

    /// File-dialog filter label
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG image",
            ExportFormat::Jpeg => "JPEG image",
            ExportFormat::Bmp => "Bitmap image",
        }
    }

    /// Format named by the path's extension, if known
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "bmp" => Some(ExportFormat::Bmp),
            _ => None,
        }
    }

    pub(crate) fn image_format(&self) -> image::ImageFormat {
        match self {
            ExportFormat::Png => image::ImageFormat::Png,
            ExportFormat::Jpeg => image::ImageFormat::Jpeg,
            ExportFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}
