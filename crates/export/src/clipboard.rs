//! Clipboard export

use crate::{ExportError, ExportResult};
use arboard::{Clipboard, ImageData};
use image::RgbaImage;

/// Place `image` on the system clipboard
pub fn copy_to_clipboard(image: &RgbaImage) -> ExportResult<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::EmptyImage);
    }

    let mut clipboard = Clipboard::new()?;
    clipboard.set_image(ImageData {
        width: image.width() as usize,
        height: image.height() as usize,
        bytes: image.as_raw().into(),
    })?;

    log::info!("copied {}x{} image to clipboard", image.width(), image.height());
    Ok(())
}
