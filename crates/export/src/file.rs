//! Image file export

use crate::{ExportError, ExportFormat, ExportResult};
use image::{DynamicImage, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Save `image` to `path` in `format`.
///
/// Missing parent directories are created. JPEG has no alpha channel, so the
/// image is flattened to RGB first.
pub fn save_image(image: &RgbaImage, path: &Path, format: ExportFormat) -> ExportResult<PathBuf> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::EmptyImage);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match format {
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            rgb.save_with_format(path, format.image_format())?;
        }
        ExportFormat::Png | ExportFormat::Bmp => {
            image.save_with_format(path, format.image_format())?;
        }
    }

    log::info!(
        "saved {}x{} {:?} to {}",
        image.width(),
        image.height(),
        format,
        path.display()
    );
    Ok(path.to_path_buf())
}

/// File name suggested for a new capture
pub fn default_file_name(format: ExportFormat) -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("capture_{}.{}", secs, format.extension())
}
