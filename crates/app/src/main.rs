//! SnapRegion - select a screen region and save it as an image

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod config;

use crate::config::{config_path, AppConfig, CONFIG_ENV};
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = std::env::args().skip(1);
    let result = load_config(args, std::env::var(CONFIG_ENV).ok()).and_then(run);
    if let Err(err) = &result {
        report(err);
    }
    result
}

fn load_config(
    args: impl Iterator<Item = String>,
    env: Option<String>,
) -> anyhow::Result<AppConfig> {
    let path = config_path(args, env);
    let config = AppConfig::load(path.as_deref())?;
    info!("starting snapregion");
    Ok(config)
}

/// Text shown to the user for a failed run
fn describe(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

/// Release builds have no console, so failures also go to a message box
fn report(err: &anyhow::Error) {
    let message = describe(err);
    log::error!("snapregion failed: {message}");

    #[cfg(windows)]
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("SnapRegion")
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

#[cfg(windows)]
fn run(config: AppConfig) -> anyhow::Result<()> {
    use windows::Win32::UI::HiDpi::{
        SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    };

    // Physical pixels everywhere, so overlay and capture coordinates agree
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }

    flow::run(&config)
}

#[cfg(not(windows))]
fn run(_config: AppConfig) -> anyhow::Result<()> {
    anyhow::bail!("the selection overlay is only available on Windows")
}

#[cfg(windows)]
mod flow {
    use crate::config::{AppConfig, OutputAction, OutputConfig};
    use export::ExportFormat;
    use image::RgbaImage;
    use log::info;
    use overlay::OverlayWindow;

    /// Show the overlay, then hand the result to the configured output
    pub fn run(config: &AppConfig) -> anyhow::Result<()> {
        let outcome = OverlayWindow::show(config.overlay.clone())?;
        let Some(image) = outcome.into_image() else {
            info!("selection cancelled");
            return Ok(());
        };

        match config.output.action {
            OutputAction::Clipboard => export::copy_to_clipboard(&image)?,
            OutputAction::Save => save(&image, &config.output)?,
        }
        Ok(())
    }

    fn save(image: &RgbaImage, output: &OutputConfig) -> anyhow::Result<()> {
        let mut dialog = rfd::FileDialog::new()
            .set_title("Save capture")
            .set_file_name(export::default_file_name(output.format));
        if let Some(dir) = &output.directory {
            dialog = dialog.set_directory(dir);
        }

        // Preferred format first, so it is the dialog's default filter
        let others = ExportFormat::ALL.into_iter().filter(|f| *f != output.format);
        for format in std::iter::once(output.format).chain(others) {
            dialog = dialog.add_filter(format.label(), &[format.extension()]);
        }

        let Some(path) = dialog.save_file() else {
            info!("save dialog dismissed");
            return Ok(());
        };

        let format = ExportFormat::from_path(&path).unwrap_or(output.format);
        export::save_image(image, &path, format)?;
        Ok(())
    }
}
