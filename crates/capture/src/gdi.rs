//! Virtual desktop capture using GDI

use crate::{bitmap, CaptureError, CaptureResult, DesktopBounds, Rect, ScreenSource};
use image::RgbaImage;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC,
    GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB,
    DIB_RGB_COLORS, SRCCOPY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN,
    SM_YVIRTUALSCREEN,
};

impl From<windows::core::Error> for CaptureError {
    fn from(err: windows::core::Error) -> Self {
        CaptureError::Platform(err.to_string())
    }
}

/// Screen source reading the live desktop through the screen DC
#[derive(Debug, Default, Clone, Copy)]
pub struct GdiScreen;

impl GdiScreen {
    pub fn new() -> Self {
        Self
    }
}

impl ScreenSource for GdiScreen {
    fn desktop_bounds(&self) -> DesktopBounds {
        virtual_desktop_bounds()
    }

    fn capture(&mut self, rect: Rect) -> CaptureResult<RgbaImage> {
        if rect.is_empty() {
            return Err(CaptureError::OutOfBounds(rect));
        }
        let data = unsafe { blit_region(rect)? };
        bitmap::from_bgra(rect.width, rect.height, data)
    }
}

/// Get virtual desktop bounds
pub fn virtual_desktop_bounds() -> DesktopBounds {
    unsafe {
        let left = GetSystemMetrics(SM_XVIRTUALSCREEN);
        let top = GetSystemMetrics(SM_YVIRTUALSCREEN);
        DesktopBounds {
            left,
            top,
            right: left + GetSystemMetrics(SM_CXVIRTUALSCREEN),
            bottom: top + GetSystemMetrics(SM_CYVIRTUALSCREEN),
        }
    }
}

/// Copy a desktop rectangle into a top-down BGRA buffer
unsafe fn blit_region(rect: Rect) -> CaptureResult<Vec<u8>> {
    let width = rect.width as i32;
    let height = rect.height as i32;

    let screen_dc = GetDC(None);
    if screen_dc.is_invalid() {
        return Err(CaptureError::Screenshot("Failed to get screen DC".into()));
    }

    let mem_dc = CreateCompatibleDC(screen_dc);
    let bitmap = CreateCompatibleBitmap(screen_dc, width, height);
    let old_bitmap = SelectObject(mem_dc, bitmap);

    let blitted = BitBlt(mem_dc, 0, 0, width, height, screen_dc, rect.x, rect.y, SRCCOPY);

    let mut bmi = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width,
            biHeight: -height, // Top-down DIB
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        bmiColors: [Default::default()],
    };

    let mut data = vec![0u8; rect.width as usize * rect.height as usize * 4];
    let lines = if blitted.is_ok() {
        GetDIBits(
            mem_dc,
            bitmap,
            0,
            rect.height,
            Some(data.as_mut_ptr() as *mut _),
            &mut bmi,
            DIB_RGB_COLORS,
        )
    } else {
        0
    };

    SelectObject(mem_dc, old_bitmap);
    let _ = DeleteObject(bitmap);
    let _ = DeleteDC(mem_dc);
    ReleaseDC(None, screen_dc);

    blitted?;
    if lines != height {
        return Err(CaptureError::Screenshot(format!(
            "GetDIBits copied {lines} of {height} lines"
        )));
    }

    log::debug!("captured {}x{} at ({}, {})", rect.width, rect.height, rect.x, rect.y);
    Ok(data)
}
