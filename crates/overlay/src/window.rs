//! Overlay window implementation

use crate::{
    canvas::Canvas,
    config::OverlayConfig,
    input::{InputEvent, KeyAction, PointerButton},
    session::OverlaySession,
    OverlayError, OverlayResult, Outcome,
};
use capture::{GdiScreen, Point, Rect};
use image::{Rgba, RgbaImage};
use std::cell::RefCell;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, EndPaint, GetDC, ReleaseDC, SetDIBitsToDevice, BITMAPINFO, BITMAPINFOHEADER,
    BI_RGB, DIB_RGB_COLORS, HDC, PAINTSTRUCT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture, SetFocus};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
    LoadCursorW, RegisterClassExW, SetForegroundWindow, SetLayeredWindowAttributes, ShowWindow,
    TranslateMessage, CS_HREDRAW, CS_VREDRAW, IDC_CROSS, LWA_ALPHA, MSG, SW_SHOW, WM_CLOSE,
    WM_DESTROY, WM_ERASEBKGND, WM_KEYDOWN, WM_KILLFOCUS, WM_LBUTTONDOWN, WM_LBUTTONUP,
    WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEMOVE, WM_PAINT, WM_RBUTTONDOWN, WNDCLASSEXW,
    WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

const VK_ESCAPE: usize = 0x1B;
const VK_A: usize = 0x41;

thread_local! {
    static OVERLAY_STATE: RefCell<Option<OverlayState>> = RefCell::new(None);
}

struct OverlayState {
    session: OverlaySession<GdiScreen>,
    canvas: WindowCanvas,
    error: Option<OverlayError>,
}

/// Back buffer of the overlay window.
///
/// Damaged regions are blitted straight through the window DC, so
/// presenting never re-enters the window procedure.
struct WindowCanvas {
    hwnd: isize,
    pixels: RgbaImage,
}

impl Canvas for WindowCanvas {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba<u8>) {
        self.pixels.fill_rect(rect, color);
    }

    fn restore_rect(&mut self, rect: Rect, source: &RgbaImage) {
        self.pixels.restore_rect(rect, source);
    }

    fn present(&mut self, damage: &[Rect]) -> OverlayResult<()> {
        if self.hwnd == 0 || damage.is_empty() {
            return Ok(());
        }
        unsafe {
            let hwnd = hwnd_from_raw(self.hwnd);
            let hdc = GetDC(hwnd);
            if hdc.is_invalid() {
                return Err(OverlayError::Window("Failed to get overlay DC".into()));
            }
            for rect in damage {
                blit(hdc, &self.pixels, *rect);
            }
            ReleaseDC(hwnd, hdc);
        }
        Ok(())
    }
}

/// Overlay window for selection
pub struct OverlayWindow;

impl OverlayWindow {
    const CLASS_NAME: PCWSTR = w!("SnapRegionOverlay");

    /// Create the overlay, run it until the session ends and return the outcome
    pub fn show(config: OverlayConfig) -> OverlayResult<Outcome> {
        let frozen = config.frozen;
        let opacity = config.live_opacity;

        // Frozen mode grabs the desktop here, before the overlay covers it
        let session = OverlaySession::start(GdiScreen::new(), config)?;
        let vd = session.desktop_bounds();

        let mut canvas = WindowCanvas {
            hwnd: 0,
            pixels: session.new_canvas(),
        };
        session.paint(&mut canvas);

        OVERLAY_STATE.with(|s| {
            *s.borrow_mut() = Some(OverlayState {
                session,
                canvas,
                error: None,
            });
        });

        let created = unsafe {
            Self::create(vd.left, vd.top, vd.width(), vd.height(), frozen, opacity)
        };
        let hwnd = match created {
            Ok(hwnd) => hwnd,
            Err(e) => {
                OVERLAY_STATE.with(|s| s.borrow_mut().take());
                return Err(e);
            }
        };

        OVERLAY_STATE.with(|s| {
            if let Some(state) = s.borrow_mut().as_mut() {
                state.canvas.hwnd = hwnd.0 as isize;
            }
        });

        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = SetForegroundWindow(hwnd);
            let _ = SetFocus(hwnd);

            // Message loop
            let mut msg = MSG::default();
            loop {
                let ret = GetMessageW(&mut msg, None, 0, 0);
                if !ret.as_bool() {
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);

                let done = OVERLAY_STATE.with(|s| {
                    s.borrow()
                        .as_ref()
                        .map(|state| state.session.is_done())
                        .unwrap_or(true)
                });
                if done {
                    break;
                }
            }

            // Cleanup
            let _ = DestroyWindow(hwnd);
        }

        let state = OVERLAY_STATE
            .with(|s| s.borrow_mut().take())
            .ok_or_else(|| OverlayError::Window("Overlay state lost".into()))?;

        match state.error {
            Some(err) => Err(err),
            None => state.session.finish(),
        }
    }

    unsafe fn create(
        left: i32,
        top: i32,
        width: u32,
        height: u32,
        frozen: bool,
        opacity: u8,
    ) -> OverlayResult<HWND> {
        let window_err = |e: windows::core::Error| OverlayError::Window(e.to_string());

        let hmodule = GetModuleHandleW(None).map_err(window_err)?;
        let hinstance = HINSTANCE(hmodule.0);

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(Self::wnd_proc),
            hInstance: hinstance,
            hCursor: LoadCursorW(None, IDC_CROSS).map_err(window_err)?,
            lpszClassName: Self::CLASS_NAME,
            ..Default::default()
        };

        // Fails harmlessly when the class is already registered
        RegisterClassExW(&wc);

        let ex_style = if frozen {
            WS_EX_TOPMOST | WS_EX_TOOLWINDOW
        } else {
            WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_LAYERED
        };

        // Create window covering virtual desktop
        let hwnd = CreateWindowExW(
            ex_style,
            Self::CLASS_NAME,
            w!("SnapRegion Selection"),
            WS_POPUP,
            left,
            top,
            width as i32,
            height as i32,
            None,
            None,
            hinstance,
            None,
        )
        .map_err(window_err)?;

        if !frozen {
            // The live desktop stays visible through the dimmed overlay
            SetLayeredWindowAttributes(hwnd, COLORREF(0), opacity, LWA_ALPHA).map_err(window_err)?;
        }

        Ok(hwnd)
    }

    unsafe extern "system" fn wnd_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_PAINT => {
                let mut ps = PAINTSTRUCT::default();
                let hdc = BeginPaint(hwnd, &mut ps);
                let dirty = Rect::new(
                    ps.rcPaint.left,
                    ps.rcPaint.top,
                    (ps.rcPaint.right - ps.rcPaint.left).max(0) as u32,
                    (ps.rcPaint.bottom - ps.rcPaint.top).max(0) as u32,
                );
                OVERLAY_STATE.with(|s| {
                    if let Ok(guard) = s.try_borrow() {
                        if let Some(state) = guard.as_ref() {
                            blit(hdc, &state.canvas.pixels, dirty);
                        }
                    }
                });
                let _ = EndPaint(hwnd, &ps);
                LRESULT(0)
            }

            // The back buffer covers every pixel
            WM_ERASEBKGND => LRESULT(1),

            WM_LBUTTONDOWN => {
                SetCapture(hwnd);
                Self::dispatch(InputEvent::PointerDown {
                    button: PointerButton::Primary,
                    position: point_from_lparam(lparam),
                });
                LRESULT(0)
            }

            WM_RBUTTONDOWN => {
                Self::dispatch(InputEvent::PointerDown {
                    button: PointerButton::Secondary,
                    position: point_from_lparam(lparam),
                });
                LRESULT(0)
            }

            WM_MBUTTONDOWN => {
                Self::dispatch(InputEvent::PointerDown {
                    button: PointerButton::Other,
                    position: point_from_lparam(lparam),
                });
                LRESULT(0)
            }

            WM_MBUTTONUP => {
                Self::dispatch(InputEvent::PointerUp {
                    button: PointerButton::Other,
                    position: point_from_lparam(lparam),
                });
                LRESULT(0)
            }

            WM_MOUSEMOVE => {
                Self::dispatch(InputEvent::PointerMove {
                    position: point_from_lparam(lparam),
                });
                LRESULT(0)
            }

            WM_LBUTTONUP => {
                let _ = ReleaseCapture();
                Self::dispatch(InputEvent::PointerUp {
                    button: PointerButton::Primary,
                    position: point_from_lparam(lparam),
                });
                LRESULT(0)
            }

            WM_KEYDOWN => {
                match wparam.0 {
                    VK_ESCAPE => Self::dispatch(InputEvent::Key(KeyAction::Cancel)),
                    VK_A => Self::dispatch(InputEvent::Key(KeyAction::CaptureFullDesktop)),
                    _ => {}
                }
                LRESULT(0)
            }

            WM_KILLFOCUS => {
                Self::dispatch(InputEvent::FocusLost);
                LRESULT(0)
            }

            WM_CLOSE => {
                Self::dispatch(InputEvent::Key(KeyAction::Cancel));
                LRESULT(0)
            }

            WM_DESTROY => LRESULT(0),

            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }

    /// Route an event into the session and push the damage to the screen
    fn dispatch(event: InputEvent) {
        OVERLAY_STATE.with(|s| {
            // Re-entrant messages (e.g. focus changes during teardown) are dropped
            let Ok(mut guard) = s.try_borrow_mut() else {
                log::debug!("dropped re-entrant {:?}", event);
                return;
            };
            let Some(state) = guard.as_mut() else {
                return;
            };

            let OverlayState { session, canvas, error } = state;
            match session.handle_event(canvas, event) {
                Ok(damage) => {
                    if let Err(e) = canvas.present(&damage) {
                        log::warn!("overlay repaint failed: {e}");
                    }
                }
                Err(e) => {
                    log::error!("overlay session failed: {e}");
                    *error = Some(e);
                }
            }
        });
    }
}

fn hwnd_from_raw(raw: isize) -> HWND {
    HWND(raw as *mut std::ffi::c_void)
}

fn point_from_lparam(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    Point::new(x, y)
}

/// Copy `rect` of the back buffer to the window as a top-down BGRA DIB
unsafe fn blit(hdc: HDC, pixels: &RgbaImage, rect: Rect) {
    let bounds = Rect::new(0, 0, pixels.width(), pixels.height());
    let Some(clip) = rect.intersection(&bounds) else {
        return;
    };

    let mut bgra = Vec::with_capacity(clip.width as usize * clip.height as usize * 4);
    for y in clip.y as u32..clip.bottom() as u32 {
        for x in clip.x as u32..clip.right() as u32 {
            let [r, g, b, a] = pixels.get_pixel(x, y).0;
            bgra.extend_from_slice(&[b, g, r, a]);
        }
    }

    let bmi = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: clip.width as i32,
            biHeight: -(clip.height as i32), // Top-down
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        bmiColors: [Default::default()],
    };

    SetDIBitsToDevice(
        hdc,
        clip.x,
        clip.y,
        clip.width,
        clip.height,
        0,
        0,
        0,
        clip.height,
        bgra.as_ptr() as *const _,
        &bmi,
        DIB_RGB_COLORS,
    );
}
