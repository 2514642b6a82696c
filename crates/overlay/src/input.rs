//! Input events fed to an overlay session

use capture::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    /// Resets the selection
    Secondary,
    /// Middle or extra buttons, ignored by the session
    Other,
}

/// Keyboard shortcuts understood by the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Cancel,
    CaptureFullDesktop,
}

/// Window-local input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerDown { button: PointerButton, position: Point },
    PointerMove { position: Point },
    PointerUp { button: PointerButton, position: Point },
    Key(KeyAction),
    FocusLost,
}
