//! Overlay session state machine

use crate::canvas::Canvas;
use crate::config::OverlayConfig;
use crate::geometry::normalize;
use crate::input::{InputEvent, KeyAction, PointerButton};
use crate::render::{IncrementalRenderer, Selection};
use crate::{OverlayError, OverlayResult, Outcome};
use capture::{bitmap, DesktopBounds, Point, Rect, ScreenSource};
use image::RgbaImage;
use log::{debug, info, warn};

/// Where a session stands
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Waiting for the primary button
    Idle,
    /// Primary button held since `start`
    Dragging {
        start: Point,
        last: Point,
        /// Selection currently on the canvas
        shown: Option<Selection>,
    },
    Finished(Outcome),
    /// A capture failed; the error went to the event's caller
    Failed,
}

/// One overlay lifecycle, from showing the overlay to a result or cancellation.
///
/// Positions are window-local; the overlay window sits at the virtual
/// desktop origin and has the desktop's size.
pub struct OverlaySession<S: ScreenSource> {
    config: OverlayConfig,
    screen: S,
    bounds: DesktopBounds,
    renderer: IncrementalRenderer,
    state: SessionState,
}

impl<S: ScreenSource> OverlaySession<S> {
    /// Start a session. Frozen mode captures the whole desktop here, once.
    pub fn start(mut screen: S, config: OverlayConfig) -> OverlayResult<Self> {
        config.validate()?;

        let bounds = screen.desktop_bounds();
        if bounds.width() == 0 || bounds.height() == 0 {
            return Err(OverlayError::EmptyDesktop);
        }

        let renderer = if config.frozen {
            let backdrop = screen.capture_desktop()?;
            IncrementalRenderer::frozen(&config, backdrop)
        } else {
            IncrementalRenderer::live(&config)
        };

        info!(
            "overlay session started ({}x{} at {},{}; {})",
            bounds.width(),
            bounds.height(),
            bounds.left,
            bounds.top,
            if config.frozen { "frozen" } else { "live" }
        );

        Ok(Self {
            config,
            screen,
            bounds,
            renderer,
            state: SessionState::Idle,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn desktop_bounds(&self) -> DesktopBounds {
        self.bounds
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, SessionState::Finished(_) | SessionState::Failed)
    }

    /// Selection currently drawn, if any
    pub fn shown(&self) -> Option<&Selection> {
        match &self.state {
            SessionState::Dragging { shown, .. } => shown.as_ref(),
            _ => None,
        }
    }

    /// Blank canvas of the overlay's size
    pub fn new_canvas(&self) -> RgbaImage {
        RgbaImage::new(self.bounds.width(), self.bounds.height())
    }

    /// Paint the initial overlay: the backdrop, or the background colour
    pub fn paint<C: Canvas>(&self, canvas: &mut C) -> Vec<Rect> {
        self.renderer.paint_background(canvas)
    }

    /// Feed one input event; returns the canvas regions that changed.
    ///
    /// A capture failure is returned here and leaves the session `Failed`.
    pub fn handle_event<C: Canvas>(
        &mut self,
        canvas: &mut C,
        event: InputEvent,
    ) -> OverlayResult<Vec<Rect>> {
        if self.is_done() {
            return Ok(Vec::new());
        }

        let result = match event {
            InputEvent::PointerDown { button: PointerButton::Primary, position } => {
                Ok(self.begin_drag(position))
            }
            InputEvent::PointerDown { button: PointerButton::Secondary, .. } => {
                Ok(self.reset(canvas))
            }
            InputEvent::PointerDown { .. } => Ok(Vec::new()),
            InputEvent::PointerMove { position } => Ok(self.drag_to(canvas, position)),
            InputEvent::PointerUp { button: PointerButton::Primary, position } => {
                self.release(canvas, position)
            }
            InputEvent::PointerUp { .. } => Ok(Vec::new()),
            InputEvent::Key(KeyAction::Cancel) => Ok(self.cancel(canvas)),
            InputEvent::Key(KeyAction::CaptureFullDesktop) => self.capture_full(canvas),
            InputEvent::FocusLost if self.config.debug => {
                debug!("focus lost, ignored in debug mode");
                Ok(Vec::new())
            }
            InputEvent::FocusLost => Ok(self.cancel(canvas)),
        };

        if result.is_err() {
            self.state = SessionState::Failed;
        }
        result
    }

    /// End the session and hand the outcome to the caller.
    ///
    /// An unfinished session counts as cancelled.
    pub fn finish(self) -> OverlayResult<Outcome> {
        match self.state {
            SessionState::Finished(outcome) => {
                info!("overlay session finished (success: {})", outcome.is_success());
                Ok(outcome)
            }
            SessionState::Failed => Err(OverlayError::Aborted),
            SessionState::Idle | SessionState::Dragging { .. } => {
                info!("overlay session closed without a selection");
                Ok(Outcome::Cancelled)
            }
        }
    }

    fn begin_drag(&mut self, position: Point) -> Vec<Rect> {
        if let SessionState::Idle = self.state {
            debug!("drag started at ({}, {})", position.x, position.y);
            self.state = SessionState::Dragging {
                start: position,
                last: position,
                shown: None,
            };
        }
        Vec::new()
    }

    fn drag_to<C: Canvas>(&mut self, canvas: &mut C, position: Point) -> Vec<Rect> {
        let thickness = self.renderer.thickness();
        let SessionState::Dragging { start, last, shown } = &mut self.state else {
            return Vec::new();
        };
        if *last == position {
            return Vec::new();
        }

        let next = Selection::from_points(*start, position, thickness);
        let damage = self.renderer.redraw(canvas, shown.as_ref(), &next);
        *last = position;
        *shown = Some(next);
        damage
    }

    /// Erase whatever is drawn and go back to idle
    fn reset<C: Canvas>(&mut self, canvas: &mut C) -> Vec<Rect> {
        let damage = self.erase_shown(canvas);
        if !matches!(self.state, SessionState::Idle) {
            debug!("selection reset");
        }
        self.state = SessionState::Idle;
        damage
    }

    fn cancel<C: Canvas>(&mut self, canvas: &mut C) -> Vec<Rect> {
        let damage = self.erase_shown(canvas);
        info!("overlay session cancelled");
        self.state = SessionState::Finished(Outcome::Cancelled);
        damage
    }

    fn release<C: Canvas>(&mut self, canvas: &mut C, position: Point) -> OverlayResult<Vec<Rect>> {
        let SessionState::Dragging { start, .. } = self.state else {
            // release without a press
            return Ok(Vec::new());
        };

        let damage = self.erase_shown(canvas);
        let local = Rect::new(0, 0, self.bounds.width(), self.bounds.height());
        let rect = normalize(start, position);

        let Some(rect) = rect.intersection(&local) else {
            debug!("empty selection {:?} ignored", rect);
            self.state = SessionState::Idle;
            return Ok(damage);
        };

        let image = match self.renderer.backdrop() {
            Some(backdrop) => bitmap::crop(backdrop, rect),
            None => {
                // the outline must be gone from the screen before reading it back
                canvas.present(&damage)?;
                self.screen.capture(self.bounds.local_to_desktop(rect))?
            }
        };

        info!("captured region {}x{} at ({}, {})", rect.width, rect.height, rect.x, rect.y);
        self.state = SessionState::Finished(Outcome::Captured(image));
        Ok(damage)
    }

    fn capture_full<C: Canvas>(&mut self, canvas: &mut C) -> OverlayResult<Vec<Rect>> {
        let shown = self.shown().copied();
        let keep = self.config.keep_selection_on_full_capture;

        let mut damage = Vec::new();
        if !keep {
            damage = self.erase_shown(canvas);
            if !self.renderer.is_frozen() && !damage.is_empty() {
                canvas.present(&damage)?;
            }
        }

        let mut image = match self.renderer.take_backdrop() {
            Some(backdrop) => backdrop,
            None => self.screen.capture_desktop()?,
        };

        if keep {
            if let Some(selection) = &shown {
                self.renderer.stamp(&mut image, selection);
            }
        }

        if image.dimensions() != (self.bounds.width(), self.bounds.height()) {
            warn!(
                "desktop capture is {}x{}, expected {}x{}",
                image.width(),
                image.height(),
                self.bounds.width(),
                self.bounds.height()
            );
        }

        info!("captured full desktop {}x{}", image.width(), image.height());
        self.state = SessionState::Finished(Outcome::Captured(image));
        Ok(damage)
    }

    fn erase_shown<C: Canvas>(&mut self, canvas: &mut C) -> Vec<Rect> {
        let SessionState::Dragging { shown, .. } = &mut self.state else {
            return Vec::new();
        };
        match shown.take() {
            Some(selection) => self.renderer.erase(canvas, &selection),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::StaticScreen;
    use image::Rgba;

    fn desktop() -> RgbaImage {
        RgbaImage::from_fn(200, 150, |x, y| Rgba([x as u8, y as u8, (x + y) as u8, 255]))
    }

    fn session() -> OverlaySession<StaticScreen> {
        OverlaySession::start(StaticScreen::new(desktop()), OverlayConfig::default()).unwrap()
    }

    fn down(x: i32, y: i32) -> InputEvent {
        InputEvent::PointerDown {
            button: PointerButton::Primary,
            position: Point::new(x, y),
        }
    }

    fn mv(x: i32, y: i32) -> InputEvent {
        InputEvent::PointerMove { position: Point::new(x, y) }
    }

    fn up(x: i32, y: i32) -> InputEvent {
        InputEvent::PointerUp {
            button: PointerButton::Primary,
            position: Point::new(x, y),
        }
    }

    #[test]
    fn press_records_start_without_drawing() {
        let mut session = session();
        let mut canvas = session.new_canvas();
        session.paint(&mut canvas);

        let damage = session.handle_event(&mut canvas, down(10, 20)).unwrap();
        assert!(damage.is_empty());
        assert_eq!(
            session.state(),
            &SessionState::Dragging {
                start: Point::new(10, 20),
                last: Point::new(10, 20),
                shown: None,
            }
        );
        assert_eq!(canvas, desktop());
    }

    #[test]
    fn redundant_move_is_skipped() {
        let mut session = session();
        let mut canvas = session.new_canvas();
        session.paint(&mut canvas);

        session.handle_event(&mut canvas, down(10, 10)).unwrap();
        assert!(session.handle_event(&mut canvas, mv(10, 10)).unwrap().is_empty());
        assert!(!session.handle_event(&mut canvas, mv(50, 40)).unwrap().is_empty());
        assert!(session.handle_event(&mut canvas, mv(50, 40)).unwrap().is_empty());
        assert_eq!(session.shown().map(|s| s.rect), Some(Rect::new(10, 10, 40, 30)));
    }

    #[test]
    fn other_buttons_leave_the_drag_alone() {
        let mut session = session();
        let mut canvas = session.new_canvas();
        session.paint(&mut canvas);

        session.handle_event(&mut canvas, down(10, 10)).unwrap();
        session.handle_event(&mut canvas, mv(60, 50)).unwrap();
        let before = session.state().clone();
        let drawn = canvas.clone();

        let middle = Point::new(60, 50);
        for event in [
            InputEvent::PointerDown { button: PointerButton::Other, position: middle },
            InputEvent::PointerUp { button: PointerButton::Other, position: middle },
            InputEvent::PointerUp { button: PointerButton::Secondary, position: middle },
        ] {
            assert!(session.handle_event(&mut canvas, event).unwrap().is_empty());
        }
        assert_eq!(session.state(), &before);
        assert_eq!(canvas, drawn);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut session = session();
        let mut canvas = session.new_canvas();

        assert!(session.handle_event(&mut canvas, up(30, 30)).unwrap().is_empty());
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn zero_area_release_returns_to_idle() {
        let mut session = session();
        let mut canvas = session.new_canvas();

        session.handle_event(&mut canvas, down(100, 100)).unwrap();
        session.handle_event(&mut canvas, up(100, 100)).unwrap();
        assert_eq!(session.state(), &SessionState::Idle);

        session.handle_event(&mut canvas, down(100, 100)).unwrap();
        session.handle_event(&mut canvas, mv(140, 100)).unwrap();
        session.handle_event(&mut canvas, up(140, 100)).unwrap();
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.finish().unwrap(), Outcome::Cancelled);
    }

    #[test]
    fn events_after_finish_are_ignored() {
        let mut session = session();
        let mut canvas = session.new_canvas();

        session.handle_event(&mut canvas, InputEvent::Key(KeyAction::Cancel)).unwrap();
        assert!(session.is_done());
        assert!(session.handle_event(&mut canvas, down(1, 1)).unwrap().is_empty());
        assert_eq!(session.state(), &SessionState::Finished(Outcome::Cancelled));
    }

    #[test]
    fn invalid_config_refuses_to_start() {
        let mut config = OverlayConfig::default();
        config.border.thickness = 0;
        let err = OverlaySession::start(StaticScreen::new(desktop()), config).err();
        assert!(matches!(err, Some(OverlayError::InvalidConfig(_))));
    }

    #[test]
    fn empty_desktop_refuses_to_start() {
        let screen = StaticScreen::new(RgbaImage::new(0, 0));
        let err = OverlaySession::start(screen, OverlayConfig::default()).err();
        assert!(matches!(err, Some(OverlayError::EmptyDesktop)));
    }
}
