use tracing::debug;

use crate::calc::distance;
use crate::config::ViewportConfig;
use crate::models::Position;
use crate::transform::{self, ViewRect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// `anchor` is the last pointer position seen while dragging.
    Dragging { anchor: Position },
}

/// Combined drag/fullscreen state, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportMode {
    Idle,
    Dragging,
    FullscreenIdle,
    FullscreenDragging,
}

/// Keys the map viewer reacts to while focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Enter,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Handled,
    /// The key asks for the current guess to be validated. The viewport
    /// cannot do that itself; the game session decides.
    ValidateGuess,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchState {
    start_distance: f64,
    start_zoom: f64,
    start_offset: Position,
    midpoint: Position,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tap {
    at: Position,
    time_ms: f64,
}

/// Pan/zoom/fullscreen state of the interactive map.
///
/// All pointer positions are client (page) pixels; `bounds` must be kept in
/// sync with the viewer element through [`Viewport::set_bounds`].
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    config: ViewportConfig,
    bounds: ViewRect,
    zoom: f64,
    offset: Position,
    fullscreen: bool,
    drag: DragState,
    pinch: Option<PinchState>,
    last_tap: Option<Tap>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            bounds: ViewRect::default(),
            zoom: config.min_zoom,
            offset: Position::ORIGIN,
            fullscreen: false,
            drag: DragState::Idle,
            pinch: None,
            last_tap: None,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Position {
        self.offset
    }

    pub fn bounds(&self) -> ViewRect {
        self.bounds
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn mode(&self) -> ViewportMode {
        match (self.fullscreen, self.drag) {
            (false, DragState::Idle) => ViewportMode::Idle,
            (false, DragState::Dragging { .. }) => ViewportMode::Dragging,
            (true, DragState::Idle) => ViewportMode::FullscreenIdle,
            (true, DragState::Dragging { .. }) => ViewportMode::FullscreenDragging,
        }
    }

    /// Update the viewer rect (layout change, fullscreen, resize) and re-clamp.
    pub fn set_bounds(&mut self, bounds: ViewRect) {
        self.bounds = bounds;
        self.offset = transform::clamp_offset(self.offset, bounds, self.zoom);
    }

    // --- Pointer drag ---

    pub fn pointer_down(&mut self, client: Position) {
        self.drag = DragState::Dragging { anchor: client };
    }

    /// Pan by the pointer delta while dragging. Returns whether the offset moved.
    pub fn pointer_move(&mut self, client: Position) -> bool {
        let DragState::Dragging { anchor } = self.drag else {
            return false;
        };
        let before = self.offset;
        let moved = Position {
            x: self.offset.x + (client.x - anchor.x),
            y: self.offset.y + (client.y - anchor.y),
        };
        self.offset = transform::clamp_offset(moved, self.bounds, self.zoom);
        self.drag = DragState::Dragging { anchor: client };
        self.offset != before
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.drag = DragState::Idle;
    }

    // --- Zoom ---

    /// Step the zoom by one wheel notch about the cursor. Negative `delta_y`
    /// (scrolling up) zooms in. Returns whether anything changed.
    pub fn wheel(&mut self, client: Position, delta_y: f64) -> bool {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        let target = self.zoom - delta_y.signum() * self.config.wheel_zoom_step;
        let focal = self.bounds.relative_to_center(client);
        self.zoom_about(focal, self.offset, self.zoom, target)
    }

    pub fn pinch_start(&mut self, p0: Position, p1: Position) {
        self.drag = DragState::Idle;
        self.last_tap = None;
        self.pinch = Some(PinchState {
            start_distance: distance(p0, p1),
            start_zoom: self.zoom,
            start_offset: self.offset,
            midpoint: Position::new((p0.x + p1.x) / 2.0, (p0.y + p1.y) / 2.0),
        });
    }

    /// Scale the pinch-start zoom by the finger distance ratio, about the
    /// pinch-start midpoint.
    pub fn pinch_move(&mut self, p0: Position, p1: Position) -> bool {
        let Some(pinch) = self.pinch else {
            return false;
        };
        if pinch.start_distance < 1.0 {
            return false;
        }
        let target = pinch.start_zoom * distance(p0, p1) / pinch.start_distance;
        let focal = self.bounds.relative_to_center(pinch.midpoint);
        self.zoom_about(focal, pinch.start_offset, pinch.start_zoom, target)
    }

    pub fn pinch_end(&mut self) {
        self.pinch = None;
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    // f64::clamp panics when min > max
    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.min(self.config.max_zoom).max(self.config.min_zoom)
    }

    fn zoom_about(&mut self, focal: Position, base_offset: Position, base_zoom: f64, target: f64) -> bool {
        let new_zoom = self.clamp_zoom(target);
        if (new_zoom - self.zoom).abs() < 1e-9 && base_offset == self.offset {
            return false;
        }
        let offset = transform::zoom_offset_at_focal(base_offset, focal, base_zoom, new_zoom);
        self.offset = transform::clamp_offset(offset, self.bounds, new_zoom);
        self.zoom = new_zoom;
        true
    }

    // --- Commands ---

    pub fn reset(&mut self) {
        self.zoom = self.config.min_zoom;
        self.offset = Position::ORIGIN;
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        self.reset();
        debug!(fullscreen = self.fullscreen, "Toggled fullscreen");
    }

    /// Leave fullscreen if active. Returns whether it was active.
    pub fn exit_fullscreen(&mut self) -> bool {
        if !self.fullscreen {
            return false;
        }
        self.toggle_fullscreen();
        true
    }

    /// Apply a keyboard binding.
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        match key {
            Key::Escape => {
                if self.exit_fullscreen() {
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::Ignored
                }
            }
            Key::Char('r') | Key::Char('R') => {
                self.reset();
                KeyOutcome::Handled
            }
            Key::Char('f') | Key::Char('F') => {
                self.toggle_fullscreen();
                KeyOutcome::Handled
            }
            Key::ArrowUp => {
                let target = self.zoom + self.config.key_zoom_step;
                self.zoom_about(Position::ORIGIN, self.offset, self.zoom, target);
                KeyOutcome::Handled
            }
            Key::ArrowDown => {
                let target = self.zoom - self.config.key_zoom_step;
                self.zoom_about(Position::ORIGIN, self.offset, self.zoom, target);
                KeyOutcome::Handled
            }
            Key::ArrowLeft => {
                self.nudge(-self.config.key_pan_step);
                KeyOutcome::Handled
            }
            Key::ArrowRight => {
                self.nudge(self.config.key_pan_step);
                KeyOutcome::Handled
            }
            Key::Enter => KeyOutcome::ValidateGuess,
            Key::Char(_) => KeyOutcome::Ignored,
        }
    }

    fn nudge(&mut self, dx: f64) {
        let moved = Position {
            x: self.offset.x + dx,
            y: self.offset.y,
        };
        self.offset = transform::clamp_offset(moved, self.bounds, self.zoom);
    }

    // --- Coordinate mapping ---

    /// Map a client position to normalized map space using the live pan/zoom.
    pub fn pointer_to_normalized(&self, client: Position) -> Option<Position> {
        transform::to_normalized(client, self.bounds, self.offset, self.zoom)
    }

    /// Record a single-finger tap. Returns `true` when it completes a double
    /// tap (two taps close in time and space); the pair is then consumed.
    pub fn register_tap(&mut self, client: Position, time_ms: f64) -> bool {
        if let Some(prev) = self.last_tap {
            let quick = time_ms - prev.time_ms <= self.config.double_tap_ms;
            let near = distance(prev.at, client) <= self.config.double_tap_slop;
            if quick && near {
                self.last_tap = None;
                return true;
            }
        }
        self.last_tap = Some(Tap { at: client, time_ms });
        false
    }
}
