//! Coordinate mapping between the map viewer and normalized map space.
//!
//! The map image fills the viewer rect at zoom 1. Zoom scales it about the
//! rect centre, then the pan offset translates it, matching a CSS
//! `translate(pan) scale(zoom)` with the default centred transform origin.

use crate::models::Position;

/// Viewer rectangle in client (page) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn center(&self) -> Position {
        Position {
            x: self.left + self.width / 2.0,
            y: self.top + self.height / 2.0,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Position relative to the rect centre.
    pub fn relative_to_center(&self, client: Position) -> Position {
        let c = self.center();
        Position {
            x: client.x - c.x,
            y: client.y - c.y,
        }
    }
}

/// Convert a client-space pointer position to normalized map coordinates,
/// undoing the live pan/zoom. Result is clamped to `[0, 1]`.
///
/// Returns `None` for an empty rect or non-positive zoom.
pub fn to_normalized(pointer: Position, rect: ViewRect, pan: Position, zoom: f64) -> Option<Position> {
    if rect.is_degenerate() || zoom <= 0.0 {
        return None;
    }
    let center = rect.center();
    let x = (pointer.x - center.x - pan.x) / (rect.width * zoom) + 0.5;
    let y = (pointer.y - center.y - pan.y) / (rect.height * zoom) + 0.5;
    Some(Position {
        x: x.clamp(0.0, 1.0),
        y: y.clamp(0.0, 1.0),
    })
}

/// Convert normalized map coordinates to a client-space pixel position.
pub fn to_screen(normalized: Position, rect: ViewRect, pan: Position, zoom: f64) -> Position {
    let center = rect.center();
    Position {
        x: (normalized.x - 0.5) * rect.width * zoom + center.x + pan.x,
        y: (normalized.y - 0.5) * rect.height * zoom + center.y + pan.y,
    }
}

/// Largest pan offset per axis that keeps the scaled image covering the rect.
pub fn max_offset(rect: ViewRect, zoom: f64) -> Position {
    Position {
        x: ((rect.width * zoom - rect.width) / 2.0).max(0.0),
        y: ((rect.height * zoom - rect.height) / 2.0).max(0.0),
    }
}

/// Clamp a pan offset to `[-max_offset, max_offset]` on each axis.
pub fn clamp_offset(offset: Position, rect: ViewRect, zoom: f64) -> Position {
    let max = max_offset(rect, zoom);
    Position {
        x: offset.x.clamp(-max.x, max.x),
        y: offset.y.clamp(-max.y, max.y),
    }
}

/// New pan offset that keeps the content under `focal` (relative to the rect
/// centre) fixed when zooming from `old_zoom` to `new_zoom`. Not clamped.
pub fn zoom_offset_at_focal(offset: Position, focal: Position, old_zoom: f64, new_zoom: f64) -> Position {
    let ratio = new_zoom / old_zoom;
    Position {
        x: (offset.x - focal.x) * ratio + focal.x,
        y: (offset.y - focal.y) * ratio + focal.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn rect() -> ViewRect {
        ViewRect::new(100.0, 50.0, 600.0, 600.0)
    }

    fn close(a: Position, b: Position) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn test_center_click_at_identity_is_half() {
        let p = to_normalized(Position::new(400.0, 350.0), rect(), Position::ORIGIN, 1.0).unwrap();
        assert!(close(p, Position::new(0.5, 0.5)));
    }

    #[test]
    fn test_top_left_corner_at_identity() {
        let p = to_normalized(Position::new(100.0, 50.0), rect(), Position::ORIGIN, 1.0).unwrap();
        assert!(close(p, Position::new(0.0, 0.0)));
    }

    #[test]
    fn test_zoom_shrinks_visible_area_about_center() {
        // At zoom 2 the rect's left edge shows normalized x = 0.25
        let p = to_normalized(Position::new(100.0, 350.0), rect(), Position::ORIGIN, 2.0).unwrap();
        assert!(close(p, Position::new(0.25, 0.5)));
    }

    #[test]
    fn test_pan_shifts_content() {
        // Panning right by 150px at zoom 2 moves normalized 0.375 under the centre
        let p = to_normalized(Position::new(400.0, 350.0), rect(), Position::new(150.0, 0.0), 2.0)
            .unwrap();
        assert!(close(p, Position::new(0.375, 0.5)));
    }

    #[test]
    fn test_to_normalized_clamps_outside_points() {
        let p = to_normalized(Position::new(-500.0, 2000.0), rect(), Position::ORIGIN, 1.0).unwrap();
        assert!(close(p, Position::new(0.0, 1.0)));
    }

    #[test]
    fn test_to_normalized_rejects_degenerate_rect() {
        let r = ViewRect::new(0.0, 0.0, 0.0, 300.0);
        assert!(to_normalized(Position::ORIGIN, r, Position::ORIGIN, 1.0).is_none());
        assert!(to_normalized(Position::ORIGIN, rect(), Position::ORIGIN, 0.0).is_none());
    }

    #[test]
    fn test_round_trip_over_grid_of_transforms() {
        let rects = [rect(), ViewRect::new(0.0, 0.0, 1024.0, 768.0)];
        let pans = [Position::ORIGIN, Position::new(-120.5, 37.25), Position::new(800.0, -800.0)];
        let zooms = [1.0, 1.7, 3.3, 5.0];
        for r in rects {
            for pan in pans {
                for zoom in zooms {
                    for i in 0..=10 {
                        for j in 0..=10 {
                            let n = Position::new(i as f64 / 10.0, j as f64 / 10.0);
                            let screen = to_screen(n, r, pan, zoom);
                            let back = to_normalized(screen, r, pan, zoom).unwrap();
                            assert!(close(back, n), "{n:?} -> {screen:?} -> {back:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_max_offset_zero_at_min_zoom() {
        let m = max_offset(rect(), 1.0);
        assert!(m.x.abs() < EPS && m.y.abs() < EPS);
        let m = max_offset(rect(), 3.0);
        assert!((m.x - 600.0).abs() < EPS);
    }

    #[test]
    fn test_clamp_offset_per_axis() {
        let o = clamp_offset(Position::new(1000.0, -1000.0), rect(), 2.0);
        assert!(close(o, Position::new(300.0, -300.0)));
        let o = clamp_offset(Position::new(10.0, -20.0), rect(), 2.0);
        assert!(close(o, Position::new(10.0, -20.0)));
    }

    #[test]
    fn test_zoom_offset_keeps_focal_content_fixed() {
        let r = rect();
        let offset = Position::new(40.0, -25.0);
        let cursor = Position::new(550.0, 200.0);
        let before = to_normalized(cursor, r, offset, 2.0).unwrap();
        let focal = r.relative_to_center(cursor);
        let new_offset = zoom_offset_at_focal(offset, focal, 2.0, 3.0);
        let after = to_normalized(cursor, r, new_offset, 3.0).unwrap();
        assert!(close(before, after));
    }
}
