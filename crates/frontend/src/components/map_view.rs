use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use spotguess_shared::viewport::{DragState, ViewportMode};
use spotguess_shared::{GameSession, Position};

use crate::coords;

pub const MAP_CONTAINER_ID: &str = "guess-map-container";

/// Touch movement below this (px) still counts as a tap.
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

/// Overlay coordinate space: normalized positions scaled to this many units.
const OVERLAY_UNITS: f64 = 1000.0;

const GUESS_COLOR: &str = "#f5c542";
const TRUTH_COLOR: &str = "#4fd18b";
const LINE_COLOR: &str = "rgba(255,255,255,0.85)";

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

/// Refresh the viewport's bounds from the live container rect.
pub fn sync_bounds(session: &mut Signal<GameSession>) {
    let Some(rect) = coords::element_view_rect(MAP_CONTAINER_ID) else {
        return;
    };
    if session.peek().viewport().bounds() != rect {
        session.write().viewport_mut().set_bounds(rect);
    }
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

fn point_distance(a: Position, b: Position) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

fn touch_points(evt: &Event<TouchData>) -> Vec<Position> {
    evt.data()
        .touches()
        .iter()
        .map(|t| {
            let c = t.client_coordinates();
            Position::new(c.x, c.y)
        })
        .collect()
}

fn container_class(mode: ViewportMode) -> &'static str {
    match mode {
        ViewportMode::Idle => "map-container",
        ViewportMode::Dragging => "map-container dragging",
        ViewportMode::FullscreenIdle => "map-container fullscreen",
        ViewportMode::FullscreenDragging => "map-container fullscreen dragging",
    }
}

// ---------------------------------------------------------------------------
// SVG builder
// ---------------------------------------------------------------------------

/// What the overlay should draw for the current round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayState {
    pub guess: Option<Position>,
    /// Only known once the guess is validated.
    pub truth: Option<Position>,
    pub distance_meters: Option<f64>,
}

pub fn format_distance(meters: f64) -> String {
    format!("{:.1} m", meters)
}

/// Build the overlay SVG. `units_per_px` keeps markers a constant on-screen
/// size whatever the container width and zoom.
fn build_overlay_svg(state: &OverlayState, units_per_px: f64) -> String {
    let mut svg = String::with_capacity(1024);
    let to_units = |p: Position| (p.x * OVERLAY_UNITS, p.y * OVERLAY_UNITS);

    if let (Some(truth), Some(guess)) = (state.truth, state.guess) {
        let (tx, ty) = to_units(truth);
        let (gx, gy) = to_units(guess);
        let sw = 3.0 * units_per_px;
        let dash = 8.0 * units_per_px;
        svg.push_str(&format!(
            r#"<line x1="{tx}" y1="{ty}" x2="{gx}" y2="{gy}" stroke="{LINE_COLOR}" stroke-width="{sw}" stroke-dasharray="{dash} {dash}"/>"#
        ));
        if let Some(d) = state.distance_meters {
            let fs = 16.0 * units_per_px;
            let tsw = 4.0 * units_per_px;
            let label = format_distance(d);
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" fill="white" font-size="{fs}" font-family="sans-serif" font-weight="700" text-anchor="middle" stroke="rgba(0,0,0,0.7)" stroke-width="{tsw}" paint-order="stroke">{label}</text>"#,
                (tx + gx) / 2.0,
                (ty + gy) / 2.0 - 10.0 * units_per_px,
            ));
        }
        let r = 9.0 * units_per_px;
        let sw = 2.5 * units_per_px;
        svg.push_str(&format!(
            r#"<g role="img"><title>Answer</title><circle cx="{tx}" cy="{ty}" r="{r}" fill="{TRUTH_COLOR}" stroke="white" stroke-width="{sw}"/></g>"#
        ));
    }

    if let Some(guess) = state.guess {
        let (gx, gy) = to_units(guess);
        let r = 8.0 * units_per_px;
        let ring = 16.0 * units_per_px;
        let sw = 2.5 * units_per_px;
        svg.push_str(&format!(
            r#"<g role="img"><title>Your guess</title><circle cx="{gx}" cy="{gy}" r="{ring}" fill="none" stroke="{GUESS_COLOR}" stroke-width="{sw}" stroke-opacity="0.6"/><circle cx="{gx}" cy="{gy}" r="{r}" fill="{GUESS_COLOR}" stroke="white" stroke-width="{sw}"/></g>"#
        ));
    }

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {OVERLAY_UNITS} {OVERLAY_UNITS}" preserveAspectRatio="none" style="position:absolute;top:0;left:0;width:100%;height:100%;pointer-events:none;">{svg}</svg>"#
    )
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Zoomable, pannable map the player double-clicks (or double-taps) to guess.
#[component]
pub fn MapView(session: Signal<GameSession>) -> Element {
    let mut session = session;

    // Touch tap tracking
    let mut touch_start_pos = use_signal(|| None::<Position>);
    let mut touch_did_pan = use_signal(|| false);

    let (transform_style, class, map_src, overlay) = {
        let s = session.read();
        let vp = s.viewport();
        let offset = vp.offset();
        let zoom = vp.zoom();
        let resolved = s.round_state().valid_guess();
        let state = OverlayState {
            guess: s.guess(),
            truth: if resolved {
                s.active_target().map(|t| t.location)
            } else {
                None
            },
            distance_meters: if resolved { s.current_distance() } else { None },
        };
        let width = vp.bounds().width;
        let units_per_px = if width > 0.0 {
            OVERLAY_UNITS / (width * zoom)
        } else {
            1.0
        };
        (
            format!(
                "transform: translate({}px, {}px) scale({});",
                offset.x, offset.y, zoom
            ),
            container_class(vp.mode()),
            s.map_image_path().unwrap_or_default().to_string(),
            build_overlay_svg(&state, units_per_px),
        )
    };

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{class}",

            onmounted: move |_| sync_bounds(&mut session),

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                sync_bounds(&mut session);
                let client = evt.data().client_coordinates();
                let delta_y = wheel_delta_y(evt.data().delta());
                session
                    .write()
                    .viewport_mut()
                    .wheel(Position::new(client.x, client.y), delta_y);
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                sync_bounds(&mut session);
                let client = evt.client_coordinates();
                session
                    .write()
                    .viewport_mut()
                    .pointer_down(Position::new(client.x, client.y));
            },

            onmousemove: move |evt: Event<MouseData>| {
                if session.peek().viewport().drag_state() == DragState::Idle {
                    return;
                }
                let client = evt.client_coordinates();
                session
                    .write()
                    .viewport_mut()
                    .pointer_move(Position::new(client.x, client.y));
            },

            onmouseup: move |_| {
                if session.peek().viewport().drag_state() != DragState::Idle {
                    session.write().viewport_mut().pointer_up();
                }
            },

            onmouseleave: move |_| {
                if session.peek().viewport().drag_state() != DragState::Idle {
                    session.write().viewport_mut().pointer_leave();
                }
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                sync_bounds(&mut session);
                let client = evt.client_coordinates();
                session.write().double_click(Position::new(client.x, client.y));
            },

            // --- Touch event handlers ---

            ontouchstart: move |evt: Event<TouchData>| {
                evt.prevent_default();
                sync_bounds(&mut session);
                let points = touch_points(&evt);
                if let Some((p0, p1)) = coords::touch_pair(&points) {
                    session.write().viewport_mut().pinch_start(p0, p1);
                    touch_start_pos.set(None);
                    touch_did_pan.set(true);
                } else if let Some(&p) = points.first() {
                    session.write().viewport_mut().pointer_down(p);
                    touch_start_pos.set(Some(p));
                    touch_did_pan.set(false);
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let points = touch_points(&evt);
                let pinching = session.peek().viewport().is_pinching();
                if pinching {
                    if let Some((p0, p1)) = coords::touch_pair(&points) {
                        session.write().viewport_mut().pinch_move(p0, p1);
                    }
                } else if let [p] = points.as_slice() {
                    if let Some(start) = *touch_start_pos.peek() {
                        if !*touch_did_pan.peek() && point_distance(start, *p) > TOUCH_DRAG_THRESHOLD {
                            touch_did_pan.set(true);
                        }
                    }
                    session.write().viewport_mut().pointer_move(*p);
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let remaining = evt.data().touches().len();
                if remaining > 0 {
                    return;
                }
                if session.peek().viewport().is_pinching() {
                    // Wait for all fingers to lift before ending the pinch
                    session.write().viewport_mut().pinch_end();
                    touch_start_pos.set(None);
                    return;
                }
                session.write().viewport_mut().pointer_up();
                if !*touch_did_pan.peek() {
                    if let Some(start) = *touch_start_pos.peek() {
                        session.write().double_tap(start, coords::now_ms());
                    }
                }
                touch_start_pos.set(None);
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                let mut s = session.write();
                s.viewport_mut().pinch_end();
                s.viewport_mut().pointer_leave();
                touch_start_pos.set(None);
                touch_did_pan.set(false);
            },

            // Inner wrapper: the CSS transform applies zoom/pan to map + overlay together
            div {
                class: "map-inner",
                style: "{transform_style}",

                img { src: "{map_src}", draggable: "false" }

                div {
                    dangerous_inner_html: "{overlay}",
                    style: "position:absolute;top:0;left:0;width:100%;height:100%;pointer-events:none;",
                }
            }
        }
    }
}
