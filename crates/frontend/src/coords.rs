use spotguess_shared::transform::ViewRect;
use spotguess_shared::viewport::Key as ViewKey;
use spotguess_shared::Position;
use wasm_bindgen::JsCast;

/// Bounding client rect of an element, as the viewer rect the core expects.
pub fn element_view_rect(element_id: &str) -> Option<ViewRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(element_id)?;
    let rect = element.get_bounding_client_rect();
    Some(ViewRect::new(rect.left(), rect.top(), rect.width(), rect.height()))
}

/// Give keyboard focus to an element so it receives key events.
pub fn focus_element(element_id: &str) -> Option<()> {
    let document = web_sys::window()?.document()?;
    let element = document
        .get_element_by_id(element_id)?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()?;
    element.focus().ok()
}

/// Milliseconds since the epoch, for tap timing.
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// A fresh RNG seed for each page load.
pub fn random_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

/// Map a DOM `KeyboardEvent.key` name to a viewer key. Modifier and
/// unrelated named keys map to `None`.
pub fn key_from_dom(name: &str) -> Option<ViewKey> {
    match name {
        "ArrowUp" => Some(ViewKey::ArrowUp),
        "ArrowDown" => Some(ViewKey::ArrowDown),
        "ArrowLeft" => Some(ViewKey::ArrowLeft),
        "ArrowRight" => Some(ViewKey::ArrowRight),
        "Escape" => Some(ViewKey::Escape),
        "Enter" => Some(ViewKey::Enter),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(ViewKey::Char(c)),
                _ => None,
            }
        }
    }
}

/// The first two touch points, if at least two fingers are down.
pub fn touch_pair(points: &[Position]) -> Option<(Position, Position)> {
    match points {
        [a, b, ..] => Some((*a, *b)),
        _ => None,
    }
}
