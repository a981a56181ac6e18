use dioxus::prelude::*;
use spotguess_shared::ScoringConfig;

#[component]
pub fn HelpOverlay(show: Signal<bool>, scoring: ScoringConfig) -> Element {
    if !*show.read() {
        return rsx! {};
    }

    let max_score = scoring.max_score;
    let max_distance = scoring.max_distance;

    rsx! {
        div {
            class: "help-overlay-backdrop",
            onclick: move |_| show.set(false),

            div {
                class: "help-overlay",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                h2 { "Help" }

                // --- Keyboard shortcuts ---

                div { class: "shortcut-section",
                    h3 { "Map" }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "\u{2191}" } " / " kbd { "\u{2193}" } }
                        span { "Zoom in / out" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "\u{2190}" } " / " kbd { "\u{2192}" } }
                        span { "Pan left / right" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "R" } }
                        span { "Reset zoom & pan" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "F" } }
                        span { "Toggle fullscreen map" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "Esc" } }
                        span { "Leave fullscreen" }
                    }
                }

                div { class: "shortcut-section",
                    h3 { "Guessing" }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "Enter" } }
                        span { "Confirm your guess" }
                    }
                    div { class: "shortcut-row",
                        span { class: "shortcut-keys", kbd { "H" } " / " kbd { "?" } }
                        span { "Toggle this help" }
                    }
                }

                div { class: "help-divider" }

                h2 { class: "help-section-title", "How Scoring Works" }

                div { class: "help-info-section",
                    h3 { "Placing a guess" }
                    p { "Double-click the map (or double-tap on touch screens) where you think the screenshot was taken. You can move your guess as often as you like until you confirm it." }
                }

                div { class: "help-info-section",
                    h3 { "Points" }
                    p { "A perfect guess scores {max_score}. Points fall off linearly with distance and reach zero at {max_distance} m or more." }
                }

                div { class: "help-info-section",
                    h3 { "Map Interactions" }
                    p { "Scroll or pinch to zoom, drag to pan." }
                }

                button {
                    class: "close-help",
                    onclick: move |_| show.set(false),
                    "Close"
                }
            }
        }
    }
}
