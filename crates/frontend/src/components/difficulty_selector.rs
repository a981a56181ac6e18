use dioxus::prelude::*;
use spotguess_shared::Difficulty;

#[component]
pub fn DifficultySelector(selected: Signal<String>) -> Element {
    rsx! {
        div { class: "panel",
            h3 { "Difficulty" }
            select {
                "aria-label": "Select difficulty",
                value: "{selected}",
                onchange: move |evt: Event<FormData>| {
                    selected.set(evt.value().to_string());
                },
                for d in Difficulty::ALL {
                    option {
                        value: d.as_str(),
                        selected: selected.read().eq_ignore_ascii_case(d.as_str()),
                        "{d}"
                    }
                }
            }
        }
    }
}
