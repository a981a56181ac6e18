use std::collections::BTreeSet;

use dioxus::prelude::*;
use spotguess_shared::models::Region;
use spotguess_shared::{GameSession, GameSettings, Phase};

use crate::api;
use crate::components::difficulty_selector::DifficultySelector;
use crate::components::region_selector::RegionSelector;
use crate::pages::game::begin_load;
use crate::Route;

const MIN_ROUNDS: u32 = 1;
const MAX_ROUNDS: u32 = 20;
const DEFAULT_ROUNDS: u32 = 5;

/// Settings of the most recent game, kept across `back_to_menu`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LastSettings(pub Option<GameSettings>);

/// Initial form values: the previous game's settings, or the defaults.
fn form_defaults(previous: Option<&GameSettings>) -> (String, BTreeSet<String>, u32) {
    match previous {
        Some(s) => (
            s.difficulty.as_str().to_string(),
            s.selected_regions.clone(),
            s.num_rounds,
        ),
        None => ("easy".to_string(), BTreeSet::new(), DEFAULT_ROUNDS),
    }
}

#[component]
pub fn Menu() -> Element {
    let mut session = use_context::<Signal<GameSession>>();
    let mut last_settings = use_context::<Signal<LastSettings>>();
    let nav = use_navigator();

    let regions_resource = use_resource(|| api::fetch_regions());

    // Form state, prefilled from the previous game when there is one
    let (initial_difficulty, initial_regions, initial_rounds) =
        form_defaults(last_settings.peek().0.as_ref());
    let difficulty = use_signal(|| initial_difficulty);
    let selected_regions = use_signal(|| initial_regions);
    let mut num_rounds = use_signal(|| initial_rounds);
    let mut form_error = use_signal(|| None::<String>);

    let (regions, regions_error): (Vec<Region>, Option<String>) = match &*regions_resource.read() {
        Some(Ok(r)) => (r.clone(), None),
        Some(Err(e)) => (vec![], Some(e.clone())),
        None => (vec![], None),
    };
    let rounds = *num_rounds.read();

    rsx! {
        div { class: "app menu",
            div { class: "header",
                h1 { "Spot Guess" }
                p { class: "tagline", "Where was this screenshot taken?" }
            }

            div { class: "sidebar",
                if let Some(e) = regions_error {
                    div { class: "panel error", "Could not load maps: {e}" }
                }

                RegionSelector { regions: regions, selected: selected_regions }

                DifficultySelector { selected: difficulty }

                div { class: "panel",
                    h3 { "Rounds" }
                    div { class: "strength-row",
                        input {
                            r#type: "range",
                            min: "{MIN_ROUNDS}",
                            max: "{MAX_ROUNDS}",
                            value: "{rounds}",
                            onchange: move |evt: Event<FormData>| {
                                if let Ok(v) = evt.value().parse::<u32>() {
                                    num_rounds.set(v);
                                }
                            },
                        }
                        span { class: "value", "{rounds}" }
                    }
                }

                if let Some(e) = form_error.read().clone() {
                    div { class: "panel error", "{e}" }
                }

                button {
                    class: "primary start-game",
                    onclick: move |_| {
                        let settings = match GameSettings::parse(
                            &difficulty.read(),
                            selected_regions.read().iter().cloned(),
                            *num_rounds.read(),
                        ) {
                            Ok(s) => s,
                            Err(e) => {
                                form_error.set(Some(e.to_string()));
                                return;
                            }
                        };
                        let request = {
                            let mut s = session.write();
                            if !matches!(s.phase(), Phase::NotStarted | Phase::LoadFailed(_)) {
                                s.back_to_menu();
                            }
                            s.start_game(settings.clone())
                        };
                        match request {
                            Ok(request) => {
                                form_error.set(None);
                                last_settings.set(LastSettings(Some(settings)));
                                begin_load(session, request);
                                nav.push(Route::Game {});
                            }
                            Err(e) => form_error.set(Some(e.to_string())),
                        }
                    },
                    "Start game"
                }
            }
        }
    }
}
