use dioxus::prelude::*;
use dioxus::core::spawn_forever;
use spotguess_shared::game::{LoadOutcome, LoadRequest};
use spotguess_shared::viewport::KeyOutcome;
use spotguess_shared::{GameSession, Phase};

use crate::api;
use crate::components::help_overlay::HelpOverlay;
use crate::components::map_view::{self, format_distance, MapView};
use crate::components::results::{GameSummaryView, RoundResultPanel};
use crate::coords;
use crate::Route;

const GAME_ROOT_ID: &str = "game-root";

/// Fetch the requested datasets and hand them to the session. The task is
/// rooted at the app so it survives leaving the menu; a result that arrives
/// after the player backs out is discarded by the session.
pub fn begin_load(mut session: Signal<GameSession>, request: LoadRequest) {
    spawn_forever(async move {
        let result = api::fetch_datasets(&request.regions).await;
        match session.write().complete_load(request.ticket, result) {
            Ok(LoadOutcome::Started) => tracing::info!("Game loaded"),
            Ok(LoadOutcome::Discarded) => tracing::debug!("Stale load discarded"),
            Err(e) => tracing::warn!(error = %e, "Game failed to load"),
        }
    });
}

#[component]
pub fn Game() -> Element {
    let mut session = use_context::<Signal<GameSession>>();
    let nav = use_navigator();
    let mut show_help = use_signal(|| false);

    let mut go_to_menu = move || {
        session.write().back_to_menu();
        nav.push(Route::Menu {});
    };

    let phase = session.read().phase().clone();
    match phase {
        Phase::NotStarted => rsx! {
            div { class: "app status",
                p { "No game in progress." }
                Link { to: Route::Menu {}, "Back to menu" }
            }
        },
        Phase::Loading => rsx! {
            div { class: "app status",
                div { class: "spinner" }
                p { "Loading maps\u{2026}" }
                button { onclick: move |_| go_to_menu(), "Cancel" }
            }
        },
        Phase::LoadFailed(err) => rsx! {
            div { class: "app status",
                div { class: "panel error", "Could not start the game: {err}" }
                button {
                    class: "primary",
                    onclick: move |_| {
                        let Some(settings) = session.peek().settings().cloned() else {
                            return;
                        };
                        let request = session.write().start_game(settings);
                        match request {
                            Ok(request) => begin_load(session, request),
                            Err(e) => tracing::warn!(error = %e, "Retry rejected"),
                        }
                    },
                    "Retry"
                }
                button { onclick: move |_| go_to_menu(), "Back to menu" }
            }
        },
        Phase::GameOver => {
            let Some(summary) = session.read().summary() else {
                return rsx! {};
            };
            rsx! {
                div { class: "app status",
                    GameSummaryView {
                        summary: summary,
                        on_restart: move |_| {
                            if let Err(e) = session.write().restart() {
                                tracing::warn!(error = %e, "Restart failed");
                            }
                        },
                        on_menu: move |_| go_to_menu(),
                    }
                }
            }
        }
        Phase::InRound | Phase::RoundResolved => {
            let s = session.read();
            let rs = s.round_state();
            let round = rs.round();
            let total_score = rs.total_score();
            let num_rounds = s.settings().map_or(0, |st| st.num_rounds);
            let image = s.image_path().unwrap_or_default();
            let callout = s
                .active_target()
                .map(|t| t.callout_name.clone())
                .unwrap_or_default();
            let last_result = s.history().last().cloned();
            let can_validate = rs.have_guessed() && !rs.valid_guess();
            let resolved = rs.valid_guess();
            let scoring = s.config().scoring;
            let distance_label = s.current_distance().map(format_distance);
            drop(s);

            rsx! {
                div {
                    id: GAME_ROOT_ID,
                    class: "app game",
                    tabindex: "0",
                    onmounted: move |_| {
                        coords::focus_element(GAME_ROOT_ID);
                    },
                    onkeydown: move |evt: Event<KeyboardData>| {
                        let name = evt.key().to_string();
                        if name == "h" || name == "H" || name == "?" {
                            let shown = *show_help.peek();
                            show_help.set(!shown);
                            return;
                        }
                        if name == "Escape" && *show_help.peek() {
                            show_help.set(false);
                            return;
                        }
                        let Some(key) = coords::key_from_dom(&name) else {
                            return;
                        };
                        map_view::sync_bounds(&mut session);
                        if session.write().handle_key(key) != KeyOutcome::Ignored {
                            evt.prevent_default();
                        }
                    },

                    div { class: "header",
                        h1 { "Round {round} / {num_rounds}" }
                        div { class: "score-readout", "Score: {total_score}" }
                        div { class: "header-actions",
                            button { onclick: move |_| show_help.set(true), "Help" }
                            button {
                                onclick: move |_| {
                                    if let Err(e) = session.write().restart() {
                                        tracing::warn!(error = %e, "Restart failed");
                                    }
                                },
                                "Restart"
                            }
                            button { onclick: move |_| go_to_menu(), "Menu" }
                        }
                    }

                    div { class: "sidebar",
                        div { class: "panel screenshot",
                            img { src: "{image}", alt: "Where is this?", draggable: "false" }
                        }

                        if resolved {
                            if let Some(result) = last_result {
                                RoundResultPanel {
                                    score: result.score,
                                    distance_meters: result.distance_meters,
                                    callout: callout,
                                    is_last_round: round >= num_rounds,
                                    on_next: move |_| {
                                        if let Err(e) = session.write().next_round() {
                                            tracing::warn!(error = %e, "Could not advance round");
                                        }
                                    },
                                }
                            }
                        } else {
                            div { class: "panel",
                                p {
                                    if can_validate {
                                        "Guess placed. Double-click again to move it."
                                    } else {
                                        "Double-click the map where you think this is."
                                    }
                                }
                                button {
                                    class: "primary",
                                    disabled: !can_validate,
                                    onclick: move |_| {
                                        if let Err(e) = session.write().validate_guess() {
                                            tracing::warn!(error = %e, "Validation rejected");
                                        }
                                    },
                                    "Confirm guess"
                                }
                            }
                        }

                        if let Some(d) = distance_label.filter(|_| resolved) {
                            div { class: "distance-readout", "Off by {d}" }
                        }
                    }

                    MapView { session: session }

                    HelpOverlay { show: show_help, scoring: scoring }
                }
            }
        }
    }
}
